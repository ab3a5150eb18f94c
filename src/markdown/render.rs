use super::parse::enable_extensions;
use comrak::{
    nodes::{AstNode, ListType, NodeList, NodeValue},
    parse_document, Arena, Options,
};

/// The style applied to a piece of text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextStyle {
    pub(crate) bold: bool,
    pub(crate) italics: bool,
    pub(crate) strikethrough: bool,
    pub(crate) code: bool,
}

impl TextStyle {
    pub(crate) fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(crate) fn italics(mut self) -> Self {
        self.italics = true;
        self
    }

    pub(crate) fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    pub(crate) fn code(mut self) -> Self {
        self.code = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StyledText {
    pub(crate) text: String,
    pub(crate) style: TextStyle,
}

impl StyledText {
    pub(crate) fn new<S: Into<String>>(text: S, style: TextStyle) -> Self {
        Self { text: text.into(), style }
    }

    pub(crate) fn plain<S: Into<String>>(text: S) -> Self {
        Self::new(text, TextStyle::default())
    }
}

/// A line of text ready to be printed on a terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StyledLine {
    pub(crate) indent: u16,
    pub(crate) chunks: Vec<StyledText>,
}

impl StyledLine {
    #[cfg(test)]
    pub(crate) fn text(&self) -> String {
        self.chunks.iter().map(|chunk| chunk.text.as_str()).collect()
    }
}

/// Render a slide's markdown into lines that can be drawn on a terminal.
pub(crate) fn render_lines(contents: &str) -> Vec<StyledLine> {
    let arena = Arena::new();
    let mut options = Options::default();
    enable_extensions(&mut options);
    let root = parse_document(&arena, contents, &options);

    let mut renderer = LineRenderer::default();
    renderer.render_children(root, 0);
    while renderer.lines.last().is_some_and(|line| line.chunks.is_empty()) {
        renderer.lines.pop();
    }
    renderer.lines
}

#[derive(Default)]
struct LineRenderer {
    lines: Vec<StyledLine>,
}

impl LineRenderer {
    fn render_children<'a>(&mut self, node: &'a AstNode<'a>, indent: u16) {
        for child in node.children() {
            self.render_block(child, indent);
        }
    }

    fn render_block<'a>(&mut self, node: &'a AstNode<'a>, indent: u16) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => {
                let style = TextStyle::default().bold();
                let prefix = format!("{} ", "#".repeat(heading.level as usize));
                let mut chunks = vec![StyledText::new(prefix, style.clone())];
                collect_inlines(node, &style, &mut chunks);
                self.push(indent, chunks);
                self.push_empty();
            }
            NodeValue::Paragraph => {
                self.render_paragraph(node, indent, Vec::new());
                self.push_empty();
            }
            NodeValue::List(list) => {
                self.render_list(node, list, indent);
                self.push_empty();
            }
            NodeValue::CodeBlock(block) => {
                for line in block.literal.lines() {
                    self.push(indent + 4, vec![StyledText::new(line, TextStyle::default().code())]);
                }
                self.push_empty();
            }
            NodeValue::BlockQuote => {
                let start = self.lines.len();
                self.render_children(node, indent);
                for line in &mut self.lines[start..] {
                    if !line.chunks.is_empty() {
                        line.chunks.insert(0, StyledText::new("▍ ", TextStyle::default().italics()));
                    }
                }
            }
            NodeValue::Table(_) => {
                for row in node.children() {
                    let mut chunks = Vec::new();
                    for (index, cell) in row.children().enumerate() {
                        if index > 0 {
                            chunks.push(StyledText::plain(" │ "));
                        }
                        collect_inlines(cell, &TextStyle::default(), &mut chunks);
                    }
                    self.push(indent, chunks);
                }
                self.push_empty();
            }
            NodeValue::ThematicBreak => {
                self.push(indent, vec![StyledText::plain("───")]);
                self.push_empty();
            }
            NodeValue::HtmlBlock(_) => (),
            _ => self.render_children(node, indent),
        }
    }

    fn render_paragraph<'a>(&mut self, node: &'a AstNode<'a>, indent: u16, prefix: Vec<StyledText>) {
        let mut chunks = prefix;
        collect_inlines(node, &TextStyle::default(), &mut chunks);
        // Hard line breaks show up as newlines in the collected text.
        let mut line = Vec::new();
        for chunk in chunks {
            let mut pieces = chunk.text.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                if !piece.is_empty() {
                    line.push(StyledText::new(piece, chunk.style.clone()));
                }
                if pieces.peek().is_some() {
                    self.push(indent, std::mem::take(&mut line));
                }
            }
        }
        self.push(indent, line);
    }

    fn render_list<'a>(&mut self, node: &'a AstNode<'a>, list: &NodeList, indent: u16) {
        let item_indent = indent + 2;
        for (index, item) in node.children().enumerate() {
            let marker = match list.list_type {
                ListType::Bullet => "• ".to_string(),
                ListType::Ordered => format!("{}. ", list.start + index),
            };
            // The marker goes in front of the item's first paragraph.
            let mut marker = Some(StyledText::plain(marker));
            for child in item.children() {
                let data = child.data.borrow();
                match &data.value {
                    NodeValue::Paragraph => {
                        let prefix = marker.take().into_iter().collect();
                        self.render_paragraph(child, item_indent, prefix);
                    }
                    NodeValue::List(nested) => self.render_list(child, nested, item_indent),
                    _ => self.render_block(child, item_indent),
                }
            }
            if let Some(marker) = marker {
                self.push(item_indent, vec![marker]);
            }
        }
    }

    fn push(&mut self, indent: u16, chunks: Vec<StyledText>) {
        self.lines.push(StyledLine { indent, chunks });
    }

    fn push_empty(&mut self) {
        if self.lines.last().is_some_and(|line| !line.chunks.is_empty()) {
            self.lines.push(StyledLine::default());
        }
    }
}

fn collect_inlines<'a>(node: &'a AstNode<'a>, style: &TextStyle, chunks: &mut Vec<StyledText>) {
    for child in node.children() {
        let data = child.data.borrow();
        match &data.value {
            NodeValue::Text(text) => chunks.push(StyledText::new(text.to_string(), style.clone())),
            NodeValue::Code(code) => chunks.push(StyledText::new(code.literal.clone(), style.clone().code())),
            NodeValue::Strong => collect_inlines(child, &style.clone().bold(), chunks),
            NodeValue::Emph => collect_inlines(child, &style.clone().italics(), chunks),
            NodeValue::Strikethrough => collect_inlines(child, &style.clone().strikethrough(), chunks),
            NodeValue::SoftBreak => chunks.push(StyledText::new(" ", style.clone())),
            NodeValue::LineBreak => chunks.push(StyledText::new("\n", style.clone())),
            NodeValue::HtmlInline(_) => (),
            _ => collect_inlines(child, style, chunks),
        }
    }
}
