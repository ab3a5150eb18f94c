use crate::presentation::{Deck, Slide};
use comrak::{markdown_to_html, Options};

/// The timing used for slides that don't specify one.
pub const DEFAULT_SLIDE_TIMING: u32 = 60;

const SLIDE_SEPARATOR: &str = "---";
const TIMING_DIRECTIVE: &str = "<!-- timing:";

type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// The timing, in seconds, for slides without a timing directive.
    pub default_timing: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { default_timing: DEFAULT_SLIDE_TIMING }
    }
}

/// Turns markdown into a deck of timed slides.
///
/// Slides are separated by lines starting with `---`. A slide's timing is set via a line that
/// starts with `<!-- timing: <seconds>`, anywhere in the slide.
#[derive(Default)]
pub struct DeckParser {
    options: ParserOptions,
}

impl DeckParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, contents: &str) -> ParseResult<Deck> {
        let mut slides = Vec::new();
        let mut builder = SlideBuilder::new(self.options.default_timing);
        for (line_number, line) in contents.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.starts_with(SLIDE_SEPARATOR) {
                let next = SlideBuilder::new(self.options.default_timing);
                slides.extend(std::mem::replace(&mut builder, next).build());
            } else if let Some(directive) = line.strip_prefix(TIMING_DIRECTIVE) {
                if let Some(timing) = Self::parse_timing(directive, line_number + 1)? {
                    builder.timing = timing;
                }
            } else {
                builder.lines.push(line);
            }
        }
        slides.extend(builder.build());
        Ok(Deck::new(slides))
    }

    fn parse_timing(directive: &str, line: usize) -> ParseResult<Option<u32>> {
        let directive = directive.trim_start();
        let end = directive.find(|c: char| !c.is_ascii_digit()).unwrap_or(directive.len());
        let digits = &directive[..end];
        if digits.is_empty() {
            return Ok(None);
        }
        match digits.parse() {
            Ok(timing) => Ok(Some(timing)),
            Err(_) => Err(ParseError::InvalidTiming { line, value: digits.to_string() }),
        }
    }
}

struct SlideBuilder<'a> {
    lines: Vec<&'a str>,
    timing: u32,
}

impl<'a> SlideBuilder<'a> {
    fn new(timing: u32) -> Self {
        Self { lines: Vec::new(), timing }
    }

    fn build(self) -> Option<Slide> {
        if self.lines.is_empty() {
            return None;
        }
        let content = self.lines.join("\n");
        let html = render_html(&content);
        Some(Slide { content, html, timing: self.timing })
    }
}

/// Enable the markdown extensions slides can use.
pub(crate) fn enable_extensions(options: &mut Options) {
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
}

fn render_html(contents: &str) -> String {
    let mut options = Options::default();
    enable_extensions(&mut options);
    markdown_to_html(contents, &options)
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid timing '{value}' at line {line}")]
    InvalidTiming { line: usize, value: String },
}
