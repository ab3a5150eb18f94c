use super::{
    footer::{progress_bar, NavigationHint},
    terminal::Terminal,
    WindowSize,
};
use crate::{
    markdown::render::{StyledLine, StyledText},
    presentation::{
        event::SlideView,
        timer::{TimerDisplay, TimerLevel},
    },
};
use crossterm::style::{Color, Stylize};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_HEIGHT: u16 = 2;
const FOOTER_HEIGHT: u16 = 2;
const HINT_SEPARATOR: &str = "  ";

/// Everything needed to draw the current slide.
pub(crate) struct SlideFrame<'a> {
    pub(crate) view: &'a SlideView,
    pub(crate) timer: Option<&'a TimerDisplay>,
    pub(crate) lines: &'a [StyledLine],
    pub(crate) hints: &'a [NavigationHint],

    /// Whether the last slide's countdown ran out.
    pub(crate) overtime: bool,
}

/// Allows drawing on the terminal.
pub(crate) struct TerminalDrawer<W: Write> {
    terminal: Terminal<W>,
}

impl<W: Write> TerminalDrawer<W> {
    pub(crate) fn new(handle: W) -> Self {
        Self { terminal: Terminal::new(handle) }
    }

    /// Construct a drawer that takes over the terminal until it's dropped.
    pub(crate) fn acquire(handle: W) -> io::Result<Self> {
        let mut drawer = Self::new(handle);
        drawer.terminal.acquire()?;
        Ok(drawer)
    }

    pub(crate) fn render_slide(&mut self, frame: &SlideFrame, dimensions: WindowSize) -> io::Result<()> {
        self.terminal.clear_screen()?;
        self.render_header(frame, dimensions)?;

        let body_rows = dimensions.rows.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT);
        let body_columns = dimensions.columns.saturating_sub(HORIZONTAL_MARGIN * 2);
        for (row, line) in frame.lines.iter().take(body_rows as usize).enumerate() {
            let indent = line.indent.min(body_columns);
            self.terminal.move_to(HORIZONTAL_MARGIN + indent, HEADER_HEIGHT + row as u16)?;
            self.render_line(line, body_columns - indent)?;
        }

        self.render_footer(frame, dimensions)?;
        self.terminal.flush()
    }

    pub(crate) fn render_error(&mut self, message: &str, dimensions: WindowSize) -> io::Result<()> {
        self.terminal.clear_screen()?;
        let columns = dimensions.columns.saturating_sub(HORIZONTAL_MARGIN * 2);
        let rows: Vec<_> = message.lines().flat_map(|line| wrap(line, columns)).collect();
        let starting_row = (dimensions.rows / 2).saturating_sub(rows.len() as u16 / 2 + 1);

        self.terminal.move_to(HORIZONTAL_MARGIN, starting_row)?;
        self.terminal.print_styled_text("Error loading presentation".to_string().bold().with(Color::Red))?;
        for (index, row) in rows.iter().enumerate() {
            self.terminal.move_to(HORIZONTAL_MARGIN, starting_row + 2 + index as u16)?;
            self.terminal.print_text(row)?;
        }
        self.terminal.flush()
    }

    pub(crate) fn ring_bell(&mut self) -> io::Result<()> {
        self.terminal.bell()
    }

    fn render_header(&mut self, frame: &SlideFrame, dimensions: WindowSize) -> io::Result<()> {
        let position = format!("{} / {}", frame.view.index + 1, frame.view.total);
        self.terminal.move_to(HORIZONTAL_MARGIN, 0)?;
        self.terminal.print_styled_text(position.bold())?;

        let timer = match (frame.overtime, frame.timer) {
            (true, _) => "time's up".to_string().bold().with(Color::Red),
            (false, Some(timer)) => {
                let text = timer.to_string();
                match timer.level {
                    TimerLevel::Normal => text.with(Color::Green),
                    TimerLevel::Warning => text.with(Color::Yellow),
                    TimerLevel::Danger => text.bold().with(Color::Red),
                }
            }
            (false, None) => return Ok(()),
        };
        let width = timer.content().chars().count() as u16;
        let column = dimensions.columns.saturating_sub(width + HORIZONTAL_MARGIN);
        self.terminal.move_to(column, 0)?;
        self.terminal.print_styled_text(timer)
    }

    fn render_footer(&mut self, frame: &SlideFrame, dimensions: WindowSize) -> io::Result<()> {
        let hints_row = dimensions.rows.saturating_sub(FOOTER_HEIGHT);
        self.terminal.move_to(HORIZONTAL_MARGIN, hints_row)?;
        for (index, hint) in frame.hints.iter().enumerate() {
            if index > 0 {
                self.terminal.print_text(HINT_SEPARATOR)?;
            }
            let label = hint.label.clone();
            let label = if hint.enabled { label.stylize() } else { label.with(Color::DarkGrey) };
            self.terminal.print_styled_text(label)?;
        }

        let bar = progress_bar(dimensions.columns, frame.view);
        self.terminal.move_to(0, dimensions.rows.saturating_sub(1))?;
        self.terminal.print_styled_text(bar.with(Color::Blue))
    }

    fn render_line(&mut self, line: &StyledLine, max_columns: u16) -> io::Result<()> {
        let mut available = max_columns;
        for chunk in &line.chunks {
            if available == 0 {
                break;
            }
            let (text, width) = truncate(&chunk.text, available);
            available -= width;
            self.terminal.print_styled_text(apply_style(text, chunk))?;
        }
        Ok(())
    }
}

fn apply_style(text: String, chunk: &StyledText) -> crossterm::style::StyledContent<String> {
    let style = &chunk.style;
    let mut styled = text.stylize();
    if style.bold {
        styled = styled.bold();
    }
    if style.italics {
        styled = styled.italic();
    }
    if style.strikethrough {
        styled = styled.crossed_out();
    }
    if style.code {
        styled = styled.with(Color::Cyan);
    }
    styled
}

/// Cut a piece of text so it's at most `max_columns` wide, returning it along with its width.
fn truncate(text: &str, max_columns: u16) -> (String, u16) {
    let mut output = String::new();
    let mut width = 0;
    for c in text.chars() {
        let char_width = c.width().unwrap_or(0) as u16;
        if width + char_width > max_columns {
            break;
        }
        width += char_width;
        output.push(c);
    }
    (output, width)
}

/// Split a piece of text into rows that are at most `max_columns` wide.
fn wrap(text: &str, max_columns: u16) -> Vec<String> {
    let mut rows = Vec::new();
    let mut rest = text;
    loop {
        let (row, _) = truncate(rest, max_columns);
        if row.is_empty() && !rest.is_empty() {
            break;
        }
        rest = &rest[row.len()..];
        rows.push(row);
        if rest.is_empty() {
            return rows;
        }
    }
    rows
}
