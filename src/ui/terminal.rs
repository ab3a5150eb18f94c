use crossterm::{
    cursor,
    style::{self, StyledContent},
    terminal, QueueableCommand,
};
use std::io::{self, Write};

/// A wrapper over the terminal write handle.
///
/// An acquired terminal is in raw mode and on the alternate screen until it's dropped.
pub(crate) struct Terminal<W>
where
    W: Write,
{
    writer: W,
    acquired: bool,
}

impl<W: Write> Terminal<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer, acquired: false }
    }

    /// Take over the terminal so a presentation can be drawn on it.
    pub(crate) fn acquire(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.acquired = true;
        self.writer.queue(terminal::EnterAlternateScreen)?;
        self.writer.queue(cursor::Hide)?;
        self.writer.flush()
    }

    pub(crate) fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.writer.queue(cursor::MoveTo(column, row))?;
        Ok(())
    }

    pub(crate) fn print_text(&mut self, text: &str) -> io::Result<()> {
        self.writer.queue(style::Print(text))?;
        Ok(())
    }

    pub(crate) fn print_styled_text(&mut self, content: StyledContent<String>) -> io::Result<()> {
        self.writer.queue(style::PrintStyledContent(content))?;
        Ok(())
    }

    pub(crate) fn clear_screen(&mut self) -> io::Result<()> {
        self.writer.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    pub(crate) fn bell(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\x07")?;
        self.writer.flush()
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W> Drop for Terminal<W>
where
    W: Write,
{
    fn drop(&mut self) {
        if !self.acquired {
            return;
        }
        let _ = self.writer.queue(terminal::LeaveAlternateScreen);
        let _ = self.writer.queue(cursor::Show);
        let _ = self.writer.flush();
        let _ = terminal::disable_raw_mode();
    }
}
