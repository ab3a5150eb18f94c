use std::io;

pub(crate) mod draw;
pub(crate) mod footer;
pub(crate) mod terminal;

/// The size of the terminal window, in character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WindowSize {
    pub(crate) rows: u16,
    pub(crate) columns: u16,
}

impl WindowSize {
    pub(crate) fn current() -> io::Result<Self> {
        let (columns, rows) = crossterm::terminal::size()?;
        Ok(Self { rows, columns })
    }
}
