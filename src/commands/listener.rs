use super::{
    keyboard::{CommandKeyBindings, KeyBindingsValidationError, KeyboardListener},
    watcher::PresentationFileWatcher,
};
use crate::config::KeyBindingsConfig;
use std::{io, path::PathBuf, time::Duration};

/// A command listener that allows polling all command sources in a single place.
pub struct CommandListener {
    keyboard: KeyboardListener,
    watcher: PresentationFileWatcher,
}

impl CommandListener {
    /// Create a new listener that also watches the presentation at the given path.
    pub fn new<P: Into<PathBuf>>(
        config: KeyBindingsConfig,
        presentation_path: P,
    ) -> Result<Self, KeyBindingsValidationError> {
        let bindings = CommandKeyBindings::try_from(config)?;
        let watcher = PresentationFileWatcher::new(presentation_path);
        Ok(Self { keyboard: KeyboardListener::new(bindings), watcher })
    }

    pub(crate) fn bindings(&self) -> &CommandKeyBindings {
        self.keyboard.bindings()
    }

    /// Try to get the next command, waiting at most `timeout` for user input.
    ///
    /// This returns `Ok(None)` on timeout.
    pub(crate) fn try_next_command(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if let Some(command) = self.keyboard.poll_next_command(timeout)? {
            return Ok(Some(command));
        }
        if self.watcher.has_modifications()? { Ok(Some(Command::Reload)) } else { Ok(None) }
    }
}

/// A command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Redraw the presentation.
    ///
    /// This can happen on terminal resize.
    Redraw,

    /// Move to the next slide.
    Next,

    /// Move to the previous slide.
    Previous,

    /// Start the presentation over from its first slide.
    Restart,

    /// Exit the presentation.
    Exit,

    /// The presentation file changed and needs to be reloaded.
    Reload,
}
