use crate::{
    commands::{keyboard::CommandKeyBindings, listener::Command},
    presentation::event::SlideView,
};

const PROGRESS_CHARACTER: &str = "█";

/// Build the progress bar for the given slide, spanning at most `columns` cells.
pub(crate) fn progress_bar(columns: u16, view: &SlideView) -> String {
    if view.total == 0 {
        return String::new();
    }
    let columns_ratio = (columns as f64 * view.progress()).ceil();
    PROGRESS_CHARACTER.repeat(columns_ratio as usize)
}

/// A hint telling the presenter which key triggers a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NavigationHint {
    pub(crate) label: String,
    pub(crate) enabled: bool,
}

/// Build the hints shown in the footer.
///
/// Navigation hints are disabled when the current slide is at that end of the deck. Commands
/// without any key bound to them get no hint.
pub(crate) fn navigation_hints(bindings: &CommandKeyBindings, view: &SlideView) -> Vec<NavigationHint> {
    let commands = [
        (Command::Previous, "previous", view.previous_enabled()),
        (Command::Next, "next", view.next_enabled()),
        (Command::Restart, "restart", true),
        (Command::Exit, "exit", true),
    ];
    let mut hints = Vec::new();
    for (command, name, enabled) in commands {
        if let Some(binding) = bindings.bindings_for(command).next() {
            hints.push(NavigationHint { label: format!("{binding} {name}"), enabled });
        }
    }
    hints
}
