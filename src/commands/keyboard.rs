use super::listener::Command;
use crate::config::KeyBindingsConfig;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Deserialize;
use std::{fmt, io, iter, mem, str::FromStr, time::Duration};

/// Named keys that can be used inside a binding, along with the aliases they can be spelled as.
const NAMED_KEYS: &[(&[&str], KeyCode)] = &[
    (&["<page_up>", "<PageUp>"], KeyCode::PageUp),
    (&["<page_down>", "<PageDown>"], KeyCode::PageDown),
    (&["<enter>", "<Enter>", "<cr>", "<CR>"], KeyCode::Enter),
    (&["<home>", "<Home>"], KeyCode::Home),
    (&["<end>", "<End>"], KeyCode::End),
    (&["<left>", "<Left>"], KeyCode::Left),
    (&["<right>", "<Right>"], KeyCode::Right),
    (&["<up>", "<Up>"], KeyCode::Up),
    (&["<down>", "<Down>"], KeyCode::Down),
    (&["<esc>", "<Esc>"], KeyCode::Esc),
    (&["<tab>", "<Tab>"], KeyCode::Tab),
    (&["<backspace>", "<Backspace>"], KeyCode::Backspace),
    (&["<space>", "<Space>"], KeyCode::Char(' ')),
];

/// Turns keyboard events into commands.
pub struct KeyboardListener {
    bindings: CommandKeyBindings,
    pending: Vec<KeyEvent>,
}

impl KeyboardListener {
    pub fn new(bindings: CommandKeyBindings) -> Self {
        Self { bindings, pending: Vec::new() }
    }

    pub(crate) fn bindings(&self) -> &CommandKeyBindings {
        &self.bindings
    }

    /// Wait up to `timeout` for the next command.
    pub(crate) fn poll_next_command(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if poll(timeout)? { self.next_command() } else { Ok(None) }
    }

    fn next_command(&mut self) -> io::Result<Option<Command>> {
        let command = match read()? {
            Event::Key(event) if event.kind == KeyEventKind::Release => None,
            Event::Key(event) => self.push_event(event),
            Event::Resize(..) => Some(Command::Redraw),
            _ => None,
        };
        Ok(command)
    }

    fn push_event(&mut self, event: KeyEvent) -> Option<Command> {
        let mut events = mem::take(&mut self.pending);
        events.push(event);
        match self.bindings.apply(&events) {
            BindingMatch::Full(command) => Some(command),
            BindingMatch::Partial => {
                self.pending = events;
                None
            }
            BindingMatch::None => None,
        }
    }
}

/// The set of key bindings for every command.
pub struct CommandKeyBindings {
    bindings: Vec<(KeyBinding, Command)>,
}

impl CommandKeyBindings {
    fn apply(&self, events: &[KeyEvent]) -> BindingMatch<Command> {
        let mut any_partial = false;
        for (binding, command) in &self.bindings {
            match binding.match_events(events) {
                BindingMatch::Full(()) => return BindingMatch::Full(command.clone()),
                BindingMatch::Partial => any_partial = true,
                BindingMatch::None => (),
            }
        }
        if any_partial { BindingMatch::Partial } else { BindingMatch::None }
    }

    /// The bindings for a command, as they can be displayed to the user.
    pub(crate) fn bindings_for(&self, command: Command) -> impl Iterator<Item = &KeyBinding> + '_ {
        self.bindings.iter().filter(move |(_, c)| *c == command).map(|(binding, _)| binding)
    }

    fn validate_conflicts<'a>(
        bindings: impl Iterator<Item = &'a KeyBinding>,
    ) -> Result<(), KeyBindingsValidationError> {
        let mut bindings: Vec<_> = bindings.collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        for window in bindings.windows(2) {
            let (shorter, longer) = (window[0], window[1]);
            if longer.0.starts_with(&shorter.0) {
                return Err(KeyBindingsValidationError::Conflict(shorter.clone(), longer.clone()));
            }
        }
        Ok(())
    }
}

impl TryFrom<KeyBindingsConfig> for CommandKeyBindings {
    type Error = KeyBindingsValidationError;

    fn try_from(config: KeyBindingsConfig) -> Result<Self, Self::Error> {
        let zip = |command, bindings: Vec<KeyBinding>| bindings.into_iter().zip(iter::repeat(command));
        let bindings: Vec<_> = iter::empty()
            .chain(zip(Command::Next, config.next))
            .chain(zip(Command::Previous, config.previous))
            .chain(zip(Command::Restart, config.restart))
            .chain(zip(Command::Exit, config.exit))
            .collect();
        Self::validate_conflicts(bindings.iter().map(|(binding, _)| binding))?;
        Ok(Self { bindings })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingsValidationError {
    #[error("conflicting keybindings: {0} and {1}")]
    Conflict(KeyBinding, KeyBinding),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BindingMatch<T> {
    Full(T),
    Partial,
    None,
}

/// A sequence of keys that triggers a command, e.g. `<c-c>` or `gg`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(try_from = "String")]
pub struct KeyBinding(#[cfg_attr(feature = "json-schema", schemars(with = "String"))] Vec<KeyCombination>);

impl KeyBinding {
    fn match_events(&self, events: &[KeyEvent]) -> BindingMatch<()> {
        if events.len() > self.0.len() {
            return BindingMatch::None;
        }
        if !self.0.iter().zip(events).all(|(combo, event)| combo.matches(event)) {
            return BindingMatch::None;
        }
        if events.len() == self.0.len() { BindingMatch::Full(()) } else { BindingMatch::Partial }
    }
}

impl FromStr for KeyBinding {
    type Err = KeyBindingParseError;

    fn from_str(mut input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(KeyBindingParseError::NoInput);
        }
        let mut combos = Vec::new();
        while !input.is_empty() {
            let (combo, rest) = KeyCombination::parse(input)?;
            combos.push(combo);
            input = rest;
        }
        Ok(Self(combos))
    }
}

impl TryFrom<String> for KeyBinding {
    type Error = KeyBindingParseError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for combo in &self.0 {
            write!(f, "{combo}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingParseError {
    #[error("no input")]
    NoInput,

    #[error("not a valid key: {0}")]
    InvalidKey(String),

    #[error("invalid control sequence")]
    InvalidControlSequence,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct KeyCombination {
    key: OrderedKeyCode,
    control: bool,
}

impl KeyCombination {
    fn matches(&self, event: &KeyEvent) -> bool {
        let is_control = event.modifiers == KeyModifiers::CONTROL;
        self.key.0 == event.code && self.control == is_control
    }

    fn parse(input: &str) -> Result<(Self, &str), KeyBindingParseError> {
        if let Some(rest) = input.strip_prefix("<c-").or_else(|| input.strip_prefix("<C-")) {
            let (key, rest) = Self::parse_key(rest)?;
            let rest = rest.strip_prefix('>').ok_or(KeyBindingParseError::InvalidControlSequence)?;
            Ok((Self { key: OrderedKeyCode(key), control: true }, rest))
        } else {
            let (key, rest) = Self::parse_key(input)?;
            Ok((Self { key: OrderedKeyCode(key), control: false }, rest))
        }
    }

    fn parse_key(input: &str) -> Result<(KeyCode, &str), KeyBindingParseError> {
        for (aliases, key) in NAMED_KEYS {
            if let Some(rest) = aliases.iter().find_map(|alias| input.strip_prefix(alias)) {
                return Ok((*key, rest));
            }
        }
        let next = input.chars().next().ok_or(KeyBindingParseError::NoInput)?;
        if next == '<' {
            let tag = input.split_inclusive('>').next().unwrap_or(input);
            return Err(KeyBindingParseError::InvalidKey(tag.to_string()));
        }
        if next == '>' || !(next.is_alphanumeric() || next.is_ascii_punctuation() || next == ' ') {
            return Err(KeyBindingParseError::InvalidKey(next.to_string()));
        }
        Ok((KeyCode::Char(next), &input[next.len_utf8()..]))
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.control {
            write!(f, "<c-")?;
        }
        match self.key.0 {
            KeyCode::Char(c) if c != ' ' => write!(f, "{c}")?,
            key => {
                let name = NAMED_KEYS
                    .iter()
                    .find(|(_, named)| *named == key)
                    .map(|(aliases, _)| aliases[0])
                    .unwrap_or("<?>");
                write!(f, "{name}")?
            }
        };
        if self.control {
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// A [KeyCode] that can be sorted, so conflicting bindings end up next to each other.
#[derive(Clone, Debug, PartialEq, Eq)]
struct OrderedKeyCode(KeyCode);

impl PartialOrd for OrderedKeyCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKeyCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        format!("{:?}", self.0).cmp(&format!("{:?}", other.0))
    }
}
