use crate::{
    commands::keyboard::KeyBinding, markdown::parse::DEFAULT_SLIDE_TIMING, presentation::timer::TimerThresholds,
};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The default configuration for every presentation.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub bindings: KeyBindingsConfig,
}

impl Config {
    /// Load the config from a path.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigLoadError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("config file not found")]
    NotFound,

    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// The number of seconds slides without a timing directive are shown for.
    #[serde(default = "default_slide_timing")]
    pub slide_timing: u32,

    /// The directory presentations are saved into.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { slide_timing: default_slide_timing(), storage_dir: default_storage_dir() }
    }
}

fn default_slide_timing() -> u32 {
    DEFAULT_SLIDE_TIMING
}

fn default_storage_dir() -> PathBuf {
    "uploads".into()
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    /// The remaining seconds below which the timer is highlighted as a warning.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u32,

    /// The remaining seconds below which the timer is highlighted as urgent.
    #[serde(default = "default_danger_threshold")]
    pub danger_threshold: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { warning_threshold: default_warning_threshold(), danger_threshold: default_danger_threshold() }
    }
}

impl From<&TimerConfig> for TimerThresholds {
    fn from(config: &TimerConfig) -> Self {
        Self { warning: config.warning_threshold, danger: config.danger_threshold }
    }
}

fn default_warning_threshold() -> u32 {
    TimerThresholds::default().warning
}

fn default_danger_threshold() -> u32 {
    TimerThresholds::default().danger
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    /// Whether to ring the terminal bell every time the slide changes.
    #[serde(default = "default_sound")]
    pub sound: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self { sound: default_sound() }
    }
}

fn default_sound() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct KeyBindingsConfig {
    /// The keys that move to the next slide.
    #[serde(default = "default_next_bindings")]
    pub next: Vec<KeyBinding>,

    /// The keys that move to the previous slide.
    #[serde(default = "default_previous_bindings")]
    pub previous: Vec<KeyBinding>,

    /// The keys that restart the presentation from its first slide.
    #[serde(default = "default_restart_bindings")]
    pub restart: Vec<KeyBinding>,

    /// The keys that end the presentation.
    #[serde(default = "default_exit_bindings")]
    pub exit: Vec<KeyBinding>,
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self {
            next: default_next_bindings(),
            previous: default_previous_bindings(),
            restart: default_restart_bindings(),
            exit: default_exit_bindings(),
        }
    }
}

fn make_keybindings<const N: usize>(raw_bindings: [&str; N]) -> Vec<KeyBinding> {
    raw_bindings.into_iter().map(|binding| binding.parse().expect("invalid default binding")).collect()
}

fn default_next_bindings() -> Vec<KeyBinding> {
    make_keybindings(["l", "j", "<right>", "<down>", "<page_down>", "<space>"])
}

fn default_previous_bindings() -> Vec<KeyBinding> {
    make_keybindings(["h", "k", "<left>", "<up>", "<page_up>"])
}

fn default_restart_bindings() -> Vec<KeyBinding> {
    make_keybindings(["r"])
}

fn default_exit_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<esc>", "q", "<c-c>"])
}
