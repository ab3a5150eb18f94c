//! markdslide: timed markdown slideshows in your terminal.
//!
//! This is not meant to be used as a crate!

pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod markdown;
pub(crate) mod presentation;
pub(crate) mod presenter;
pub(crate) mod sample;
pub(crate) mod storage;
pub(crate) mod ui;

pub use crate::{
    commands::{keyboard::KeyBindingsValidationError, listener::CommandListener},
    config::{Config, ConfigLoadError},
    export::{ExportError, Exporter},
    markdown::parse::{DeckParser, ParseError, ParserOptions},
    presentation::{
        runner::{PresentationRunner, RunnerError},
        timer::TimerThresholds,
        Deck, Slide,
    },
    presenter::{PresentationError, Presenter, PresenterOptions},
    sample::SAMPLE_PRESENTATION,
    storage::{PresentationStore, StorageError},
};
