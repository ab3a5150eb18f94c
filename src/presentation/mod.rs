use serde::Serialize;

pub(crate) mod countdown;
pub(crate) mod event;
pub(crate) mod runner;
pub(crate) mod timer;

/// A single slide in a deck.
///
/// Slides are immutable once parsed: the runner only ever reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Slide {
    /// The markdown this slide was built from, without timing directives.
    pub content: String,

    /// The rendered markup for this slide.
    pub html: String,

    /// The number of seconds this slide is meant to be displayed for.
    pub timing: u32,
}

/// An ordered list of slides that make up a presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// The sum of every slide's timing, in seconds.
    pub fn total_timing(&self) -> u64 {
        self.slides.iter().map(|slide| u64::from(slide.timing)).sum()
    }
}
