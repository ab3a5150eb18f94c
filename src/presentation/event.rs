use super::timer::TimerDisplay;

/// A notification emitted by the runner for the host to display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunnerEvent {
    /// A slide became the current one.
    SlideShown(SlideView),

    /// The remaining time on the current slide changed.
    TimerUpdated(TimerDisplay),

    /// A slide change happened; hosts typically play a sound.
    AdvanceCue,

    /// The countdown for the slide at this index ran out.
    Expired { index: usize },
}

/// Where the presentation is at after a slide was shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideView {
    pub index: usize,
    pub total: usize,

    /// The slide's own timing plus any bonus carried into it.
    pub duration: i64,
}

impl SlideView {
    /// The fraction of the deck that has been reached, counting the current slide.
    pub fn progress(&self) -> f64 {
        (self.index + 1) as f64 / self.total as f64
    }

    pub fn previous_enabled(&self) -> bool {
        self.index != 0
    }

    pub fn next_enabled(&self) -> bool {
        self.index + 1 != self.total
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single(0, 1, false, false)]
    #[case::first(0, 3, false, true)]
    #[case::middle(1, 3, true, true)]
    #[case::last(2, 3, true, false)]
    fn navigation(#[case] index: usize, #[case] total: usize, #[case] previous: bool, #[case] next: bool) {
        let view = SlideView { index, total, duration: 0 };
        assert_eq!(view.previous_enabled(), previous);
        assert_eq!(view.next_enabled(), next);
    }

    #[test]
    fn progress() {
        let view = SlideView { index: 1, total: 4, duration: 0 };
        assert_eq!(view.progress(), 0.5);
    }
}
