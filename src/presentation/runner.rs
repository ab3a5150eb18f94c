use super::{
    countdown::{Countdown, TICK_PERIOD},
    event::{RunnerEvent, SlideView},
    timer::{TimerDisplay, TimerThresholds},
    Deck, Slide,
};
use std::{mem, time::Instant};
use tracing::{debug, info};

/// A source of time for the runner's countdown.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Drives a presentation: which slide is current, how long it has left and when to move on.
///
/// Unused time on a slide is carried over as bonus time into the next slide, but only when moving
/// forward. Moving backwards discards it.
///
/// The runner never blocks. The host is expected to call [PresentationRunner::poll] regularly
/// (see [PresentationRunner::next_deadline]) and to drain the notifications produced via
/// [PresentationRunner::take_events].
pub struct PresentationRunner<C = SystemClock> {
    clock: C,
    thresholds: TimerThresholds,
    state: RunnerState,
    events: Vec<RunnerEvent>,
}

impl<C: Clock> PresentationRunner<C> {
    pub fn new(clock: C, thresholds: TimerThresholds) -> Self {
        Self { clock, thresholds, state: RunnerState::Idle, events: Vec::new() }
    }

    /// Start a new session over the given deck, showing its first slide.
    ///
    /// Any running session is discarded, including its bonus time.
    pub fn start(&mut self, deck: Deck) -> Result<(), RunnerError> {
        if deck.is_empty() {
            return Err(RunnerError::EmptyDeck);
        }
        info!(slides = deck.len(), total_timing = deck.total_timing(), "starting presentation");
        self.state = RunnerState::Active(Session {
            deck,
            current: 0,
            time_left: 0,
            bonus_time: 0,
            used_bonus: 0,
            countdown: None,
        });
        self.show_slide(0);
        self.events.push(RunnerEvent::AdvanceCue);
        Ok(())
    }

    /// Make the slide at `index` the current one and restart the countdown for it.
    ///
    /// Any accumulated bonus time is added to the slide's timing and reset. Indexes out of the
    /// deck's bounds are ignored, as is any call while no session is running.
    pub fn show_slide(&mut self, index: usize) {
        let now = self.clock.now();
        let RunnerState::Active(session) = &mut self.state else {
            return;
        };
        let Some(timing) = session.deck.get(index).map(|slide| slide.timing) else {
            return;
        };
        session.countdown = None;
        session.current = index;

        let bonus = mem::take(&mut session.bonus_time);
        session.used_bonus = bonus;
        session.time_left = i64::from(timing).saturating_add_unsigned(bonus);
        session.countdown = Some(Countdown::arm(now, TICK_PERIOD));
        debug!(index, timing, bonus, "showing slide");

        let view = SlideView { index, total: session.deck.len(), duration: session.time_left };
        let timer = session.timer_display(&self.thresholds);
        self.events.push(RunnerEvent::SlideShown(view));
        self.events.push(RunnerEvent::TimerUpdated(timer));
    }

    /// Move to the next slide, carrying any time left on the current one as bonus time.
    pub fn next(&mut self) {
        let RunnerState::Active(session) = &mut self.state else {
            return;
        };
        let target = session.current + 1;
        if target >= session.deck.len() {
            return;
        }
        if session.time_left > 0 {
            session.bonus_time += session.time_left.unsigned_abs();
        }
        self.show_slide(target);
        self.events.push(RunnerEvent::AdvanceCue);
    }

    /// Move to the previous slide. Time left on the current slide is lost.
    pub fn previous(&mut self) {
        let RunnerState::Active(session) = &mut self.state else {
            return;
        };
        let Some(target) = session.current.checked_sub(1) else {
            return;
        };
        self.show_slide(target);
        self.events.push(RunnerEvent::AdvanceCue);
    }

    /// End the current session, if any.
    pub fn stop(&mut self) {
        if let RunnerState::Active(session) = &self.state {
            info!(index = session.current, "stopping presentation");
        }
        self.state = RunnerState::Idle;
    }

    /// Run every countdown tick that is due by now.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        loop {
            let RunnerState::Active(session) = &mut self.state else {
                return;
            };
            let Some(countdown) = session.countdown.as_mut() else {
                return;
            };
            if !countdown.try_fire(now) {
                return;
            }
            self.tick();
        }
    }

    /// One second elapsed on the current slide.
    ///
    /// Expiry is checked after decrementing, so a slide is only noticed as expired on the tick that
    /// takes it to zero or below.
    pub(crate) fn tick(&mut self) {
        let RunnerState::Active(session) = &mut self.state else {
            return;
        };
        if session.countdown.is_none() {
            return;
        }
        session.time_left -= 1;
        self.events.push(RunnerEvent::TimerUpdated(session.timer_display(&self.thresholds)));
        if session.time_left > 0 {
            return;
        }

        session.countdown = None;
        let index = session.current;
        let is_last = index + 1 >= session.deck.len();
        self.events.push(RunnerEvent::Expired { index });
        if !is_last {
            info!(index, "slide time is up, advancing");
            self.next();
        } else {
            info!(index, "time is up on the last slide");
        }
    }

    /// The instant at which the next tick is due, if a countdown is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session().and_then(|session| session.countdown.as_ref()).map(Countdown::deadline)
    }

    /// Take every notification produced since the last call.
    pub fn take_events(&mut self) -> Vec<RunnerEvent> {
        mem::take(&mut self.events)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RunnerState::Active(_))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session().map(|session| session.current)
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.session().and_then(|session| session.deck.get(session.current))
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.session().map(|session| &session.deck)
    }

    pub fn time_left(&self) -> Option<i64> {
        self.session().map(|session| session.time_left)
    }

    /// The bonus time waiting to be consumed by the next slide transition.
    pub fn bonus_time(&self) -> u64 {
        self.session().map(|session| session.bonus_time).unwrap_or_default()
    }

    /// The current timer, as it should be displayed.
    pub fn timer(&self) -> Option<TimerDisplay> {
        self.session().map(|session| session.timer_display(&self.thresholds))
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            RunnerState::Active(session) => Some(session),
            RunnerState::Idle => None,
        }
    }
}

#[derive(Debug)]
enum RunnerState {
    Idle,
    Active(Session),
}

#[derive(Debug)]
struct Session {
    deck: Deck,
    current: usize,
    time_left: i64,
    bonus_time: u64,
    used_bonus: u64,
    countdown: Option<Countdown>,
}

impl Session {
    fn timer_display(&self, thresholds: &TimerThresholds) -> TimerDisplay {
        TimerDisplay::new(self.time_left, self.used_bonus, thresholds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("presentation has no slides")]
    EmptyDeck,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presentation::test_utils::deck_with_timings;
    use rstest::rstest;
    use std::{cell::Cell, rc::Rc, time::Duration};

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(Instant::now())))
        }

        fn advance(&self, seconds: u64) {
            self.0.set(self.0.get() + Duration::from_secs(seconds));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    struct Harness {
        clock: ManualClock,
        runner: PresentationRunner<ManualClock>,
    }

    impl Harness {
        fn started(timings: &[u32]) -> Self {
            let clock = ManualClock::new();
            let mut runner = PresentationRunner::new(clock.clone(), TimerThresholds::default());
            runner.start(deck_with_timings(timings)).expect("start failed");
            Self { clock, runner }
        }

        fn elapse(&mut self, seconds: u64) {
            for _ in 0..seconds {
                self.clock.advance(1);
                self.runner.poll();
            }
        }

        fn shown_slides(&mut self) -> Vec<SlideView> {
            self.runner
                .take_events()
                .into_iter()
                .filter_map(|event| match event {
                    RunnerEvent::SlideShown(view) => Some(view),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn start_shows_first_slide() {
        let mut harness = Harness::started(&[5, 8]);
        assert!(harness.runner.is_active());
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(5));
        assert_eq!(harness.runner.bonus_time(), 0);

        let events = harness.runner.take_events();
        let expected_timer = TimerDisplay::new(5, 0, &TimerThresholds::default());
        assert_eq!(
            events,
            vec![
                RunnerEvent::SlideShown(SlideView { index: 0, total: 2, duration: 5 }),
                RunnerEvent::TimerUpdated(expected_timer),
                RunnerEvent::AdvanceCue,
            ]
        );
    }

    #[test]
    fn start_with_empty_deck() {
        let mut runner = PresentationRunner::new(ManualClock::new(), TimerThresholds::default());
        let result = runner.start(Deck::default());
        assert!(matches!(result, Err(RunnerError::EmptyDeck)));
        assert!(!runner.is_active());
        assert_eq!(runner.current_index(), None);
        assert!(runner.take_events().is_empty());
    }

    #[test]
    fn navigation_without_session_is_ignored() {
        let mut runner = PresentationRunner::new(ManualClock::new(), TimerThresholds::default());
        runner.next();
        runner.previous();
        runner.show_slide(0);
        runner.tick();
        runner.poll();
        runner.stop();
        runner.stop();
        assert!(!runner.is_active());
        assert!(runner.take_events().is_empty());
        assert_eq!(runner.next_deadline(), None);
    }

    #[rstest]
    #[case::single(&[5])]
    #[case::three(&[5, 8, 3])]
    #[case::many(&[1, 1, 1, 1, 1, 1, 1])]
    fn next_reaches_last_slide(#[case] timings: &[u32]) {
        let mut harness = Harness::started(timings);
        for _ in 1..timings.len() {
            harness.runner.next();
        }
        let last = timings.len() - 1;
        assert_eq!(harness.runner.current_index(), Some(last));

        harness.runner.take_events();
        harness.runner.next();
        assert_eq!(harness.runner.current_index(), Some(last));
        assert!(harness.runner.take_events().is_empty());
    }

    #[test]
    fn previous_on_first_slide_is_ignored() {
        let mut harness = Harness::started(&[5, 8]);
        harness.elapse(2);
        harness.runner.take_events();
        harness.runner.previous();
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(3));
        assert!(harness.runner.take_events().is_empty());
    }

    #[test]
    fn unused_time_carries_forward() {
        let mut harness = Harness::started(&[10, 20]);
        harness.elapse(3);
        assert_eq!(harness.runner.time_left(), Some(7));

        harness.runner.next();
        assert_eq!(harness.runner.current_index(), Some(1));
        assert_eq!(harness.runner.time_left(), Some(27));
        assert_eq!(harness.runner.bonus_time(), 0);
        assert_eq!(harness.runner.timer().map(|timer| timer.used_bonus), Some(7));
    }

    #[test]
    fn bonus_is_consumed_once() {
        let mut harness = Harness::started(&[10, 10, 10]);
        harness.elapse(3);
        harness.runner.next();
        assert_eq!(harness.runner.bonus_time(), 0);

        // Going back and forth again must not see the old bonus.
        harness.runner.previous();
        assert_eq!(harness.runner.time_left(), Some(10));
        harness.elapse(10);
        assert_eq!(harness.runner.current_index(), Some(1));
        assert_eq!(harness.runner.time_left(), Some(10));
    }

    #[test]
    fn previous_discards_unused_time() {
        let mut harness = Harness::started(&[10, 10, 10]);
        harness.runner.next();
        harness.elapse(3);
        assert_eq!(harness.runner.time_left(), Some(17));

        harness.runner.previous();
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(10));
        assert_eq!(harness.runner.bonus_time(), 0);
    }

    #[test]
    fn example_session() {
        let mut harness = Harness::started(&[5, 8, 3]);
        assert_eq!(harness.runner.time_left(), Some(5));

        harness.elapse(2);
        harness.runner.next();
        assert_eq!(harness.runner.current_index(), Some(1));
        assert_eq!(harness.runner.time_left(), Some(11));

        harness.elapse(4);
        assert_eq!(harness.runner.time_left(), Some(7));
        harness.runner.previous();
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(5));
    }

    #[test]
    fn repeated_show_slide_keeps_single_countdown() {
        let mut harness = Harness::started(&[10, 10, 10]);
        harness.runner.show_slide(1);
        harness.runner.show_slide(1);
        harness.runner.show_slide(2);
        harness.runner.take_events();

        harness.clock.advance(1);
        harness.runner.poll();
        let timer_updates =
            harness.runner.take_events().into_iter().filter(|e| matches!(e, RunnerEvent::TimerUpdated(_))).count();
        assert_eq!(timer_updates, 1);
        assert_eq!(harness.runner.time_left(), Some(9));
    }

    #[test]
    fn show_slide_out_of_range_is_ignored() {
        let mut harness = Harness::started(&[10, 10]);
        harness.elapse(4);
        harness.runner.take_events();
        let deadline = harness.runner.next_deadline();

        harness.runner.show_slide(2);
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(6));
        assert_eq!(harness.runner.next_deadline(), deadline);
        assert!(harness.runner.take_events().is_empty());
    }

    #[test]
    fn expiry_advances_once() {
        let mut harness = Harness::started(&[2, 3, 4]);
        harness.shown_slides();

        harness.elapse(2);
        let shown = harness.shown_slides();
        assert_eq!(shown, vec![SlideView { index: 1, total: 3, duration: 3 }]);
        assert_eq!(harness.runner.time_left(), Some(3));
    }

    #[test]
    fn expiry_on_last_slide_stays() {
        let mut harness = Harness::started(&[1, 2]);
        harness.elapse(1);
        assert_eq!(harness.runner.current_index(), Some(1));
        harness.runner.take_events();

        harness.elapse(2);
        let events = harness.runner.take_events();
        assert!(events.contains(&RunnerEvent::Expired { index: 1 }));
        assert!(!events.iter().any(|e| matches!(e, RunnerEvent::SlideShown(_))));
        assert_eq!(harness.runner.current_index(), Some(1));
        assert_eq!(harness.runner.time_left(), Some(0));
        assert_eq!(harness.runner.next_deadline(), None);

        // Nothing else happens once the countdown is gone.
        harness.elapse(5);
        assert!(harness.runner.take_events().is_empty());
        assert!(harness.runner.is_active());
    }

    #[test]
    fn zero_timing_expires_after_drifting_below_zero() {
        let mut harness = Harness::started(&[0, 5]);
        harness.runner.take_events();

        harness.clock.advance(1);
        harness.runner.poll();
        let events = harness.runner.take_events();
        let expected_timer = TimerDisplay::new(-1, 0, &TimerThresholds::default());
        assert_eq!(events[0], RunnerEvent::TimerUpdated(expected_timer));
        assert_eq!(events[1], RunnerEvent::Expired { index: 0 });
        assert_eq!(harness.runner.current_index(), Some(1));
        assert_eq!(harness.runner.time_left(), Some(5));
    }

    #[test]
    fn poll_catches_up_missed_ticks() {
        let mut harness = Harness::started(&[10, 10]);
        harness.clock.advance(4);
        harness.runner.poll();
        assert_eq!(harness.runner.time_left(), Some(6));
    }

    #[test]
    fn stop_then_start_is_fresh() {
        let mut harness = Harness::started(&[10, 10]);
        harness.elapse(3);
        harness.runner.stop();
        assert!(!harness.runner.is_active());
        assert_eq!(harness.runner.next_deadline(), None);
        harness.runner.stop();

        harness.runner.start(deck_with_timings(&[10, 10])).expect("start failed");
        assert_eq!(harness.runner.current_index(), Some(0));
        assert_eq!(harness.runner.time_left(), Some(10));
        harness.runner.next();
        assert_eq!(harness.runner.time_left(), Some(20));
    }

    #[test]
    fn navigation_emits_cues() {
        let mut harness = Harness::started(&[10, 10]);
        harness.runner.take_events();

        harness.runner.next();
        harness.runner.previous();
        let cues = harness.runner.take_events().into_iter().filter(|e| e == &RunnerEvent::AdvanceCue).count();
        assert_eq!(cues, 2);
    }

    #[test]
    fn deadline_follows_slide_changes() {
        let mut harness = Harness::started(&[10, 10]);
        let first_deadline = harness.runner.next_deadline().expect("no deadline");

        harness.elapse(1);
        harness.runner.next();
        let second_deadline = harness.runner.next_deadline().expect("no deadline");
        assert_eq!(second_deadline, harness.clock.now() + TICK_PERIOD);
        assert!(second_deadline > first_deadline);
    }
}
