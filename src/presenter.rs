use crate::{
    commands::listener::{Command, CommandListener},
    markdown::{
        parse::{DeckParser, ParseError, ParserOptions},
        render::{render_lines, StyledLine},
    },
    presentation::{
        event::{RunnerEvent, SlideView},
        runner::{PresentationRunner, RunnerError, SystemClock},
        timer::{TimerDisplay, TimerThresholds},
        Deck,
    },
    storage::{PresentationStore, StorageError},
    ui::{
        draw::{SlideFrame, TerminalDrawer},
        footer::navigation_hints,
        WindowSize,
    },
};
use std::{
    io::{self, Write},
    path::Path,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// The longest we wait for user input before checking on the runner again.
const MAX_POLL_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, Default)]
pub struct PresenterOptions {
    pub parser: ParserOptions,
    pub thresholds: TimerThresholds,

    /// Whether to ring the terminal bell on every slide change.
    pub sound: bool,
}

/// A slideshow presenter.
///
/// This type puts everything else together.
pub struct Presenter {
    commands: CommandListener,
    parser: DeckParser,
    runner: PresentationRunner,
    slide: Option<DisplayedSlide>,
    failure: Option<String>,
    sound: bool,
}

impl Presenter {
    /// Construct a new presenter.
    pub fn new(commands: CommandListener, options: PresenterOptions) -> Self {
        Self {
            commands,
            parser: DeckParser::new(options.parser),
            runner: PresentationRunner::new(SystemClock, options.thresholds),
            slide: None,
            failure: None,
            sound: options.sound,
        }
    }

    /// Run a presentation.
    pub fn present(mut self, path: &Path) -> Result<(), PresentationError> {
        let deck = self.load_deck(path)?;
        info!(path = %path.display(), slides = deck.len(), "starting presentation");
        self.runner.start(deck)?;

        let mut drawer = TerminalDrawer::acquire(io::stdout())?;
        let mut needs_render = true;
        loop {
            needs_render |= self.process_runner_events(&mut drawer)?;
            if needs_render {
                self.render(&mut drawer)?;
                needs_render = false;
            }

            let timeout = self.poll_timeout();
            if let Some(command) = self.commands.try_next_command(timeout)? {
                match self.apply_command(command, path) {
                    CommandSideEffect::Exit => {
                        self.runner.stop();
                        return Ok(());
                    }
                    CommandSideEffect::Redraw => needs_render = true,
                    CommandSideEffect::None => (),
                }
            }
            self.runner.poll();
        }
    }

    fn load_deck(&self, path: &Path) -> Result<Deck, PresentationError> {
        let contents = PresentationStore::load(path)?;
        let deck = self.parser.parse(&contents)?;
        Ok(deck)
    }

    fn poll_timeout(&self) -> Duration {
        match self.runner.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(MAX_POLL_TIMEOUT),
            None => MAX_POLL_TIMEOUT,
        }
    }

    /// Consume the runner's notifications, returning whether the screen needs to be redrawn.
    fn process_runner_events<W: Write>(&mut self, drawer: &mut TerminalDrawer<W>) -> io::Result<bool> {
        let events = self.runner.take_events();
        let needs_render = !events.is_empty();
        for event in events {
            match event {
                RunnerEvent::SlideShown(view) => {
                    let lines = self.runner.current_slide().map(|slide| render_lines(&slide.content));
                    self.slide = Some(DisplayedSlide {
                        view,
                        timer: None,
                        lines: lines.unwrap_or_default(),
                        overtime: false,
                    });
                }
                RunnerEvent::TimerUpdated(timer) => {
                    if let Some(slide) = &mut self.slide {
                        slide.timer = Some(timer);
                    }
                }
                RunnerEvent::AdvanceCue => {
                    if self.sound {
                        drawer.ring_bell()?;
                    }
                }
                RunnerEvent::Expired { index } => {
                    debug!(index, "slide countdown expired");
                    if let Some(slide) = &mut self.slide {
                        slide.overtime = !slide.view.next_enabled();
                    }
                }
            }
        }
        Ok(needs_render)
    }

    fn render<W: Write>(&self, drawer: &mut TerminalDrawer<W>) -> io::Result<()> {
        let dimensions = WindowSize::current()?;
        if let Some(error) = &self.failure {
            return drawer.render_error(error, dimensions);
        }
        let Some(slide) = &self.slide else {
            return Ok(());
        };
        let hints = navigation_hints(self.commands.bindings(), &slide.view);
        let frame = SlideFrame {
            view: &slide.view,
            timer: slide.timer.as_ref(),
            lines: &slide.lines,
            hints: &hints,
            overtime: slide.overtime,
        };
        drawer.render_slide(&frame, dimensions)
    }

    fn apply_command(&mut self, command: Command, path: &Path) -> CommandSideEffect {
        match command {
            Command::Exit => return CommandSideEffect::Exit,
            Command::Redraw => return CommandSideEffect::Redraw,
            Command::Reload => {
                self.try_reload(path);
                return CommandSideEffect::Redraw;
            }
            Command::Restart => self.restart(),
            Command::Next => self.runner.next(),
            Command::Previous => self.runner.previous(),
        };
        CommandSideEffect::None
    }

    fn restart(&mut self) {
        let Some(deck) = self.runner.deck().cloned() else {
            return;
        };
        info!("restarting presentation");
        self.runner.stop();
        // The deck came from a running session so it can't be empty.
        if let Err(e) = self.runner.start(deck) {
            warn!("failed to restart presentation: {e}");
        }
        self.failure = None;
    }

    fn try_reload(&mut self, path: &Path) {
        let deck = match self.load_deck(path) {
            Ok(deck) if deck.is_empty() => {
                warn!(path = %path.display(), "reloaded presentation has no slides");
                self.failure = Some(RunnerError::EmptyDeck.to_string());
                return;
            }
            Ok(deck) => deck,
            Err(e) => {
                warn!(path = %path.display(), "failed to reload presentation: {e}");
                self.failure = Some(e.to_string());
                return;
            }
        };
        let index = self.runner.current_index().unwrap_or_default();
        info!(path = %path.display(), slides = deck.len(), index, "reloading presentation");
        self.runner.stop();
        if let Err(e) = self.runner.start(deck) {
            self.failure = Some(e.to_string());
            return;
        }
        self.runner.show_slide(index);
        self.failure = None;
    }
}

/// The slide currently on screen.
struct DisplayedSlide {
    view: SlideView,
    timer: Option<TimerDisplay>,
    lines: Vec<StyledLine>,
    overtime: bool,
}

enum CommandSideEffect {
    Exit,
    Redraw,
    None,
}

/// An error during the presentation.
#[derive(thiserror::Error, Debug)]
pub enum PresentationError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::KeyBindingsConfig;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        path: std::path::PathBuf,
        presenter: Presenter,
        drawer: TerminalDrawer<Vec<u8>>,
    }

    impl Fixture {
        fn new(contents: &str) -> Self {
            let dir = tempfile::tempdir().expect("failed to create dir");
            let path = dir.path().join("talk.md");
            fs::write(&path, contents).expect("write failed");
            let commands = CommandListener::new(KeyBindingsConfig::default(), &path).expect("invalid bindings");
            let mut presenter = Presenter::new(commands, PresenterOptions::default());
            let deck = presenter.load_deck(&path).expect("load failed");
            presenter.runner.start(deck).expect("start failed");
            let mut fixture = Self { _dir: dir, path, presenter, drawer: TerminalDrawer::new(Vec::new()) };
            fixture.process();
            fixture
        }

        fn apply(&mut self, command: Command) {
            let path = self.path.clone();
            self.presenter.apply_command(command, &path);
            self.process();
        }

        fn process(&mut self) -> bool {
            self.presenter.process_runner_events(&mut self.drawer).expect("processing failed")
        }

        fn current_view(&self) -> &SlideView {
            &self.presenter.slide.as_ref().expect("no slide").view
        }
    }

    const DECK: &str = "# one\n<!-- timing: 10 -->\n---\n# two\n---\n# three";

    #[test]
    fn start_shows_first_slide() {
        let fixture = Fixture::new(DECK);
        let slide = fixture.presenter.slide.as_ref().expect("no slide");
        assert_eq!(slide.view, SlideView { index: 0, total: 3, duration: 10 });
        assert_eq!(slide.timer.as_ref().map(|timer| timer.remaining), Some(10));
        assert_eq!(slide.lines[0].text(), "# one");
    }

    #[test]
    fn navigation() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        assert_eq!(fixture.current_view().index, 1);
        fixture.apply(Command::Next);
        fixture.apply(Command::Next);
        assert_eq!(fixture.current_view().index, 2);
        fixture.apply(Command::Previous);
        assert_eq!(fixture.current_view().index, 1);
    }

    #[test]
    fn sound_rings_bell() {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let path = dir.path().join("talk.md");
        fs::write(&path, DECK).expect("write failed");
        let commands = CommandListener::new(KeyBindingsConfig::default(), &path).expect("invalid bindings");
        let options = PresenterOptions { sound: true, ..Default::default() };
        let mut presenter = Presenter::new(commands, options);
        let deck = presenter.load_deck(&path).expect("load failed");
        presenter.runner.start(deck).expect("start failed");

        let mut buffer = Vec::new();
        {
            let mut drawer = TerminalDrawer::new(&mut buffer);
            presenter.process_runner_events(&mut drawer).expect("processing failed");
            presenter.runner.next();
            presenter.process_runner_events(&mut drawer).expect("processing failed");
        }
        assert_eq!(buffer, b"\x07\x07");
    }

    #[test]
    fn muted_by_default() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        let mut buffer = Vec::new();
        {
            let mut drawer = TerminalDrawer::new(&mut buffer);
            fixture.presenter.runner.next();
            fixture.presenter.process_runner_events(&mut drawer).expect("processing failed");
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn nothing_to_process() {
        let mut fixture = Fixture::new(DECK);
        assert!(!fixture.process());
    }

    #[test]
    fn restart() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        fixture.apply(Command::Restart);
        assert_eq!(fixture.current_view().index, 0);
        assert_eq!(fixture.presenter.runner.bonus_time(), 0);
    }

    #[test]
    fn reload_keeps_position() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        fs::write(&fixture.path, "# uno\n---\n# dos\n<!-- timing: 5 -->\n---\n# tres").expect("write failed");
        fixture.apply(Command::Reload);

        let slide = fixture.presenter.slide.as_ref().expect("no slide");
        assert_eq!(slide.view.index, 1);
        assert_eq!(slide.view.duration, 5);
        assert_eq!(slide.lines[0].text(), "# dos");
        assert!(fixture.presenter.failure.is_none());
    }

    #[test]
    fn reload_out_of_range_stays_on_first_slide() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        fixture.apply(Command::Next);
        fs::write(&fixture.path, "# only").expect("write failed");
        fixture.apply(Command::Reload);
        assert_eq!(fixture.current_view(), &SlideView { index: 0, total: 1, duration: 60 });
    }

    #[test]
    fn reload_failure_keeps_session() {
        let mut fixture = Fixture::new(DECK);
        fixture.apply(Command::Next);
        fs::write(&fixture.path, "# one\n<!-- timing: 99999999999 -->").expect("write failed");
        fixture.apply(Command::Reload);

        let failure = fixture.presenter.failure.as_deref().expect("no failure");
        assert!(failure.contains("invalid timing"), "unexpected failure: {failure}");
        assert_eq!(fixture.presenter.runner.current_index(), Some(1));
        assert_eq!(fixture.presenter.runner.deck().map(Deck::len), Some(3));

        fs::write(&fixture.path, DECK).expect("write failed");
        fixture.apply(Command::Reload);
        assert!(fixture.presenter.failure.is_none());
    }

    #[test]
    fn reload_empty_deck_keeps_session() {
        let mut fixture = Fixture::new(DECK);
        fs::write(&fixture.path, "---\n<!-- timing: 5 -->").expect("write failed");
        fixture.apply(Command::Reload);
        assert_eq!(fixture.presenter.failure.as_deref(), Some("presentation has no slides"));
        assert!(fixture.presenter.runner.is_active());
    }

    #[test]
    fn expiry_on_last_slide_is_overtime() {
        let mut fixture = Fixture::new("# one\n<!-- timing: 1 -->");
        fixture.presenter.runner.tick();
        fixture.process();
        let slide = fixture.presenter.slide.as_ref().expect("no slide");
        assert!(slide.overtime);
        assert_eq!(fixture.presenter.runner.current_index(), Some(0));
    }

    #[test]
    fn exit() {
        let mut fixture = Fixture::new(DECK);
        let path = fixture.path.clone();
        assert!(matches!(fixture.presenter.apply_command(Command::Exit, &path), CommandSideEffect::Exit));
    }
}
