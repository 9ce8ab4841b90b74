use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::passage::PassagePool;
use crate::runtime::Metronome;
use crate::score::ScoreRecord;
use crate::session::{Session, Status, Transition};
use crate::store::ResultStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Owns the session and applies what its transitions ask for: the one-second
/// metronome, the text field, the result store and the current screen.
pub struct App<C: Clock = SystemClock> {
    session: Session<C>,
    metronome: Metronome,
    store: Box<dyn ResultStore>,
    input: String,
    screen: Screen,
    last_score: Option<ScoreRecord>,
    needs_redraw: bool,
}

impl App<SystemClock> {
    pub fn new(pool: PassagePool, store: Box<dyn ResultStore>) -> Self {
        Self::from_session(Session::new(pool), store)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(pool: PassagePool, store: Box<dyn ResultStore>, clock: C) -> Self {
        Self::from_session(Session::with_clock(pool, clock), store)
    }

    pub fn from_session(session: Session<C>, store: Box<dyn ResultStore>) -> Self {
        Self {
            session,
            metronome: Metronome::every_second(),
            store,
            input: String::new(),
            screen: Screen::Typing,
            last_score: None,
            needs_redraw: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.screen {
            Screen::Typing => self.on_typing_key(key),
            Screen::Results => self.on_results_key(key),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Enter => self.start(),
            KeyCode::Esc => {
                if self.session.status() == Status::Idle {
                    return Control::Quit;
                }
                self.reset();
            }
            KeyCode::Backspace => {
                if self.session.is_running() && self.input.pop().is_some() {
                    let transition = self.session.on_input(&self.input);
                    self.apply(transition);
                }
            }
            KeyCode::Char(c) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    return Control::Continue;
                }
                if self.session.is_running()
                    && self.input.chars().count() < self.session.passage_len()
                {
                    self.input.push(c);
                    let transition = self.session.on_input(&self.input);
                    self.apply(transition);
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Enter | KeyCode::Char('r') => self.start(),
            KeyCode::Char('b') => self.reset(),
            _ => {}
        }
        Control::Continue
    }

    pub fn start(&mut self) {
        let transition = self.session.start();
        self.apply(transition);
    }

    pub fn reset(&mut self) {
        let transition = self.session.reset();
        self.apply(transition);
    }

    /// Feeds one session tick per second elapsed on the metronome
    pub fn on_tick(&mut self) {
        let due = self.metronome.due(self.session.now());
        for _ in 0..due {
            let transition = self.session.tick();
            self.apply(transition);
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Ignored => return,
            Transition::Started => {
                self.input.clear();
                self.metronome.arm(self.session.now());
                self.screen = Screen::Typing;
            }
            Transition::Reset => {
                self.input.clear();
                self.metronome.disarm();
                self.screen = Screen::Typing;
            }
            Transition::Countdown(_) | Transition::Typed => {}
            Transition::Finished(record) => self.complete(record),
        }
        self.needs_redraw = true;
    }

    fn complete(&mut self, record: ScoreRecord) {
        self.metronome.disarm();

        info!(
            wpm = record.wpm,
            raw = record.raw_wpm,
            accuracy = record.accuracy,
            errors = record.errors,
            "test finished"
        );
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "failed to save result");
        }

        self.last_score = Some(record);
        self.screen = Screen::Results;
    }

    /// The record the results screen shows: the stored one, else the last in memory
    pub fn results_view(&self) -> Option<ScoreRecord> {
        match self.store.latest() {
            Ok(Some(record)) => Some(record),
            Ok(None) => self.last_score.clone(),
            Err(e) => {
                warn!(error = %e, "failed to read stored result");
                self.last_score.clone()
            }
        }
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns whether a redraw is pending and clears the flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn metronome(&self) -> &Metronome {
        &self.metronome
    }

    pub fn last_score(&self) -> Option<&ScoreRecord> {
        self.last_score.as_ref()
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }
}
