use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::time::SystemTime;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::passage::PassagePool;
use crate::score::ScoreRecord;

/// Length of every test
pub const TEST_DURATION_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Idle,
    Running,
    Finished,
}

/// What an operation did, so the owner can drive the timer, display and store
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Called outside its valid state, or nothing changed
    Ignored,
    Started,
    Reset,
    /// One second passed; carries the seconds left
    Countdown(u32),
    /// Input was graded or undone; the display needs a redraw
    Typed,
    Finished(ScoreRecord),
}

/// One typing test attempt
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    pool: PassagePool,
    clock: C,
    rng: StdRng,
    passage: String,
    cursor: usize,
    history: Vec<bool>,
    correct: usize,
    errors: usize,
    total: usize,
    remaining_secs: u32,
    status: Status,
    started_at: Option<SystemTime>,
}

impl Session<SystemClock> {
    pub fn new(pool: PassagePool) -> Self {
        Self::with_clock(pool, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(pool: PassagePool, clock: C) -> Self {
        Self {
            pool,
            clock,
            rng: StdRng::from_entropy(),
            passage: String::new(),
            cursor: 0,
            history: Vec::new(),
            correct: 0,
            errors: 0,
            total: 0,
            remaining_secs: TEST_DURATION_SECS,
            status: Status::Idle,
            started_at: None,
        }
    }

    /// Makes passage selection reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn start(&mut self) -> Transition {
        if self.status == Status::Running {
            return Transition::Ignored;
        }

        self.passage = self.pool.pick(&mut self.rng).to_string();
        self.clear_progress();
        self.started_at = Some(self.clock.now());
        self.status = Status::Running;

        debug!(
            pool = self.pool.name(),
            passage_len = self.passage_len(),
            "session started"
        );
        Transition::Started
    }

    pub fn reset(&mut self) -> Transition {
        self.clear_progress();
        self.status = Status::Idle;
        debug!("session reset");
        Transition::Reset
    }

    pub fn tick(&mut self) -> Transition {
        if self.status != Status::Running {
            return Transition::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finish()
        } else {
            Transition::Countdown(self.remaining_secs)
        }
    }

    /// Grades the text field after it changed.
    ///
    /// A shorter text undoes the most recent characters, one history entry per
    /// missing character. A longer text grades each new character against the
    /// passage; anything past the end of the passage is dropped.
    pub fn on_input(&mut self, new_text: &str) -> Transition {
        if self.status != Status::Running {
            return Transition::Ignored;
        }

        let len = new_text.chars().count();
        let changed = match len.cmp(&self.cursor) {
            Ordering::Less => {
                for _ in len..self.cursor {
                    self.undo_last();
                }
                true
            }
            Ordering::Equal => false,
            Ordering::Greater => {
                let mut graded = false;
                for c in new_text.chars().skip(self.cursor) {
                    if !self.grade(c) {
                        break;
                    }
                    graded = true;
                }
                graded
            }
        };

        if changed {
            Transition::Typed
        } else {
            Transition::Ignored
        }
    }

    fn finish(&mut self) -> Transition {
        if self.status != Status::Running {
            return Transition::Ignored;
        }
        self.status = Status::Finished;

        let now = self.clock.now();
        let elapsed = self
            .started_at
            .and_then(|started| now.duration_since(started).ok())
            .unwrap_or_default();

        let record = ScoreRecord::compute(
            self.correct,
            self.errors,
            self.total,
            elapsed,
            DateTime::<Local>::from(now),
        );

        debug!(
            wpm = record.wpm,
            raw = record.raw_wpm,
            accuracy = record.accuracy,
            total = record.total,
            "session finished"
        );
        Transition::Finished(record)
    }

    fn grade(&mut self, c: char) -> bool {
        let Some(expected) = self.passage.chars().nth(self.cursor) else {
            return false;
        };

        let is_correct = c == expected;
        if is_correct {
            self.correct += 1;
        } else {
            self.errors += 1;
        }
        self.total += 1;
        self.history.push(is_correct);
        self.cursor += 1;
        true
    }

    fn undo_last(&mut self) {
        match self.history.pop() {
            Some(true) => self.correct -= 1,
            Some(false) => self.errors -= 1,
            None => return,
        }
        self.total -= 1;
        self.cursor -= 1;
    }

    fn clear_progress(&mut self) {
        self.cursor = 0;
        self.history.clear();
        self.correct = 0;
        self.errors = 0;
        self.total = 0;
        self.remaining_secs = TEST_DURATION_SECS;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn passage(&self) -> &str {
        &self.passage
    }

    pub fn passage_len(&self) -> usize {
        self.passage.chars().count()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }
}
