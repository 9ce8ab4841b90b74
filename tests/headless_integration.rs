use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typesprint::{
    app::{App, Control, Screen},
    clock::ManualClock,
    passage::PassagePool,
    runtime::{AppEvent, FixedTicker, Runner, TestEventSource},
    session::Status,
    store::{ResultStore, SqliteResultStore},
};

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Drives the app like the binary's loop does. Every tick moves the clock by
/// `tick_advance`; stops on Quit or after `max_steps`.
fn drive(
    app: &mut App<ManualClock>,
    clock: &ManualClock,
    runner: &Runner<TestEventSource, FixedTicker>,
    tick_advance: Duration,
    max_steps: u32,
) -> Control {
    for _ in 0..max_steps {
        match runner.step() {
            AppEvent::Tick => {
                clock.advance(tick_advance);
                app.on_tick();
            }
            AppEvent::Resize => app.request_redraw(),
            AppEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    return Control::Quit;
                }
            }
        }
        if app.screen() == Screen::Results {
            break;
        }
    }
    Control::Continue
}

// Verifies a whole test through Runner/TestEventSource without a TTY
#[test]
fn headless_typing_test_runs_to_results() {
    let clock = ManualClock::default();
    let mut app = App::with_clock(
        PassagePool::single("cat").unwrap(),
        Box::new(SqliteResultStore::in_memory().unwrap()),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    tx.send(key(KeyCode::Enter)).unwrap();
    for c in "cot".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Backspace)).unwrap();
    tx.send(key(KeyCode::Backspace)).unwrap();
    for c in "at".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }

    // keys first, then ticks of one second each until time is up
    let control = drive(&mut app, &clock, &runner, Duration::from_secs(1), 200);

    assert_eq!(control, Control::Continue);
    assert_eq!(app.screen(), Screen::Results);
    assert_eq!(app.session().status(), Status::Finished);
    assert_eq!(app.session().history(), [true, true, true]);

    let record = app.store().latest().unwrap().expect("result saved");
    assert_eq!(record.correct, 3);
    assert_eq!(record.errors, 0);
    assert_eq!(record.total, 3);
    assert_eq!(record.accuracy, 100);
    assert_eq!(record.elapsed_secs, 30.0);
}

#[test]
fn headless_reset_mid_test_cancels_the_timer() {
    let clock = ManualClock::default();
    let mut app = App::with_clock(
        PassagePool::single("the lazy dog").unwrap(),
        Box::new(SqliteResultStore::in_memory().unwrap()),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char('t'))).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();

    drive(&mut app, &clock, &runner, Duration::from_secs(1), 60);

    assert_eq!(app.screen(), Screen::Typing);
    assert_eq!(app.session().status(), Status::Idle);
    assert_eq!(app.session().remaining_secs(), 30);
    assert!(!app.metronome().is_armed());
    assert!(app.store().latest().unwrap().is_none());
}

#[test]
fn headless_quit_from_idle() {
    let clock = ManualClock::default();
    let mut app = App::with_clock(
        PassagePool::builtin().unwrap(),
        Box::new(SqliteResultStore::in_memory().unwrap()),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );
    tx.send(AppEvent::Resize).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();

    let control = drive(&mut app, &clock, &runner, Duration::from_secs(1), 10);

    assert_eq!(control, Control::Quit);
}

#[test]
fn headless_second_test_overwrites_first_result() {
    let clock = ManualClock::default();
    let mut app = App::with_clock(
        PassagePool::single("cat").unwrap(),
        Box::new(SqliteResultStore::in_memory().unwrap()),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char('x'))).unwrap();
    drive(&mut app, &clock, &runner, Duration::from_secs(1), 200);
    assert_eq!(app.store().latest().unwrap().map(|r| r.errors), Some(1));

    // retry from the results screen
    tx.send(key(KeyCode::Char('r'))).unwrap();
    for c in "ca".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    // leave the results screen first so drive() doesn't stop right away
    match runner.step() {
        AppEvent::Key(k) => {
            app.handle_key(k);
        }
        other => panic!("expected the retry key, got {other:?}"),
    }
    drive(&mut app, &clock, &runner, Duration::from_secs(1), 200);

    let record = app.store().latest().unwrap().unwrap();
    assert_eq!(record.errors, 0);
    assert_eq!(record.correct, 2);
}
