//! Interactive timer
//!
//! One event channel feeds the loop: ticks from the interval lease and key
//! presses from a blocking reader. Events are handled strictly in arrival
//! order on a single task, so the timer needs no locking.

use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, queue, style::Print, terminal};
use pomo_core::{format, Config};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::alert::DesktopNotifier;
use crate::segment::{Segment, Status};
use crate::settings::{Direction, Settings};
use crate::store::KeyValueStore;
use crate::ticker::{IntervalTicker, Tick, TickSource};
use crate::timer::{Notifier, TickOutcome, Timer, Transition};

/// One countdown second
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// How often the key reader checks whether the loop has gone away
const INPUT_POLL: Duration = Duration::from_millis(200);

/// Everything the loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick(u64),
    Key(KeyEvent),
    InputClosed,
}

impl From<Tick> for Event {
    fn from(tick: Tick) -> Self {
        Event::Tick(tick.generation)
    }
}

/// User actions available from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Select(Segment),
    Longer,
    Shorter,
    ResetCount,
    ToggleNotifications,
    Quit,
}

/// Map a key press to an action
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Toggle),
        KeyCode::Char('f') => Some(Action::Select(Segment::Focus)),
        KeyCode::Char('s') => Some(Action::Select(Segment::ShortBreak)),
        KeyCode::Char('l') => Some(Action::Select(Segment::LongBreak)),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Longer),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::Shorter),
        KeyCode::Char('r') => Some(Action::ResetCount),
        KeyCode::Char('n') => Some(Action::ToggleNotifications),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Which segment `+` and `-` change
///
/// Follows the current segment until one is picked with `f`, `s` or `l`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    picked: Option<Segment>,
}

impl Selection {
    pub fn target(&self, current: Segment) -> Segment {
        self.picked.unwrap_or(current)
    }
}

/// Apply an action; returns `false` when the loop should stop
pub fn apply<S, T, N>(timer: &mut Timer<S, T, N>, selection: &mut Selection, action: Action) -> bool
where
    S: KeyValueStore,
    T: TickSource,
    N: Notifier,
{
    match action {
        Action::Toggle => {
            timer.toggle();
        }
        Action::Select(segment) => selection.picked = Some(segment),
        Action::Longer => {
            timer.adjust_duration(selection.target(timer.segment()), Direction::Up);
        }
        Action::Shorter => {
            timer.adjust_duration(selection.target(timer.segment()), Direction::Down);
        }
        Action::ResetCount => timer.reset_session_counter(),
        Action::ToggleNotifications => {
            let enabled = !timer.settings().notifications_enabled();
            timer.settings_mut().set_notifications_enabled(enabled);
        }
        Action::Quit => return false,
    }
    true
}

/// Single status line for the current timer state
pub fn status_line<S, T, N>(timer: &Timer<S, T, N>, selection: Selection) -> String
where
    S: KeyValueStore,
    T: TickSource,
    N: Notifier,
{
    let settings = timer.settings();
    let mut line = format!(
        "[{}] {}  {}",
        timer.segment().label(),
        format::clock(timer.remaining()),
        timer.status().as_str()
    );

    if timer.status() == Status::Running {
        if let Some(ends) = end_time(timer.remaining()) {
            line.push_str(&format!(" (ends {})", format::time(ends)));
        }
    } else if timer.status() == Status::NotStarted {
        line.push_str(&format!(
            " (next {})",
            format::duration(settings.duration(timer.segment()))
        ));
    }

    let target = selection.target(timer.segment());
    line.push_str(&format!(
        "  | +/- {} {}",
        target.label().to_lowercase(),
        format::duration(settings.duration(target))
    ));

    line.push_str(&format!(
        "  | completed {} | notifications {}",
        settings.completed_count(),
        if settings.notifications_enabled() { "on" } else { "off" }
    ));
    line
}

/// Wall-clock time `remaining` seconds from now, if chrono can represent it
fn end_time(remaining: u64) -> Option<DateTime<Local>> {
    let delta = i64::try_from(remaining).ok().and_then(TimeDelta::try_seconds)?;
    Local::now().checked_add_signed(delta)
}

/// Line printed when a segment ends
pub fn transition_line(transition: &Transition) -> String {
    match transition.completed {
        Some(count) => format!(
            "{} complete ({} total). Next: {}",
            transition.finished.label(),
            count,
            transition.next.label()
        ),
        None => format!(
            "{} complete. Next: {}",
            transition.finished.label(),
            transition.next.label()
        ),
    }
}

/// Raw terminal mode for the lifetime of the guard
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, Print("\r\n"));
        let _ = terminal::disable_raw_mode();
    }
}

/// Forward key presses until the loop stops listening
fn read_keys(tx: UnboundedSender<Event>) {
    loop {
        if tx.is_closed() {
            return;
        }
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(TermEvent::Key(key)) => {
                    if tx.send(Event::Key(key)).is_err() {
                        return;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "terminal input failed");
                    let _ = tx.send(Event::InputClosed);
                    return;
                }
            },
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(error = %err, "terminal input failed");
                let _ = tx.send(Event::InputClosed);
                return;
            }
        }
    }
}

fn draw(out: &mut impl Write, line: &str) -> Result<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        Print(line),
        Print("   space start/pause  f/s/l pick  +/- duration  r reset  n notify  q quit")
    )?;
    out.flush()?;
    Ok(())
}

fn announce(out: &mut impl Write, transition: &Transition) -> Result<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        Print(transition_line(transition)),
        Print("\r\n")
    )?;
    Ok(())
}

/// Run the interactive timer until the user quits
pub async fn run<S: KeyValueStore>(settings: Settings<S>, config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let ticker = IntervalTicker::new(tx.clone(), TICK_PERIOD);
    let mut timer = Timer::new(settings, ticker, DesktopNotifier)
        .with_long_break_every(config.long_break_every);
    let mut selection = Selection::default();

    let _raw = RawMode::enable()?;
    let input = tokio::task::spawn_blocking(move || read_keys(tx));

    let stdout = io::stdout();
    draw(&mut stdout.lock(), &status_line(&timer, selection))?;

    while let Some(event) = rx.recv().await {
        match event {
            Event::Tick(generation) => {
                if let TickOutcome::Expired(transition) = timer.tick_from(generation) {
                    announce(&mut stdout.lock(), &transition)?;
                }
            }
            Event::Key(key) => {
                if let Some(action) = action_for(&key) {
                    tracing::debug!(?action, "key action");
                    if !apply(&mut timer, &mut selection, action) {
                        break;
                    }
                }
            }
            Event::InputClosed => break,
        }
        draw(&mut stdout.lock(), &status_line(&timer, selection))?;
    }

    // Releases the tick lease before the channel goes away
    drop(timer);
    drop(rx);
    let _ = input.await;
    Ok(())
}
