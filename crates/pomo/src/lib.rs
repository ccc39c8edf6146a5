//! pomo - Pomodoro timer for the terminal
//!
//! Alternates focus and break segments, keeps segment durations and the
//! completed focus count in a small settings file, and alerts when a
//! segment ends.
//!
//! The pieces:
//! - [`timer::Timer`]: the state machine (NotStarted / Running / Paused)
//! - [`settings::Settings`]: durations, counter and preferences over a
//!   [`store::KeyValueStore`]
//! - [`ticker`]: the cancellable once-per-second clock
//! - [`alert`]: desktop notification and chime on segment end
//! - [`app`]: the interactive terminal loop

pub mod alert;
pub mod app;
pub mod segment;
pub mod settings;
pub mod store;
pub mod ticker;
pub mod timer;

pub use segment::{Segment, Status, TimerState};
pub use settings::{Defaults, Direction, Settings};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use ticker::{IntervalTicker, ManualTicker, Tick, TickSource};
pub use timer::{Notifier, TickOutcome, Timer, Transition};
