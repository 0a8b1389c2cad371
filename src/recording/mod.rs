//! Recording feature for clipdeck.
//!
//! Holds the recorder state machine, its timers and time sources, the
//! waveform visualization, and the terminal front end that binds to it.

pub mod binding;
pub mod clock;
pub mod controller;
pub mod duration;
pub mod error;
pub mod scheduler;
pub mod time_format;
pub mod ui;
pub mod view;
pub mod visualizations;

pub use binding::{ControlMode, Severity, UiBinding, UiUpdate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    Collaborators, CommandOutcome, Phase, RecorderController, StopReason, COUNTDOWN_TICK,
};
pub use error::RecorderError;
pub use time_format::format_time;
pub use ui::{ClipdeckTui, UserCommand};
pub use view::RecorderView;
