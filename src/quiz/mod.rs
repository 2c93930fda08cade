//! The quiz core: step sequencing, profile, readings, gating and screens.
//!
//! Everything the front end needs goes through `Session`:
//!
//! ```text
//! Action ──> Session::dispatch ──> step::advance / back / reset
//!                 │                        │
//!                 │               processing step entered
//!                 │                        ▼
//!                 │          spawn_gated(TaskGate, Lease, oracle call)
//!                 │                        │
//!                 └── handle_event <── SessionEvent (mpsc)
//! ```

pub mod gate;
pub mod model;
pub mod reading;
pub mod screen;
pub mod session;
pub mod step;
pub mod zodiac;

pub use model::{Profile, ProfileUpdate};
pub use reading::{ChartReading, PalmReading, ReadingView, ResultCache};
pub use screen::{Affordance, Field, Screen, ScreenView};
pub use session::{Action, GateOutcome, Session, SessionEvent};
pub use step::Step;
pub use zodiac::ZodiacSign;
