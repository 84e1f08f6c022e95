mod barrier;
mod cursor;
mod tempo;

pub use barrier::{Clock, ManualClock, SystemClock, TimeBarrier};
pub use cursor::{DueEvents, TrackCursors};
pub use tempo::{DEFAULT_MICROS_PER_BEAT, Tempo, TickLength};
