mod clock;
mod countdown;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{Countdown, CountdownState, Tick};
