pub mod assembler;
pub mod clock;
pub mod monitor;

pub use assembler::{ItineraryAssembler, DEFAULT_CENTER};
pub use clock::{Clock, FixedClock, SystemClock};
pub use monitor::{AlertCallback, MonitoringEngine, SessionStatus, Subscription};
