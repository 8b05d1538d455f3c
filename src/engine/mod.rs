//! Pure calculation modules: no I/O, no storage access. Everything here is
//! closed-form arithmetic over the loaded rate schedule.

pub mod arrears;
pub mod deadlines;
pub mod proration;
pub mod settlement;

pub use arrears::AmountSource;
pub use deadlines::{DeadlineKind, DeadlineSchedule, Urgency};
pub use settlement::SettlementResult;
