//! ICS generation and parsing for the weekly schedule.
//!
//! Exported events become weekly-recurring VEVENTs; imported VEVENTs map
//! back onto weekday slots (or important dates when they are date-only).

mod generate;
mod parse;

pub use generate::generate_ics;
pub use parse::parse_ics;
