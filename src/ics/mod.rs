//! Reading iCalendar documents: repair, parse, resolve timezones, extract recurrence.

mod ics_component;
mod ics_document;
mod ics_recurrence;
mod ics_sanitize;
mod ics_time;
mod ics_timezone;

pub use ics_component::*;
pub use ics_document::*;
pub use ics_recurrence::*;
pub use ics_sanitize::*;
pub use ics_time::*;
pub use ics_timezone::*;
