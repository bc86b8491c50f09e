//! External collaborators: the destination calendar store and the document source.

pub mod calendar_store;
pub mod document_source;
pub mod google_calendar;

pub use calendar_store::CalendarStore;
pub use document_source::{DocumentSource, LocationSource};
pub use google_calendar::GoogleCalendarClient;
