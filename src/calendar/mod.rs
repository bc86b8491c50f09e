//! The destination side: event bodies, translation, exception reconciliation and import.

mod calendar_exceptions;
mod calendar_import;
mod calendar_join;
mod calendar_translate;
mod calendar_types;

pub use calendar_exceptions::*;
pub use calendar_import::*;
pub use calendar_join::*;
pub use calendar_translate::*;
pub use calendar_types::*;
