pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod ics;
pub mod services;

use chrono::Local;
use env_logger::Env;
use std::io::Write;

/// Initialise `env_logger` with the `<time> [<level>] <message>` format. `RUST_LOG` overrides
/// the default `info` filter.
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use calendar::{ImportReport, Importer, Translator};
pub use config::Config;
pub use error::{ImportError, StoreError};
pub use services::{CalendarStore, DocumentSource, GoogleCalendarClient, LocationSource};
