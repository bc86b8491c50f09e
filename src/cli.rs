use clap::{Parser, Subcommand};

/// ics-importer - import iCalendar files into Google Calendar
#[derive(Debug, Parser)]
#[command(name = "ics-importer")]
#[command(about = "Import iCalendar (.ics) files into Google Calendar", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import the events of an .ics document
    Import {
        /// URL (http, https, file) or path of the document
        #[arg(required = true)]
        source: String,

        /// Destination calendar ID (defaults to the configured calendar)
        #[arg(long)]
        calendar: Option<String>,

        /// Print the translated events instead of creating them
        #[arg(long)]
        dry_run: bool,
    },

    /// List calendars events can be imported into
    #[command(alias = "list")]
    Calendars,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show the current configuration
    Show,

    /// Set the destination calendar
    SetCalendar {
        /// Calendar ID as shown by `calendars`
        #[arg(required = true)]
        calendar_id: String,
    },

    /// Override the guessed local timezone
    SetTimezone {
        /// IANA timezone name, e.g. Europe/Berlin
        #[arg(required = true)]
        time_zone: String,
    },
}
