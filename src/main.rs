use anyhow::{Context, Result};
use clap::Parser;
use ics_importer::calendar::{CalendarChoices, CalendarListEntry, TranslatedEvent};
use ics_importer::cli::{Cli, Commands, ConfigActions};
use ics_importer::config::{get_config_path, load_token};
use ics_importer::ics::guess_local_timezone;
use ics_importer::{
    CalendarStore, Config, DocumentSource, GoogleCalendarClient, Importer, LocationSource,
    Translator,
};
use log::{debug, info};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    ics_importer::init_logger();

    // Missing .env is fine; the token may come from the environment directly
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Import { source, calendar, dry_run } => {
            import(&config, &source, calendar, dry_run).await
        }
        Commands::Calendars => list_calendars(&config).await,
        Commands::Config { action } => handle_config(config, action),
    }
}

fn translator(config: &Config) -> Translator {
    let (name, tz) = guess_local_timezone(config.import.time_zone.as_deref());
    debug!("Using local timezone {}", name);
    Translator::new(tz)
}

fn client(config: &Config, calendar_id: &str) -> Result<GoogleCalendarClient> {
    let token = load_token()?;
    GoogleCalendarClient::new(&config.import.api_base, calendar_id, token)
        .context("Failed to set up the Google Calendar client")
}

async fn import(
    config: &Config,
    source: &str,
    calendar: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let translator = translator(config);
    let documents = LocationSource::new();

    if dry_run {
        let raw = documents.fetch_document_text(source).await?;
        let translated = translator.translate_document(&raw)?;
        print_translated(&translated)?;
        return Ok(());
    }

    let calendar_id = calendar.unwrap_or_else(|| config.calendar.calendar_id.clone());
    let store = client(config, &calendar_id)?;
    info!("Importing {} into calendar {}", source, store.calendar_id());

    let importer = Importer::new(Arc::new(store), Arc::new(documents), translator);
    let report = importer.import_document(source).await?;
    println!(
        "Imported {} event(s) into {}, cancelled {} excluded occurrence(s)",
        report.created(),
        calendar_id,
        report.cancelled()
    );
    Ok(())
}

fn print_translated(translated: &[TranslatedEvent]) -> Result<()> {
    for entry in translated {
        println!("{}", serde_json::to_string_pretty(&entry.event)?);
        for date in &entry.excluded {
            println!("  excluded: {}", date);
        }
    }
    println!("{} event(s) would be imported", translated.len());
    Ok(())
}

async fn list_calendars(config: &Config) -> Result<()> {
    let store = client(config, &config.calendar.calendar_id)?;
    let choices = CalendarChoices::from_entries(store.list_calendars().await?);

    println!("Calendars:");
    for entry in &choices.visible {
        print_calendar(entry, &config.calendar.calendar_id);
    }
    if !choices.hidden.is_empty() {
        println!("Hidden calendars:");
        for entry in &choices.hidden {
            print_calendar(entry, &config.calendar.calendar_id);
        }
    }
    Ok(())
}

fn print_calendar(entry: &CalendarListEntry, current: &str) {
    let marker = if entry.id == current { "*" } else { " " };
    println!(
        "{} {} ({})",
        marker,
        entry.summary.as_deref().unwrap_or(&entry.id),
        entry.id
    );
}

fn handle_config(mut config: Config, action: ConfigActions) -> Result<()> {
    match action {
        ConfigActions::Show => {
            println!("# {}", get_config_path()?.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigActions::SetCalendar { calendar_id } => {
            config.calendar.calendar_id = calendar_id;
            config.save()?;
            println!("Destination calendar set to {}", config.calendar.calendar_id);
        }
        ConfigActions::SetTimezone { time_zone } => {
            config.set_time_zone(&time_zone)?;
            config.save()?;
            println!("Timezone set to {}", time_zone);
        }
    }
    Ok(())
}
