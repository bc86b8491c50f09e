//! Translation of parsed events into destination event bodies.
//
// Destination times use the local system's zone paired with the source's civil timestamp.
// Translating arbitrary source zone definitions exactly is not attempted.

use super::calendar_types::{DestinationEvent, EventDateTime, Reminders};
use crate::error::ImportError;
use crate::ics::{
    extract_recurrence, parse_events, CivilTime, EventRecord, ExcludedDate, TimezoneRegistry,
    ZoneRule,
};
use std::sync::Arc;
use uuid::Uuid;

/// Source of the 16 random bytes behind a generated identifier.
pub trait RandomSource: Send + Sync {
    fn random_bytes(&self) -> [u8; 16];
}

/// Operating system randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn random_bytes(&self) -> [u8; 16] {
        *Uuid::new_v4().as_bytes()
    }
}

/// A random version-4 UUID in lowercase hyphenated form.
pub fn generate_uid(random: &dyn RandomSource) -> String {
    uuid::Builder::from_random_bytes(random.random_bytes()).into_uuid().to_string()
}

/// A destination body plus the dates to cancel once it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedEvent {
    pub event: DestinationEvent,
    pub excluded: Vec<ExcludedDate>,
}

pub struct Translator {
    time_zone: chrono_tz::Tz,
    random: Arc<dyn RandomSource>,
}

impl Translator {
    pub fn new(time_zone: chrono_tz::Tz) -> Self {
        Self::with_random(time_zone, Arc::new(OsRandom))
    }

    pub fn with_random(time_zone: chrono_tz::Tz, random: Arc<dyn RandomSource>) -> Self {
        Self { time_zone, random }
    }

    pub fn time_zone(&self) -> chrono_tz::Tz {
        self.time_zone
    }

    /// The zone floating source values are read in.
    pub fn floating_zone(&self) -> ZoneRule {
        ZoneRule::Olson(self.time_zone)
    }

    /// Translate one event. Only a malformed recurrence can fail.
    pub fn translate(
        &self,
        record: &EventRecord,
        registry: &TimezoneRegistry,
    ) -> Result<TranslatedEvent, ImportError> {
        let (recurrence, excluded) = if record.is_recurring() {
            let set = extract_recurrence(record, registry)?;
            (Some(set.rules), set.excluded)
        } else {
            (None, Vec::new())
        };

        let event = DestinationEvent {
            ical_uid: match &record.uid {
                Some(uid) => uid.clone(),
                None => generate_uid(self.random.as_ref()),
            },
            start: self.event_time(&record.start),
            end: self.event_time(&record.end),
            summary: record.summary.clone().filter(|s| !s.is_empty()),
            location: record.location.clone().filter(|s| !s.is_empty()),
            description: description_with_url(record.description.as_deref(), record.url.as_deref()),
            recurrence,
            reminders: Reminders { use_default: true },
        };
        Ok(TranslatedEvent { event, excluded })
    }

    /// Sanitize, parse and translate every event of a raw document.
    pub fn translate_document(&self, raw: &str) -> Result<Vec<TranslatedEvent>, ImportError> {
        let (document, events) = parse_events(raw)?;
        events.iter().map(|record| self.translate(record, document.registry())).collect()
    }

    fn event_time(&self, time: &CivilTime) -> EventDateTime {
        let civil = time.to_civil_string();
        let (date_time, date) = if time.is_date { (None, Some(civil)) } else { (Some(civil), None) };
        EventDateTime { date_time, date, time_zone: Some(self.time_zone.name().to_string()) }
    }
}

/// The description with the URL appended on its own paragraph.
fn description_with_url(description: Option<&str>, url: Option<&str>) -> String {
    let mut out = description.unwrap_or_default().to_string();
    if let Some(url) = url {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(url);
    }
    out
}
