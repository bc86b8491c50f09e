//! Calendar document parsing and event extraction.

use super::ics_component::{Component, VCALENDAR, VEVENT, VTIMEZONE};
use super::ics_time::{parse_duration, CivilTime};
use super::ics_timezone::TimezoneRegistry;
use crate::error::ImportError;
use chrono::Duration;
use ical::IcalParser;
use log::debug;
use std::io::BufReader;

/// A parsed iCalendar document together with the timezones it defines.
#[derive(Debug, Clone)]
pub struct CalendarDocument {
    calendars: Vec<Component>,
    registry: TimezoneRegistry,
}

impl CalendarDocument {
    /// Parse already-sanitized text. Every VTIMEZONE is registered before any event is read.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let calendars = IcalParser::new(BufReader::new(text.as_bytes()))
            .map(|calendar| calendar.map(Component::from))
            .collect::<Result<Vec<_>, _>>()?;
        if calendars.is_empty() {
            return Err(ImportError::malformed(format!("no {VCALENDAR} component found")));
        }

        let mut registry = TimezoneRegistry::new();
        for vtimezone in calendars.iter().flat_map(|c| c.subcomponents(VTIMEZONE)) {
            registry.register(vtimezone);
        }
        debug!(
            "Parsed {} calendar(s) with {} registered timezone(s)",
            calendars.len(),
            registry.len()
        );

        Ok(Self { calendars, registry })
    }

    pub fn registry(&self) -> &TimezoneRegistry {
        &self.registry
    }

    /// All top-level components of one kind across every VCALENDAR in the document.
    pub fn components<'d>(&'d self, kind: &'d str) -> impl Iterator<Item = &'d Component> {
        self.calendars.iter().flat_map(move |c| c.subcomponents(kind))
    }

    /// Every VEVENT as an [`EventRecord`]; an empty vector when the document has none.
    pub fn events(&self) -> Result<Vec<EventRecord>, ImportError> {
        self.components(VEVENT)
            .map(|vevent| EventRecord::from_component(vevent, &self.registry))
            .collect()
    }
}

/// Sanitize, parse and extract events in one step.
///
/// A document that parses but holds no events is [`ImportError::EmptyDocument`].
pub fn parse_events(raw: &str) -> Result<(CalendarDocument, Vec<EventRecord>), ImportError> {
    let document = CalendarDocument::parse(&super::sanitize(raw))?;
    let events = document.events()?;
    if events.is_empty() {
        return Err(ImportError::EmptyDocument);
    }
    Ok((document, events))
}

/// One VEVENT with its times resolved against the document's timezones.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub uid: Option<String>,
    pub start: CivilTime,
    pub end: CivilTime,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// The VEVENT this record was read from; recurrence properties are read from here.
    pub component: Component,
}

impl EventRecord {
    pub fn from_component(
        vevent: &Component,
        registry: &TimezoneRegistry,
    ) -> Result<Self, ImportError> {
        let start = read_time(vevent, "DTSTART", registry)?
            .ok_or_else(|| ImportError::malformed("VEVENT without DTSTART"))?;
        let end = match read_time(vevent, "DTEND", registry)? {
            Some(end) => end,
            None => match vevent.property_value("DURATION") {
                Some(duration) => start.shifted(parse_duration(duration)?),
                None if start.is_date => start.shifted(Duration::days(1)),
                None => start.clone(),
            },
        };

        Ok(Self {
            uid: vevent.property_value("UID").map(str::to_string),
            start,
            end,
            summary: text_value(vevent, "SUMMARY"),
            location: text_value(vevent, "LOCATION"),
            description: text_value(vevent, "DESCRIPTION"),
            url: vevent.property_value("URL").map(str::to_string),
            component: vevent.clone(),
        })
    }

    /// An event recurs when it carries an RRULE or RDATE.
    pub fn is_recurring(&self) -> bool {
        self.component.has_property("RRULE") || self.component.has_property("RDATE")
    }
}

fn read_time(
    component: &Component,
    name: &str,
    registry: &TimezoneRegistry,
) -> Result<Option<CivilTime>, ImportError> {
    let Some(prop) = component.property(name) else {
        return Ok(None);
    };
    let Some(value) = prop.value.as_deref().filter(|v| !v.is_empty()) else {
        return Err(ImportError::malformed(format!("{name} without a value")));
    };
    let is_date = prop.value_type() == Some("DATE");
    CivilTime::parse(value, registry.zone_for(prop), is_date).map(Some)
}

fn text_value(component: &Component, name: &str) -> Option<String> {
    component.property_value(name).map(unescape_text)
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
