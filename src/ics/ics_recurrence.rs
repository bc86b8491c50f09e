//! Recurrence rules and excluded dates of a recurring event.
//
// EXRULE is deprecated and ambiguous, so it is never read. An RDATE makes the destination
// series one whose instances can only be deleted together, not edited together; that is a
// property of the destination and accepted as is.

use super::ics_document::EventRecord;
use super::ics_time::{CivilTime, Zone};
use super::ics_timezone::TimezoneRegistry;
use crate::error::ImportError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Properties that define the occurrences sent to the destination, in emission order.
const RULE_PROPERTIES: [&str; 2] = ["RRULE", "RDATE"];

/// One occurrence of a series that must not materialize at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExcludedDate(pub CivilTime);

impl ExcludedDate {
    pub fn time(&self) -> &CivilTime {
        &self.0
    }
}

impl fmt::Display for ExcludedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Destination-ready rule strings plus the dates the series excludes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecurrenceRuleSet {
    pub rules: Vec<String>,
    pub excluded: Vec<ExcludedDate>,
}

/// Read the rule strings and excluded dates of a recurring event.
pub fn extract_recurrence(
    event: &EventRecord,
    registry: &TimezoneRegistry,
) -> Result<RecurrenceRuleSet, ImportError> {
    Ok(RecurrenceRuleSet {
        rules: recurrence_rules(event)?,
        excluded: ExclusionSet::from_event(event, registry)?.excluded,
    })
}

/// RRULE and RDATE properties serialized verbatim, RRULEs first, each in source order.
pub fn recurrence_rules(event: &EventRecord) -> Result<Vec<String>, ImportError> {
    let mut rules = Vec::new();
    for name in RULE_PROPERTIES {
        for prop in event.component.properties(name) {
            if name == "RRULE" {
                let value = prop.value.as_deref().unwrap_or_default();
                rrule::RRule::<rrule::Unvalidated>::from_str(value)?;
            }
            rules.push(prop.to_ical_string());
        }
    }
    Ok(rules)
}

/// The distinct dates a series' EXDATE properties exclude, in chronological order.
///
/// Instances cut off by COUNT or UNTIL are not excluded dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionSet {
    pub excluded: Vec<ExcludedDate>,
}

impl ExclusionSet {
    pub fn from_event(
        event: &EventRecord,
        registry: &TimezoneRegistry,
    ) -> Result<Self, ImportError> {
        let mut seen = HashSet::new();
        let mut excluded = Vec::new();
        for prop in event.component.properties("EXDATE") {
            let zone = registry.zone_for(prop);
            let is_date = prop.value_type() == Some("DATE");
            let values = prop.value.as_deref().unwrap_or_default();
            for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                let parsed = CivilTime::parse(value, zone.clone(), is_date)?;
                let date = ExcludedDate(align_with_start(parsed, &event.start));
                if seen.insert(date.clone()) {
                    excluded.push(date);
                }
            }
        }
        excluded.sort_by(|a, b| a.0.naive.cmp(&b.0.naive));
        Ok(Self { excluded })
    }
}

/// A floating exclusion on a zoned series is read in the series' zone so that both are
/// compared in the same representation.
fn align_with_start(date: CivilTime, start: &CivilTime) -> CivilTime {
    match (&date.zone, &start.zone) {
        (Zone::Floating, Zone::Named { .. }) | (Zone::Floating, Zone::Utc) => CivilTime {
            zone: start.zone.clone(),
            ..date
        },
        _ => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::parse_events;
    use pretty_assertions::assert_eq;

    fn event(body: &str) -> (EventRecord, TimezoneRegistry) {
        let text = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\nUID:series\r\n{body}END:VEVENT\r\nEND:VCALENDAR\r\n"
        );
        let (document, mut events) = parse_events(&text).unwrap();
        (events.remove(0), document.registry().clone())
    }

    #[test]
    fn single_rrule_is_emitted_verbatim() {
        let (record, registry) = event(
            "DTSTART;TZID=Europe/Berlin:20240101T100000\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO;COUNT=10\r\n",
        );
        let set = extract_recurrence(&record, &registry).unwrap();
        assert_eq!(set.rules, vec!["RRULE:FREQ=WEEKLY;BYDAY=MO;COUNT=10".to_string()]);
        assert!(set.excluded.is_empty());
    }

    #[test]
    fn rrules_precede_rdates_and_exrules_are_dropped() {
        let (record, registry) = event(
            "DTSTART:20240101T100000Z\r\n\
RDATE:20240105T100000Z\r\n\
EXRULE:FREQ=MONTHLY\r\n\
RRULE:FREQ=DAILY;COUNT=3\r\n",
        );
        let set = extract_recurrence(&record, &registry).unwrap();
        assert_eq!(
            set.rules,
            vec!["RRULE:FREQ=DAILY;COUNT=3".to_string(), "RDATE:20240105T100000Z".to_string()]
        );
    }

    #[test]
    fn third_occurrence_exclusion() {
        let (record, registry) = event(
            "DTSTART;TZID=America/New_York:20240101T090000\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
EXDATE;TZID=America/New_York:20240103T090000\r\n",
        );
        let set = extract_recurrence(&record, &registry).unwrap();
        assert_eq!(set.excluded.len(), 1);
        assert_eq!(set.excluded[0].time().to_offset_string(), "2024-01-03T09:00:00-05:00");
    }

    #[test]
    fn exclusions_are_deduplicated() {
        let (record, registry) = event(
            "DTSTART:20240101T090000Z\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
EXDATE:20240102T090000Z,20240103T090000Z\r\n\
EXDATE:20240102T090000Z\r\n",
        );
        let set = extract_recurrence(&record, &registry).unwrap();
        let rendered: Vec<String> = set.excluded.iter().map(|d| d.time().to_civil_string()).collect();
        assert_eq!(rendered, vec!["2024-01-02T09:00:00Z", "2024-01-03T09:00:00Z"]);
    }

    #[test]
    fn floating_exclusion_takes_series_zone() {
        let (record, registry) = event(
            "DTSTART;TZID=Europe/Berlin:20240101T100000\r\n\
RRULE:FREQ=DAILY\r\n\
EXDATE:20240102T100000\r\n",
        );
        let set = extract_recurrence(&record, &registry).unwrap();
        assert_eq!(set.excluded[0].time().zone, record.start.zone);
    }

    #[test]
    fn exclusions_are_sorted_across_properties() {
        let (record, registry) = event(
            "DTSTART:20240101T090000Z\r\n\
RRULE:FREQ=DAILY;COUNT=9\r\n\
EXDATE:20240108T090000Z\r\n\
EXDATE:20240103T090000Z,20240105T090000Z\r\n",
        );
        let set = ExclusionSet::from_event(&record, &registry).unwrap();
        let rendered: Vec<String> = set.excluded.iter().map(|d| d.time().to_civil_string()).collect();
        assert_eq!(
            rendered,
            vec!["2024-01-03T09:00:00Z", "2024-01-05T09:00:00Z", "2024-01-08T09:00:00Z"]
        );
    }

    #[test]
    fn invalid_rrule_is_malformed() {
        let (record, registry) = event("DTSTART:20240101T100000Z\r\nRRULE:FREQ=SOMETIMES\r\n");
        assert!(matches!(
            extract_recurrence(&record, &registry),
            Err(ImportError::MalformedFormat(_))
        ));
    }
}
