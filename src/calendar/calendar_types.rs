//! Wire types for the destination calendar (Google Calendar v3 event resources).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_CANCELLED: &str = "cancelled";

/// Start or end of an event: `date_time` for timed events, `date` for all-day events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
}

/// Request body for creating (importing) one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationEvent {
    #[serde(rename = "iCalUID")]
    pub ical_uid: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    pub reminders: Reminders,
}

/// An event as returned by the destination after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(rename = "iCalUID", default, skip_serializing_if = "Option::is_none")]
    pub ical_uid: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One materialized occurrence of a recurring destination event.
///
/// Unknown fields are carried through so an update writes the instance back unchanged apart
/// from its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationInstance {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DestinationInstance {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some(STATUS_CANCELLED)
    }

    /// The cancelled form of this instance. Cancellation is one-way.
    pub fn cancelled(&self) -> Self {
        Self { status: Some(STATUS_CANCELLED.to_string()), ..self.clone() }
    }
}

/// The `items` envelope of a list response.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// An entry of the user's calendar list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub access_role: String,
    #[serde(default)]
    pub selected: bool,
}

impl CalendarListEntry {
    /// Only owners and writers can receive imported events.
    pub fn is_writable(&self) -> bool {
        self.access_role == "owner" || self.access_role == "writer"
    }
}

/// Writable calendars split by whether they are shown in the user's calendar UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarChoices {
    pub visible: Vec<CalendarListEntry>,
    pub hidden: Vec<CalendarListEntry>,
}

impl CalendarChoices {
    pub fn from_entries(entries: Vec<CalendarListEntry>) -> Self {
        let (visible, hidden) = entries
            .into_iter()
            .filter(CalendarListEntry::is_writable)
            .partition(|entry| entry.selected);
        Self { visible, hidden }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn destination_event_serializes_google_field_names() {
        let event = DestinationEvent {
            ical_uid: "uid-1".to_string(),
            start: EventDateTime {
                date_time: Some("2024-01-15T09:30:00".to_string()),
                date: None,
                time_zone: Some("Europe/Berlin".to_string()),
            },
            end: EventDateTime {
                date_time: Some("2024-01-15T10:30:00".to_string()),
                date: None,
                time_zone: Some("Europe/Berlin".to_string()),
            },
            summary: Some("Planning".to_string()),
            location: None,
            description: String::new(),
            recurrence: None,
            reminders: Reminders { use_default: true },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "iCalUID": "uid-1",
                "start": {"dateTime": "2024-01-15T09:30:00", "timeZone": "Europe/Berlin"},
                "end": {"dateTime": "2024-01-15T10:30:00", "timeZone": "Europe/Berlin"},
                "summary": "Planning",
                "description": "",
                "reminders": {"useDefault": true}
            })
        );
    }

    #[test]
    fn cancelling_keeps_other_fields() {
        let instance: DestinationInstance = serde_json::from_value(json!({
            "id": "abc_20240103T140000Z",
            "status": "confirmed",
            "recurringEventId": "abc",
            "originalStartTime": {"dateTime": "2024-01-03T09:00:00-05:00"}
        }))
        .unwrap();
        let cancelled = instance.cancelled();
        assert!(cancelled.is_cancelled());
        assert!(!instance.is_cancelled());
        let body = serde_json::to_value(&cancelled).unwrap();
        assert_eq!(body["status"], "cancelled");
        assert_eq!(body["recurringEventId"], "abc");
    }

    #[test]
    fn calendar_choices_only_offer_writable_calendars() {
        let entries: Vec<CalendarListEntry> = serde_json::from_value(json!([
            {"id": "primary", "summary": "Me", "accessRole": "owner", "selected": true},
            {"id": "team", "summary": "Team", "accessRole": "writer"},
            {"id": "holidays", "summary": "Holidays", "accessRole": "reader", "selected": true}
        ]))
        .unwrap();
        let choices = CalendarChoices::from_entries(entries);
        assert_eq!(choices.visible.len(), 1);
        assert_eq!(choices.visible[0].id, "primary");
        assert_eq!(choices.hidden.len(), 1);
        assert_eq!(choices.hidden[0].id, "team");
    }
}
