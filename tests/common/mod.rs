#![allow(dead_code)]

use async_trait::async_trait;
use ics_importer::calendar::{
    CalendarListEntry, CreatedEvent, DestinationEvent, DestinationInstance,
};
use ics_importer::{CalendarStore, DocumentSource, ImportError, StoreError};
use serde_json::Map;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Calls seen by a [`RecordingStore`].
#[derive(Debug, Default)]
pub struct Calls {
    pub created: Vec<DestinationEvent>,
    pub exact_queries: Vec<(String, String)>,
    pub window_queries: Vec<(String, String, String)>,
    pub updates: Vec<DestinationInstance>,
}

/// In-memory destination that answers from canned instances and records every call.
#[derive(Debug, Default)]
pub struct RecordingStore {
    by_original_start: HashMap<String, Vec<DestinationInstance>>,
    in_window: Vec<DestinationInstance>,
    rejected_uids: HashSet<String>,
    failing_updates: HashSet<String>,
    calendars: Vec<CalendarListEntry>,
    calls: Mutex<Calls>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exact(mut self, original_start: &str, instances: Vec<DestinationInstance>) -> Self {
        self.by_original_start.insert(original_start.to_string(), instances);
        self
    }

    pub fn with_window(mut self, instances: Vec<DestinationInstance>) -> Self {
        self.in_window = instances;
        self
    }

    pub fn rejecting(mut self, uid: &str) -> Self {
        self.rejected_uids.insert(uid.to_string());
        self
    }

    pub fn failing_update(mut self, instance_id: &str) -> Self {
        self.failing_updates.insert(instance_id.to_string());
        self
    }

    pub fn with_calendars(mut self, calendars: Vec<CalendarListEntry>) -> Self {
        self.calendars = calendars;
        self
    }

    pub fn calls(&self) -> MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }
}

fn rejected(message: &str) -> StoreError {
    StoreError::Status { status: 400, message: message.to_string() }
}

#[async_trait]
impl CalendarStore for RecordingStore {
    async fn create_event(&self, event: &DestinationEvent) -> Result<CreatedEvent, StoreError> {
        let id = {
            let mut calls = self.calls();
            calls.created.push(event.clone());
            format!("event{}", calls.created.len())
        };
        tokio::task::yield_now().await;
        if self.rejected_uids.contains(&event.ical_uid) {
            return Err(rejected("Invalid event"));
        }
        Ok(CreatedEvent {
            id,
            ical_uid: Some(event.ical_uid.clone()),
            start: event.start.clone(),
            end: event.end.clone(),
            extra: Map::new(),
        })
    }

    async fn list_instances_by_original_start(
        &self,
        event_id: &str,
        original_start: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError> {
        self.calls()
            .exact_queries
            .push((event_id.to_string(), original_start.to_string()));
        Ok(self.by_original_start.get(original_start).cloned().unwrap_or_default())
    }

    async fn list_instances_in_window(
        &self,
        event_id: &str,
        end_min: &str,
        start_max: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError> {
        self.calls().window_queries.push((
            event_id.to_string(),
            end_min.to_string(),
            start_max.to_string(),
        ));
        Ok(self.in_window.clone())
    }

    async fn update_instance(&self, instance: &DestinationInstance) -> Result<(), StoreError> {
        if self.failing_updates.contains(&instance.id) {
            return Err(rejected("Update failed"));
        }
        self.calls().updates.push(instance.clone());
        Ok(())
    }

    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, StoreError> {
        Ok(self.calendars.clone())
    }
}

/// Document source serving one fixed text, or failing.
pub struct StaticSource(pub Result<String, String>);

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch_document_text(&self, location: &str) -> Result<String, ImportError> {
        self.0.clone().map_err(|e| ImportError::Fetch(format!("{location}: {e}")))
    }
}

pub fn instance(id: &str) -> DestinationInstance {
    DestinationInstance {
        id: id.to_string(),
        status: Some("confirmed".to_string()),
        extra: Map::new(),
    }
}

/// Wrap VEVENT bodies into a calendar document.
pub fn calendar(events: &[&str]) -> String {
    let mut text = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
    for body in events {
        text.push_str("BEGIN:VEVENT\r\n");
        text.push_str(body);
        text.push_str("END:VEVENT\r\n");
    }
    text.push_str("END:VCALENDAR\r\n");
    text
}
