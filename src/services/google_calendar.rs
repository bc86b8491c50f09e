//! Google Calendar v3 client.

use super::calendar_store::CalendarStore;
use crate::calendar::{
    CalendarListEntry, CreatedEvent, DestinationEvent, DestinationInstance, ItemsResponse,
};
use crate::error::StoreError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

const MAX_ERROR_LEN: usize = 240;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Talks to one destination calendar on behalf of one bearer token.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: Url,
    calendar_id: String,
    token: SecretString,
}

impl GoogleCalendarClient {
    pub fn new(
        api_base: &str,
        calendar_id: impl Into<String>,
        token: SecretString,
    ) -> Result<Self, StoreError> {
        let api_base =
            Url::parse(api_base).map_err(|e| StoreError::InvalidUrl(format!("{api_base}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(api_base.to_string()));
        }
        Ok(Self { client: Client::new(), api_base, calendar_id: calendar_id.into(), token })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Build an endpoint URL below the API base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn events_endpoint(&self, rest: &[&str]) -> Result<Url, StoreError> {
        let mut segments = vec!["calendars", self.calendar_id.as_str(), "events"];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.bearer_auth(self.token.expose_secret()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn list_instances(
        &self,
        event_id: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<DestinationInstance>, StoreError> {
        let url = self.events_endpoint(&[event_id, "instances"])?;
        debug!("Listing instances of {} with {:?}", event_id, query);
        let response: ItemsResponse<DestinationInstance> =
            self.send(self.client.get(url).query(query)).await?;
        Ok(response.items)
    }
}

#[async_trait]
impl CalendarStore for GoogleCalendarClient {
    async fn create_event(&self, event: &DestinationEvent) -> Result<CreatedEvent, StoreError> {
        let url = self.events_endpoint(&["import"])?;
        debug!("Importing event {} into {}", event.ical_uid, self.calendar_id);
        self.send(self.client.post(url).json(event)).await
    }

    async fn list_instances_by_original_start(
        &self,
        event_id: &str,
        original_start: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError> {
        self.list_instances(event_id, &[("originalStart", original_start)]).await
    }

    async fn list_instances_in_window(
        &self,
        event_id: &str,
        end_min: &str,
        start_max: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError> {
        self.list_instances(event_id, &[("timeMin", end_min), ("timeMax", start_max)]).await
    }

    async fn update_instance(&self, instance: &DestinationInstance) -> Result<(), StoreError> {
        let url = self.events_endpoint(&[instance.id.as_str()])?;
        let _: serde_json::Value = self.send(self.client.put(url).json(instance)).await?;
        Ok(())
    }

    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, StoreError> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        let response: ItemsResponse<CalendarListEntry> = self.send(self.client.get(url)).await?;
        Ok(response.items)
    }
}

/// Prefer the API's own error message, else a shortened single-line body.
fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("no response body").to_string();
    }
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(trimmed) {
        return parsed.error.message;
    }
    let mut message = trimmed.replace(['\n', '\r'], " ");
    if message.len() > MAX_ERROR_LEN {
        let cut = (0..=MAX_ERROR_LEN).rev().find(|i| message.is_char_boundary(*i)).unwrap_or(0);
        message.truncate(cut);
        message.push_str("...");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(calendar_id: &str) -> GoogleCalendarClient {
        GoogleCalendarClient::new(
            DEFAULT_API_BASE,
            calendar_id,
            SecretString::from("token".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn builds_import_endpoint() {
        let url = client("primary").events_endpoint(&["import"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events/import"
        );
    }

    #[test]
    fn encodes_calendar_ids() {
        let url = client("team#shared@group.calendar.google.com")
            .events_endpoint(&["abc_20240103", "instances"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/calendar/v3/calendars/team%23shared@group.calendar.google.com/events/abc_20240103/instances"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let client = GoogleCalendarClient::new(
            "http://localhost:8080/v3/",
            "primary",
            SecretString::from("token".to_string()),
        )
        .unwrap();
        let url = client.endpoint(&["users", "me", "calendarList"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v3/users/me/calendarList");
    }

    #[test]
    fn rejects_invalid_base() {
        let result =
            GoogleCalendarClient::new("not a url", "primary", SecretString::from("t".to_string()));
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }

    #[test]
    fn extracts_api_error_message() {
        let body = r#"{"error": {"code": 403, "message": "Forbidden calendar"}}"#;
        assert_eq!(error_message(StatusCode::FORBIDDEN, body), "Forbidden calendar");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream\nfailed"), "upstream failed");
    }
}
