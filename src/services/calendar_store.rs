use crate::calendar::{CalendarListEntry, CreatedEvent, DestinationEvent, DestinationInstance};
use crate::error::StoreError;
use async_trait::async_trait;

/// Operations the import pipeline needs from a destination calendar.
///
/// Timestamps are passed through as the strings the destination expects; window bounds must
/// carry an explicit UTC offset.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Create (import) one event and return it with its destination identifier.
    async fn create_event(&self, event: &DestinationEvent) -> Result<CreatedEvent, StoreError>;

    /// Instances of `event_id` whose original start equals `original_start`.
    async fn list_instances_by_original_start(
        &self,
        event_id: &str,
        original_start: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError>;

    /// Instances of `event_id` ending after `end_min` and starting before `start_max`.
    async fn list_instances_in_window(
        &self,
        event_id: &str,
        end_min: &str,
        start_max: &str,
    ) -> Result<Vec<DestinationInstance>, StoreError>;

    /// Persist a changed instance.
    async fn update_instance(&self, instance: &DestinationInstance) -> Result<(), StoreError>;

    /// Calendars visible to the authenticated user.
    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, StoreError>;
}
