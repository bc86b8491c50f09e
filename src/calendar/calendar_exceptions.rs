//! Cancelling the destination occurrences a source series excludes.
//!
//! Each excluded date is looked up in two tiers:
//!
//! 1. instances whose original start equals the excluded timestamp; every match is cancelled;
//! 2. only when nothing matched exactly and the series is timed: instances on the excluded
//!    date's day. A single candidate is taken to be the intended
//!    occurrence (producers often emit an exclusion with the wrong time of day). Zero or several
//!    candidates leave the date alone.
//!
//! The series is created from the source's civil times in the local zone, so excluded
//! date-times are read the same way: their civil time in that zone. UTC values stay absolute.
//!
//! Dates are reconciled independently; a failure for one date is logged and dropped.

use super::calendar_join::{join_all_or_first_error, join_all_suppressing};
use super::calendar_types::{CreatedEvent, DestinationInstance};
use crate::error::StoreError;
use crate::ics::{parse_destination_civil, utc_query_string, CivilTime, ExcludedDate, ZoneRule};
use crate::services::CalendarStore;
use chrono::Duration;
use log::{debug, warn};

/// What happened to one excluded date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Instances matched by original start and cancelled.
    ExactMatch { cancelled: usize },
    /// The only instance on the excluded day was cancelled.
    DayWindow { instance_id: String },
    /// The day window held no instance or several; nothing was cancelled.
    Ambiguous { candidates: usize },
    /// Nothing matched exactly and the series is all-day, so the day window does not apply.
    NoMatch,
}

impl ReconcileOutcome {
    pub fn cancelled(&self) -> usize {
        match self {
            ReconcileOutcome::ExactMatch { cancelled } => *cancelled,
            ReconcileOutcome::DayWindow { .. } => 1,
            ReconcileOutcome::Ambiguous { .. } | ReconcileOutcome::NoMatch => 0,
        }
    }
}

pub struct ExceptionReconciler<'a> {
    store: &'a dyn CalendarStore,
    floating_zone: ZoneRule,
}

impl<'a> ExceptionReconciler<'a> {
    /// `floating_zone` is the zone the destination series was created in; excluded date-times
    /// that are not UTC are read in it.
    pub fn new(store: &'a dyn CalendarStore, floating_zone: ZoneRule) -> Self {
        Self { store, floating_zone }
    }

    /// Reconcile every excluded date concurrently. Outcomes of failed dates are dropped.
    pub async fn reconcile(
        &self,
        created: &CreatedEvent,
        excluded: &[ExcludedDate],
    ) -> Vec<ReconcileOutcome> {
        let tasks = excluded.iter().map(|date| async move {
            self.reconcile_date(created, date).await.map_err(|err| (date, err))
        });
        join_all_suppressing(tasks, |(date, err)| {
            warn!("Could not cancel the excluded occurrence {} of {}: {}", date, created.id, err)
        })
        .await
    }

    pub async fn reconcile_date(
        &self,
        created: &CreatedEvent,
        date: &ExcludedDate,
    ) -> Result<ReconcileOutcome, StoreError> {
        let time = date.time().as_floating();
        let original_start = time.to_offset_string_with(&self.floating_zone);
        let exact =
            self.store.list_instances_by_original_start(&created.id, &original_start).await?;
        if !exact.is_empty() {
            let cancelled = self.cancel_all(&exact).await?;
            if cancelled == 0 {
                debug!(
                    "Every instance of {} at {} was already cancelled",
                    created.id, original_start
                );
            }
            return Ok(ReconcileOutcome::ExactMatch { cancelled });
        }

        let Some((end_min, start_max)) = self.day_window(created, &time) else {
            debug!("No exact instance of {} at {}; series is all-day", created.id, original_start);
            return Ok(ReconcileOutcome::NoMatch);
        };
        let candidates =
            self.store.list_instances_in_window(&created.id, &end_min, &start_max).await?;
        match candidates.as_slice() {
            [only] => {
                self.cancel(only).await?;
                Ok(ReconcileOutcome::DayWindow { instance_id: only.id.clone() })
            }
            _ => {
                debug!(
                    "Leaving {} of {} alone: {} instance(s) between {} and {}",
                    date,
                    created.id,
                    candidates.len(),
                    end_min,
                    start_max
                );
                Ok(ReconcileOutcome::Ambiguous { candidates: candidates.len() })
            }
        }
    }

    /// Query bounds for the excluded date's day, or `None` when the series is all-day.
    ///
    /// The lower bound constrains instance end, so it is advanced by the series' duration.
    /// The duration is taken from the civil parts of start and end; if they were created with
    /// different offsets the shift is off by the difference.
    fn day_window(&self, created: &CreatedEvent, time: &CivilTime) -> Option<(String, String)> {
        let start = parse_destination_civil(created.start.date_time.as_deref()?)?;
        let duration = created
            .end
            .date_time
            .as_deref()
            .and_then(parse_destination_civil)
            .map_or_else(Duration::zero, |end| end - start);

        let (day_start, day_end) = time.day_bounds();
        let end_min = day_start.shifted(duration).to_utc(&self.floating_zone);
        let start_max = day_end.to_utc(&self.floating_zone);
        Some((utc_query_string(&end_min), utc_query_string(&start_max)))
    }

    async fn cancel_all(&self, instances: &[DestinationInstance]) -> Result<usize, StoreError> {
        let pending: Vec<&DestinationInstance> =
            instances.iter().filter(|instance| !instance.is_cancelled()).collect();
        join_all_or_first_error(pending.iter().map(|instance| self.cancel(instance))).await?;
        Ok(pending.len())
    }

    async fn cancel(&self, instance: &DestinationInstance) -> Result<(), StoreError> {
        debug!("Cancelling instance {}", instance.id);
        self.store.update_instance(&instance.cancelled()).await
    }
}
