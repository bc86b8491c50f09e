//! Import orchestration: fetch, parse, translate, then create and reconcile every event.
//
// Creation is all-or-report: if any create fails the batch is reported as failed, but events
// created before the failure stay in the destination.

use super::calendar_exceptions::{ExceptionReconciler, ReconcileOutcome};
use super::calendar_join::join_all_or_first_error;
use super::calendar_translate::{TranslatedEvent, Translator};
use super::calendar_types::CreatedEvent;
use crate::error::ImportError;
use crate::services::{CalendarStore, DocumentSource};
use log::{error, info, warn};
use std::sync::Arc;

/// One created event and what happened to its excluded dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedEvent {
    pub created: CreatedEvent,
    pub exceptions: Vec<ReconcileOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub events: Vec<ImportedEvent>,
}

impl ImportReport {
    pub fn created(&self) -> usize {
        self.events.len()
    }

    pub fn cancelled(&self) -> usize {
        self.events
            .iter()
            .flat_map(|event| &event.exceptions)
            .map(ReconcileOutcome::cancelled)
            .sum()
    }
}

pub struct Importer {
    store: Arc<dyn CalendarStore>,
    source: Arc<dyn DocumentSource>,
    translator: Translator,
}

impl Importer {
    pub fn new(
        store: Arc<dyn CalendarStore>,
        source: Arc<dyn DocumentSource>,
        translator: Translator,
    ) -> Self {
        Self { store, source, translator }
    }

    /// Import the document found at `location`.
    pub async fn import_document(&self, location: &str) -> Result<ImportReport, ImportError> {
        let raw = self.source.fetch_document_text(location).await.map_err(|err| {
            warn!("{}", err);
            err
        })?;
        self.import_text(&raw).await
    }

    /// Import an already fetched document.
    pub async fn import_text(&self, raw: &str) -> Result<ImportReport, ImportError> {
        let translated = self.translator.translate_document(raw).map_err(|err| {
            warn!("{}", err);
            err
        })?;
        info!("Importing {} event(s)", translated.len());

        let tasks = translated.iter().map(|event| self.import_event(event));
        match join_all_or_first_error(tasks).await {
            Ok(events) => {
                let report = ImportReport { events };
                info!(
                    "Created {} event(s), cancelled {} excluded occurrence(s)",
                    report.created(),
                    report.cancelled()
                );
                Ok(report)
            }
            Err(err) => {
                if translated.len() == 1 {
                    error!("Can't create the event.");
                } else {
                    error!("Can't create the events.");
                }
                error!("{}", err);
                Err(err)
            }
        }
    }

    async fn import_event(&self, translated: &TranslatedEvent) -> Result<ImportedEvent, ImportError> {
        let created = self.store.create_event(&translated.event).await.map_err(|source| {
            ImportError::Create { uid: translated.event.ical_uid.clone(), source }
        })?;
        let exceptions = if translated.excluded.is_empty() {
            Vec::new()
        } else {
            ExceptionReconciler::new(self.store.as_ref(), self.translator.floating_zone())
                .reconcile(&created, &translated.excluded)
                .await
        };
        Ok(ImportedEvent { created, exceptions })
    }
}
