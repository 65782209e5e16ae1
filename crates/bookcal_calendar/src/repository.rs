//! Booking persistence on top of a [`DocumentStore`] collection.

use crate::booking::Booking;
use crate::error::CalendarError;
use bookcal_common::{DocumentStore, StoreWrite};
use bookcal_config::MoveStrategy;
use serde_json::Value;
use tracing::{debug, info, warn};

pub struct BookingRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> BookingRepository<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every readable booking of the collection.
    ///
    /// Records without both bounds are skipped quietly; records that cannot
    /// be read at all are skipped with a warning.
    pub async fn load_all(&self) -> Result<Vec<Booking>, CalendarError> {
        let documents = self
            .store
            .query_all(&self.collection)
            .await
            .map_err(|e| CalendarError::Fetch(e.to_string()))?;

        let total = documents.len();
        let mut bookings = Vec::with_capacity(total);
        for document in &documents {
            match Booking::from_stored(document) {
                Ok(booking) => bookings.push(booking),
                Err(CalendarError::IncompleteRecord(field)) => {
                    debug!("skipping document {} without {}", document.id, field);
                }
                Err(e) => warn!("skipping unreadable document {}: {}", document.id, e),
            }
        }
        debug!(
            "loaded {} of {} documents from {}",
            bookings.len(),
            total,
            self.collection
        );
        Ok(bookings)
    }

    /// Insert a new record and return its document id.
    pub async fn create(&self, booking: &Booking) -> Result<String, CalendarError> {
        let doc_id = self
            .store
            .insert(&self.collection, booking.to_document())
            .await
            .map_err(|e| CalendarError::Write(e.to_string()))?;
        info!("Booking {} added as document {}", booking.id, doc_id);
        Ok(doc_id)
    }

    /// Persist `moved` in place of every stored record with the same booking id.
    pub async fn relocate(
        &self,
        moved: &Booking,
        strategy: MoveStrategy,
    ) -> Result<(), CalendarError> {
        match strategy {
            MoveStrategy::Upsert => self.upsert(moved).await,
            MoveStrategy::DeleteThenInsert => self.delete_then_insert(moved).await,
        }
    }

    async fn matching_documents(&self, booking_id: &str) -> Result<Vec<String>, CalendarError> {
        let matches = self
            .store
            .query_where(&self.collection, "id", &Value::String(booking_id.to_string()))
            .await
            .map_err(|e| CalendarError::Fetch(e.to_string()))?;
        Ok(matches.into_iter().map(|doc| doc.id).collect())
    }

    /// One commit: set the document named after the booking id and delete
    /// any other copy of the booking.
    async fn upsert(&self, moved: &Booking) -> Result<(), CalendarError> {
        let mut writes = vec![StoreWrite::Set {
            id: moved.id.clone(),
            fields: moved.to_document(),
        }];
        writes.extend(
            self.matching_documents(&moved.id)
                .await?
                .into_iter()
                .filter(|doc_id| *doc_id != moved.id)
                .map(|doc_id| StoreWrite::Delete { id: doc_id }),
        );
        let replaced = writes.len() - 1;
        self.store
            .commit(&self.collection, writes)
            .await
            .map_err(|e| CalendarError::Write(e.to_string()))?;
        info!(
            "Booking {} moved to {} - {} ({} old copies removed)",
            moved.id, moved.start_time, moved.end_time, replaced
        );
        Ok(())
    }

    /// Delete every copy, then insert the moved record. A failure after the
    /// deletes leaves the booking gone from the store.
    async fn delete_then_insert(&self, moved: &Booking) -> Result<(), CalendarError> {
        for doc_id in self.matching_documents(&moved.id).await? {
            self.store
                .delete_by_id(&self.collection, &doc_id)
                .await
                .map_err(|e| CalendarError::Write(e.to_string()))?;
        }
        let doc_id = self.create(moved).await?;
        info!(
            "Booking {} moved to {} - {} as document {}",
            moved.id, moved.start_time, moved.end_time, doc_id
        );
        Ok(())
    }
}
