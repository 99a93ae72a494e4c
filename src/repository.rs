//! # Record Repository
//!
//! [`FleetRepository`] is the sole reader/writer of the durable collection:
//! a JSON array of [`Motorcycle`] records under one fixed store key. It owns
//! the serialization format, the validation rules and the plate-uniqueness
//! invariant, and every mutation is a whole-collection read-modify-write —
//! the store has no query capability and no partial writes.
//!
//! ## Failure semantics
//!
//! - [`FleetRepository::list`] is infallible: an absent key, a store fault or
//!   an unparseable payload all read as an empty collection. A parse failure
//!   is logged and treated as "no data"; a permanently corrupt store would be
//!   worse than data loss for this domain.
//! - Mutations return a discriminated [`FleetError`], so callers can tell a
//!   validation rejection from a plate conflict from a missing id from a
//!   storage fault.
//!
//! ## Concurrency
//!
//! Two concurrently issued mutations both read the pre-mutation snapshot and
//! the second write wins, silently discarding the first. The repository does
//! not guard against this; [`crate::state::FleetController`] serializes
//! access by requiring `&mut self` for every mutating operation.

use tracing::{debug, warn};

use crate::error::{FleetError, Result};
use crate::model::{Motorcycle, MotorcycleDraft, MotorcycleUpdate};
use crate::stats::{fleet_statistics, FleetStatistics};
use crate::store::KeyValueStore;

/// Fixed store key holding the serialized collection.
pub const COLLECTION_KEY: &str = "motorcycles";

/// Prefix for the one-off forensic snapshot written before every delete.
/// Backups are never read back by normal code paths.
const BACKUP_KEY_PREFIX: &str = "motorcycles_backup";

pub struct FleetRepository<S> {
    store: S,
}

impl<S: KeyValueStore> FleetRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the entire collection. Never fails: an absent key, a store fault
    /// or a payload that does not parse as a record array all yield an empty
    /// collection.
    pub async fn list(&self) -> Vec<Motorcycle> {
        match self.store.get(COLLECTION_KEY).await {
            Ok(Some(payload)) => parse_collection(&payload),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read collection, treating as empty");
                Vec::new()
            }
        }
    }

    /// Validate a draft and append it to the collection.
    ///
    /// Rejects with [`FleetError::DuplicatePlate`] before any write if a live
    /// record carries the same plate (case-insensitive). On success returns
    /// the newly assigned id.
    pub async fn create(&self, draft: MotorcycleDraft) -> Result<String> {
        draft.validate()?;

        let mut records = self.load_for_mutation().await?;
        if let Some(existing) = find_by_plate(&records, &draft.plate) {
            warn!(plate = %existing.plate, "rejected creation: plate already registered");
            return Err(FleetError::DuplicatePlate(draft.plate.to_uppercase()));
        }

        let record = Motorcycle::from_draft(draft);
        let id = record.id.clone();
        debug!(id = %id, plate = %record.plate, "creating record");

        records.push(record);
        self.save(&records).await?;
        Ok(id)
    }

    /// Merge a partial update into the record with `id`, refreshing
    /// `updated_at`/`last_update`. A plate change is held to the same
    /// uniqueness invariant as creation.
    pub async fn update(&self, id: &str, update: MotorcycleUpdate) -> Result<()> {
        update.validate()?;

        let mut records = self.load_for_mutation().await?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FleetError::NotFound(id.to_string()))?;

        if let Some(new_plate) = &update.plate {
            let taken = records
                .iter()
                .any(|r| r.id != id && r.plate.to_uppercase() == new_plate.to_uppercase());
            if taken {
                return Err(FleetError::DuplicatePlate(new_plate.to_uppercase()));
            }
        }

        let record = &mut records[index];
        update.merge_into(record);
        let now = chrono::Utc::now();
        record.updated_at = now;
        record.last_update = now;

        debug!(id = %id, "updating record");
        self.save(&records).await
    }

    /// Remove the record with `id` from the collection.
    ///
    /// Writes a forensic backup of the pre-delete collection first, then
    /// verifies after writing that the persisted collection shrank by exactly
    /// one — a write that silently no-ops is reported as a store error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let records = self.load_for_mutation().await?;
        if !records.iter().any(|r| r.id == id) {
            warn!(id = %id, "rejected deletion: record not found");
            return Err(FleetError::NotFound(id.to_string()));
        }

        let backup_key = format!(
            "{}_{}",
            BACKUP_KEY_PREFIX,
            chrono::Utc::now().timestamp_millis()
        );
        let payload = serde_json::to_string(&records)?;
        self.store.set(&backup_key, &payload).await?;
        debug!(key = %backup_key, "wrote pre-delete backup");

        let remaining: Vec<Motorcycle> = records.into_iter().filter(|r| r.id != id).collect();
        let expected = remaining.len();
        self.save(&remaining).await?;

        // Read back and confirm the write took effect.
        let persisted = self.list().await;
        if persisted.len() != expected {
            return Err(FleetError::Store(format!(
                "delete verification failed: {} records persisted, expected {}",
                persisted.len(),
                expected
            )));
        }

        debug!(id = %id, remaining = expected, "deleted record");
        Ok(())
    }

    /// Derive the fleet aggregate from the current collection.
    pub async fn statistics(&self) -> FleetStatistics {
        fleet_statistics(&self.list().await)
    }

    /// Collection read for mutations: parse failures still degrade to empty
    /// (consistent with [`Self::list`]), but store faults propagate so a
    /// transient read error cannot clobber the collection on the write-back.
    async fn load_for_mutation(&self) -> Result<Vec<Motorcycle>> {
        Ok(self
            .store
            .get(COLLECTION_KEY)
            .await?
            .map(|payload| parse_collection(&payload))
            .unwrap_or_default())
    }

    async fn save(&self, records: &[Motorcycle]) -> Result<()> {
        let payload = serde_json::to_string(records)?;
        self.store.set(COLLECTION_KEY, &payload).await
    }
}

fn parse_collection(payload: &str) -> Vec<Motorcycle> {
    match serde_json::from_str::<Vec<Motorcycle>>(payload) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "collection payload did not parse, treating as empty");
            Vec::new()
        }
    }
}

fn find_by_plate<'a>(records: &'a [Motorcycle], plate: &str) -> Option<&'a Motorcycle> {
    let wanted = plate.to_uppercase();
    records.iter().find(|r| r.plate.to_uppercase() == wanted)
}
