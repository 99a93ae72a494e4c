//! # Application State Controller
//!
//! [`FleetController`] mediates every UI-facing read and write. It owns an
//! in-memory cache of the repository's contents — a [`FleetState`] advanced
//! only through the fixed set of [`FleetAction`] transitions by the pure
//! [`reduce`] function — and reconciles that cache against the authoritative
//! repository after each mutation.
//!
//! The controller is an explicitly constructed handle, created at application
//! start and passed to whoever renders from it; there is no ambient
//! singleton. Mutating operations take `&mut self`, so at most one mutation
//! is in flight at a time — the one-writer discipline the storage layer
//! cannot provide is enforced by the borrow checker instead of by
//! convention.
//!
//! Nothing here fails outward: repository errors are folded into the cache's
//! `error` field, which holds the most recent human-readable failure and is
//! cleared by the next successful operation.

use tracing::debug;

use crate::model::{Motorcycle, MotorcycleDraft, MotorcycleUpdate};
use crate::repository::FleetRepository;
use crate::stats::{fleet_statistics, FleetStatistics};
use crate::store::KeyValueStore;

/// The UI-facing cache: a derived, eventually-consistent copy of the durable
/// collection plus the loading/error signals around it.
#[derive(Debug, Clone, Default)]
pub struct FleetState {
    pub records: Vec<Motorcycle>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<Motorcycle>,
}

/// The fixed set of cache transitions.
#[derive(Debug, Clone)]
pub enum FleetAction {
    LoadStart,
    LoadSuccess(Vec<Motorcycle>),
    LoadError(String),
    Add(Motorcycle),
    Update { id: String, update: MotorcycleUpdate },
    Delete(String),
    Select(Option<Motorcycle>),
    ClearError,
}

/// Pure transition function: builds the next state from the previous one and
/// an action. Never mutates `state` in place. Every successful transition
/// clears `error`; only [`FleetAction::LoadError`] sets it.
pub fn reduce(state: &FleetState, action: FleetAction) -> FleetState {
    match action {
        FleetAction::LoadStart => FleetState {
            loading: true,
            ..state.clone()
        },
        FleetAction::LoadSuccess(records) => FleetState {
            records,
            loading: false,
            error: None,
            selected: state.selected.clone(),
        },
        FleetAction::LoadError(message) => FleetState {
            error: Some(message),
            loading: false,
            ..state.clone()
        },
        FleetAction::Add(record) => {
            let mut records = state.records.clone();
            records.push(record);
            FleetState {
                records,
                loading: false,
                error: None,
                selected: state.selected.clone(),
            }
        }
        FleetAction::Update { id, update } => {
            let records = state
                .records
                .iter()
                .map(|r| {
                    if r.id == id {
                        let mut updated = r.clone();
                        update.merge_into(&mut updated);
                        updated
                    } else {
                        r.clone()
                    }
                })
                .collect();
            FleetState {
                records,
                loading: false,
                error: None,
                selected: state.selected.clone(),
            }
        }
        FleetAction::Delete(id) => FleetState {
            records: state
                .records
                .iter()
                .filter(|r| r.id != id)
                .cloned()
                .collect(),
            loading: false,
            error: None,
            selected: state.selected.clone(),
        },
        FleetAction::Select(record) => FleetState {
            selected: record,
            ..state.clone()
        },
        FleetAction::ClearError => FleetState {
            error: None,
            ..state.clone()
        },
    }
}

pub struct FleetController<S> {
    repo: FleetRepository<S>,
    state: FleetState,
}

impl<S: KeyValueStore> FleetController<S> {
    pub fn new(repo: FleetRepository<S>) -> Self {
        Self {
            repo,
            state: FleetState::default(),
        }
    }

    /// The current cache. Reads are always served from here, never from the
    /// store directly.
    pub fn state(&self) -> &FleetState {
        &self.state
    }

    pub fn repository(&self) -> &FleetRepository<S> {
        &self.repo
    }

    fn dispatch(&mut self, action: FleetAction) {
        self.state = reduce(&self.state, action);
    }

    /// Replace the cached records with a fresh authoritative read. Never
    /// fails outward; `list()` itself degrades to empty on a store fault.
    pub async fn refresh(&mut self) {
        self.dispatch(FleetAction::LoadStart);
        let records = self.repo.list().await;
        debug!(count = records.len(), "refreshed cache from repository");
        self.dispatch(FleetAction::LoadSuccess(records));
    }

    /// Create a record from a draft. Returns `false` and sets `error` on any
    /// rejection.
    ///
    /// The cache is pre-checked for a plate collision so an obviously
    /// conflicting draft fails without touching the store; the repository
    /// still performs the authoritative check, since the cache may be stale.
    /// On success the whole cache is re-read rather than appended to, which
    /// resolves any divergence introduced between pre-check and write.
    pub async fn add(&mut self, draft: MotorcycleDraft) -> bool {
        self.dispatch(FleetAction::LoadStart);

        let wanted = draft.plate.to_uppercase();
        if self
            .state
            .records
            .iter()
            .any(|r| r.plate.to_uppercase() == wanted)
        {
            self.dispatch(FleetAction::LoadError(format!(
                "a motorcycle with plate {wanted} is already registered"
            )));
            return false;
        }

        match self.repo.create(draft).await {
            Ok(id) => {
                debug!(id = %id, "record created, refreshing cache");
                self.refresh().await;
                true
            }
            Err(e) => {
                self.dispatch(FleetAction::LoadError(e.to_string()));
                false
            }
        }
    }

    /// Apply a partial update. On success the same merge is applied to the
    /// cache locally; no forced refresh is required.
    pub async fn update_by_id(&mut self, id: &str, update: MotorcycleUpdate) -> bool {
        self.dispatch(FleetAction::LoadStart);
        match self.repo.update(id, update.clone()).await {
            Ok(()) => {
                self.dispatch(FleetAction::Update {
                    id: id.to_string(),
                    update,
                });
                true
            }
            Err(e) => {
                self.dispatch(FleetAction::LoadError(e.to_string()));
                false
            }
        }
    }

    /// Delete a record, then re-read the cache: after a whole-collection
    /// rewrite the cache is only trustworthy immediately after a fresh list.
    pub async fn remove_by_id(&mut self, id: &str) -> bool {
        self.dispatch(FleetAction::LoadStart);
        match self.repo.delete(id).await {
            Ok(()) => {
                self.dispatch(FleetAction::Delete(id.to_string()));
                self.refresh().await;
                true
            }
            Err(e) => {
                self.dispatch(FleetAction::LoadError(e.to_string()));
                false
            }
        }
    }

    /// Pure cache mutation, no I/O.
    pub fn select(&mut self, record: Option<Motorcycle>) {
        self.dispatch(FleetAction::Select(record));
    }

    pub fn clear_error(&mut self) {
        self.dispatch(FleetAction::ClearError);
    }

    /// Fleet aggregate over the current cache snapshot.
    pub fn statistics(&self) -> FleetStatistics {
        fleet_statistics(&self.state.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, MotorcycleStatus};
    use crate::store::memory::fixtures::FlakyStore;
    use crate::store::memory::InMemoryStore;

    fn draft(plate: &str) -> MotorcycleDraft {
        MotorcycleDraft {
            model: "CG".to_string(),
            plate: plate.to_string(),
            status: MotorcycleStatus::Available,
            location: Location { x: 1.0, y: 2.0 },
            battery_level: 50,
            fuel_level: 50,
            mileage: 0,
            next_maintenance_date: "2025-01-01".to_string(),
            assigned_branch: "X".to_string(),
            technical_info: None,
        }
    }

    fn controller() -> FleetController<InMemoryStore> {
        FleetController::new(FleetRepository::new(InMemoryStore::new()))
    }

    // --- reducer ---

    #[test]
    fn reduce_never_mutates_the_old_state() {
        let state = FleetState {
            records: vec![Motorcycle::from_draft(draft("aaa1a11"))],
            loading: false,
            error: Some("stale".to_string()),
            selected: None,
        };
        let next = reduce(&state, FleetAction::Delete(state.records[0].id.clone()));

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.error.as_deref(), Some("stale"));
        assert!(next.records.is_empty());
        assert_eq!(next.error, None);
    }

    #[test]
    fn load_transitions_drive_the_loading_flag() {
        let state = FleetState::default();
        let loading = reduce(&state, FleetAction::LoadStart);
        assert!(loading.loading);

        let loaded = reduce(&loading, FleetAction::LoadSuccess(Vec::new()));
        assert!(!loaded.loading);
        assert_eq!(loaded.error, None);

        let failed = reduce(&loading, FleetAction::LoadError("boom".to_string()));
        assert!(!failed.loading);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn successful_transitions_clear_a_previous_error() {
        let state = FleetState {
            error: Some("old failure".to_string()),
            ..FleetState::default()
        };
        let next = reduce(&state, FleetAction::Add(Motorcycle::from_draft(draft("aaa1a11"))));
        assert_eq!(next.error, None);
        assert_eq!(next.records.len(), 1);
    }

    #[test]
    fn select_is_a_pure_cache_mutation() {
        let record = Motorcycle::from_draft(draft("aaa1a11"));
        let state = FleetState::default();
        let next = reduce(&state, FleetAction::Select(Some(record.clone())));
        assert_eq!(next.selected.as_ref().map(|r| r.id.as_str()), Some(record.id.as_str()));

        let cleared = reduce(&next, FleetAction::Select(None));
        assert!(cleared.selected.is_none());
    }

    // --- controller ---

    #[tokio::test]
    async fn refresh_populates_the_cache() {
        let mut ctrl = controller();
        ctrl.repository().create(draft("aaa1a11")).await.unwrap();

        assert!(ctrl.state().records.is_empty());
        ctrl.refresh().await;
        assert_eq!(ctrl.state().records.len(), 1);
        assert!(!ctrl.state().loading);
    }

    #[tokio::test]
    async fn add_refreshes_rather_than_appending() {
        let mut ctrl = controller();
        assert!(ctrl.add(draft("abc1d23")).await);

        let state = ctrl.state();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].plate, "ABC1D23");
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn add_pre_checks_the_cache_for_plate_collisions() {
        let mut ctrl = controller();
        assert!(ctrl.add(draft("abc1d23")).await);
        assert!(!ctrl.add(draft("ABC1D23")).await);

        let state = ctrl.state();
        assert_eq!(state.records.len(), 1);
        let error = state.error.as_deref().unwrap();
        assert!(error.contains("ABC1D23"), "unexpected error: {error}");
    }

    #[tokio::test]
    async fn stale_cache_still_hits_the_authoritative_check() {
        let mut ctrl = controller();
        // Written behind the cache's back: the pre-check cannot see it.
        ctrl.repository().create(draft("abc1d23")).await.unwrap();
        assert!(ctrl.state().records.is_empty());

        assert!(!ctrl.add(draft("abc1d23")).await);
        assert!(ctrl.state().error.is_some());
    }

    #[tokio::test]
    async fn update_applies_the_transition_locally() {
        let mut ctrl = controller();
        ctrl.add(draft("abc1d23")).await;
        let id = ctrl.state().records[0].id.clone();

        let ok = ctrl
            .update_by_id(
                &id,
                MotorcycleUpdate {
                    status: Some(MotorcycleStatus::Rented),
                    ..Default::default()
                },
            )
            .await;
        assert!(ok);
        assert_eq!(ctrl.state().records[0].status, MotorcycleStatus::Rented);
        assert_eq!(ctrl.state().error, None);
    }

    #[tokio::test]
    async fn update_of_unknown_id_surfaces_as_error() {
        let mut ctrl = controller();
        let ok = ctrl
            .update_by_id("moto_0_missing00", MotorcycleUpdate::default())
            .await;
        assert!(!ok);
        assert!(ctrl.state().error.is_some());
        assert!(!ctrl.state().loading);
    }

    #[tokio::test]
    async fn remove_deletes_and_re_reads() {
        let mut ctrl = controller();
        ctrl.add(draft("abc1d23")).await;
        let id = ctrl.state().records[0].id.clone();

        assert!(ctrl.remove_by_id(&id).await);
        assert!(ctrl.state().records.is_empty());
        assert!(ctrl.repository().list().await.is_empty());
    }

    #[tokio::test]
    async fn error_is_cleared_by_the_next_successful_operation() {
        let mut ctrl = controller();
        assert!(!ctrl.remove_by_id("moto_0_missing00").await);
        assert!(ctrl.state().error.is_some());

        assert!(ctrl.add(draft("abc1d23")).await);
        assert_eq!(ctrl.state().error, None);
    }

    #[tokio::test]
    async fn repository_failures_never_escape_the_controller() {
        let mut ctrl = FleetController::new(FleetRepository::new(FlakyStore::new()));
        ctrl.add(draft("abc1d23")).await;

        ctrl.repository().store().fail_writes(true);
        assert!(!ctrl.add(draft("xyz9z99")).await);
        assert!(ctrl.state().error.is_some());

        // Reads degrade to an empty (valid, not erroneous) cache.
        ctrl.repository().store().fail_reads(true);
        ctrl.refresh().await;
        assert!(ctrl.state().records.is_empty());
        assert_eq!(ctrl.state().error, None);
    }

    #[tokio::test]
    async fn selection_survives_a_refresh() {
        let mut ctrl = controller();
        ctrl.add(draft("abc1d23")).await;
        let record = ctrl.state().records[0].clone();
        ctrl.select(Some(record.clone()));

        ctrl.refresh().await;
        assert_eq!(
            ctrl.state().selected.as_ref().map(|r| r.id.as_str()),
            Some(record.id.as_str())
        );
    }

    #[tokio::test]
    async fn statistics_read_the_cache_snapshot() {
        let mut ctrl = controller();
        let mut d = draft("aaa1a11");
        d.battery_level = 80;
        ctrl.add(d).await;
        let mut d = draft("bbb2b22");
        d.battery_level = 40;
        ctrl.add(d).await;

        let stats = ctrl.statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.average_battery, 60.0);
    }
}
