//! # Motofleet Architecture
//!
//! Motofleet is the **UI-agnostic persistence core** of a motorcycle
//! fleet-management client. It is not an app that happens to have some
//! library code — it is a library that an app renders from. Screens,
//! navigation and theming live elsewhere; what lives here is the canonical
//! record collection, its durable representation, and the invariants around
//! mutating it.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller Layer (state.rs)                                │
//! │  - Reducer-based in-memory cache, the only UI-facing view   │
//! │  - Folds every failure into a human-readable `error` field  │
//! │  - &mut self mutations: one in-flight write, enforced by    │
//! │    the borrow checker rather than by convention             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository Layer (repository.rs)                           │
//! │  - Sole writer of the durable collection                    │
//! │  - Validation, plate uniqueness, per-call atomicity         │
//! │  - Discriminated errors (Validation / DuplicatePlate /      │
//! │    NotFound / Store / Io / Serialization)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract async KeyValueStore trait                       │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Model
//!
//! The durable collection is a JSON array under one fixed key; every mutation
//! is a whole-collection read-modify-write. The controller's cache is a
//! derived, eventually-consistent copy that is re-read after creations and
//! deletions. Two concurrently issued mutations would race last-write-wins,
//! which is why the controller requires exclusive access for mutations.
//!
//! ## Key Principle: No Faults Escape
//!
//! Storage faults are caught at the repository boundary and surfaced as typed
//! errors; the controller converts them into its `error` field. Reads
//! tolerate an absent or corrupt payload by degrading to an empty collection
//! — an empty fleet is a valid state, a crashed app is not.
//!
//! ## Module Overview
//!
//! - [`model`]: Core data types (`Motorcycle`, drafts, partial updates)
//! - [`store`]: Storage abstraction and implementations
//! - [`repository`]: CRUD and invariants over the durable collection
//! - [`state`]: Reducer, cache and the UI-facing controller
//! - [`stats`]: Pure fleet-wide aggregation
//! - [`error`]: Error types

pub mod error;
pub mod model;
pub mod repository;
pub mod state;
pub mod stats;
pub mod store;

pub use error::{FleetError, Result};
pub use model::{Location, Motorcycle, MotorcycleDraft, MotorcycleStatus, MotorcycleUpdate};
pub use repository::FleetRepository;
pub use state::{FleetAction, FleetController, FleetState};
pub use stats::{fleet_statistics, FleetStatistics};
pub use store::KeyValueStore;
