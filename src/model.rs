//! # Domain Model: Fleet Records
//!
//! This module defines the core data structures: [`Motorcycle`] (the aggregate
//! root), [`MotorcycleDraft`] (creation input, no identity yet) and
//! [`MotorcycleUpdate`] (partial mutation input).
//!
//! ## Identity
//!
//! Record ids are opaque strings of the form `moto_{unix_millis}_{suffix}`,
//! a time-based prefix plus a 9-character random suffix to avoid collisions.
//! An id is assigned exactly once at creation, never reassigned, and never
//! reused after deletion.
//!
//! ## Plate Normalization
//!
//! Plates are normalized to uppercase before storage, and plate comparison is
//! always case-insensitive. A record created with plate `abc1d23` is stored
//! and listed as `ABC1D23`.
//!
//! ## Wire Format
//!
//! Records serialize as camelCase JSON (`batteryLevel`, `nextMaintenanceDate`,
//! ...) so the durable payload matches what the device already has on disk.
//! Status variants serialize snake_case (`out_of_service`).
//!
//! ## Validation
//!
//! A draft or partial update is validated before any I/O:
//! - `model` and `plate` must be non-empty
//! - both location coordinates must be finite numbers
//! - `battery_level` and `fuel_level` must be in `[0, 100]`
//!
//! Violations surface as [`FleetError::Validation`] naming the offending
//! field. Invalid records are never written.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FleetError, Result};

/// Operational status of a fleet vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorcycleStatus {
    Available,
    Maintenance,
    Rented,
    OutOfService,
}

impl Default for MotorcycleStatus {
    fn default() -> Self {
        Self::Available
    }
}

/// Decimal-degree coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A fleet record as persisted in the durable collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motorcycle {
    pub id: String,
    pub model: String,
    pub plate: String,
    pub status: MotorcycleStatus,
    pub location: Location,
    pub battery_level: u8,
    pub fuel_level: u8,
    pub mileage: u64,
    pub next_maintenance_date: String,
    pub assigned_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl Motorcycle {
    /// Materialize a validated draft into a full record: assigns identity,
    /// normalizes the plate to uppercase and stamps all three timestamps.
    pub fn from_draft(draft: MotorcycleDraft) -> Self {
        let now = Utc::now();
        Self {
            id: generate_motorcycle_id(),
            model: draft.model,
            plate: draft.plate.to_uppercase(),
            status: draft.status,
            location: draft.location,
            battery_level: draft.battery_level,
            fuel_level: draft.fuel_level,
            mileage: draft.mileage,
            next_maintenance_date: draft.next_maintenance_date,
            assigned_branch: draft.assigned_branch,
            technical_info: draft.technical_info,
            created_at: now,
            updated_at: now,
            last_update: now,
        }
    }
}

/// Creation input: a record without identity or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleDraft {
    pub model: String,
    pub plate: String,
    #[serde(default)]
    pub status: MotorcycleStatus,
    pub location: Location,
    pub battery_level: u8,
    pub fuel_level: u8,
    pub mileage: u64,
    pub next_maintenance_date: String,
    pub assigned_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_info: Option<String>,
}

impl MotorcycleDraft {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(FleetError::Validation("model".into()));
        }
        if self.plate.trim().is_empty() {
            return Err(FleetError::Validation("plate".into()));
        }
        if !self.location.is_finite() {
            return Err(FleetError::Validation("location".into()));
        }
        if self.battery_level > 100 {
            return Err(FleetError::Validation("batteryLevel".into()));
        }
        if self.fuel_level > 100 {
            return Err(FleetError::Validation("fuelLevel".into()));
        }
        Ok(())
    }
}

/// Partial mutation input: only the present fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleUpdate {
    pub model: Option<String>,
    pub plate: Option<String>,
    pub status: Option<MotorcycleStatus>,
    pub location: Option<Location>,
    pub battery_level: Option<u8>,
    pub fuel_level: Option<u8>,
    pub mileage: Option<u64>,
    pub next_maintenance_date: Option<String>,
    pub assigned_branch: Option<String>,
    pub technical_info: Option<String>,
}

impl MotorcycleUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(FleetError::Validation("model".into()));
            }
        }
        if let Some(plate) = &self.plate {
            if plate.trim().is_empty() {
                return Err(FleetError::Validation("plate".into()));
            }
        }
        if let Some(location) = &self.location {
            if !location.is_finite() {
                return Err(FleetError::Validation("location".into()));
            }
        }
        if matches!(self.battery_level, Some(level) if level > 100) {
            return Err(FleetError::Validation("batteryLevel".into()));
        }
        if matches!(self.fuel_level, Some(level) if level > 100) {
            return Err(FleetError::Validation("fuelLevel".into()));
        }
        Ok(())
    }

    /// Merge the present fields into `record`. The plate, if given, is
    /// normalized to uppercase. Timestamps are the repository's concern.
    pub fn merge_into(&self, record: &mut Motorcycle) {
        if let Some(model) = &self.model {
            record.model = model.clone();
        }
        if let Some(plate) = &self.plate {
            record.plate = plate.to_uppercase();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(location) = self.location {
            record.location = location;
        }
        if let Some(level) = self.battery_level {
            record.battery_level = level;
        }
        if let Some(level) = self.fuel_level {
            record.fuel_level = level;
        }
        if let Some(mileage) = self.mileage {
            record.mileage = mileage;
        }
        if let Some(date) = &self.next_maintenance_date {
            record.next_maintenance_date = date.clone();
        }
        if let Some(branch) = &self.assigned_branch {
            record.assigned_branch = branch.clone();
        }
        if let Some(info) = &self.technical_info {
            record.technical_info = Some(info.clone());
        }
    }
}

/// Generate a fresh record id: time-based prefix plus random suffix.
pub fn generate_motorcycle_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("moto_{}_{}", Utc::now().timestamp_millis(), suffix)
}
