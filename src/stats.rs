//! Fleet-wide derived metrics. Pure functions over a record snapshot; no
//! persistence, no mutation.

use serde::Serialize;

use crate::model::{Motorcycle, MotorcycleStatus};

/// The aggregate view of the fleet: counts per status plus average charge and
/// fuel levels. Averages are `0.0` for an empty fleet, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStatistics {
    pub total: usize,
    pub available: usize,
    pub rented: usize,
    pub maintenance: usize,
    pub out_of_service: usize,
    pub average_battery: f64,
    pub average_fuel: f64,
}

pub fn fleet_statistics(records: &[Motorcycle]) -> FleetStatistics {
    let total = records.len();
    let count = |status: MotorcycleStatus| records.iter().filter(|m| m.status == status).count();

    let average = |level: fn(&Motorcycle) -> u8| {
        if total == 0 {
            0.0
        } else {
            records.iter().map(|m| level(m) as f64).sum::<f64>() / total as f64
        }
    };

    FleetStatistics {
        total,
        available: count(MotorcycleStatus::Available),
        rented: count(MotorcycleStatus::Rented),
        maintenance: count(MotorcycleStatus::Maintenance),
        out_of_service: count(MotorcycleStatus::OutOfService),
        average_battery: average(|m| m.battery_level),
        average_fuel: average(|m| m.fuel_level),
    }
}
