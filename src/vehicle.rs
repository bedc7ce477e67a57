//! Vehicle factory interface.
//!
//! The unit supports a set of vehicle type plugins; exactly one can be active
//! at a time. The console only enumerates the types, switches the active one,
//! and reads the active display name for menu labeling.

use std::sync::Mutex;

use log::{info, warn};

/// Enumerates vehicle type plugins and activates one of them.
pub trait VehicleFactory: Send + Sync {
    /// Ordered list of (type id, display name) pairs.
    fn types(&self) -> Vec<(String, String)>;

    /// Activate a vehicle type. Returns false when the type does not exist or
    /// fails to start; in that case the previously active type stays active.
    fn set_active(&self, type_id: &str) -> bool;

    /// Type id of the active vehicle, if any.
    fn active_type(&self) -> Option<String>;

    /// Display name of the active vehicle, if any.
    fn active_vehicle_name(&self) -> Option<String>;
}

/// Factory over a fixed type list, for tests and bench setups.
pub struct StaticVehicleFactory {
    types: Vec<(String, String)>,
    active: Mutex<Option<String>>,
}

impl StaticVehicleFactory {
    pub fn new(types: Vec<(String, String)>) -> Self {
        StaticVehicleFactory {
            types,
            active: Mutex::new(None),
        }
    }
}

impl VehicleFactory for StaticVehicleFactory {
    fn types(&self) -> Vec<(String, String)> {
        self.types.clone()
    }

    fn set_active(&self, type_id: &str) -> bool {
        if self.types.iter().any(|(id, _)| id == type_id) {
            info!("vehicle: activating type {}", type_id);
            *self.active.lock().unwrap() = Some(type_id.to_string());
            true
        } else {
            warn!("vehicle: unknown type {}", type_id);
            false
        }
    }

    fn active_type(&self) -> Option<String> {
        self.active.lock().unwrap().clone()
    }

    fn active_vehicle_name(&self) -> Option<String> {
        let active = self.active.lock().unwrap().clone()?;
        self.types
            .iter()
            .find(|(id, _)| *id == active)
            .map(|(_, name)| name.clone())
    }
}
