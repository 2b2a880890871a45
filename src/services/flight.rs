//! Single-flight registry for delete flows.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AppError;
use crate::models::EntityKey;

type FlightKey = (String, EntityKey);

/// Set of `(entity type, key)` pairs with a delete flow in progress.
///
/// Cloning shares the set.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<FlightKey>>>,
}

impl InFlight {
    /// Claim the slot for an entity, or fail if a flow already holds it.
    pub fn try_acquire(&self, entity_type: &str, key: &EntityKey) -> Result<FlightSlot, AppError> {
        let flight_key = (entity_type.to_string(), key.clone());
        if !self.lock().insert(flight_key.clone()) {
            return Err(AppError::DeleteInFlight {
                entity_type: entity_type.to_string(),
                key: key.to_string(),
            });
        }

        Ok(FlightSlot {
            owner: self.clone(),
            key: flight_key,
        })
    }

    pub fn is_active(&self, entity_type: &str, key: &EntityKey) -> bool {
        self.lock()
            .contains(&(entity_type.to_string(), key.clone()))
    }

    fn release(&self, key: &FlightKey) {
        self.lock().remove(key);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<FlightKey>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held for the lifetime of a delete flow; releases its slot on drop.
#[derive(Debug)]
pub struct FlightSlot {
    owner: InFlight,
    key: FlightKey,
}

impl Drop for FlightSlot {
    fn drop(&mut self) {
        self.owner.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let flights = InFlight::default();
        let key = EntityKey::Number(7);

        let slot = flights.try_acquire("service-type", &key).unwrap();
        assert!(flights.is_active("service-type", &key));
        assert!(matches!(
            flights.try_acquire("service-type", &key),
            Err(AppError::DeleteInFlight { .. })
        ));

        drop(slot);
        assert!(!flights.is_active("service-type", &key));
        assert!(flights.try_acquire("service-type", &key).is_ok());
    }

    #[test]
    fn test_slots_are_per_type_and_key() {
        let flights = InFlight::default();
        let _a = flights.try_acquire("service-type", &EntityKey::Number(7)).unwrap();
        assert!(flights.try_acquire("service-include", &EntityKey::Number(7)).is_ok());
        assert!(flights.try_acquire("service-type", &EntityKey::Number(8)).is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let flights = InFlight::default();
        let other = flights.clone();
        let _slot = flights.try_acquire("service-type", &EntityKey::from("x")).unwrap();
        assert!(other.is_active("service-type", &EntityKey::from("x")));
    }
}
