use std::sync::Arc;

use log::debug;

use super::storage_traits::KeyValueStore;
use crate::constants::CURRENT_DONATION_KEY;
use crate::errors::Result;

/// Typed accessor for the single "current donation" slot.
///
/// Only one donation is tracked at a time; storing a new identifier replaces
/// the previous one.
#[derive(Clone)]
pub struct CurrentDonationSlot {
    store: Arc<dyn KeyValueStore>,
}

impl CurrentDonationSlot {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the tracked identifier. Blank values count as absent.
    pub fn get(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get_value(CURRENT_DONATION_KEY)?
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    pub fn set(&self, donation_id: &str) -> Result<()> {
        debug!("[DonationSlot] Tracking donation {}", donation_id);
        self.store.set_value(CURRENT_DONATION_KEY, donation_id)
    }

    pub fn clear(&self) -> Result<()> {
        debug!("[DonationSlot] Clearing tracked donation");
        self.store.delete_value(CURRENT_DONATION_KEY)
    }
}

impl std::fmt::Debug for CurrentDonationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentDonationSlot")
            .field("key", &CURRENT_DONATION_KEY)
            .finish()
    }
}
