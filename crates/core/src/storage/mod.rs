//! Storage module - durable key-value seam and the typed donation slot.

mod donation_slot;
mod memory_store;
mod storage_traits;

pub use donation_slot::CurrentDonationSlot;
pub use memory_store::MemoryKeyValueStore;
pub use storage_traits::KeyValueStore;
