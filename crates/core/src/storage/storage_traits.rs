use crate::errors::Result;

/// Durable string storage keyed by name.
///
/// Implementations decide the medium (memory, a JSON file, browser storage).
/// Writes are last-write-wins; deleting a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get_value(&self, key: &str) -> Result<Option<String>>;
    fn set_value(&self, key: &str, value: &str) -> Result<()>;
    fn delete_value(&self, key: &str) -> Result<()>;
}
