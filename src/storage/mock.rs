use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{KeyValueStorage, Result, StorageError};

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    broken: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    /// Every write fails from now on; reads keep working.
    pub fn break_writes(&self) { self.broken.store(true, Ordering::SeqCst); }

    fn check_writable(&self) -> Result<()> {
        match self.broken.load(Ordering::SeqCst) {
            true => Err(StorageError::Unavailable("quota exceeded".to_string())),
            false => Ok(()),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> { Ok(self.items.lock().get(key).cloned()) }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.items.lock().insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.items.lock().remove(key);

        Ok(())
    }
}
