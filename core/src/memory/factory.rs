use crate::config::{Config, StoreBackend};
use crate::memory::{InMemoryThreadStore, JsonFileThreadStore};
use crate::traits::ThreadStore;
use std::sync::Arc;

pub fn create_store(config: &Config) -> Arc<dyn ThreadStore> {
    match config.memory.backend {
        StoreBackend::File => Arc::new(JsonFileThreadStore::new(&config.data_dir)),
        StoreBackend::Memory => Arc::new(InMemoryThreadStore::new()),
    }
}
