pub mod factory;
pub mod in_memory;
pub mod json_file;

pub use factory::create_store;
pub use in_memory::InMemoryThreadStore;
pub use json_file::JsonFileThreadStore;
