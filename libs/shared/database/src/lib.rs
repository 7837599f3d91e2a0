pub mod backend;
pub mod error;
pub mod records;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::StoreError;
pub use records::RecordStore;
