//! # Maint Store
//!
//! 設定持久化：儲存後端、髒標記追蹤與延遲自動儲存

pub mod backend;
pub mod dirty_tracking;
pub mod store;

// Re-export 主要類型
pub use backend::{BackendError, FileBackend, MemoryBackend, PersistenceBackend};
pub use dirty_tracking::DirtyTracker;
pub use store::{ConfigurationStore, LoadOutcome, Notice, NoticeLevel, StoreOptions, STORAGE_KEY};
