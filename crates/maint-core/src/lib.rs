//! # Maint Core
//!
//! 核心資料模型與類型定義：零件記錄、全域參數、參考價目表、登錄簿與設定快照

pub mod catalog;
pub mod component;
pub mod parameters;
pub mod registry;
pub mod seed;
pub mod snapshot;

// Re-export 主要類型
pub use catalog::{canonical_code, leading_token, ReferenceTables, REFERENCE_BRAND};
pub use component::{
    ComponentCategory, ComponentRecord, ComponentUpdate, Criticality, MAX_CUSTOM_PRICE,
};
pub use parameters::{GlobalParameters, ParameterDefaults, ParameterInput};
pub use registry::Registry;
pub use snapshot::{ConfigSnapshot, SNAPSHOT_VERSION};

/// 維護規劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MaintError {
    #[error("零件 {id} 資料無效: {reason}")]
    InvalidComponent { id: u32, reason: String },

    #[error("參數 {field} 無效: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("找不到零件: {0}")]
    UnknownComponent(u32),

    #[error("參考表代碼重複或模稜兩可: {0}")]
    AmbiguousCatalogKey(String),

    #[error("設定快照無效: {0}")]
    InvalidSnapshot(String),

    #[error("儲存後端錯誤: {0}")]
    Persistence(String),

    #[error("匯出錯誤: {0}")]
    Export(String),

    #[error("JSON 解析錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MaintError>;
