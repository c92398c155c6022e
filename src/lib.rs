//! # Maint
//!
//! 工廠零件維護規劃：壽命估算、年度預算、更換排程與設定持久化
//!
//! ```no_run
//! use maint::{ConfigurationStore, MemoryBackend, ParameterDefaults, Planner, StoreOptions};
//!
//! let store = ConfigurationStore::new(
//!     MemoryBackend::new(),
//!     StoreOptions::default(),
//!     ParameterDefaults::default(),
//! );
//! let mut planner = Planner::new(store);
//! planner.startup();
//! println!("年度預算: {}", planner.summary().total_budget);
//! ```

pub mod planner;
pub mod report;

pub use planner::Planner;
pub use report::{csv_string, write_csv, ReportData, CSV_HEADER};

pub use maint_calc::{
    BudgetCalculator, BudgetLine, BudgetSummary, CalcWarning, CriticalityPolicy,
    ReplacementEvent, ReplacementSchedule, ScheduleTier, Urgency, WarningSeverity,
};
pub use maint_core::{
    ComponentCategory, ComponentRecord, ComponentUpdate, ConfigSnapshot, Criticality,
    GlobalParameters, MaintError, ParameterDefaults, ParameterInput, ReferenceTables, Registry,
    Result,
};
pub use maint_store::{
    ConfigurationStore, FileBackend, LoadOutcome, MemoryBackend, Notice, NoticeLevel,
    PersistenceBackend, StoreOptions,
};
