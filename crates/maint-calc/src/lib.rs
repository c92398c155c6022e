//! # Maint Calculation Engine
//!
//! 壽命估算、關鍵度政策、單價解析、預算彙總與更換排程

pub mod budget;
pub mod life;
pub mod policy;
pub mod pricing;
pub mod schedule;

// Re-export 主要類型
pub use budget::{BrandBreakdown, BudgetCalculator, BudgetLine, GroupBreakdown};
pub use life::{LifeEstimate, LifeEstimator};
pub use policy::{CriticalityPolicy, Urgency};
pub use pricing::{PriceResolver, PriceSource, ResolvedPrice};
pub use schedule::{ReplacementEvent, ReplacementSchedule, ScheduleTier};

use rust_decimal::Decimal;
use serde::Serialize;

/// 預算計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// 每筆零件的明細（依登錄簿順序）
    pub lines: Vec<BudgetLine>,

    /// 年度預算
    pub total_budget: Decimal,

    /// 含 20% 應變準備的預算（四捨五入至整數）
    pub budget_with_reserve: Decimal,

    /// 更換週期小於 6 個月的零件數
    pub critical_count: usize,

    /// 平均更換週期（月，四捨五入）
    pub average_replacement_months: u32,

    /// 總安裝數量
    pub total_component_count: u64,

    /// 品牌分佈（首次出現順序）
    pub brands: Vec<BrandBreakdown>,

    /// 分組統計（首次出現順序）
    pub groups: Vec<GroupBreakdown>,

    /// 警告信息
    pub warnings: Vec<CalcWarning>,
}

impl BudgetSummary {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total_budget: Decimal::ZERO,
            budget_with_reserve: Decimal::ZERO,
            critical_count: 0,
            average_replacement_months: 0,
            total_component_count: 0,
            brands: Vec::new(),
            groups: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: CalcWarning) {
        self.warnings.push(warning);
    }

    /// 依零件 ID 取得明細
    pub fn line(&self, component_id: u32) -> Option<&BudgetLine> {
        self.lines.iter().find(|l| l.component_id == component_id)
    }

    /// 是否有指定嚴重度以上的警告
    pub fn has_warnings_at(&self, severity: WarningSeverity) -> bool {
        self.warnings.iter().any(|w| w.severity >= severity)
    }
}

/// 計算警告（輸入被替換為安全值時產生）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcWarning {
    pub component_id: u32,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CalcWarning {
    pub fn new(component_id: u32, message: String, severity: WarningSeverity) -> Self {
        Self {
            component_id,
            message,
            severity,
        }
    }

    pub fn info(component_id: u32, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Info)
    }

    pub fn warning(component_id: u32, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Warning)
    }

    pub fn error(component_id: u32, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
