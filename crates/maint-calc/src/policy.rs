//! 關鍵度政策與緊急程度

use maint_core::{Criticality, MaintError, Result};
use serde::{Deserialize, Serialize};

/// 更換週期低於此值（月）視為緊急
pub const CRITICAL_MONTHS: u32 = 6;

/// 更換週期低於此值（月）需注意
pub const WARNING_MONTHS: u32 = 12;

/// 關鍵度政策
///
/// 物理估算後的第二階段：依關鍵度縮短更換週期。這是管理規則而非物理模型，
/// 係數表可替換。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityPolicy {
    /// 各等級的週期係數（低 → 關鍵）
    pub factors: [f64; 4],
}

impl CriticalityPolicy {
    /// 建立政策，係數須落在 (0, 1] 且隨等級遞減
    pub fn new(factors: [f64; 4]) -> Result<Self> {
        let policy = Self { factors };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self
            .factors
            .iter()
            .any(|f| !f.is_finite() || *f <= 0.0 || *f > 1.0)
        {
            return Err(MaintError::InvalidParameter {
                field: "criticality_factors",
                reason: format!("係數必須介於 (0, 1]，收到 {:?}", self.factors),
            });
        }
        if self.factors.windows(2).any(|pair| pair[1] > pair[0]) {
            return Err(MaintError::InvalidParameter {
                field: "criticality_factors",
                reason: "係數不可隨關鍵度提高而變大".to_string(),
            });
        }
        Ok(())
    }

    /// 指定等級的係數
    pub fn factor(&self, criticality: Criticality) -> f64 {
        self.factors[criticality.index()]
    }

    /// 套用政策：`max(1, round(months × factor))`
    pub fn apply(&self, months: u32, criticality: Criticality) -> u32 {
        let adjusted = (f64::from(months) * self.factor(criticality)).round();
        (adjusted as u32).max(1)
    }
}

impl Default for CriticalityPolicy {
    fn default() -> Self {
        Self {
            factors: [1.0, 0.8, 0.6, 0.4],
        }
    }
}

/// 緊急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Critical,
    Warning,
    Normal,
}

impl Urgency {
    pub fn from_months(months: u32) -> Self {
        if months < CRITICAL_MONTHS {
            Urgency::Critical
        } else if months < WARNING_MONTHS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Critical => "Crítico",
            Urgency::Warning => "Atención",
            Urgency::Normal => "Normal",
        }
    }
}
