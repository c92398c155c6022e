//! 壽命估算（物理階段）
//!
//! - 軸承、輪子：L10 額定壽命 `(C/P)^3 × 10^6` 轉，換算為運轉時數
//! - 軸承座：經驗公式，基準 15000 小時
//! - 皮帶：品牌基準壽命（月）乘上負載與使用率係數
//!
//! 無效輸入不會中斷計算，而是替換為安全值並產生警告。

use maint_core::{ComponentCategory, ComponentRecord, GlobalParameters, ReferenceTables};
use serde::Serialize;

use crate::CalcWarning;

/// 轉速無效時使用的替代值
pub const MIN_RPM: f64 = 1.0;

/// 負載無效時使用的替代值
pub const MIN_LOAD_FACTOR: f64 = 0.01;

/// 輸入經過替換時的更換週期上限（月）
pub const MAX_GUARDED_MONTHS: u32 = 600;

/// 軸承壽命下限（小時）
pub const BEARING_FLOOR_HOURS: f64 = 100.0;

/// 軸承座基準壽命與下限（小時）
pub const PILLOW_BLOCK_BASE_HOURS: f64 = 15000.0;
pub const PILLOW_BLOCK_FLOOR_HOURS: f64 = 500.0;

/// 皮帶壽命下限（月）
pub const BELT_FLOOR_MONTHS: u32 = 3;

/// 物理估算結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifeEstimate {
    /// 預估壽命（運轉小時）
    pub life_hours: f64,

    /// 更換週期（月，≥ 1）
    pub replacement_months: u32,
}

/// 壽命估算器
pub struct LifeEstimator<'a> {
    tables: &'a ReferenceTables,
    params: &'a GlobalParameters,
}

impl<'a> LifeEstimator<'a> {
    pub fn new(tables: &'a ReferenceTables, params: &'a GlobalParameters) -> Self {
        Self { tables, params }
    }

    /// 估算單筆零件的物理壽命
    pub fn estimate(&self, record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> LifeEstimate {
        let warnings_before = warnings.len();
        let estimate = self.physical(record, warnings);

        // 替換值算出的週期沒有物理意義，只在這條路徑上設上限
        if warnings.len() > warnings_before && estimate.replacement_months > MAX_GUARDED_MONTHS {
            tracing::warn!(
                "零件 {} 以替換值估算的週期 {} 個月，限制為 {}",
                record.id,
                estimate.replacement_months,
                MAX_GUARDED_MONTHS
            );
            warnings.push(CalcWarning::warning(
                record.id,
                format!(
                    "以替換值估算的週期 {} 個月，限制為 {} 個月",
                    estimate.replacement_months, MAX_GUARDED_MONTHS
                ),
            ));
            return LifeEstimate {
                replacement_months: MAX_GUARDED_MONTHS,
                ..estimate
            };
        }

        estimate
    }

    fn physical(&self, record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> LifeEstimate {
        let annual_hours = self.annual_hours(record, warnings);
        let load = guarded_load(record, warnings);
        let env = self.params.environment_factor;

        match record.category {
            ComponentCategory::Bearing | ComponentCategory::Wheel => {
                let rpm = guarded_rpm(record, warnings);
                let capacity = self.tables.dynamic_capacity(&record.brand, &record.part_code);
                let life_hours = bearing_life_hours(capacity, load, rpm, env);
                LifeEstimate {
                    life_hours,
                    replacement_months: months_from_hours(life_hours, annual_hours),
                }
            }
            ComponentCategory::PillowBlock => {
                let rpm = if record.rpm.is_finite() { record.rpm.max(0.0) } else { 0.0 };
                let life_hours = pillow_block_life_hours(load, rpm, env);
                LifeEstimate {
                    life_hours,
                    replacement_months: months_from_hours(life_hours, annual_hours),
                }
            }
            ComponentCategory::Belt => {
                let base = self.tables.belt_base_life_months(&record.brand);
                let months = belt_life_months(base, load, record.daily_hours, env);
                LifeEstimate {
                    life_hours: f64::from(months) / 12.0 * annual_hours,
                    replacement_months: months,
                }
            }
        }
    }

    /// 年度運轉時數（非正值時以 1 小時代替）
    fn annual_hours(&self, record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> f64 {
        let hours = self.params.annual_operating_hours(record.daily_hours);
        if hours.is_finite() && hours > 0.0 {
            return hours;
        }

        tracing::warn!("零件 {} 年度運轉時數無效: {}", record.id, hours);
        warnings.push(CalcWarning::warning(
            record.id,
            format!("年度運轉時數無效 ({})，以 1 小時計算", hours),
        ));
        1.0
    }
}

fn guarded_rpm(record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> f64 {
    if record.rpm.is_finite() && record.rpm > 0.0 {
        return record.rpm;
    }

    tracing::warn!("零件 {} 轉速無效: {}", record.id, record.rpm);
    warnings.push(CalcWarning::warning(
        record.id,
        format!("轉速無效 ({})，以 {} rpm 計算", record.rpm, MIN_RPM),
    ));
    MIN_RPM
}

fn guarded_load(record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> f64 {
    if record.load_factor.is_finite() && record.load_factor > 0.0 {
        return record.load_factor;
    }

    tracing::warn!("零件 {} 負載無效: {}", record.id, record.load_factor);
    warnings.push(CalcWarning::warning(
        record.id,
        format!(
            "負載無效 ({})，以 {} 計算",
            record.load_factor, MIN_LOAD_FACTOR
        ),
    ));
    MIN_LOAD_FACTOR
}

/// 軸承 L10 壽命（小時），下限 100 小時
pub fn bearing_life_hours(capacity_kn: f64, load_factor: f64, rpm: f64, environment_factor: f64) -> f64 {
    let applied = load_factor * capacity_kn;
    let l10_revolutions = (capacity_kn / applied).powi(3) * 1_000_000.0;
    let hours = (l10_revolutions / (rpm * 60.0) * environment_factor).round();
    hours.max(BEARING_FLOOR_HOURS)
}

/// 軸承座壽命（小時），下限 500 小時
pub fn pillow_block_life_hours(load_factor: f64, rpm: f64, environment_factor: f64) -> f64 {
    let load_term = (2.0 - load_factor).max(0.2);
    let speed_term = (1.0 - rpm / 2000.0).max(0.5);
    (PILLOW_BLOCK_BASE_HOURS * environment_factor * load_term * speed_term)
        .round()
        .max(PILLOW_BLOCK_FLOOR_HOURS)
}

/// 皮帶壽命（月），下限 3 個月
pub fn belt_life_months(base_months: u32, load_factor: f64, daily_hours: f64, environment_factor: f64) -> u32 {
    let load_term = (2.0 - load_factor).max(0.3);
    let usage_term = (1.0 - daily_hours / 24.0).max(0.3);
    let months = (f64::from(base_months) * environment_factor * load_term * usage_term).round();
    whole_months(months).max(BELT_FLOOR_MONTHS)
}

/// 運轉時數換算為更換週期：`max(1, round(hours / annual × 12))`
pub fn months_from_hours(life_hours: f64, annual_hours: f64) -> u32 {
    whole_months((life_hours / annual_hours * 12.0).round())
}

/// 浮點月數轉為整數（NaN 視為 1，超出 `u32` 範圍時飽和）
fn whole_months(months: f64) -> u32 {
    if months.is_nan() {
        return 1;
    }
    (months as u32).max(1)
}
