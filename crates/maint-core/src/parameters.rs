//! 全域參數（環境與政策設定）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{canonical_code, REFERENCE_BRAND};
use crate::{MaintError, Result};

/// 參數缺漏時的替代值
///
/// 預設值獨立於計算程式，可依工廠需求替換。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefaults {
    pub work_days_per_week: u8,
    pub work_weeks_per_year: u8,
    pub environment_factor: f64,
    pub safety_margin: f64,
    pub schedule_start_date: NaiveDate,
    pub default_brand: String,
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self {
            work_days_per_week: 5,
            work_weeks_per_year: 50,
            environment_factor: 0.8,
            safety_margin: 1.5,
            schedule_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            default_brand: REFERENCE_BRAND.to_string(),
        }
    }
}

/// 全域參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameters {
    /// 每週工作天數 (1..=7)
    pub work_days_per_week: u8,

    /// 每年工作週數 (1..=52)
    pub work_weeks_per_year: u8,

    /// 環境修正係數 (0, 2]
    pub environment_factor: f64,

    /// 安全係數 [1, 10]，乘在年度更換數量上
    pub safety_margin: f64,

    /// 更換排程起始日
    pub schedule_start_date: NaiveDate,

    /// 預設品牌（新零件與品牌選單使用）
    pub default_brand: String,
}

impl GlobalParameters {
    /// 由替代值建立參數
    pub fn from_defaults(defaults: &ParameterDefaults) -> Self {
        Self {
            work_days_per_week: defaults.work_days_per_week,
            work_weeks_per_year: defaults.work_weeks_per_year,
            environment_factor: defaults.environment_factor,
            safety_margin: defaults.safety_margin,
            schedule_start_date: defaults.schedule_start_date,
            default_brand: defaults.default_brand.clone(),
        }
    }

    /// 建構器模式：設置工作日曆
    pub fn with_work_calendar(mut self, days_per_week: u8, weeks_per_year: u8) -> Self {
        self.work_days_per_week = days_per_week;
        self.work_weeks_per_year = weeks_per_year;
        self
    }

    /// 建構器模式：設置環境修正係數
    pub fn with_environment_factor(mut self, factor: f64) -> Self {
        self.environment_factor = factor;
        self
    }

    /// 建構器模式：設置安全係數
    pub fn with_safety_margin(mut self, margin: f64) -> Self {
        self.safety_margin = margin;
        self
    }

    /// 建構器模式：設置排程起始日
    pub fn with_schedule_start_date(mut self, date: NaiveDate) -> Self {
        self.schedule_start_date = date;
        self
    }

    /// 建構器模式：設置預設品牌
    pub fn with_default_brand(mut self, brand: impl Into<String>) -> Self {
        self.default_brand = brand.into();
        self
    }

    /// 年度運轉時數
    pub fn annual_operating_hours(&self, daily_hours: f64) -> f64 {
        daily_hours * f64::from(self.work_days_per_week) * f64::from(self.work_weeks_per_year)
    }

    /// 檢查參數範圍
    pub fn validate(&self) -> Result<()> {
        if !(1..=7).contains(&self.work_days_per_week) {
            return Err(out_of_range(
                "work_days_per_week",
                self.work_days_per_week,
                "1..=7",
            ));
        }
        if !(1..=52).contains(&self.work_weeks_per_year) {
            return Err(out_of_range(
                "work_weeks_per_year",
                self.work_weeks_per_year,
                "1..=52",
            ));
        }
        if !self.environment_factor.is_finite()
            || self.environment_factor <= 0.0
            || self.environment_factor > 2.0
        {
            return Err(out_of_range(
                "environment_factor",
                self.environment_factor,
                "(0, 2]",
            ));
        }
        if !self.safety_margin.is_finite() || !(1.0..=10.0).contains(&self.safety_margin) {
            return Err(out_of_range("safety_margin", self.safety_margin, "[1, 10]"));
        }
        if self.default_brand.trim().is_empty() {
            return Err(MaintError::InvalidParameter {
                field: "default_brand",
                reason: "品牌不可為空".to_string(),
            });
        }

        Ok(())
    }

    /// 由文字欄位建立參數
    ///
    /// 欄位缺漏（`None` 或空字串）時使用替代值；有填但無法解析或超出範圍則回傳錯誤。
    pub fn from_input(input: &ParameterInput, defaults: &ParameterDefaults) -> Result<Self> {
        let params = Self {
            work_days_per_week: parse_field(
                "work_days_per_week",
                input.work_days_per_week.as_deref(),
                defaults.work_days_per_week,
            )?,
            work_weeks_per_year: parse_field(
                "work_weeks_per_year",
                input.work_weeks_per_year.as_deref(),
                defaults.work_weeks_per_year,
            )?,
            environment_factor: parse_field(
                "environment_factor",
                input.environment_factor.as_deref(),
                defaults.environment_factor,
            )?,
            safety_margin: parse_field(
                "safety_margin",
                input.safety_margin.as_deref(),
                defaults.safety_margin,
            )?,
            schedule_start_date: parse_field(
                "schedule_start_date",
                input.schedule_start_date.as_deref(),
                defaults.schedule_start_date,
            )?,
            default_brand: match present(input.default_brand.as_deref()) {
                Some(brand) => canonical_code(brand),
                None => defaults.default_brand.clone(),
            },
        };

        params.validate()?;
        Ok(params)
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self::from_defaults(&ParameterDefaults::default())
    }
}

/// 介面層傳入的原始文字欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterInput {
    pub work_days_per_week: Option<String>,
    pub work_weeks_per_year: Option<String>,
    pub environment_factor: Option<String>,
    pub safety_margin: Option<String>,
    pub schedule_start_date: Option<String>,
    pub default_brand: Option<String>,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_field<T>(field: &'static str, raw: Option<&str>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match present(raw) {
        None => Ok(default),
        Some(text) => text.parse::<T>().map_err(|_| MaintError::InvalidParameter {
            field,
            reason: format!("無法解析 \"{}\"", text),
        }),
    }
}

fn out_of_range(field: &'static str, value: impl std::fmt::Display, range: &str) -> MaintError {
    MaintError::InvalidParameter {
        field,
        reason: format!("{} 超出範圍 {}", value, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_parameters() {
        let params = GlobalParameters::default();

        assert_eq!(params.work_days_per_week, 5);
        assert_eq!(params.work_weeks_per_year, 50);
        assert_eq!(params.environment_factor, 0.8);
        assert_eq!(params.safety_margin, 1.5);
        assert_eq!(params.default_brand, "NSK");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_annual_operating_hours() {
        let params = GlobalParameters::default();

        // 8 小時 × 5 天 × 50 週
        assert_eq!(params.annual_operating_hours(8.0), 2000.0);
    }

    #[test]
    fn test_from_input_substitutes_missing_fields() {
        let input = ParameterInput {
            work_days_per_week: Some("6".to_string()),
            environment_factor: Some("  ".to_string()),
            ..Default::default()
        };

        let params = GlobalParameters::from_input(&input, &ParameterDefaults::default()).unwrap();

        assert_eq!(params.work_days_per_week, 6);
        assert_eq!(params.environment_factor, 0.8);
        assert_eq!(params.safety_margin, 1.5);
    }

    #[test]
    fn test_custom_defaults_are_used() {
        let defaults = ParameterDefaults {
            work_weeks_per_year: 48,
            safety_margin: 2.0,
            ..Default::default()
        };

        let params = GlobalParameters::from_input(&ParameterInput::default(), &defaults).unwrap();

        assert_eq!(params.work_weeks_per_year, 48);
        assert_eq!(params.safety_margin, 2.0);
    }

    #[rstest]
    #[case(Some("cinco"), None, None)]
    #[case(Some("8"), None, None)]
    #[case(None, Some("0"), None)]
    #[case(None, Some("-0.5"), None)]
    #[case(None, None, Some("0.9"))]
    fn test_from_input_rejects_invalid_values(
        #[case] days: Option<&str>,
        #[case] environment: Option<&str>,
        #[case] margin: Option<&str>,
    ) {
        let input = ParameterInput {
            work_days_per_week: days.map(str::to_string),
            environment_factor: environment.map(str::to_string),
            safety_margin: margin.map(str::to_string),
            ..Default::default()
        };

        let result = GlobalParameters::from_input(&input, &ParameterDefaults::default());
        assert!(matches!(result, Err(MaintError::InvalidParameter { .. })));
    }

    #[test]
    fn test_from_input_parses_date_and_brand() {
        let input = ParameterInput {
            schedule_start_date: Some("2025-03-01".to_string()),
            default_brand: Some("skf".to_string()),
            ..Default::default()
        };

        let params = GlobalParameters::from_input(&input, &ParameterDefaults::default()).unwrap();

        assert_eq!(
            params.schedule_start_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(params.default_brand, "SKF");
    }
}
