//! 設定快照（持久化與匯入匯出共用格式）
//!
//! 欄位名稱沿用既有設定檔，舊版以輸入框文字儲存的數值（如 `"5"`）也可讀入。

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::component::ComponentRecord;
use crate::parameters::{GlobalParameters, ParameterDefaults};
use crate::{canonical_code, MaintError, Result};

/// 寫入的快照版本
pub const SNAPSHOT_VERSION: &str = "2.1";

/// 設定快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(rename = "componentesData", default)]
    pub components: Option<Vec<ComponentRecord>>,

    #[serde(rename = "fabricanteGlobal", default)]
    pub default_brand: Option<String>,

    #[serde(
        rename = "diasSemana",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_days_per_week: Option<f64>,

    #[serde(
        rename = "semanasAno",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_weeks_per_year: Option<f64>,

    #[serde(
        rename = "factorAmbiente",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub environment_factor: Option<f64>,

    #[serde(
        rename = "margenSeguridad",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub safety_margin: Option<f64>,

    #[serde(rename = "fechaInicio", default, skip_serializing_if = "Option::is_none")]
    pub schedule_start_date: Option<String>,

    #[serde(rename = "fechaGuardado", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    #[serde(rename = "fechaExportacion", default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub version: Option<String>,
}

impl ConfigSnapshot {
    /// 由目前狀態建立快照（不含時間戳）
    pub fn from_state(records: &[ComponentRecord], params: &GlobalParameters) -> Self {
        Self {
            components: Some(records.to_vec()),
            default_brand: Some(params.default_brand.clone()),
            work_days_per_week: Some(f64::from(params.work_days_per_week)),
            work_weeks_per_year: Some(f64::from(params.work_weeks_per_year)),
            environment_factor: Some(params.environment_factor),
            safety_margin: Some(params.safety_margin),
            schedule_start_date: Some(params.schedule_start_date.format("%Y-%m-%d").to_string()),
            saved_at: None,
            exported_at: None,
            version: Some(SNAPSHOT_VERSION.to_string()),
        }
    }

    /// 建構器模式：標記儲存時間
    pub fn with_saved_at(mut self, at: DateTime<Utc>) -> Self {
        self.saved_at = Some(at);
        self
    }

    /// 建構器模式：標記匯出時間
    pub fn with_exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = Some(at);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MaintError::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 匯入檔必須包含零件資料與預設品牌
    pub fn require_complete(&self) -> Result<()> {
        if self.components.is_none() {
            return Err(MaintError::InvalidSnapshot("缺少 componentesData".to_string()));
        }
        match self.default_brand.as_deref().map(str::trim) {
            Some(brand) if !brand.is_empty() => Ok(()),
            _ => Err(MaintError::InvalidSnapshot("缺少 fabricanteGlobal".to_string())),
        }
    }

    /// 取出並驗證所有零件記錄
    pub fn records(&self) -> Result<Vec<ComponentRecord>> {
        let records = self
            .components
            .clone()
            .ok_or_else(|| MaintError::InvalidSnapshot("缺少 componentesData".to_string()))?;

        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    /// 還原全域參數，缺漏欄位使用替代值
    pub fn parameters(&self, defaults: &ParameterDefaults) -> Result<GlobalParameters> {
        let schedule_start_date = match self
            .schedule_start_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                MaintError::InvalidParameter {
                    field: "schedule_start_date",
                    reason: format!("無法解析日期 \"{}\"", text),
                }
            })?,
            None => defaults.schedule_start_date,
        };

        let params = GlobalParameters {
            work_days_per_week: whole_number(
                "work_days_per_week",
                self.work_days_per_week,
                defaults.work_days_per_week,
            )?,
            work_weeks_per_year: whole_number(
                "work_weeks_per_year",
                self.work_weeks_per_year,
                defaults.work_weeks_per_year,
            )?,
            environment_factor: self.environment_factor.unwrap_or(defaults.environment_factor),
            safety_margin: self.safety_margin.unwrap_or(defaults.safety_margin),
            schedule_start_date,
            default_brand: self
                .default_brand
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(canonical_code)
                .unwrap_or_else(|| defaults.default_brand.clone()),
        };

        params.validate()?;
        Ok(params)
    }
}

fn whole_number(field: &'static str, value: Option<f64>, default: u8) -> Result<u8> {
    match value {
        None => Ok(default),
        Some(v) if v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&v) => Ok(v as u8),
        Some(v) => Err(MaintError::InvalidParameter {
            field,
            reason: format!("{} 不是有效的整數", v),
        }),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// 數值欄位接受數字或數字字串，空字串視為缺漏
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("無法解析數值 \"{}\"", text)))
        }
    }
}
