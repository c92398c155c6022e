//! 零件記錄模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::leading_token;
use crate::{MaintError, Result};

/// 零件類別（決定壽命公式）
///
/// 序列化名稱沿用既有設定檔的西文類別名，英文名稱也可讀入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentCategory {
    /// 滾動軸承
    #[serde(rename = "Rodamiento", alias = "Bearing")]
    Bearing,
    /// 輪子（軸承公式，高負載）
    #[serde(rename = "Ruedas", alias = "Wheel")]
    Wheel,
    /// 軸承座（chumacera）
    #[serde(rename = "Chumacera", alias = "PillowBlock")]
    PillowBlock,
    /// 皮帶
    #[serde(rename = "Correa", alias = "Belt")]
    Belt,
}

impl ComponentCategory {
    /// 是否使用 L10 軸承壽命公式
    pub fn is_rolling(&self) -> bool {
        matches!(self, ComponentCategory::Bearing | ComponentCategory::Wheel)
    }

    /// 是否為皮帶
    pub fn is_belt(&self) -> bool {
        *self == ComponentCategory::Belt
    }

    /// 設定檔使用的類別名
    pub fn label(&self) -> &'static str {
        match self {
            ComponentCategory::Bearing => "Rodamiento",
            ComponentCategory::Wheel => "Ruedas",
            ComponentCategory::PillowBlock => "Chumacera",
            ComponentCategory::Belt => "Correa",
        }
    }
}

/// 關鍵度等級（0=低 … 3=關鍵）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Criticality {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl Criticality {
    /// 所有等級（由低到高）
    pub const ALL: [Criticality; 4] = [
        Criticality::Low,
        Criticality::Medium,
        Criticality::High,
        Criticality::Critical,
    ];

    /// 等級索引
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 調整等級，結果限制在 0..=3
    pub fn step(self, direction: i8) -> Self {
        let next = (self as i16 + direction as i16).clamp(0, 3);
        Self::ALL[next as usize]
    }

    /// 提高一級（已是最高則不變）
    pub fn raised(self) -> Self {
        self.step(1)
    }

    /// 顯示用標籤
    pub fn label(&self) -> &'static str {
        match self {
            Criticality::Low => "Bajo",
            Criticality::Medium => "Medio",
            Criticality::High => "Alto",
            Criticality::Critical => "Crítico",
        }
    }
}

impl TryFrom<u8> for Criticality {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("關鍵度必須介於 0 與 3 之間，收到 {}", value))
    }
}

impl From<Criticality> for u8 {
    fn from(value: Criticality) -> Self {
        value as u8
    }
}

/// 自訂單價上限
pub const MAX_CUSTOM_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// 零件記錄（一組實體零件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// 零件ID（建立時指派，不重複使用）
    pub id: u32,

    /// 零件型號（如 "6206 2RS"）
    #[serde(rename = "tipo")]
    pub part_code: String,

    /// 類別
    #[serde(rename = "categoria")]
    pub category: ComponentCategory,

    /// 安裝數量
    #[serde(rename = "cantidad")]
    pub quantity: u32,

    /// 用途說明（僅顯示）
    #[serde(rename = "aplicacion", default)]
    pub application: String,

    /// 轉速（皮帶為 0）
    pub rpm: f64,

    /// 相對負載 (0, 1]
    #[serde(rename = "carga")]
    pub load_factor: f64,

    /// 每日運轉時數 (0, 24]
    #[serde(rename = "horas_diarias")]
    pub daily_hours: f64,

    /// 關鍵度
    #[serde(rename = "criticidad")]
    pub criticality: Criticality,

    /// 報表分組（僅顯示）
    #[serde(rename = "grupo", default)]
    pub group: String,

    /// 品牌
    #[serde(rename = "marca")]
    pub brand: String,

    /// 自訂單價（覆蓋參考價）
    #[serde(
        rename = "precio_custom",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_price: Option<Decimal>,

    /// 最近一次計算的更換週期（月），不持久化
    #[serde(skip)]
    pub replacement_months: Option<u32>,
}

impl ComponentRecord {
    /// 創建新的零件記錄
    pub fn new(
        id: u32,
        part_code: impl Into<String>,
        category: ComponentCategory,
        quantity: u32,
        brand: impl Into<String>,
    ) -> Self {
        Self {
            id,
            part_code: part_code.into(),
            category,
            quantity,
            application: String::new(),
            rpm: 0.0,
            load_factor: 0.5,
            daily_hours: 8.0,
            criticality: Criticality::Low,
            group: String::new(),
            brand: brand.into(),
            custom_price: None,
            replacement_months: None,
        }
    }

    /// 建構器模式：設置用途
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    /// 建構器模式：設置運轉條件
    pub fn with_operation(mut self, rpm: f64, load_factor: f64, daily_hours: f64) -> Self {
        self.rpm = rpm;
        self.load_factor = load_factor;
        self.daily_hours = daily_hours;
        self
    }

    /// 建構器模式：設置關鍵度
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// 建構器模式：設置分組
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// 建構器模式：設置自訂單價
    pub fn with_custom_price(mut self, price: Decimal) -> Self {
        self.custom_price = Some(price);
        self
    }

    /// 型號的首段（如 "6206 2RS" → "6206"）
    pub fn code_token(&self) -> &str {
        leading_token(&self.part_code)
    }

    /// 檢查欄位範圍
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| MaintError::InvalidComponent {
            id: self.id,
            reason,
        };

        if self.part_code.trim().is_empty() {
            return Err(fail("型號不可為空".to_string()));
        }
        if self.brand.trim().is_empty() {
            return Err(fail("品牌不可為空".to_string()));
        }
        if self.quantity == 0 {
            return Err(fail("數量必須大於 0".to_string()));
        }
        if !self.rpm.is_finite() || self.rpm < 0.0 {
            return Err(fail(format!("轉速必須為非負數，收到 {}", self.rpm)));
        }
        if self.category.is_rolling() && self.rpm <= 0.0 {
            return Err(fail(format!(
                "{} 類別的轉速必須大於 0",
                self.category.label()
            )));
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 || self.load_factor > 1.0 {
            return Err(fail(format!(
                "負載必須介於 (0, 1]，收到 {}",
                self.load_factor
            )));
        }
        if !self.daily_hours.is_finite() || self.daily_hours <= 0.0 || self.daily_hours > 24.0 {
            return Err(fail(format!(
                "每日時數必須介於 (0, 24]，收到 {}",
                self.daily_hours
            )));
        }
        if let Some(price) = self.custom_price {
            if price < Decimal::ZERO {
                return Err(fail(format!("自訂單價不可為負，收到 {}", price)));
            }
            if price > MAX_CUSTOM_PRICE {
                return Err(fail(format!(
                    "自訂單價不可超過 {}，收到 {}",
                    MAX_CUSTOM_PRICE, price
                )));
            }
        }

        Ok(())
    }

    /// 套用單一欄位修改（驗證失敗時記錄保持不變）
    pub fn apply_update(&mut self, update: ComponentUpdate) -> Result<()> {
        let mut candidate = self.clone();

        match update {
            ComponentUpdate::Rpm(rpm) => candidate.rpm = rpm,
            ComponentUpdate::LoadFactor(load) => candidate.load_factor = load,
            ComponentUpdate::DailyHours(hours) => candidate.daily_hours = hours,
            ComponentUpdate::Quantity(quantity) => candidate.quantity = quantity,
            ComponentUpdate::Criticality(criticality) => candidate.criticality = criticality,
            ComponentUpdate::StepCriticality(direction) => {
                candidate.criticality = candidate.criticality.step(direction)
            }
            ComponentUpdate::Brand(brand) => {
                // 換品牌後改用新品牌的參考價
                candidate.brand = brand;
                candidate.custom_price = None;
            }
            ComponentUpdate::CustomPrice(price) => candidate.custom_price = price,
        }

        candidate.validate()?;
        candidate.replacement_months = None;
        *self = candidate;
        Ok(())
    }
}

/// 可由介面層修改的欄位
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentUpdate {
    Rpm(f64),
    LoadFactor(f64),
    DailyHours(f64),
    Quantity(u32),
    Criticality(Criticality),
    /// 以 +1 / -1 調整關鍵度
    StepCriticality(i8),
    /// 更換品牌（同時清除自訂單價）
    Brand(String),
    CustomPrice(Option<Decimal>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bearing() -> ComponentRecord {
        ComponentRecord::new(1, "6206 2RS", ComponentCategory::Bearing, 4, "NSK")
            .with_operation(300.0, 0.9, 8.0)
            .with_criticality(Criticality::Critical)
            .with_group("RUEDAS")
    }

    #[test]
    fn test_create_record() {
        let record = bearing();

        assert_eq!(record.code_token(), "6206");
        assert_eq!(record.quantity, 4);
        assert!(record.category.is_rolling());
        assert!(record.validate().is_ok());
    }

    #[rstest]
    #[case(Criticality::Low, -1, Criticality::Low)]
    #[case(Criticality::Low, 1, Criticality::Medium)]
    #[case(Criticality::High, 1, Criticality::Critical)]
    #[case(Criticality::Critical, 1, Criticality::Critical)]
    #[case(Criticality::Medium, -1, Criticality::Low)]
    fn test_criticality_step(
        #[case] start: Criticality,
        #[case] direction: i8,
        #[case] expected: Criticality,
    ) {
        assert_eq!(start.step(direction), expected);
    }

    #[test]
    fn test_zero_rpm_rejected_for_rolling() {
        let record = bearing().with_operation(0.0, 0.5, 8.0);
        assert!(record.validate().is_err());

        // 皮帶轉速為 0 是正常的
        let belt = ComponentRecord::new(22, "B 1350 Li", ComponentCategory::Belt, 2, "NSK")
            .with_operation(0.0, 0.6, 6.0);
        assert!(belt.validate().is_ok());
    }

    #[rstest]
    #[case(ComponentUpdate::LoadFactor(0.0))]
    #[case(ComponentUpdate::LoadFactor(1.2))]
    #[case(ComponentUpdate::DailyHours(25.0))]
    #[case(ComponentUpdate::Quantity(0))]
    #[case(ComponentUpdate::Rpm(f64::NAN))]
    #[case(ComponentUpdate::CustomPrice(Some(Decimal::new(-1, 0))))]
    #[case(ComponentUpdate::CustomPrice(Some(Decimal::MAX)))]
    fn test_invalid_update_leaves_record_untouched(#[case] update: ComponentUpdate) {
        let mut record = bearing();
        let before = record.clone();

        assert!(record.apply_update(update).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_brand_change_clears_custom_price() {
        let mut record = bearing().with_custom_price(Decimal::from(99));

        record
            .apply_update(ComponentUpdate::Brand("SKF".to_string()))
            .unwrap();

        assert_eq!(record.brand, "SKF");
        assert_eq!(record.custom_price, None);
    }

    #[test]
    fn test_serde_uses_snapshot_keys() {
        let json = serde_json::to_value(bearing()).unwrap();

        assert_eq!(json["tipo"], "6206 2RS");
        assert_eq!(json["categoria"], "Rodamiento");
        assert_eq!(json["criticidad"], 3);
        assert_eq!(json["horas_diarias"], 8.0);
        assert!(json.get("precio_custom").is_none());
        assert!(json.get("replacement_months").is_none());
    }

    #[test]
    fn test_deserialize_browser_record() {
        let json = r#"{"id": 15, "tipo": "P205", "categoria": "Chumacera", "cantidad": 2,
            "aplicacion": "Sistema Extracción", "rpm": 800, "carga": 0.6, "horas_diarias": 8,
            "criticidad": 2, "grupo": "CHUMACERAS", "marca": "NSK", "precio_custom": 310}"#;

        let record: ComponentRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.category, ComponentCategory::PillowBlock);
        assert_eq!(record.criticality, Criticality::High);
        assert_eq!(record.custom_price, Some(Decimal::from(310)));
    }

    #[test]
    fn test_out_of_range_criticality_rejected() {
        let json = r#"{"id": 1, "tipo": "6204", "categoria": "Rodamiento", "cantidad": 1,
            "rpm": 100, "carga": 0.5, "horas_diarias": 2, "criticidad": 7, "marca": "NSK"}"#;

        assert!(serde_json::from_str::<ComponentRecord>(json).is_err());
    }
}
