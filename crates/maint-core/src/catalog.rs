//! 參考表：各品牌的單價、建議負載、動態負載容量與皮帶基準壽命
//!
//! 查詢永不失敗，依序退回：
//! 1. 品牌表（未知品牌改用參考品牌 `NSK`）
//! 2. 標準表（僅動態容量）
//! 3. 固定預設值

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::component::ComponentCategory;
use crate::{MaintError, Result};

/// 參考品牌（未知品牌時使用）
pub const REFERENCE_BRAND: &str = "NSK";

/// 動態容量預設值 (kN)
pub const DEFAULT_CAPACITY_KN: f64 = 15.0;

/// 建議負載預設值
pub const DEFAULT_ESTIMATED_LOAD: f64 = 0.5;

/// 皮帶基準壽命預設值（月）
pub const DEFAULT_BELT_LIFE_MONTHS: u32 = 18;

/// 建議負載表中皮帶使用的代碼
pub const BELT_LOAD_KEY: &str = "CORREA";

/// 品牌 → 代碼 → 數值
pub type BrandTable<T> = BTreeMap<String, BTreeMap<String, T>>;

/// 型號正規化：去頭尾空白、合併連續空白、轉大寫
pub fn canonical_code(code: &str) -> String {
    code.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// 型號首段（如 "6206 2RS" → "6206"）
pub fn leading_token(code: &str) -> &str {
    code.split_whitespace().next().unwrap_or("")
}

/// 類別預設單價
pub fn default_price(category: ComponentCategory) -> Decimal {
    match category {
        ComponentCategory::Bearing | ComponentCategory::Wheel => Decimal::from(120),
        ComponentCategory::Belt => Decimal::from(150),
        ComponentCategory::PillowBlock => Decimal::from(350),
    }
}

/// 參考表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// 單價（當地幣別）
    pub prices: BrandTable<Decimal>,

    /// 建議負載（皮帶使用 `CORREA` 代碼）
    pub estimated_load: BrandTable<f64>,

    /// 動態負載容量 (kN)，僅軸承與軸承座
    pub dynamic_capacity: BrandTable<f64>,

    /// 皮帶基準壽命（月）
    pub belt_base_life_months: BTreeMap<String, u32>,

    /// 品牌表查不到時的標準容量
    #[serde(default = "standard_capacity")]
    pub standard_capacity: BTreeMap<String, f64>,

    /// 參考品牌
    #[serde(default = "reference_brand")]
    pub reference_brand: String,
}

impl ReferenceTables {
    /// 內建參考表（工廠現用的十個品牌）
    pub fn builtin() -> Self {
        let mut prices = BrandTable::new();
        let mut estimated_load = BrandTable::new();
        let mut dynamic_capacity = BrandTable::new();

        for (brand, row) in BUILTIN_PRICES {
            prices.insert(
                brand.to_string(),
                PRICE_CODES
                    .iter()
                    .zip(row.iter())
                    .map(|(code, price)| (canonical_code(code), Decimal::from(*price)))
                    .collect(),
            );
        }
        for (brand, row, belt) in BUILTIN_LOADS {
            let mut table: BTreeMap<String, f64> = PART_CODES
                .iter()
                .zip(row.iter())
                .map(|(code, load)| (canonical_code(code), *load))
                .collect();
            table.insert(BELT_LOAD_KEY.to_string(), *belt);
            estimated_load.insert(brand.to_string(), table);
        }
        for (brand, row) in BUILTIN_CAPACITIES {
            dynamic_capacity.insert(
                brand.to_string(),
                PART_CODES
                    .iter()
                    .zip(row.iter())
                    .map(|(code, capacity)| (canonical_code(code), *capacity))
                    .collect(),
            );
        }

        let belt_base_life_months = BUILTIN_BELT_LIFE
            .iter()
            .map(|(brand, months)| (brand.to_string(), *months))
            .collect();

        Self {
            prices,
            estimated_load,
            dynamic_capacity,
            belt_base_life_months,
            standard_capacity: standard_capacity(),
            reference_brand: reference_brand(),
        }
    }

    /// 從 JSON 載入參考表（代碼會正規化，並於載入時檢查衝突）
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: ReferenceTables = serde_json::from_str(json)?;
        let tables = Self {
            prices: canonicalize_brand_table("prices", raw.prices)?,
            estimated_load: canonicalize_brand_table("estimated_load", raw.estimated_load)?,
            dynamic_capacity: canonicalize_brand_table("dynamic_capacity", raw.dynamic_capacity)?,
            belt_base_life_months: canonicalize_keys(
                "belt_base_life_months",
                raw.belt_base_life_months,
            )?,
            standard_capacity: canonicalize_keys("standard_capacity", raw.standard_capacity)?,
            reference_brand: canonical_code(&raw.reference_brand),
        };
        tables.validate()?;
        Ok(tables)
    }

    /// 檢查參考表：代碼不得在正規化後重複，數值必須在合理範圍
    pub fn validate(&self) -> Result<()> {
        check_brand_table("prices", &self.prices)?;
        check_brand_table("estimated_load", &self.estimated_load)?;
        check_brand_table("dynamic_capacity", &self.dynamic_capacity)?;

        for (brand, table) in &self.prices {
            if let Some((code, price)) = table.iter().find(|(_, p)| **p < Decimal::ZERO) {
                return Err(invalid_value("prices", brand, code, price));
            }
        }
        for (brand, table) in &self.estimated_load {
            if let Some((code, load)) = table
                .iter()
                .find(|(_, l)| !l.is_finite() || **l <= 0.0 || **l > 1.0)
            {
                return Err(invalid_value("estimated_load", brand, code, load));
            }
        }
        for (brand, table) in &self.dynamic_capacity {
            if let Some((code, capacity)) =
                table.iter().find(|(_, c)| !c.is_finite() || **c <= 0.0)
            {
                return Err(invalid_value("dynamic_capacity", brand, code, capacity));
            }
        }
        if let Some((brand, _)) = self.belt_base_life_months.iter().find(|(_, m)| **m == 0) {
            return Err(invalid_value("belt_base_life_months", brand, "-", 0));
        }

        Ok(())
    }

    /// 所有已知品牌（依單價表）
    pub fn brands(&self) -> Vec<&str> {
        self.prices.keys().map(String::as_str).collect()
    }

    /// 品牌是否在單價表中
    pub fn knows_brand(&self, brand: &str) -> bool {
        self.prices.contains_key(&canonical_code(brand))
    }

    /// 動態負載容量 (kN)
    pub fn dynamic_capacity(&self, brand: &str, part_code: &str) -> f64 {
        let code = canonical_code(leading_token(part_code));
        self.brand_entry(&self.dynamic_capacity, brand)
            .and_then(|table| table.get(&code))
            .or_else(|| self.standard_capacity.get(&code))
            .copied()
            .unwrap_or(DEFAULT_CAPACITY_KN)
    }

    /// 顯示用動態容量（皮帶無此數值）
    pub fn capacity_for_display(
        &self,
        brand: &str,
        part_code: &str,
        category: ComponentCategory,
    ) -> Option<f64> {
        if category.is_belt() {
            None
        } else {
            Some(self.dynamic_capacity(brand, part_code))
        }
    }

    /// 建議負載
    pub fn estimated_load(
        &self,
        brand: &str,
        part_code: &str,
        category: ComponentCategory,
    ) -> f64 {
        let code = if category.is_belt() {
            BELT_LOAD_KEY.to_string()
        } else {
            canonical_code(leading_token(part_code))
        };

        self.brand_entry(&self.estimated_load, brand)
            .and_then(|table| table.get(&code))
            .copied()
            .unwrap_or(DEFAULT_ESTIMATED_LOAD)
    }

    /// 皮帶基準壽命（月）
    pub fn belt_base_life_months(&self, brand: &str) -> u32 {
        self.belt_base_life_months
            .get(&canonical_code(brand))
            .or_else(|| self.belt_base_life_months.get(&self.reference_brand))
            .copied()
            .unwrap_or(DEFAULT_BELT_LIFE_MONTHS)
    }

    /// 參考表中的單價（查不到時為 None）
    ///
    /// 軸承、輪子、皮帶以型號首段精確比對；軸承座先整碼比對，
    /// 再取最長的整段前綴代碼。
    pub fn catalog_price(
        &self,
        brand: &str,
        part_code: &str,
        category: ComponentCategory,
    ) -> Option<Decimal> {
        let table = self.brand_entry(&self.prices, brand)?;

        let key = match category {
            ComponentCategory::PillowBlock => token_prefix_key(table.keys(), part_code)?,
            _ => canonical_code(leading_token(part_code)),
        };

        table.get(&key).copied()
    }

    /// 單價（含類別預設值）
    pub fn price(&self, brand: &str, part_code: &str, category: ComponentCategory) -> Decimal {
        self.catalog_price(brand, part_code, category)
            .unwrap_or_else(|| default_price(category))
    }

    fn brand_entry<'a, T>(
        &self,
        table: &'a BrandTable<T>,
        brand: &str,
    ) -> Option<&'a BTreeMap<String, T>> {
        table
            .get(&canonical_code(brand))
            .or_else(|| table.get(&self.reference_brand))
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 在代碼集合中找出與型號相符的鍵：整碼相同，或為型號的整段前綴（取最長者）
fn token_prefix_key<'a>(keys: impl Iterator<Item = &'a String>, part_code: &str) -> Option<String> {
    let code = canonical_code(part_code);

    keys.filter(|key| {
        code == **key
            || (code.starts_with(key.as_str()) && code[key.len()..].starts_with(' '))
    })
    .max_by_key(|key| key.len())
    .cloned()
}

fn canonicalize_keys<T>(table_name: &str, raw: BTreeMap<String, T>) -> Result<BTreeMap<String, T>> {
    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let canonical = canonical_code(&key);
        if out.insert(canonical.clone(), value).is_some() {
            return Err(MaintError::AmbiguousCatalogKey(format!(
                "{}: {}",
                table_name, canonical
            )));
        }
    }
    Ok(out)
}

fn canonicalize_brand_table<T>(table_name: &str, raw: BrandTable<T>) -> Result<BrandTable<T>> {
    let mut out = BrandTable::new();
    for (brand, codes) in raw {
        let canonical = canonical_code(&brand);
        let codes = canonicalize_keys(&format!("{}/{}", table_name, canonical), codes)?;
        if out.insert(canonical.clone(), codes).is_some() {
            return Err(MaintError::AmbiguousCatalogKey(format!(
                "{}: 品牌 {}",
                table_name, canonical
            )));
        }
    }
    Ok(out)
}

fn check_brand_table<T>(table_name: &str, table: &BrandTable<T>) -> Result<()> {
    for (brand, codes) in table {
        if canonical_code(brand) != *brand {
            return Err(MaintError::AmbiguousCatalogKey(format!(
                "{}: 品牌 {} 未正規化",
                table_name, brand
            )));
        }
        if let Some(code) = codes.keys().find(|code| canonical_code(code) != **code) {
            return Err(MaintError::AmbiguousCatalogKey(format!(
                "{}/{}: {} 未正規化",
                table_name, brand, code
            )));
        }
    }
    Ok(())
}

fn invalid_value(
    table_name: &'static str,
    brand: &str,
    code: &str,
    value: impl std::fmt::Display,
) -> MaintError {
    MaintError::InvalidParameter {
        field: table_name,
        reason: format!("{}/{} 的數值 {} 超出範圍", brand, code, value),
    }
}

fn reference_brand() -> String {
    REFERENCE_BRAND.to_string()
}

fn standard_capacity() -> BTreeMap<String, f64> {
    [
        ("6203", 9.5),
        ("6204", 12.7),
        ("6205", 14.0),
        ("6206", 19.5),
        ("6207", 25.5),
        ("6304", 15.3),
    ]
    .into_iter()
    .map(|(code, capacity)| (code.to_string(), capacity))
    .collect()
}

/// 軸承與軸承座代碼（建議負載、動態容量共用）
const PART_CODES: [&str; 13] = [
    "6203", "6204", "6205", "6206", "6207", "6304", "P205", "P206", "P207", "UCFL 205",
    "UCFL 206", "F206", "207 306",
];

/// 單價代碼（軸承、軸承座與皮帶）
const PRICE_CODES: [&str; 18] = [
    "6203", "6204", "6205", "6206", "6207", "6304", "P205", "P206", "P207", "UCFL 205",
    "UCFL 206", "F206", "207 306", "B 1350", "B2100", "B116", "B2000", "B 1650",
];

const BUILTIN_PRICES: &[(&str, [i64; 18])] = &[
    ("SKF", [85, 110, 135, 185, 260, 165, 320, 390, 460, 350, 420, 340, 490, 180, 220, 150, 210, 195]),
    ("FAG", [90, 115, 140, 195, 275, 175, 335, 410, 485, 365, 440, 355, 510, 185, 225, 155, 215, 200]),
    ("NSK", [80, 105, 130, 175, 245, 155, 305, 370, 435, 330, 400, 320, 465, 170, 210, 140, 200, 185]),
    ("NTN", [78, 102, 125, 170, 240, 150, 295, 360, 425, 320, 390, 310, 450, 165, 205, 135, 195, 180]),
    ("TIMKEN", [95, 125, 155, 210, 295, 190, 365, 445, 525, 395, 475, 385, 550, 195, 240, 165, 230, 210]),
    ("KOYO", [75, 98, 120, 165, 230, 145, 285, 350, 415, 310, 380, 300, 440, 160, 200, 130, 190, 175]),
    ("GENERICO", [65, 85, 105, 145, 200, 125, 250, 305, 360, 270, 330, 260, 385, 130, 160, 110, 150, 140]),
    ("GATES", [80, 105, 130, 175, 245, 155, 305, 370, 435, 330, 400, 320, 465, 220, 280, 180, 260, 240]),
    ("OPTIBELT", [80, 105, 130, 175, 245, 155, 305, 370, 435, 330, 400, 320, 465, 200, 250, 160, 230, 210]),
    ("CONTINENTAL", [80, 105, 130, 175, 245, 155, 305, 370, 435, 330, 400, 320, 465, 210, 265, 170, 245, 225]),
];

const BUILTIN_LOADS: &[(&str, [f64; 13], f64)] = &[
    ("SKF", [0.8, 0.7, 0.6, 0.9, 0.8, 0.5, 0.6, 0.7, 0.5, 0.5, 0.6, 0.5, 0.6], 0.6),
    ("FAG", [0.7, 0.6, 0.5, 0.8, 0.7, 0.4, 0.5, 0.6, 0.4, 0.4, 0.5, 0.4, 0.5], 0.5),
    ("NSK", [0.6, 0.5, 0.5, 0.9, 0.8, 0.4, 0.6, 0.4, 0.3, 0.5, 0.6, 0.5, 0.6], 0.6),
    ("NTN", [0.6, 0.5, 0.5, 0.9, 0.8, 0.4, 0.6, 0.4, 0.3, 0.5, 0.6, 0.5, 0.6], 0.6),
    ("TIMKEN", [0.9, 0.8, 0.7, 1.0, 0.9, 0.6, 0.7, 0.8, 0.6, 0.6, 0.7, 0.6, 0.7], 0.7),
    ("KOYO", [0.5, 0.4, 0.4, 0.8, 0.7, 0.3, 0.5, 0.3, 0.2, 0.4, 0.5, 0.4, 0.5], 0.5),
    ("GENERICO", [0.4, 0.3, 0.3, 0.7, 0.6, 0.2, 0.4, 0.2, 0.1, 0.3, 0.4, 0.3, 0.4], 0.4),
    ("GATES", [0.6, 0.5, 0.5, 0.9, 0.8, 0.4, 0.6, 0.4, 0.3, 0.5, 0.6, 0.5, 0.6], 0.7),
    ("OPTIBELT", [0.6, 0.5, 0.5, 0.9, 0.8, 0.4, 0.6, 0.4, 0.3, 0.5, 0.6, 0.5, 0.6], 0.65),
    ("CONTINENTAL", [0.6, 0.5, 0.5, 0.9, 0.8, 0.4, 0.6, 0.4, 0.3, 0.5, 0.6, 0.5, 0.6], 0.68),
];

const BUILTIN_CAPACITIES: &[(&str, [f64; 13])] = &[
    ("SKF", [9.8, 13.2, 14.5, 20.1, 26.0, 15.8, 28.5, 35.2, 42.8, 25.6, 31.4, 22.8, 38.5]),
    ("FAG", [9.6, 12.9, 14.2, 19.8, 25.7, 15.5, 28.0, 34.8, 42.2, 25.2, 31.0, 22.5, 38.0]),
    ("NSK", [9.5, 12.7, 14.0, 19.5, 25.5, 15.3, 27.8, 34.5, 41.8, 25.0, 30.8, 22.2, 37.5]),
    ("NTN", [9.4, 12.6, 13.9, 19.3, 25.2, 15.1, 27.5, 34.2, 41.5, 24.8, 30.5, 22.0, 37.2]),
    ("TIMKEN", [10.2, 13.8, 15.0, 20.8, 27.2, 16.5, 29.5, 36.8, 44.5, 26.8, 32.5, 24.2, 40.2]),
    ("KOYO", [9.2, 12.3, 13.6, 18.8, 24.5, 14.8, 26.8, 33.2, 40.2, 24.2, 29.8, 21.5, 36.2]),
    ("GENERICO", [8.8, 11.8, 12.9, 17.8, 23.2, 14.2, 25.5, 31.8, 38.5, 23.2, 28.5, 20.8, 34.8]),
    ("GATES", [9.5, 12.7, 14.0, 19.5, 25.5, 15.3, 27.8, 34.5, 41.8, 25.0, 30.8, 22.2, 37.5]),
    ("OPTIBELT", [9.5, 12.7, 14.0, 19.5, 25.5, 15.3, 27.8, 34.5, 41.8, 25.0, 30.8, 22.2, 37.5]),
    ("CONTINENTAL", [9.5, 12.7, 14.0, 19.5, 25.5, 15.3, 27.8, 34.5, 41.8, 25.0, 30.8, 22.2, 37.5]),
];

const BUILTIN_BELT_LIFE: &[(&str, u32)] = &[
    ("GENERICO", 18),
    ("GATES", 24),
    ("OPTIBELT", 20),
    ("CONTINENTAL", 22),
    ("NSK", 18),
    ("KOYO", 18),
    ("NTN", 18),
    ("FAG", 18),
    ("SKF", 18),
    ("TIMKEN", 18),
];
