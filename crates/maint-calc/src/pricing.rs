//! 單價解析

use maint_core::catalog::default_price;
use maint_core::{ComponentRecord, ReferenceTables};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單價來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceSource {
    /// 使用者自訂
    Custom,
    /// 參考表
    Catalog,
    /// 類別預設值
    Default,
}

/// 解析後的單價
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub unit_price: Decimal,
    pub source: PriceSource,
}

/// 單價解析器：自訂單價 → 參考表 → 類別預設值
pub struct PriceResolver<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> PriceResolver<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// 自訂單價優先（含 0，視為免費零件），其次為參考表，最後為類別預設值
    pub fn resolve(&self, record: &ComponentRecord) -> ResolvedPrice {
        if let Some(price) = record.custom_price {
            return ResolvedPrice {
                unit_price: price,
                source: PriceSource::Custom,
            };
        }

        match self
            .tables
            .catalog_price(&record.brand, &record.part_code, record.category)
        {
            Some(price) => ResolvedPrice {
                unit_price: price,
                source: PriceSource::Catalog,
            },
            None => ResolvedPrice {
                unit_price: default_price(record.category),
                source: PriceSource::Default,
            },
        }
    }
}
