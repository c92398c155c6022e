//! 零件登錄簿（工作資料集）

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::catalog::ReferenceTables;
use crate::component::{ComponentCategory, ComponentRecord, ComponentUpdate};
use crate::seed;
use crate::{MaintError, Result};

/// 零件登錄簿
///
/// 保留一份初始資料，供「還原預設值」深拷貝使用。
#[derive(Debug, Clone)]
pub struct Registry {
    records: Vec<ComponentRecord>,
    seed: Vec<ComponentRecord>,
    next_id: u32,
}

impl Registry {
    /// 以指定資料作為初始資料建立登錄簿
    pub fn new(seed: Vec<ComponentRecord>) -> Result<Self> {
        check_records(&seed)?;
        let next_id = next_id_after(&seed);
        Ok(Self {
            records: seed.clone(),
            seed,
            next_id,
        })
    }

    /// 工廠預設清單
    pub fn plant_default() -> Self {
        let seed = seed::plant_components(crate::catalog::REFERENCE_BRAND);
        let next_id = next_id_after(&seed);
        Self {
            records: seed.clone(),
            seed,
            next_id,
        }
    }

    /// 所有記錄（依建立順序）
    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    /// 記錄數
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 依 ID 取得記錄
    pub fn get(&self, id: u32) -> Option<&ComponentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 依 ID 取得可變記錄
    pub fn get_mut(&mut self, id: u32) -> Option<&mut ComponentRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// 所有可變記錄（供重算寫入快取）
    pub fn records_mut(&mut self) -> &mut [ComponentRecord] {
        &mut self.records
    }

    /// 新增零件，回傳指派的 ID
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        part_code: impl Into<String>,
        category: ComponentCategory,
        quantity: u32,
        brand: impl Into<String>,
        rpm: f64,
        load_factor: f64,
        daily_hours: f64,
    ) -> Result<u32> {
        let id = self.next_id;
        let record = ComponentRecord::new(id, part_code, category, quantity, brand)
            .with_operation(rpm, load_factor, daily_hours);
        record.validate()?;

        self.records.push(record);
        self.next_id += 1;
        tracing::debug!("新增零件 {}", id);
        Ok(id)
    }

    /// 修改單一零件
    pub fn update(&mut self, id: u32, update: ComponentUpdate) -> Result<()> {
        let record = self.get_mut(id).ok_or(MaintError::UnknownComponent(id))?;
        record.apply_update(update)
    }

    /// 設定自訂單價（None 表示改回參考價）
    pub fn set_custom_price(&mut self, id: u32, price: Option<Decimal>) -> Result<()> {
        self.update(id, ComponentUpdate::CustomPrice(price))
    }

    /// 所有零件關鍵度提高一級，回傳實際變動數
    pub fn raise_all_criticality(&mut self) -> usize {
        let mut raised = 0;
        for record in &mut self.records {
            let next = record.criticality.raised();
            if next != record.criticality {
                record.criticality = next;
                record.replacement_months = None;
                raised += 1;
            }
        }
        raised
    }

    /// 以參考表的建議負載覆寫各零件負載，回傳實際變動數
    pub fn apply_estimated_loads(&mut self, tables: &ReferenceTables) -> usize {
        let mut applied = 0;
        for record in &mut self.records {
            let load = tables.estimated_load(&record.brand, &record.part_code, record.category);
            if load != record.load_factor {
                record.load_factor = load;
                record.replacement_months = None;
                applied += 1;
            }
        }
        applied
    }

    /// 整批替換（設定載入或匯入時）
    pub fn replace_all(&mut self, records: Vec<ComponentRecord>) -> Result<()> {
        check_records(&records)?;
        // 已發出的 ID 不再重複使用
        self.next_id = self.next_id.max(next_id_after(&records));
        self.records = records;
        Ok(())
    }

    /// 還原為初始資料的深拷貝
    pub fn restore_defaults(&mut self) {
        self.records = self.seed.clone();
    }

    /// 依分組整理（保持首次出現順序）
    pub fn groups(&self) -> Vec<(&str, Vec<&ComponentRecord>)> {
        let mut groups: Vec<(&str, Vec<&ComponentRecord>)> = Vec::new();
        for record in &self.records {
            match groups.iter_mut().find(|(name, _)| *name == record.group) {
                Some((_, members)) => members.push(record),
                None => groups.push((record.group.as_str(), vec![record])),
            }
        }
        groups
    }

    /// 總安裝數量
    pub fn total_quantity(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.quantity)).sum()
    }

    /// 對照參考表檢查登錄簿
    ///
    /// 欄位無效時回傳錯誤；品牌不在參考表中不算錯誤（計算時退回參考品牌），
    /// 以 ID 清單回傳供呼叫端提示。
    pub fn validate_against(&self, tables: &ReferenceTables) -> Result<Vec<u32>> {
        check_records(&self.records)?;

        let unknown: Vec<u32> = self
            .records
            .iter()
            .filter(|r| !tables.knows_brand(&r.brand))
            .map(|r| r.id)
            .collect();
        if !unknown.is_empty() {
            tracing::warn!("{} 筆零件的品牌不在參考表中，改用參考品牌計算", unknown.len());
        }
        Ok(unknown)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::plant_default()
    }
}

fn next_id_after(records: &[ComponentRecord]) -> u32 {
    records.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

fn check_records(records: &[ComponentRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        record.validate()?;
        if !seen.insert(record.id) {
            return Err(MaintError::InvalidComponent {
                id: record.id,
                reason: "ID 重複".to_string(),
            });
        }
    }
    Ok(())
}
