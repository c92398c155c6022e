//! 維護規劃器
//!
//! 持有參考表、政策、登錄簿、參數與設定儲存，所有操作都經由它進行。
//! 每次修改後重新計算預算並標記待儲存；呼叫端定期以目前時間呼叫 [`Planner::tick`]
//! 觸發延遲自動儲存。

use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use maint_calc::{BudgetCalculator, BudgetSummary, CriticalityPolicy, ReplacementSchedule};
use maint_core::{
    canonical_code, ComponentCategory, ComponentUpdate, GlobalParameters, MaintError,
    ParameterInput, ReferenceTables, Registry, Result,
};
use maint_store::{ConfigurationStore, LoadOutcome, Notice, PersistenceBackend};

use crate::report::{self, ReportData};

/// 維護規劃器
pub struct Planner<B: PersistenceBackend> {
    tables: ReferenceTables,
    policy: CriticalityPolicy,
    registry: Registry,
    params: GlobalParameters,
    store: ConfigurationStore<B>,
    summary: BudgetSummary,
}

impl<B: PersistenceBackend> Planner<B> {
    /// 使用內建參考表、預設政策與工廠初始清單
    pub fn new(store: ConfigurationStore<B>) -> Self {
        let params = GlobalParameters::from_defaults(store.defaults());
        let mut planner = Self {
            tables: ReferenceTables::builtin(),
            policy: CriticalityPolicy::default(),
            registry: Registry::plant_default(),
            params,
            store,
            summary: BudgetSummary::empty(),
        };
        planner.recompute();
        planner
    }

    /// 由各部分組裝（參考表與政策會先檢查）
    pub fn from_parts(
        tables: ReferenceTables,
        policy: CriticalityPolicy,
        registry: Registry,
        store: ConfigurationStore<B>,
    ) -> Result<Self> {
        tables.validate()?;
        policy.validate()?;
        registry.validate_against(&tables)?;

        let params = GlobalParameters::from_defaults(store.defaults());
        params.validate()?;

        let mut planner = Self {
            tables,
            policy,
            registry,
            params,
            store,
            summary: BudgetSummary::empty(),
        };
        planner.recompute();
        Ok(planner)
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn policy(&self) -> &CriticalityPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parameters(&self) -> &GlobalParameters {
        &self.params
    }

    pub fn store(&self) -> &ConfigurationStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigurationStore<B> {
        &mut self.store
    }

    /// 最近一次計算結果
    pub fn summary(&self) -> &BudgetSummary {
        &self.summary
    }

    /// 取出並清空儲存提示
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.store.drain_notices()
    }

    /// 啟動：載入儲存的設定（失敗則沿用目前資料）後重新計算
    pub fn startup(&mut self) -> LoadOutcome {
        let outcome = self.store.load(&mut self.registry, &mut self.params);
        tracing::info!("啟動載入結果: {:?}", outcome);
        self.recompute();
        outcome
    }

    /// 重新計算預算
    pub fn recompute(&mut self) -> &BudgetSummary {
        let calculator = BudgetCalculator::new(&self.tables, &self.params, &self.policy);
        self.summary = calculator.recompute(&mut self.registry);
        &self.summary
    }

    /// 修改單一零件
    pub fn update_component(
        &mut self,
        id: u32,
        update: ComponentUpdate,
        now: Instant,
    ) -> Result<&BudgetSummary> {
        self.registry.update(id, update)?;
        self.store.mark_component_dirty(id, now);
        Ok(self.recompute())
    }

    /// 新增零件（使用目前的預設品牌）
    #[allow(clippy::too_many_arguments)]
    pub fn add_component(
        &mut self,
        part_code: &str,
        category: ComponentCategory,
        quantity: u32,
        rpm: f64,
        load_factor: f64,
        daily_hours: f64,
        now: Instant,
    ) -> Result<u32> {
        let brand = self.params.default_brand.clone();
        let id = self
            .registry
            .add(part_code, category, quantity, brand, rpm, load_factor, daily_hours)?;
        self.store.mark_component_dirty(id, now);
        self.recompute();
        Ok(id)
    }

    /// 套用新的全域參數
    pub fn set_parameters(&mut self, params: GlobalParameters, now: Instant) -> Result<()> {
        params.validate()?;
        self.params = params;
        self.store.mark_parameters_dirty(now);
        self.recompute();
        Ok(())
    }

    /// 由介面層文字欄位套用參數（空白欄位使用預設值）
    pub fn set_parameters_from_input(&mut self, input: &ParameterInput, now: Instant) -> Result<()> {
        let params = GlobalParameters::from_input(input, self.store.defaults())?;
        self.set_parameters(params, now)
    }

    /// 變更預設品牌（既有零件不受影響）
    pub fn change_default_brand(&mut self, brand: &str, now: Instant) -> Result<()> {
        let brand = canonical_code(brand);
        if brand.is_empty() {
            return Err(MaintError::InvalidParameter {
                field: "default_brand",
                reason: "品牌不可為空".to_string(),
            });
        }
        if !self.tables.knows_brand(&brand) {
            tracing::warn!("品牌 {} 不在參考表中，計算時改用參考品牌", brand);
        }

        self.params.default_brand = brand;
        self.store.mark_parameters_dirty(now);
        Ok(())
    }

    /// 以參考表建議負載覆寫所有零件，回傳變動筆數
    pub fn apply_estimated_loads(&mut self, now: Instant) -> usize {
        let applied = self.registry.apply_estimated_loads(&self.tables);
        if applied > 0 {
            self.store.mark_all_dirty(&self.registry, now);
            self.recompute();
        }
        tracing::info!("已套用建議負載：{} 筆", applied);
        applied
    }

    /// 所有零件關鍵度提高一級，回傳變動筆數
    pub fn raise_all_criticality(&mut self, now: Instant) -> usize {
        let raised = self.registry.raise_all_criticality();
        if raised > 0 {
            self.store.mark_all_dirty(&self.registry, now);
            self.recompute();
        }
        raised
    }

    /// 還原初始資料與預設參數
    pub fn restore_defaults(&mut self, now: Instant) -> &BudgetSummary {
        self.store
            .restore_defaults(&mut self.registry, &mut self.params, now);
        self.recompute()
    }

    /// 立即儲存
    pub fn save_now(&mut self) -> bool {
        self.store.save(&self.registry, &self.params)
    }

    /// 延遲時間已過則自動儲存
    pub fn tick(&mut self, now: Instant) -> bool {
        self.store.flush_if_due(now, &self.registry, &self.params)
    }

    /// 匯出設定 JSON
    pub fn export_config(&self) -> Result<String> {
        self.store.export(&self.registry, &self.params)
    }

    /// 匯出設定至檔案
    pub fn export_config_file(&mut self, path: &Path) -> Result<()> {
        self.store.export_file(path, &self.registry, &self.params)
    }

    /// 匯入設定 JSON（失敗時狀態不變）
    pub fn import_config(&mut self, json: &str) -> Result<&BudgetSummary> {
        self.store
            .import(json, &mut self.registry, &mut self.params)?;
        Ok(self.recompute())
    }

    /// 從檔案匯入設定
    pub fn import_config_file(&mut self, path: &Path) -> Result<&BudgetSummary> {
        self.store
            .import_file(path, &mut self.registry, &mut self.params)?;
        Ok(self.recompute())
    }

    /// 零件清單 CSV
    pub fn export_csv(&self) -> Result<String> {
        report::csv_string(self.registry.records(), &self.tables)
    }

    /// 更換排程（終點預設為起始年度年底）
    pub fn schedule(&self, horizon_end: Option<NaiveDate>) -> ReplacementSchedule {
        ReplacementSchedule::build(
            self.registry.records(),
            self.params.schedule_start_date,
            horizon_end,
        )
    }

    /// 報表資料
    pub fn report(&self) -> ReportData {
        ReportData::new(
            self.params.clone(),
            self.registry.records().to_vec(),
            self.summary.clone(),
            self.schedule(None),
        )
    }
}
