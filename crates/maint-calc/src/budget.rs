//! 預算彙總
//!
//! 對登錄簿做一次純粹的折疊運算：每筆零件 → 明細行 → 總計與分佈。
//! 唯一的副作用是 [`BudgetCalculator::recompute`] 寫回登錄簿的更換週期快取。

use maint_core::{
    ComponentCategory, ComponentRecord, Criticality, GlobalParameters, ReferenceTables, Registry,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::life::LifeEstimator;
use crate::policy::{CriticalityPolicy, Urgency, CRITICAL_MONTHS};
use crate::pricing::{PriceResolver, PriceSource};
use crate::{BudgetSummary, CalcWarning};

/// 應變準備係數（預算 × 1.2）
const RESERVE_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// 單筆零件的預算明細
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub component_id: u32,
    pub part_code: String,
    pub category: ComponentCategory,
    pub brand: String,
    pub group: String,
    pub quantity: u32,
    pub criticality: Criticality,

    /// 物理階段的預估壽命（小時）
    pub life_hours: f64,

    /// 物理階段的更換週期（月）
    pub physical_months: u32,

    /// 套用關鍵度政策後的更換週期（月）
    pub replacement_months: u32,

    pub unit_price: Decimal,
    pub price_source: PriceSource,

    /// 年度更換數量（含安全係數）
    pub annual_units: u32,

    /// 年度成本
    pub annual_cost: Decimal,

    pub urgency: Urgency,
}

/// 品牌分佈
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandBreakdown {
    pub brand: String,

    /// 安裝數量
    pub units: u64,

    /// 單價 × 安裝數量
    pub cost: Decimal,

    /// 佔年度預算百分比（一位小數）
    pub percentage: Decimal,
}

/// 分組統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub group: String,
    pub units: u64,
    pub records: usize,
    pub average_months: u32,
    pub max_criticality: Criticality,
}

/// 預算計算器
pub struct BudgetCalculator<'a> {
    tables: &'a ReferenceTables,
    params: &'a GlobalParameters,
    policy: &'a CriticalityPolicy,
}

impl<'a> BudgetCalculator<'a> {
    /// 創建新的預算計算器
    pub fn new(
        tables: &'a ReferenceTables,
        params: &'a GlobalParameters,
        policy: &'a CriticalityPolicy,
    ) -> Self {
        Self {
            tables,
            params,
            policy,
        }
    }

    /// 重新計算並寫回登錄簿的更換週期快取
    pub fn recompute(&self, registry: &mut Registry) -> BudgetSummary {
        let summary = self.summarize(registry.records());

        for (record, line) in registry.records_mut().iter_mut().zip(&summary.lines) {
            record.replacement_months = Some(line.replacement_months);
        }

        summary
    }

    /// 計算預算彙總（不修改任何資料）
    pub fn summarize(&self, records: &[ComponentRecord]) -> BudgetSummary {
        tracing::info!("開始預算計算：零件 {} 筆", records.len());

        let mut summary = BudgetSummary::empty();

        // Step 1: 逐筆估算
        tracing::debug!("Step 1: 逐筆估算壽命與單價");
        for record in records {
            let line = self.line(record, &mut summary.warnings);
            summary.lines.push(line);
        }

        // Step 2: 總計
        tracing::debug!("Step 2: 彙總");
        let mut total = Decimal::ZERO;
        for line in &summary.lines {
            match total.checked_add(line.annual_cost) {
                Some(sum) => total = sum,
                None => {
                    tracing::warn!("零件 {} 使總預算溢位，不計入", line.component_id);
                    summary.warnings.push(CalcWarning::error(
                        line.component_id,
                        "總預算溢位，此零件不計入總計".to_string(),
                    ));
                }
            }
        }
        summary.total_budget = total;
        summary.budget_with_reserve = total
            .checked_mul(RESERVE_FACTOR)
            .unwrap_or(Decimal::MAX)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        summary.critical_count = summary
            .lines
            .iter()
            .filter(|l| l.replacement_months < CRITICAL_MONTHS)
            .count();
        summary.average_replacement_months =
            rounded_mean(summary.lines.iter().map(|l| l.replacement_months));
        summary.total_component_count = summary.lines.iter().map(|l| u64::from(l.quantity)).sum();

        // Step 3: 分佈
        tracing::debug!("Step 3: 品牌與分組分佈");
        summary.brands = brand_breakdown(&summary.lines, summary.total_budget);
        summary.groups = group_breakdown(&summary.lines);

        tracing::info!(
            "預算計算完成：年度 {}，含準備 {}，緊急 {} 筆",
            summary.total_budget,
            summary.budget_with_reserve,
            summary.critical_count
        );
        if !summary.warnings.is_empty() {
            tracing::warn!("計算警告 {} 則", summary.warnings.len());
        }

        summary
    }

    /// 單筆零件明細
    pub fn line(&self, record: &ComponentRecord, warnings: &mut Vec<CalcWarning>) -> BudgetLine {
        if !self.tables.knows_brand(&record.brand) {
            warnings.push(CalcWarning::info(
                record.id,
                format!(
                    "品牌 {} 不在參考表中，改用 {} 的數據",
                    record.brand, self.tables.reference_brand
                ),
            ));
        }

        let life = LifeEstimator::new(self.tables, self.params).estimate(record, warnings);
        let months = self.policy.apply(life.replacement_months, record.criticality);
        let price = PriceResolver::new(self.tables).resolve(record);
        let annual_units = annual_replacement_units(months, record.quantity, self.params.safety_margin);
        let annual_cost = match Decimal::from(annual_units).checked_mul(price.unit_price) {
            Some(cost) => cost,
            None => {
                tracing::warn!("零件 {} 年度成本溢位，以 0 計算", record.id);
                warnings.push(CalcWarning::error(
                    record.id,
                    format!("年度成本溢位（{} 件 × {}），不計入預算", annual_units, price.unit_price),
                ));
                Decimal::ZERO
            }
        };

        tracing::debug!(
            "零件 {} ({}): {} 小時 → {} 個月 → {} 個月，年度 {} 件",
            record.id,
            record.part_code,
            life.life_hours,
            life.replacement_months,
            months,
            annual_units
        );

        BudgetLine {
            component_id: record.id,
            part_code: record.part_code.clone(),
            category: record.category,
            brand: record.brand.clone(),
            group: record.group.clone(),
            quantity: record.quantity,
            criticality: record.criticality,
            life_hours: life.life_hours,
            physical_months: life.replacement_months,
            replacement_months: months,
            unit_price: price.unit_price,
            price_source: price.source,
            annual_units,
            annual_cost,
            urgency: Urgency::from_months(months),
        }
    }
}

/// 年度更換數量
///
/// 週期 ≥ 12 個月：`ceil(數量 × 安全係數)`；否則 `ceil(12 / 週期 × 數量 × 安全係數)`
pub fn annual_replacement_units(months: u32, quantity: u32, safety_margin: f64) -> u32 {
    let quantity = f64::from(quantity);
    let units = if months >= 12 {
        quantity * safety_margin
    } else {
        12.0 / f64::from(months.max(1)) * quantity * safety_margin
    };
    units.ceil().max(0.0) as u32
}

fn rounded_mean(values: impl Iterator<Item = u32>) -> u32 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

fn brand_breakdown(lines: &[BudgetLine], total_budget: Decimal) -> Vec<BrandBreakdown> {
    let mut brands: Vec<BrandBreakdown> = Vec::new();

    for line in lines {
        let cost = line.unit_price.saturating_mul(Decimal::from(line.quantity));
        match brands.iter_mut().find(|b| b.brand == line.brand) {
            Some(entry) => {
                entry.units += u64::from(line.quantity);
                entry.cost = entry.cost.saturating_add(cost);
            }
            None => brands.push(BrandBreakdown {
                brand: line.brand.clone(),
                units: u64::from(line.quantity),
                cost,
                percentage: Decimal::ZERO,
            }),
        }
    }

    if total_budget > Decimal::ZERO {
        for entry in &mut brands {
            entry.percentage = entry
                .cost
                .checked_div(total_budget)
                .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        }
    }

    brands
}

fn group_breakdown(lines: &[BudgetLine]) -> Vec<GroupBreakdown> {
    let mut order: Vec<&str> = Vec::new();
    for line in lines {
        if !order.contains(&line.group.as_str()) {
            order.push(&line.group);
        }
    }

    order
        .into_iter()
        .map(|group| {
            let members: Vec<&BudgetLine> = lines.iter().filter(|l| l.group == group).collect();
            GroupBreakdown {
                group: group.to_string(),
                units: members.iter().map(|l| u64::from(l.quantity)).sum(),
                records: members.len(),
                average_months: rounded_mean(members.iter().map(|l| l.replacement_months)),
                max_criticality: members
                    .iter()
                    .map(|l| l.criticality)
                    .max()
                    .unwrap_or_default(),
            }
        })
        .collect()
}
