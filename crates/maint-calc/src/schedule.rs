//! 更換排程

use chrono::{Datelike, Months, NaiveDate};
use maint_core::ComponentRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 每筆零件最多產生的事件數
pub const MAX_EVENTS_PER_COMPONENT: u32 = 20;

/// 排程分級（依更換週期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleTier {
    /// ≤ 1 個月
    Immediate,
    /// ≤ 3 個月
    Short,
    /// ≤ 6 個月
    Medium,
    Long,
}

impl ScheduleTier {
    pub fn from_months(months: u32) -> Self {
        match months {
            0..=1 => ScheduleTier::Immediate,
            2..=3 => ScheduleTier::Short,
            4..=6 => ScheduleTier::Medium,
            _ => ScheduleTier::Long,
        }
    }
}

/// 更換事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementEvent {
    pub id: Uuid,
    pub component_id: u32,
    pub part_code: String,
    pub group: String,
    pub brand: String,
    pub quantity: u32,
    pub replacement_months: u32,
    pub date: NaiveDate,
    pub tier: ScheduleTier,
}

/// 更換排程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSchedule {
    pub start: NaiveDate,
    pub horizon_end: NaiveDate,
    pub events: Vec<ReplacementEvent>,
}

impl ReplacementSchedule {
    /// 依登錄簿的更換週期快取產生排程
    ///
    /// 事件日期為 `start + k × 週期`（k = 0, 1, …），直到超過排程終點或達到事件上限。
    /// 未計算週期的零件略過。終點預設為起始年度的 12 月 31 日。
    pub fn build(records: &[ComponentRecord], start: NaiveDate, horizon_end: Option<NaiveDate>) -> Self {
        let horizon_end = horizon_end.unwrap_or_else(|| end_of_year(start));
        let mut events = Vec::new();

        for record in records {
            let Some(months) = record.replacement_months else {
                tracing::debug!("零件 {} 尚未計算更換週期，略過排程", record.id);
                continue;
            };

            for k in 0..MAX_EVENTS_PER_COMPONENT {
                let Some(date) = start.checked_add_months(Months::new(months.saturating_mul(k))) else {
                    break;
                };
                if date > horizon_end {
                    break;
                }

                events.push(ReplacementEvent {
                    id: Uuid::new_v4(),
                    component_id: record.id,
                    part_code: record.part_code.clone(),
                    group: record.group.clone(),
                    brand: record.brand.clone(),
                    quantity: record.quantity,
                    replacement_months: months,
                    date,
                    tier: ScheduleTier::from_months(months),
                });
            }
        }

        events.sort_by_key(|e| (e.date, e.component_id));
        tracing::debug!("產生更換事件 {} 筆", events.len());

        Self {
            start,
            horizon_end,
            events,
        }
    }

    /// 指定月份的事件
    pub fn events_in_month(&self, year: i32, month: u32) -> Vec<&ReplacementEvent> {
        self.events
            .iter()
            .filter(|e| e.date.year() == year && e.date.month() == month)
            .collect()
    }

    /// 指定零件的事件
    pub fn events_for(&self, component_id: u32) -> Vec<&ReplacementEvent> {
        self.events
            .iter()
            .filter(|e| e.component_id == component_id)
            .collect()
    }

    /// 排程內需更換的總件數
    pub fn total_units(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.quantity)).sum()
    }
}

fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maint_core::ComponentCategory;
    use rstest::rstest;

    fn record(id: u32, months: Option<u32>) -> ComponentRecord {
        let mut record = ComponentRecord::new(id, "6204 RS", ComponentCategory::Bearing, 8, "NSK")
            .with_operation(500.0, 0.5, 8.0)
            .with_group("APILADO");
        record.replacement_months = months;
        record
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_events_within_year() {
        let schedule = ReplacementSchedule::build(&[record(1, Some(4))], jan_first(), None);

        let dates: Vec<NaiveDate> = schedule.events.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            ]
        );
        assert_eq!(schedule.horizon_end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(schedule.events.iter().all(|e| e.tier == ScheduleTier::Medium));
    }

    #[test]
    fn test_event_cap() {
        let horizon = NaiveDate::from_ymd_opt(2030, 12, 31);
        let schedule = ReplacementSchedule::build(&[record(1, Some(1))], jan_first(), horizon);

        assert_eq!(schedule.events.len(), MAX_EVENTS_PER_COMPONENT as usize);
    }

    #[test]
    fn test_uncomputed_records_are_skipped() {
        let schedule =
            ReplacementSchedule::build(&[record(1, None), record(2, Some(24))], jan_first(), None);

        // 24 個月只有起始日一筆
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].component_id, 2);
        assert_eq!(schedule.total_units(), 8);
    }

    #[test]
    fn test_events_sorted_and_unique() {
        let schedule =
            ReplacementSchedule::build(&[record(1, Some(6)), record(2, Some(3))], jan_first(), None);

        assert!(schedule.events.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(schedule.events_for(2).len(), 4);
        assert_eq!(schedule.events_in_month(2025, 7).len(), 2);

        let mut ids: Vec<Uuid> = schedule.events.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), schedule.events.len());
    }

    #[test]
    fn test_month_end_start_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let schedule = ReplacementSchedule::build(&[record(1, Some(1))], start, None);

        // 2 月沒有 31 日，落在月底
        assert_eq!(schedule.events[1].date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[rstest]
    #[case(1, ScheduleTier::Immediate)]
    #[case(3, ScheduleTier::Short)]
    #[case(6, ScheduleTier::Medium)]
    #[case(7, ScheduleTier::Long)]
    fn test_tiers(#[case] months: u32, #[case] expected: ScheduleTier) {
        assert_eq!(ScheduleTier::from_months(months), expected);
    }
}
