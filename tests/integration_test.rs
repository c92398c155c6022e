//! 集成測試

use std::time::{Duration, Instant};

use maint::*;
use rstest::*;
use rust_decimal::Decimal;

fn memory_store() -> ConfigurationStore<MemoryBackend> {
    ConfigurationStore::new(
        MemoryBackend::new(),
        StoreOptions::default(),
        ParameterDefaults::default(),
    )
}

#[fixture]
fn planner() -> Planner<MemoryBackend> {
    let mut planner = Planner::new(memory_store());
    planner.startup();
    planner
}

fn long_life_bearing(criticality: Criticality) -> ComponentRecord {
    ComponentRecord::new(1, "6205", ComponentCategory::Bearing, 1, "NSK")
        .with_application("Eje Secundario")
        .with_operation(150.0, 0.3, 2.0)
        .with_criticality(criticality)
}

#[rstest]
fn test_export_then_import_reproduces_budget(mut planner: Planner<MemoryBackend>) {
    let now = Instant::now();
    planner
        .update_component(4, ComponentUpdate::Quantity(9), now)
        .unwrap();
    planner
        .update_component(12, ComponentUpdate::CustomPrice(Some(Decimal::new(4250, 2))), now)
        .unwrap();
    planner.change_default_brand("FAG", now).unwrap();

    let exported = planner.export_config().unwrap();

    let mut other = Planner::new(memory_store());
    other.import_config(&exported).unwrap();

    assert_eq!(other.parameters(), planner.parameters());
    assert_eq!(other.registry().records(), planner.registry().records());
    assert_eq!(other.summary().total_budget, planner.summary().total_budget);
    assert_eq!(other.summary().brands, planner.summary().brands);
}

#[test]
fn test_higher_criticality_shortens_interval() {
    let tables = ReferenceTables::builtin();
    let params = GlobalParameters::from_defaults(&ParameterDefaults::default());
    let policy = CriticalityPolicy::default();
    let calculator = BudgetCalculator::new(&tables, &params, &policy);

    let summary = calculator.summarize(&[
        long_life_bearing(Criticality::Low),
        long_life_bearing(Criticality::Critical),
    ]);
    let low = &summary.lines[0];
    let critical = &summary.lines[1];

    assert!(critical.replacement_months < low.replacement_months);
    assert!(critical.replacement_months >= 1);
    assert_eq!(critical.physical_months, low.physical_months);
}

#[rstest]
#[case(Criticality::Low)]
#[case(Criticality::Critical)]
fn test_short_life_wheel_stays_at_one_month(#[case] criticality: Criticality) {
    let tables = ReferenceTables::builtin();
    let params = GlobalParameters::from_defaults(&ParameterDefaults::default());
    let policy = CriticalityPolicy::default();
    let calculator = BudgetCalculator::new(&tables, &params, &policy);

    // 6206 2RS 在 300 rpm、負載 0.9、每日 8 小時時物理週期已是 1 個月，
    // 關鍵度無法再縮短
    let wheel = ComponentRecord::new(1, "6206 2RS", ComponentCategory::Wheel, 4, "NSK")
        .with_operation(300.0, 0.9, 8.0);
    let summary = calculator.summarize(&[
        wheel.clone().with_criticality(Criticality::Low),
        wheel.with_criticality(criticality),
    ]);

    assert_eq!(summary.lines[0].replacement_months, 1);
    assert_eq!(summary.lines[1].replacement_months, 1);
    assert_eq!(summary.lines[1].urgency, Urgency::Critical);
}

#[rstest]
fn test_import_rejects_oversized_custom_price(mut planner: Planner<MemoryBackend>) {
    let mut snapshot: serde_json::Value =
        serde_json::from_str(&planner.export_config().unwrap()).unwrap();
    snapshot["componentesData"][0]["precio_custom"] =
        serde_json::Value::String("70000000000000000000000000000".to_string());
    let budget_before = planner.summary().total_budget;

    let result = planner.import_config(&snapshot.to_string());

    assert!(result.is_err());
    assert_eq!(planner.registry().get(1).unwrap().custom_price, None);
    assert_eq!(planner.summary().total_budget, budget_before);
}

#[test]
fn test_empty_registry_has_zero_budget() {
    let planner = Planner::from_parts(
        ReferenceTables::builtin(),
        CriticalityPolicy::default(),
        Registry::new(Vec::new()).unwrap(),
        memory_store(),
    )
    .unwrap();

    let summary = planner.summary();
    assert_eq!(summary.total_budget, Decimal::ZERO);
    assert_eq!(summary.budget_with_reserve, Decimal::ZERO);
    assert_eq!(summary.total_component_count, 0);
    assert_eq!(summary.critical_count, 0);
    assert!(summary.lines.is_empty());
}

#[test]
fn test_single_long_life_component_budget() {
    let tables = ReferenceTables::builtin();
    let params = GlobalParameters::from_defaults(&ParameterDefaults::default());
    let policy = CriticalityPolicy::default();
    let record = long_life_bearing(Criticality::Low).with_custom_price(Decimal::from(100));

    let summary = BudgetCalculator::new(&tables, &params, &policy).summarize(&[record]);

    assert!(summary.lines[0].replacement_months >= 12);
    assert_eq!(summary.lines[0].annual_units, 2);
    assert_eq!(summary.total_budget, Decimal::from(200));
    assert_eq!(summary.budget_with_reserve, Decimal::from(240));
}

#[rstest]
fn test_import_without_components_changes_nothing(mut planner: Planner<MemoryBackend>) {
    let records_before = planner.registry().records().to_vec();
    let budget_before = planner.summary().total_budget;
    planner.drain_notices();

    let result = planner.import_config(r#"{"fabricanteGlobal": "SKF", "version": "2.0"}"#);

    assert!(result.is_err());
    assert_eq!(planner.registry().records(), records_before.as_slice());
    assert_eq!(planner.summary().total_budget, budget_before);
    assert_eq!(planner.parameters().default_brand, "NSK");

    let notices = planner.drain_notices();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));
}

#[rstest]
fn test_invalid_json_import_is_reported(mut planner: Planner<MemoryBackend>) {
    assert!(planner.import_config("{ not json").is_err());
    assert_eq!(planner.registry().len(), 26);
}

#[test]
fn test_debounced_autosave_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        ConfigurationStore::new(
            FileBackend::open(dir.path()).unwrap(),
            StoreOptions::default().with_debounce(Duration::from_millis(1000)),
            ParameterDefaults::default(),
        )
    };

    let mut planner = Planner::new(open());
    assert_eq!(planner.startup(), LoadOutcome::Missing);

    let start = Instant::now();
    planner
        .update_component(3, ComponentUpdate::Criticality(Criticality::Low), start)
        .unwrap();
    planner
        .update_component(3, ComponentUpdate::Quantity(7), start + Duration::from_millis(500))
        .unwrap();

    // 最後一次修改後未滿延遲時間
    assert!(!planner.tick(start + Duration::from_millis(1200)));
    assert!(planner.tick(start + Duration::from_millis(1500)));
    assert!(!planner.store().tracker().is_dirty());

    let mut restarted = Planner::new(open());
    assert_eq!(restarted.startup(), LoadOutcome::Loaded);

    let record = restarted.registry().get(3).unwrap();
    assert_eq!(record.criticality, Criticality::Low);
    assert_eq!(record.quantity, 7);
    assert_eq!(restarted.summary().total_budget, planner.summary().total_budget);
}

#[rstest]
fn test_restore_defaults_after_edits(mut planner: Planner<MemoryBackend>) {
    let original = planner.summary().total_budget;
    let now = Instant::now();

    assert!(planner.raise_all_criticality(now) > 0);
    assert_ne!(planner.summary().total_budget, original);

    planner.restore_defaults(now);
    assert_eq!(planner.summary().total_budget, original);
    assert!(planner.store().tracker().is_dirty());
}

#[rstest]
fn test_csv_export_lists_every_component(planner: Planner<MemoryBackend>) {
    let csv = planner.export_csv().unwrap();
    let mut lines = csv.lines();

    assert_eq!(lines.next(), Some(CSV_HEADER.join(",").as_str()));
    assert_eq!(lines.count(), planner.registry().len());
}

#[rstest]
fn test_schedule_covers_start_year(planner: Planner<MemoryBackend>) {
    let schedule = planner.schedule(None);
    let start = planner.parameters().schedule_start_date;

    assert_eq!(schedule.start, start);
    assert!(schedule
        .events
        .iter()
        .all(|e| e.date >= start && e.date <= schedule.horizon_end));
    assert!(schedule.events.windows(2).all(|w| w[0].date <= w[1].date));
}
