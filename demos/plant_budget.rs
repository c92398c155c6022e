//! # 工廠年度維護預算範例
//!
//! 這個範例展示完整的規劃流程：
//! - 以檔案後端啟動規劃器（首次啟動沒有儲存的設定）
//! - 計算年度預算與品牌、群組分佈
//! - 修改零件與參數後延遲自動儲存
//! - 匯出設定與 CSV，並產生本年度更換排程
//!
//! 執行：`RUST_LOG=maint=debug cargo run --example plant_budget`

use std::time::{Duration, Instant};

use maint::{
    ComponentUpdate, ConfigurationStore, Criticality, FileBackend, ParameterDefaults,
    ParameterInput, Planner, StoreOptions, WarningSeverity,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "maint=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🏭 ===== 工廠年度維護預算範例 =====");
    println!();

    // ========== 1. 啟動規劃器 ==========
    println!("💾 步驟 1: 以檔案後端啟動");
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::open(dir.path())?;
    let store = ConfigurationStore::new(
        backend,
        StoreOptions::default().with_debounce(Duration::from_millis(500)),
        ParameterDefaults::default(),
    );
    let mut planner = Planner::new(store);
    let outcome = planner.startup();
    println!("   ✓ 載入結果: {:?}", outcome);
    println!("   ✓ 零件記錄: {} 筆", planner.registry().len());
    println!();

    // ========== 2. 年度預算 ==========
    println!("💰 步驟 2: 計算年度預算");
    let summary = planner.summary();
    println!("   總預算: {} €", summary.total_budget);
    println!("   含 20% 預備金: {} €", summary.budget_with_reserve);
    println!("   零件總數: {}", summary.total_component_count);
    println!("   平均更換週期: {} 個月", summary.average_replacement_months);
    println!("   緊急零件: {}", summary.critical_count);
    if summary.has_warnings_at(WarningSeverity::Warning) {
        println!("   ⚠ 部分零件的輸入已被修正，詳見日誌");
    }
    println!();

    println!("   品牌分佈:");
    for brand in &summary.brands {
        println!(
            "     {:<8} {:>5} 件  {:>10} €  {:>6}%",
            brand.brand, brand.units, brand.cost, brand.percentage
        );
    }
    println!();

    println!("   群組:");
    for group in &summary.groups {
        println!(
            "     {:<12} {:>3} 筆  {:>4} 件  平均 {} 個月",
            group.group, group.records, group.units, group.average_months
        );
    }
    println!();

    // ========== 3. 修改並延遲儲存 ==========
    println!("✏️  步驟 3: 修改零件與參數");
    let start = Instant::now();
    planner.update_component(3, ComponentUpdate::Criticality(Criticality::Critical), start)?;
    planner.update_component(5, ComponentUpdate::Rpm(1200.0), start)?;
    let input = ParameterInput {
        safety_margin: Some("1.8".to_string()),
        ..Default::default()
    };
    planner.set_parameters_from_input(&input, start)?;
    println!("   ✓ 新總預算: {} €", planner.summary().total_budget);

    let saved_early = planner.tick(start + Duration::from_millis(100));
    let saved_later = planner.tick(start + Duration::from_millis(600));
    println!("   ✓ 100ms 後儲存: {}，600ms 後儲存: {}", saved_early, saved_later);
    for notice in planner.drain_notices() {
        println!("   [{:?}] {}", notice.level, notice.message);
    }
    println!();

    // ========== 4. 匯出 ==========
    println!("📤 步驟 4: 匯出設定與 CSV");
    let config_path = dir.path().join("configuracion_rodamientos.json");
    planner.export_config_file(&config_path)?;
    println!("   ✓ 設定檔: {}", config_path.display());

    let csv = planner.export_csv()?;
    for line in csv.lines().take(4) {
        println!("   {}", line);
    }
    println!("   ...");
    println!();

    // ========== 5. 更換排程 ==========
    println!("📅 步驟 5: 本年度更換排程");
    let schedule = planner.schedule(None);
    println!(
        "   {} ~ {}: {} 次更換，共 {} 件",
        schedule.start,
        schedule.horizon_end,
        schedule.events.len(),
        schedule.total_units()
    );
    for event in schedule.events.iter().take(8) {
        println!(
            "   {}  {:<12} x{:<3} {:?}",
            event.date, event.part_code, event.quantity, event.tier
        );
    }
    println!();

    // ========== 6. 報表 ==========
    let report = planner.report();
    if let Some(alert) = &report.critical_alert {
        println!("🚨 {}", alert);
    }
    println!("✅ 報表已產生（{}）", report.generated_at.format("%Y-%m-%d %H:%M"));

    Ok(())
}
