//! 報表資料與 CSV 匯出
//!
//! 介面層（圖表、日曆）與文件匯出器只讀取這裡的純資料。

use chrono::{DateTime, Utc};
use maint_calc::{BudgetSummary, PriceResolver, ReplacementSchedule};
use maint_core::{ComponentRecord, GlobalParameters, MaintError, ReferenceTables, Result};
use serde::Serialize;

/// CSV 欄位（沿用既有匯出檔）
pub const CSV_HEADER: [&str; 12] = [
    "Tipo",
    "Categoria",
    "Cantidad",
    "Aplicacion",
    "RPM",
    "Carga",
    "Horas_Diarias",
    "Criticidad",
    "Marca",
    "Capacidad_kN",
    "Precio",
    "Tiempo_Recambio_Meses",
];

const NOT_AVAILABLE: &str = "N/A";

/// 報表資料
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub parameters: GlobalParameters,
    pub components: Vec<ComponentRecord>,
    pub summary: BudgetSummary,
    pub schedule: ReplacementSchedule,

    /// 需立即注意的提示（無緊急零件時為 None）
    pub critical_alert: Option<String>,
}

impl ReportData {
    pub fn new(
        parameters: GlobalParameters,
        components: Vec<ComponentRecord>,
        summary: BudgetSummary,
        schedule: ReplacementSchedule,
    ) -> Self {
        let critical_alert = (summary.critical_count > 0).then(|| {
            format!(
                "{} 筆零件的更換週期少於 6 個月，需優先處理",
                summary.critical_count
            )
        });

        Self {
            generated_at: Utc::now(),
            parameters,
            components,
            summary,
            schedule,
            critical_alert,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 將零件清單寫成 CSV
///
/// 皮帶沒有動態容量，更換週期尚未計算時寫入 `N/A`。
pub fn write_csv<W: std::io::Write>(
    writer: W,
    records: &[ComponentRecord],
    tables: &ReferenceTables,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let resolver = PriceResolver::new(tables);

    csv.write_record(CSV_HEADER).map_err(export_error)?;
    for record in records {
        let capacity = tables
            .capacity_for_display(&record.brand, &record.part_code, record.category)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |c| c.to_string());
        let months = record
            .replacement_months
            .map_or_else(|| NOT_AVAILABLE.to_string(), |m| m.to_string());

        csv.write_record([
            record.part_code.clone(),
            record.category.label().to_string(),
            record.quantity.to_string(),
            record.application.clone(),
            record.rpm.to_string(),
            record.load_factor.to_string(),
            record.daily_hours.to_string(),
            u8::from(record.criticality).to_string(),
            record.brand.clone(),
            capacity,
            resolver.resolve(record).unit_price.to_string(),
            months,
        ])
        .map_err(export_error)?;
    }

    csv.flush()?;
    Ok(())
}

/// 將零件清單轉為 CSV 字串
pub fn csv_string(records: &[ComponentRecord], tables: &ReferenceTables) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, records, tables)?;
    String::from_utf8(buffer).map_err(|e| MaintError::Export(e.to_string()))
}

fn export_error(e: csv::Error) -> MaintError {
    MaintError::Export(e.to_string())
}
