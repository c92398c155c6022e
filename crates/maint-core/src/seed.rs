//! 工廠現場零件清單（初始資料）

use crate::component::{ComponentCategory, ComponentRecord, Criticality};

use ComponentCategory::{Bearing, Belt, PillowBlock, Wheel};

type SeedRow = (
    &'static str,
    ComponentCategory,
    u32,
    &'static str,
    f64,
    f64,
    f64,
    u8,
    &'static str,
);

// (型號, 類別, 數量, 用途, 轉速, 負載, 每日時數, 關鍵度, 分組)
const PLANT_COMPONENTS: &[SeedRow] = &[
    ("6206 2RS", Wheel, 4, "Ruedas Sistema Apilado", 300.0, 0.9, 8.0, 3, "RUEDAS"),
    ("6206 RS", Wheel, 4, "Ruedas Carro Material", 250.0, 0.9, 6.0, 3, "RUEDAS"),
    ("6203 42RS", Bearing, 20, "Sistema Extracción Pallets", 1200.0, 0.6, 8.0, 2, "EXTRACCIÓN"),
    ("6205 RS", Bearing, 2, "Sistema Extracción Pallets", 800.0, 0.6, 8.0, 2, "EXTRACCIÓN"),
    ("6205 RS", Bearing, 4, "Sistema Apilado Pallets", 600.0, 0.5, 8.0, 2, "APILADO"),
    ("6204 RS", Bearing, 8, "Sistema Apilado Pallets", 500.0, 0.5, 8.0, 2, "APILADO"),
    ("6205 2RS", Bearing, 6, "Carro Material", 200.0, 0.4, 4.0, 1, "CARROS"),
    ("6205 2RS", Bearing, 4, "Manivelas Carro", 150.0, 0.3, 2.0, 1, "CARROS"),
    ("6304 2RS", Bearing, 2, "Laterales Carro", 100.0, 0.3, 4.0, 1, "CARROS"),
    ("6207 RZ", Bearing, 2, "Disco Agitado Carro", 1500.0, 0.8, 6.0, 3, "CARROS"),
    ("6204 RS", Bearing, 48, "Carros Transporte TRUPER", 180.0, 0.5, 6.0, 2, "CARROS"),
    ("6304 RS", Bearing, 6, "Cinta Pequeña Alimentación", 800.0, 0.3, 8.0, 1, "CINTA"),
    ("6304 RS", Bearing, 36, "Cinta Transportadora Material", 1000.0, 0.4, 8.0, 2, "CINTA"),
    ("6204", Bearing, 4, "Caja Pallets", 100.0, 0.5, 2.0, 1, "OTROS"),
    ("P205", PillowBlock, 2, "Sistema Extracción", 800.0, 0.6, 8.0, 2, "CHUMACERAS"),
    ("UCFL 206", PillowBlock, 2, "Sistema Extracción", 1000.0, 0.6, 8.0, 2, "CHUMACERAS"),
    ("UCFL 205", PillowBlock, 2, "Cepillo Redondo", 1200.0, 0.5, 6.0, 2, "CHUMACERAS"),
    ("207 306", PillowBlock, 4, "Sistema Apilado", 600.0, 0.6, 8.0, 2, "CHUMACERAS"),
    ("F206", PillowBlock, 6, "Carro Material", 300.0, 0.5, 4.0, 1, "CHUMACERAS"),
    ("P207", PillowBlock, 4, "Rodillos Alimentación", 500.0, 0.3, 8.0, 1, "CHUMACERAS"),
    ("P206", PillowBlock, 4, "Rodillos Cinta Transportadora", 800.0, 0.4, 8.0, 2, "CHUMACERAS"),
    ("B 1350 Li", Belt, 2, "Disco Agitado Carro", 0.0, 0.6, 6.0, 2, "CORREAS"),
    ("B2100 Li", Belt, 4, "Sistema de Vibración", 0.0, 0.7, 4.0, 2, "CORREAS"),
    ("B116 (295Li)", Belt, 2, "Transmisión Cinta Transportadora", 0.0, 0.5, 8.0, 2, "CORREAS"),
    ("B2000 Li", Belt, 2, "Transmisión Cinta Transportadora", 0.0, 0.5, 8.0, 2, "CORREAS"),
    ("B 1650 Li", Belt, 3, "Mixer de Material", 0.0, 0.8, 6.0, 3, "CORREAS"),
];

/// 工廠初始零件清單，ID 從 1 起依序指派
pub fn plant_components(brand: &str) -> Vec<ComponentRecord> {
    PLANT_COMPONENTS
        .iter()
        .zip(1u32..)
        .map(
            |(&(code, category, quantity, application, rpm, load, hours, criticality, group), id)| {
                ComponentRecord::new(id, code, category, quantity, brand)
                    .with_application(application)
                    .with_operation(rpm, load, hours)
                    .with_criticality(
                        Criticality::try_from(criticality).unwrap_or(Criticality::Critical),
                    )
                    .with_group(group)
            },
        )
        .collect()
}
