// 🌱 Default residential catalog
// Furnaces (80-98.5% AFUE), condensers (2-5 ton, 13-17 SEER), coils (2-5 ton)
//
// Coils come in 17.5" and 21" cabinets to stack on the matching furnace.

use crate::equipment::{Dimensions, EquipmentCategory, EquipmentRecord};

type Row = (&'static str, &'static str, u64, f64, [f64; 3], f64);

const FURNACES: &[Row] = &[
    // Standard efficiency (80% AFUE)
    ("Goodman", "GM9C800603AN", 60_000, 80.0, [33.0, 17.5, 28.0], 1200.0),
    ("Goodman", "GM9C800804BN", 80_000, 80.0, [33.0, 21.0, 28.0], 1400.0),
    ("Goodman", "GM9C801005CN", 100_000, 80.0, [33.0, 21.0, 28.0], 1600.0),
    // High efficiency (96% AFUE)
    ("Goodman", "GMVC960603BN", 60_000, 96.0, [34.5, 17.5, 29.5], 2200.0),
    ("Goodman", "GMVC960804CN", 80_000, 96.0, [34.5, 21.0, 29.5], 2500.0),
    ("Goodman", "GMVC961005CN", 100_000, 96.0, [34.5, 21.0, 29.5], 2800.0),
    // Premium
    ("Carrier", "59MN7A060F17", 60_000, 98.5, [35.0, 17.5, 30.0], 3500.0),
    ("Carrier", "59MN7A080F21", 80_000, 98.5, [35.0, 21.0, 30.0], 3800.0),
    ("Trane", "S9V2C100D5", 100_000, 97.0, [35.0, 21.0, 30.0], 4200.0),
];

const CONDENSERS: &[Row] = &[
    ("Goodman", "GSX130241", 24_000, 13.0, [26.0, 26.0, 28.0], 1100.0),
    ("Goodman", "GSX140241", 24_000, 14.0, [26.0, 26.0, 28.0], 1300.0),
    ("Goodman", "GSXC160241", 24_000, 16.0, [29.0, 29.0, 30.0], 2100.0),
    ("Goodman", "GSX130361", 36_000, 13.0, [29.0, 29.0, 30.0], 1400.0),
    ("Goodman", "GSX140361", 36_000, 14.0, [29.0, 29.0, 30.0], 1700.0),
    ("Goodman", "GSXC160361", 36_000, 16.0, [35.0, 35.0, 36.0], 2600.0),
    ("Goodman", "GSX130481", 48_000, 13.0, [35.0, 35.0, 36.0], 1700.0),
    ("Goodman", "GSX140481", 48_000, 14.0, [35.0, 35.0, 36.0], 2100.0),
    ("Carrier", "24ACC448", 48_000, 17.0, [35.0, 35.0, 39.0], 3200.0),
    ("Goodman", "GSX130601", 60_000, 13.0, [35.0, 35.0, 41.0], 2000.0),
    ("Goodman", "GSX140601", 60_000, 14.0, [35.0, 35.0, 41.0], 2400.0),
    ("Trane", "4TTR6060", 60_000, 16.0, [37.0, 37.0, 43.0], 3800.0),
];

const COILS: &[Row] = &[
    ("Goodman", "CAPF3030A6", 24_000, 0.0, [21.0, 17.5, 14.0], 450.0),
    ("Goodman", "CHPF3030A6", 24_000, 0.0, [21.0, 17.5, 14.0], 500.0),
    ("Goodman", "CAPF3636A6", 36_000, 0.0, [21.0, 17.5, 17.5], 550.0),
    ("Goodman", "CAPF3636C6", 36_000, 0.0, [24.5, 21.0, 17.5], 600.0),
    ("Goodman", "CHPF3636C6", 36_000, 0.0, [24.5, 21.0, 17.5], 650.0),
    ("Goodman", "CAPF4860C6", 48_000, 0.0, [24.5, 21.0, 21.0], 700.0),
    ("Goodman", "CHPF4860C6", 48_000, 0.0, [24.5, 21.0, 21.0], 750.0),
    ("Goodman", "CAPF6124D6", 60_000, 0.0, [24.5, 21.0, 24.5], 850.0),
    ("Goodman", "CHPF6124D6", 60_000, 0.0, [24.5, 21.0, 24.5], 900.0),
];

fn build(category: EquipmentCategory, rows: &[Row]) -> impl Iterator<Item = EquipmentRecord> + '_ {
    rows.iter().map(move |&(manufacturer, model, btu, efficiency, [l, w, h], price)| {
        // Coils carry no efficiency rating
        let efficiency = (efficiency > 0.0).then_some(efficiency);
        EquipmentRecord::new(
            category,
            manufacturer,
            model,
            btu,
            efficiency,
            Dimensions::new(l, w, h),
            price,
        )
    })
}

/// The standard catalog loaded by `hvac-sizing seed`
pub fn default_catalog() -> Vec<EquipmentRecord> {
    build(EquipmentCategory::Furnace, FURNACES)
        .chain(build(EquipmentCategory::OutdoorCondenser, CONDENSERS))
        .chain(build(EquipmentCategory::EvaporatorCoil, COILS))
        .collect()
}
