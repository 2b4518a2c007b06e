// 🔧 Equipment Catalog Records
//
// One row of the equipment catalog: a furnace (primary heating unit), an
// outdoor condenser (outdoor heat-exchange unit) or an evaporator coil
// (indoor coil). Optional columns stay optional: a record with no width is
// never treated as width 0.

use crate::error::SizingError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ============================================================================
// EQUIPMENT CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    /// Primary heating unit
    Furnace,

    /// Outdoor heat-exchange unit
    OutdoorCondenser,

    /// Indoor coil, stacked on the furnace cabinet
    EvaporatorCoil,
}

impl EquipmentCategory {
    pub const ALL: [EquipmentCategory; 3] = [
        EquipmentCategory::Furnace,
        EquipmentCategory::OutdoorCondenser,
        EquipmentCategory::EvaporatorCoil,
    ];

    /// Storage / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Furnace => "furnace",
            EquipmentCategory::OutdoorCondenser => "outdoor_condenser",
            EquipmentCategory::EvaporatorCoil => "evaporator_coil",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EquipmentCategory::Furnace => "Furnace",
            EquipmentCategory::OutdoorCondenser => "Outdoor Condenser",
            EquipmentCategory::EvaporatorCoil => "Evaporator Coil",
        }
    }
}

impl std::str::FromStr for EquipmentCategory {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "furnace" => Ok(EquipmentCategory::Furnace),
            "outdoor_condenser" => Ok(EquipmentCategory::OutdoorCondenser),
            "evaporator_coil" => Ok(EquipmentCategory::EvaporatorCoil),
            other => Err(SizingError::invalid(format!(
                "unknown equipment type '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DIMENSIONS
// ============================================================================

/// Physical footprint in inches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Dimensions {
            length: Some(length),
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Cabinet width rounded to hundredths of an inch.
///
/// Two cabinets are the same width exactly when their keys are equal. The
/// SQLite width query computes the same key with `ROUND(width * 100)`.
pub fn width_key(width: f64) -> i64 {
    (width * 100.0).round() as i64
}

pub fn widths_match(a: f64, b: f64) -> bool {
    width_key(a) == width_key(b)
}

// ============================================================================
// EQUIPMENT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: Uuid,
    pub category: EquipmentCategory,

    /// Nominal capacity in BTU. For coils this is the matched tonnage × 12000.
    pub capacity_btu: Option<u64>,

    /// AFUE for furnaces, SEER for condensers, absent for coils
    pub efficiency: Option<f64>,

    pub dimensions: Dimensions,
    pub price: f64,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
}

impl EquipmentRecord {
    /// Fully-populated record with a fresh UUID
    pub fn new(
        category: EquipmentCategory,
        manufacturer: &str,
        model_number: &str,
        capacity_btu: u64,
        efficiency: Option<f64>,
        dimensions: Dimensions,
        price: f64,
    ) -> Self {
        EquipmentRecord {
            id: Uuid::new_v4(),
            category,
            capacity_btu: Some(capacity_btu),
            efficiency,
            dimensions,
            price,
            manufacturer: Some(manufacturer.to_string()),
            model_number: Some(model_number.to_string()),
        }
    }

    pub fn width(&self) -> Option<f64> {
        self.dimensions.width
    }

    /// Manufacturer and model both present and non-blank
    pub fn has_display_fields(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.manufacturer) && present(&self.model_number)
    }

    /// Catalog deduplication key (category + manufacturer + model)
    /// NOTE: This is for DEDUPLICATION, not IDENTITY!
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}",
            self.category.as_str(),
            self.manufacturer.as_deref().unwrap_or_default().trim().to_lowercase(),
            self.model_number.as_deref().unwrap_or_default().trim().to_lowercase(),
        ));
        format!("{:x}", hasher.finalize())
    }

    /// Check the record invariants: non-negative price and dimensions
    pub fn validate(&self) -> Result<(), SizingError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SizingError::invalid(format!(
                "{} {}: price {} must be a non-negative amount",
                self.category,
                self.model_number.as_deref().unwrap_or("<no model>"),
                self.price
            )));
        }

        let dims = [
            ("length", self.dimensions.length),
            ("width", self.dimensions.width),
            ("height", self.dimensions.height),
        ];
        for (name, value) in dims {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(SizingError::invalid(format!(
                        "{} {}: {} {} must be non-negative",
                        self.category,
                        self.model_number.as_deref().unwrap_or("<no model>"),
                        name,
                        v
                    )));
                }
            }
        }

        if let Some(eff) = self.efficiency {
            if !eff.is_finite() || eff < 0.0 {
                return Err(SizingError::invalid(format!(
                    "{}: efficiency {} must be non-negative",
                    self.category, eff
                )));
            }
        }

        Ok(())
    }
}
