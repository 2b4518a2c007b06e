// 🌡️ Load Calculator - floor area → capacity band
// Industry heuristic: one 12,000 BTU ton serves 400-600 sq ft of floor area
//
// Both ends of the band are rounded UP to half-ton (6,000 BTU) granularity.

use crate::error::SizingError;
use serde::{Deserialize, Serialize};

/// 1 ton of nominal HVAC capacity
pub const BTU_PER_TON: u64 = 12_000;

/// Band granularity (half a ton)
pub const BAND_STEP_BTU: u64 = 6_000;

/// Most efficient end: largest area served per ton
pub const SQFT_PER_TON_MAX: u64 = 600;

/// Least efficient end: smallest area served per ton
pub const SQFT_PER_TON_MIN: u64 = 400;

// ============================================================================
// CAPACITY BAND
// ============================================================================

/// Inclusive BTU range equipment should be selected within
///
/// Only constructed through `new` or `compute_capacity_band`; deserialization
/// goes through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BandBounds")]
pub struct CapacityBand {
    min_btu: u64,
    max_btu: u64,
}

#[derive(Deserialize)]
struct BandBounds {
    min_btu: u64,
    max_btu: u64,
}

impl TryFrom<BandBounds> for CapacityBand {
    type Error = SizingError;

    fn try_from(bounds: BandBounds) -> Result<Self, Self::Error> {
        CapacityBand::new(bounds.min_btu, bounds.max_btu)
    }
}

impl CapacityBand {
    /// Build a band, checking that both bounds are positive half-ton multiples
    /// and correctly ordered
    pub fn new(min_btu: u64, max_btu: u64) -> Result<Self, SizingError> {
        for (name, value) in [("minimum", min_btu), ("maximum", max_btu)] {
            if value == 0 || value % BAND_STEP_BTU != 0 {
                return Err(SizingError::invalid(format!(
                    "{} BTU {} is not a positive multiple of {}",
                    name, value, BAND_STEP_BTU
                )));
            }
        }

        if min_btu > max_btu {
            return Err(SizingError::invalid(format!(
                "band minimum {} exceeds maximum {}",
                min_btu, max_btu
            )));
        }

        Ok(CapacityBand { min_btu, max_btu })
    }

    pub fn min_btu(&self) -> u64 {
        self.min_btu
    }

    pub fn max_btu(&self) -> u64 {
        self.max_btu
    }

    pub fn contains(&self, btu: u64) -> bool {
        btu >= self.min_btu && btu <= self.max_btu
    }

    pub fn min_tons(&self) -> f64 {
        btu_to_tons(self.min_btu)
    }

    pub fn max_tons(&self) -> f64 {
        btu_to_tons(self.max_btu)
    }
}

impl std::fmt::Display for CapacityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{} BTU ({:.1}-{:.1} ton)",
            self.min_btu,
            self.max_btu,
            self.min_tons(),
            self.max_tons()
        )
    }
}

pub fn btu_to_tons(btu: u64) -> f64 {
    btu as f64 / BTU_PER_TON as f64
}

/// Display label used for outdoor units, e.g. "3.0 ton"
pub fn tonnage_label(btu: u64) -> String {
    format!("{:.1} ton", btu_to_tons(btu))
}

fn round_up_to_step(btu: u64) -> u64 {
    btu.div_ceil(BAND_STEP_BTU) * BAND_STEP_BTU
}

// ============================================================================
// CALCULATION
// ============================================================================

/// Compute the capacity band for a floor area in square feet
///
/// Pure function. Sanity bounds on the area (e.g. 500-10000 sq ft) belong to
/// the caller; only non-positive or overflowing inputs are rejected here.
pub fn compute_capacity_band(floor_area_sq_ft: i64) -> Result<CapacityBand, SizingError> {
    if floor_area_sq_ft <= 0 {
        return Err(SizingError::invalid(format!(
            "floor area must be a positive integer, got {}",
            floor_area_sq_ft
        )));
    }

    let area = floor_area_sq_ft as u64;
    let scaled = area
        .checked_mul(BTU_PER_TON)
        .ok_or_else(|| SizingError::invalid(format!("floor area {} is too large", area)))?;

    let min_raw = scaled / SQFT_PER_TON_MAX;
    let max_raw = scaled / SQFT_PER_TON_MIN;

    Ok(CapacityBand {
        min_btu: round_up_to_step(min_raw),
        max_btu: round_up_to_step(max_raw),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2400_sq_ft_lands_on_exact_tons() {
        let band = compute_capacity_band(2400).unwrap();
        assert_eq!(band.min_btu, 48_000);
        assert_eq!(band.max_btu, 72_000);
        assert_eq!(band.min_tons(), 4.0);
        assert_eq!(band.max_tons(), 6.0);
    }

    #[test]
    fn test_1000_sq_ft_rounds_minimum_up() {
        let band = compute_capacity_band(1000).unwrap();
        assert_eq!(band, CapacityBand { min_btu: 24_000, max_btu: 30_000 });
    }

    #[test]
    fn test_tiny_area_rounds_to_half_ton() {
        let band = compute_capacity_band(1).unwrap();
        assert_eq!(band.min_btu, 6_000);
        assert_eq!(band.max_btu, 6_000);
    }

    #[test]
    fn test_non_positive_area_rejected() {
        assert!(matches!(compute_capacity_band(0), Err(SizingError::InvalidInput(_))));
        assert!(matches!(compute_capacity_band(-250), Err(SizingError::InvalidInput(_))));
    }

    #[test]
    fn test_overflowing_area_rejected() {
        assert!(matches!(
            compute_capacity_band(i64::MAX),
            Err(SizingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_band_properties_over_residential_range() {
        let mut previous: Option<CapacityBand> = None;

        for area in 1..=12_000 {
            let band = compute_capacity_band(area).unwrap();

            // Granularity
            assert!(band.min_btu > 0 && band.min_btu % BAND_STEP_BTU == 0, "area {}", area);
            assert!(band.max_btu > 0 && band.max_btu % BAND_STEP_BTU == 0, "area {}", area);

            // Ordering
            assert!(band.min_btu <= band.max_btu, "area {}", area);

            // Monotonicity
            if let Some(prev) = previous {
                assert!(prev.min_btu <= band.min_btu, "area {}", area);
                assert!(prev.max_btu <= band.max_btu, "area {}", area);
            }

            // Idempotence
            assert_eq!(band, compute_capacity_band(area).unwrap());

            previous = Some(band);
        }
    }

    #[test]
    fn test_band_new_validates() {
        assert!(CapacityBand::new(36_000, 36_000).is_ok());
        assert!(CapacityBand::new(0, 36_000).is_err());
        assert!(CapacityBand::new(35_000, 36_000).is_err());
        assert!(CapacityBand::new(48_000, 36_000).is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let band = CapacityBand::new(24_000, 30_000).unwrap();
        assert!(band.contains(24_000));
        assert!(band.contains(30_000));
        assert!(!band.contains(18_000));
        assert!(!band.contains(36_000));
    }

    #[test]
    fn test_tonnage_label() {
        assert_eq!(tonnage_label(36_000), "3.0 ton");
        assert_eq!(tonnage_label(30_000), "2.5 ton");
        assert_eq!(
            compute_capacity_band(1000).unwrap().to_string(),
            "24000-30000 BTU (2.0-2.5 ton)"
        );
    }

    #[test]
    fn test_deserialize_checks_band() {
        let band: CapacityBand = serde_json::from_str(r#"{"min_btu":24000,"max_btu":30000}"#).unwrap();
        assert_eq!(band, CapacityBand::new(24_000, 30_000).unwrap());

        for bad in [
            r#"{"min_btu":30000,"max_btu":24000}"#,
            r#"{"min_btu":0,"max_btu":6000}"#,
            r#"{"min_btu":6000,"max_btu":7000}"#,
        ] {
            assert!(serde_json::from_str::<CapacityBand>(bad).is_err(), "{}", bad);
        }
    }
}
