// 🧩 Compatibility Matcher - assemble priced three-piece system bundles
//
// A bundle is one furnace + one outdoor condenser + one evaporator coil:
//   - furnace width == coil width (the coil stacks on the furnace cabinet)
//   - condenser capacity inside the capacity band
//   - total price = sum of the three unit prices
//
// Results are sorted by total price, then furnace/condenser/coil model, then id.

use crate::equipment::{width_key, widths_match, EquipmentCategory, EquipmentRecord};
use crate::error::SizingError;
use crate::load::{btu_to_tons, tonnage_label, CapacityBand};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Standard residential furnace cabinet width (inches)
pub const STANDARD_CABINET_WIDTH: f64 = 21.0;

// ============================================================================
// CATALOG ACCESS
// ============================================================================

/// Read access to an equipment catalog snapshot
///
/// Implemented for plain slices (in-memory catalogs) and for
/// `rusqlite::Connection` in `db`.
pub trait CatalogSource {
    fn list_by_category(&self, category: EquipmentCategory) -> Result<Vec<EquipmentRecord>>;

    /// Records of a category whose width matches `width`; records with no
    /// width never match
    fn list_by_category_and_width(
        &self,
        category: EquipmentCategory,
        width: f64,
    ) -> Result<Vec<EquipmentRecord>> {
        Ok(self
            .list_by_category(category)?
            .into_iter()
            .filter(|r| r.width().is_some_and(|w| widths_match(w, width)))
            .collect())
    }
}

impl CatalogSource for [EquipmentRecord] {
    fn list_by_category(&self, category: EquipmentCategory) -> Result<Vec<EquipmentRecord>> {
        Ok(self.iter().filter(|r| r.category == category).cloned().collect())
    }
}

impl CatalogSource for Vec<EquipmentRecord> {
    fn list_by_category(&self, category: EquipmentCategory) -> Result<Vec<EquipmentRecord>> {
        self.as_slice().list_by_category(category)
    }
}

// ============================================================================
// MATCH POLICY
// ============================================================================

/// Which cabinet widths furnaces and coils are paired on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WidthSelection {
    /// A single nominal width (inches)
    Fixed(f64),

    /// Every width present among both furnaces and coils
    Observed,
}

/// What to do with records missing manufacturer or model number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingFieldPolicy {
    /// Keep the record; display fields render as empty strings
    Placeholder,

    /// Drop the record from the candidate set
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    pub width: WidthSelection,

    /// Also require furnace and coil capacities to lie in the band
    /// (default: only the condenser is range-checked)
    pub require_all_capacities_in_band: bool,

    /// When set, coil and condenser capacities must agree within this many BTU
    pub coil_tolerance_btu: Option<u64>,

    pub missing_fields: MissingFieldPolicy,
}

impl MatchPolicy {
    pub fn new() -> Self {
        MatchPolicy {
            width: WidthSelection::Fixed(STANDARD_CABINET_WIDTH),
            require_all_capacities_in_band: false,
            coil_tolerance_btu: None,
            missing_fields: MissingFieldPolicy::Placeholder,
        }
    }

    pub fn with_width(mut self, width: WidthSelection) -> Self {
        self.width = width;
        self
    }

    pub fn with_all_capacities_in_band(mut self, required: bool) -> Self {
        self.require_all_capacities_in_band = required;
        self
    }

    pub fn with_coil_tolerance(mut self, tolerance_btu: Option<u64>) -> Self {
        self.coil_tolerance_btu = tolerance_btu;
        self
    }

    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    fn keeps_display_fields(&self, record: &EquipmentRecord) -> bool {
        self.missing_fields == MissingFieldPolicy::Placeholder || record.has_display_fields()
    }

    fn capacity_in_band(&self, record: &EquipmentRecord, band: &CapacityBand) -> bool {
        !self.require_all_capacities_in_band
            || record.capacity_btu.is_some_and(|btu| band.contains(btu))
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SYSTEM BUNDLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBundle {
    pub furnace: EquipmentRecord,
    pub condenser: EquipmentRecord,
    pub coil: EquipmentRecord,

    /// Cabinet width shared by furnace and coil
    pub cabinet_width: f64,

    pub total_price: f64,
}

impl SystemBundle {
    fn new(furnace: &EquipmentRecord, condenser: &EquipmentRecord, coil: &EquipmentRecord, cabinet_width: f64) -> Self {
        SystemBundle {
            total_price: furnace.price + condenser.price + coil.price,
            furnace: furnace.clone(),
            condenser: condenser.clone(),
            coil: coil.clone(),
            cabinet_width,
        }
    }

    pub fn condenser_tons(&self) -> Option<f64> {
        self.condenser.capacity_btu.map(btu_to_tons)
    }

    /// "3.0 ton" style label for the condenser
    pub fn condenser_tonnage_label(&self) -> Option<String> {
        self.condenser.capacity_btu.map(tonnage_label)
    }
}

fn cmp_model(a: &EquipmentRecord, b: &EquipmentRecord) -> Ordering {
    a.model_number.cmp(&b.model_number)
}

fn cmp_bundles(a: &SystemBundle, b: &SystemBundle) -> Ordering {
    a.total_price
        .total_cmp(&b.total_price)
        .then_with(|| cmp_model(&a.furnace, &b.furnace))
        .then_with(|| cmp_model(&a.condenser, &b.condenser))
        .then_with(|| cmp_model(&a.coil, &b.coil))
        .then_with(|| a.furnace.id.cmp(&b.furnace.id))
        .then_with(|| a.condenser.id.cmp(&b.condenser.id))
        .then_with(|| a.coil.id.cmp(&b.coil.id))
}

// ============================================================================
// MATCHING
// ============================================================================

/// Find every compatible bundle for `band` in `catalog`
///
/// An empty catalog category or no surviving combination yields `Ok(vec![])`.
/// Catalog failures are returned as `SizingError::Collaborator`.
pub fn find_compatible_bundles<C>(
    band: &CapacityBand,
    catalog: &C,
    policy: &MatchPolicy,
) -> Result<Vec<SystemBundle>, SizingError>
where
    C: CatalogSource + ?Sized,
{
    let condensers = catalog.list_by_category(EquipmentCategory::OutdoorCondenser)?;

    let (furnaces, coils) = match policy.width {
        WidthSelection::Fixed(width) => (
            catalog.list_by_category_and_width(EquipmentCategory::Furnace, width)?,
            catalog.list_by_category_and_width(EquipmentCategory::EvaporatorCoil, width)?,
        ),
        WidthSelection::Observed => (
            catalog.list_by_category(EquipmentCategory::Furnace)?,
            catalog.list_by_category(EquipmentCategory::EvaporatorCoil)?,
        ),
    };

    Ok(match_bundles(band, &furnaces, &condensers, &coils, policy))
}

/// Pure matching over already-fetched candidate lists
pub fn match_bundles(
    band: &CapacityBand,
    furnaces: &[EquipmentRecord],
    condensers: &[EquipmentRecord],
    coils: &[EquipmentRecord],
    policy: &MatchPolicy,
) -> Vec<SystemBundle> {
    let condensers: Vec<&EquipmentRecord> = condensers
        .iter()
        .filter(|c| c.category == EquipmentCategory::OutdoorCondenser)
        .filter(|c| c.capacity_btu.is_some_and(|btu| band.contains(btu)))
        .filter(|c| policy.keeps_display_fields(c))
        .collect();

    let furnaces_by_width = group_by_width(furnaces, EquipmentCategory::Furnace, band, policy);
    let coils_by_width = group_by_width(coils, EquipmentCategory::EvaporatorCoil, band, policy);

    let widths: BTreeSet<i64> = match policy.width {
        WidthSelection::Fixed(width) => std::iter::once(width_key(width)).collect(),
        WidthSelection::Observed => furnaces_by_width
            .keys()
            .filter(|key| coils_by_width.contains_key(key))
            .copied()
            .collect(),
    };

    tracing::debug!(
        band = %band,
        condensers = condensers.len(),
        furnace_widths = furnaces_by_width.len(),
        coil_widths = coils_by_width.len(),
        "matching candidates"
    );

    let mut bundles = Vec::new();

    for key in widths {
        let (Some(width_furnaces), Some(width_coils)) =
            (furnaces_by_width.get(&key), coils_by_width.get(&key))
        else {
            continue;
        };
        let cabinet_width = key as f64 / 100.0;

        for furnace in width_furnaces {
            for condenser in &condensers {
                for coil in width_coils {
                    if !coil_matches_condenser(coil, condenser, policy) {
                        continue;
                    }
                    bundles.push(SystemBundle::new(furnace, condenser, coil, cabinet_width));
                }
            }
        }
    }

    bundles.sort_by(cmp_bundles);

    tracing::debug!(bundles = bundles.len(), "matching complete");
    bundles
}

/// Group stackable candidates by width key; records with no width are dropped
fn group_by_width<'a>(
    records: &'a [EquipmentRecord],
    category: EquipmentCategory,
    band: &CapacityBand,
    policy: &MatchPolicy,
) -> BTreeMap<i64, Vec<&'a EquipmentRecord>> {
    let mut groups: BTreeMap<i64, Vec<&EquipmentRecord>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.category == category) {
        let Some(width) = record.width() else {
            tracing::debug!(id = %record.id, category = %category, "skipping record without width");
            continue;
        };
        if !policy.keeps_display_fields(record) || !policy.capacity_in_band(record, band) {
            continue;
        }
        groups.entry(width_key(width)).or_default().push(record);
    }

    groups
}

fn coil_matches_condenser(coil: &EquipmentRecord, condenser: &EquipmentRecord, policy: &MatchPolicy) -> bool {
    let Some(tolerance) = policy.coil_tolerance_btu else {
        return true;
    };

    match (coil.capacity_btu, condenser.capacity_btu) {
        (Some(coil_btu), Some(condenser_btu)) => coil_btu.abs_diff(condenser_btu) <= tolerance,
        _ => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================
