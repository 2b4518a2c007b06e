// Caller-side orchestration around the pure engine:
//   calculate:           area bounds → capacity band → new lead
//   compatible_systems:  lead id → stored band → matched bundles

use crate::error::SizingError;
use crate::leads::{Lead, LeadRequest, LeadStore};
use crate::load::compute_capacity_band;
use crate::matcher::{find_compatible_bundles, CatalogSource, MatchPolicy, SystemBundle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Floor-area sanity bounds enforced before sizing (inclusive, sq ft)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub min_sq_ft: i64,
    pub max_sq_ft: i64,
}

impl AreaBounds {
    pub fn check(&self, square_footage: i64) -> Result<(), SizingError> {
        if square_footage < self.min_sq_ft || square_footage > self.max_sq_ft {
            return Err(SizingError::invalid(format!(
                "square footage must be between {} and {}, got {}",
                self.min_sq_ft, self.max_sq_ft, square_footage
            )));
        }
        Ok(())
    }
}

impl Default for AreaBounds {
    fn default() -> Self {
        AreaBounds {
            min_sq_ft: 500,
            max_sq_ft: 10_000,
        }
    }
}

/// Size a request and persist it as a new lead
pub fn calculate<S>(store: &S, request: LeadRequest, bounds: &AreaBounds) -> Result<Lead, SizingError>
where
    S: LeadStore + ?Sized,
{
    bounds.check(request.square_footage)?;
    let band = compute_capacity_band(request.square_footage)?;
    let lead = store.create_lead(request, band)?;
    Ok(lead)
}

/// Look up a lead and match its band against the catalog
pub fn compatible_systems<S, C>(
    store: &S,
    catalog: &C,
    lead_id: &Uuid,
    policy: &MatchPolicy,
) -> Result<(Lead, Vec<SystemBundle>), SizingError>
where
    S: LeadStore + ?Sized,
    C: CatalogSource + ?Sized,
{
    let lead = store
        .get_lead(lead_id)?
        .ok_or(SizingError::NotFound(*lead_id))?;

    let bundles = find_compatible_bundles(&lead.band, catalog, policy)?;
    tracing::info!(lead_id = %lead_id, band = %lead.band, systems = bundles.len(), "matched systems");

    Ok((lead, bundles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::MemoryLeadStore;
    use crate::seed::default_catalog;

    #[test]
    fn test_calculate_persists_band() {
        let store = MemoryLeadStore::new();
        let lead = calculate(&store, LeadRequest::new(2400), &AreaBounds::default()).unwrap();

        assert_eq!(lead.band.min_btu(), 48_000);
        assert_eq!(lead.band.max_btu(), 72_000);
        assert_eq!(store.get_lead(&lead.id).unwrap(), Some(lead));
    }

    #[test]
    fn test_calculate_enforces_bounds() {
        let store = MemoryLeadStore::new();

        for sq_ft in [0, 499, 10_001] {
            let err = calculate(&store, LeadRequest::new(sq_ft), &AreaBounds::default()).unwrap_err();
            assert!(matches!(err, SizingError::InvalidInput(_)));
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_compatible_systems_for_lead() {
        let store = MemoryLeadStore::new();
        let catalog = default_catalog();

        let lead = calculate(&store, LeadRequest::new(1500), &AreaBounds::default()).unwrap();
        let (found, bundles) =
            compatible_systems(&store, &catalog, &lead.id, &MatchPolicy::new()).unwrap();

        assert_eq!(found.id, lead.id);
        assert!(!bundles.is_empty());
        assert!(bundles
            .iter()
            .all(|b| lead.band.contains(b.condenser.capacity_btu.unwrap())));
    }

    #[test]
    fn test_unknown_lead_is_not_found() {
        let store = MemoryLeadStore::new();
        let id = Uuid::new_v4();

        let err = compatible_systems(&store, &default_catalog(), &id, &MatchPolicy::new()).unwrap_err();
        assert!(matches!(err, SizingError::NotFound(missing) if missing == id));
    }

    #[test]
    fn test_no_match_is_success() {
        let store = MemoryLeadStore::new();
        let empty: Vec<crate::equipment::EquipmentRecord> = Vec::new();

        let lead = calculate(&store, LeadRequest::new(1500), &AreaBounds::default()).unwrap();
        let (_, bundles) = compatible_systems(&store, &empty, &lead.id, &MatchPolicy::new()).unwrap();
        assert!(bundles.is_empty());
    }
}
