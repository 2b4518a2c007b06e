// 📇 Leads - one stored sizing request and its capacity band
//
// A lead is written once when the band is calculated and read back when the
// matching systems are requested. There is no update or delete path.

use crate::load::CapacityBand;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

// ============================================================================
// LEAD REQUEST / LEAD
// ============================================================================

/// Form data submitted with a sizing request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRequest {
    pub square_footage: i64,

    #[serde(default)]
    pub current_system: Option<String>,

    #[serde(default)]
    pub home_age: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra_data: HashMap<String, serde_json::Value>,
}

impl LeadRequest {
    pub fn new(square_footage: i64) -> Self {
        LeadRequest {
            square_footage,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Stable identity, generated by the store
    pub id: Uuid,
    pub request: LeadRequest,
    pub band: CapacityBand,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(request: LeadRequest, band: CapacityBand) -> Self {
        Lead {
            id: Uuid::new_v4(),
            request,
            band,
            created_at: Utc::now(),
        }
    }

    /// Form data as stored alongside the band
    pub fn form_data(&self) -> serde_json::Value {
        serde_json::json!({
            "square_footage": self.request.square_footage,
            "current_system": self.request.current_system,
            "home_age": self.request.home_age,
            "extra_data": self.request.extra_data,
            "timestamp": self.created_at.to_rfc3339(),
        })
    }
}

// ============================================================================
// LEAD STORE
// ============================================================================

/// Persistence for leads. `get_lead` returns `Ok(None)` for an unknown id so
/// absence is distinguishable from a storage failure.
pub trait LeadStore {
    fn create_lead(&self, request: LeadRequest, band: CapacityBand) -> Result<Lead>;

    fn get_lead(&self, id: &Uuid) -> Result<Option<Lead>>;
}

/// In-process lead store
#[derive(Clone, Default)]
pub struct MemoryLeadStore {
    leads: Arc<RwLock<HashMap<Uuid, Lead>>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let leads = self
            .leads
            .read()
            .map_err(|_| anyhow!("lead store lock poisoned"))?;
        Ok(leads.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl LeadStore for MemoryLeadStore {
    fn create_lead(&self, request: LeadRequest, band: CapacityBand) -> Result<Lead> {
        let lead = Lead::new(request, band);
        let mut leads = self
            .leads
            .write()
            .map_err(|_| anyhow!("lead store lock poisoned"))?;
        leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    fn get_lead(&self, id: &Uuid) -> Result<Option<Lead>> {
        let leads = self
            .leads
            .read()
            .map_err(|_| anyhow!("lead store lock poisoned"))?;
        Ok(leads.get(id).cloned())
    }
}
