// HVAC Sizing - REST API (axum)
//
//   POST /api/calculate          floor area → stored lead + capacity band
//   GET  /api/systems/:lead_id   lead → compatible, priced system bundles
//   GET  /api/health

use crate::config::Config;
use crate::equipment::EquipmentRecord;
use crate::error::SizingError;
use crate::leads::{Lead, LeadRequest};
use crate::matcher::{MatchPolicy, SystemBundle};
use crate::service::{self, AreaBounds};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    policy: MatchPolicy,
    area_bounds: AreaBounds,
}

impl AppState {
    pub fn new(conn: Connection, policy: MatchPolicy, area_bounds: AreaBounds) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            policy,
            area_bounds,
        }
    }

    pub fn from_config(conn: Connection, config: &Config) -> Self {
        Self::new(conn, config.policy.clone(), config.area_bounds)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::internal("database connection lock poisoned"))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<SizingError> for ApiError {
    fn from(err: SizingError) -> Self {
        match err {
            SizingError::InvalidInput(message) => Self::bad_request(message),
            SizingError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: "Lead not found".to_string(),
            },
            SizingError::Collaborator(e) => {
                tracing::error!(error = ?e, "collaborator failure");
                Self::internal("Internal server error")
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub lead_id: Uuid,
    pub square_footage: i64,
    pub min_btu: u64,
    pub max_btu: u64,
    pub min_tons: f64,
    pub max_tons: f64,
}

impl From<&Lead> for CalculateResponse {
    fn from(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id,
            square_footage: lead.request.square_footage,
            min_btu: lead.band.min_btu(),
            max_btu: lead.band.max_btu(),
            min_tons: lead.band.min_tons(),
            max_tons: lead.band.max_tons(),
        }
    }
}

/// A single piece of equipment as shown to the customer
#[derive(Debug, Serialize, Deserialize)]
pub struct EquipmentPiece {
    pub manufacturer: String,
    pub model_number: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btu: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

impl EquipmentPiece {
    fn new(record: &EquipmentRecord, suffix: Option<String>) -> Self {
        let model = [
            record.manufacturer.as_deref(),
            record.model_number.as_deref(),
            suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Self {
            manufacturer: record.manufacturer.clone().unwrap_or_default(),
            model_number: record.model_number.clone().unwrap_or_default(),
            model,
            btu: record.capacity_btu,
            efficiency: record.efficiency,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemResponse {
    pub furnace: EquipmentPiece,
    pub condenser: EquipmentPiece,
    pub coil: EquipmentPiece,
    pub cabinet_width: f64,
    pub total_price: f64,
}

impl From<&SystemBundle> for SystemResponse {
    fn from(bundle: &SystemBundle) -> Self {
        Self {
            furnace: EquipmentPiece::new(&bundle.furnace, None),
            condenser: EquipmentPiece::new(&bundle.condenser, bundle.condenser_tonnage_label()),
            coil: EquipmentPiece::new(&bundle.coil, Some("Coil".to_string())),
            cabinet_width: bundle.cabinet_width,
            total_price: bundle.total_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemsResponse {
    pub lead_id: Uuid,
    pub systems: Vec<SystemResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/calculate
async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected calculate body");
        ApiError::bad_request("Invalid request body")
    })?;

    let lead = create_lead(&state, request)?;
    Ok(Json(CalculateResponse::from(&lead)))
}

fn create_lead(state: &AppState, request: LeadRequest) -> Result<Lead, ApiError> {
    let conn = state.conn()?;
    Ok(service::calculate(&*conn, request, &state.area_bounds)?)
}

/// GET /api/systems/:lead_id
async fn systems(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<SystemsResponse>, ApiError> {
    let lead_id = Uuid::parse_str(&lead_id).map_err(|_| ApiError::bad_request("Invalid lead ID"))?;
    let response = systems_for_lead(&state, lead_id)?;
    Ok(Json(response))
}

fn systems_for_lead(state: &AppState, lead_id: Uuid) -> Result<SystemsResponse, ApiError> {
    let conn = state.conn()?;
    let (lead, bundles) = service::compatible_systems(&*conn, &*conn, &lead_id, &state.policy)?;

    Ok(SystemsResponse {
        lead_id: lead.id,
        systems: bundles.iter().map(SystemResponse::from).collect(),
    })
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/calculate", post(calculate))
        .route("/systems/:lead_id", get(systems))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{Dimensions, EquipmentCategory};
    use crate::load::CapacityBand;
    use crate::matcher::match_bundles;

    #[test]
    fn test_condenser_and_coil_labels() {
        let furnace = EquipmentRecord::new(
            EquipmentCategory::Furnace,
            "Goodman",
            "GM9C800804BN",
            80_000,
            Some(80.0),
            Dimensions::new(33.0, 21.0, 28.0),
            1400.0,
        );
        let condenser = EquipmentRecord::new(
            EquipmentCategory::OutdoorCondenser,
            "Goodman",
            "GSX130361",
            36_000,
            Some(13.0),
            Dimensions::new(29.0, 29.0, 30.0),
            1400.0,
        );
        let coil = EquipmentRecord::new(
            EquipmentCategory::EvaporatorCoil,
            "Goodman",
            "CAPF3636C6",
            36_000,
            None,
            Dimensions::new(24.5, 21.0, 17.5),
            600.0,
        );

        let band = CapacityBand::new(36_000, 36_000).unwrap();
        let bundles = match_bundles(&band, &[furnace], &[condenser], &[coil], &MatchPolicy::new());
        let response = SystemResponse::from(&bundles[0]);

        assert_eq!(response.furnace.model, "Goodman GM9C800804BN");
        assert_eq!(response.furnace.efficiency, Some(80.0));
        assert_eq!(response.condenser.model, "Goodman GSX130361 3.0 ton");
        assert_eq!(response.condenser.efficiency, Some(13.0));
        assert_eq!(response.coil.model, "Goodman CAPF3636C6 Coil");
        assert_eq!(response.coil.efficiency, None);
        assert_eq!(response.total_price, 3400.0);
    }

    #[test]
    fn test_missing_manufacturer_renders_empty() {
        let mut coil = EquipmentRecord::new(
            EquipmentCategory::EvaporatorCoil,
            "Goodman",
            "CAPF3636C6",
            36_000,
            None,
            Dimensions::new(24.5, 21.0, 17.5),
            600.0,
        );
        coil.manufacturer = None;

        let piece = EquipmentPiece::new(&coil, Some("Coil".to_string()));
        assert_eq!(piece.manufacturer, "");
        assert_eq!(piece.model, "CAPF3636C6 Coil");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::from(SizingError::invalid("bad")).status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(SizingError::NotFound(Uuid::nil())).status, StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(SizingError::Collaborator(anyhow::anyhow!("disk full"))).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
