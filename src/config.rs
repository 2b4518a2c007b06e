// ⚙️ Configuration - environment variables (+ optional .env file)

use crate::matcher::{MatchPolicy, MissingFieldPolicy, WidthSelection, STANDARD_CABINET_WIDTH};
use crate::service::AreaBounds;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub policy: MatchPolicy,
    pub area_bounds: AreaBounds,
}

impl Config {
    /// Read configuration from the process environment, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("Failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let width = match get("HVAC_CABINET_WIDTH") {
            None => WidthSelection::Fixed(STANDARD_CABINET_WIDTH),
            Some(v) if v.eq_ignore_ascii_case("all") => WidthSelection::Observed,
            Some(v) => {
                let width: f64 = parse_value("HVAC_CABINET_WIDTH", &v)?;
                if !width.is_finite() || width <= 0.0 {
                    bail!("HVAC_CABINET_WIDTH must be a positive width, got {}", v);
                }
                WidthSelection::Fixed(width)
            }
        };

        let missing_fields = match get("HVAC_MISSING_FIELDS").as_deref() {
            None | Some("placeholder") => MissingFieldPolicy::Placeholder,
            Some("exclude") => MissingFieldPolicy::Exclude,
            Some(other) => bail!(
                "HVAC_MISSING_FIELDS must be 'placeholder' or 'exclude', got '{}'",
                other
            ),
        };

        let policy = MatchPolicy::new()
            .with_width(width)
            .with_all_capacities_in_band(
                get("HVAC_REQUIRE_ALL_CAPACITIES")
                    .map(|v| parse_value("HVAC_REQUIRE_ALL_CAPACITIES", &v))
                    .transpose()?
                    .unwrap_or(false),
            )
            .with_coil_tolerance(
                get("HVAC_COIL_TOLERANCE_BTU")
                    .map(|v| parse_value("HVAC_COIL_TOLERANCE_BTU", &v))
                    .transpose()?,
            )
            .with_missing_fields(missing_fields);

        let defaults = AreaBounds::default();
        let area_bounds = AreaBounds {
            min_sq_ft: get("HVAC_MIN_SQFT")
                .map(|v| parse_value("HVAC_MIN_SQFT", &v))
                .transpose()?
                .unwrap_or(defaults.min_sq_ft),
            max_sq_ft: get("HVAC_MAX_SQFT")
                .map(|v| parse_value("HVAC_MAX_SQFT", &v))
                .transpose()?
                .unwrap_or(defaults.max_sq_ft),
        };
        if area_bounds.min_sq_ft <= 0 || area_bounds.min_sq_ft > area_bounds.max_sq_ft {
            bail!(
                "invalid floor area bounds {}..{}",
                area_bounds.min_sq_ft,
                area_bounds.max_sq_ft
            );
        }

        Ok(Config {
            db_path: get("HVAC_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("hvac.db")),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT")
                .map(|v| parse_value("PORT", &v))
                .transpose()?
                .unwrap_or(8080),
            policy,
            area_bounds,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value for {}: '{}'", key, value))
}
