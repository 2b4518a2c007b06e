use crate::equipment::{width_key, Dimensions, EquipmentCategory, EquipmentRecord};
use crate::leads::{Lead, LeadRequest, LeadStore};
use crate::load::CapacityBand;
use crate::matcher::CatalogSource;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

const EQUIPMENT_COLUMNS: &str = "equipment_uuid, equipment_type, manufacturer, model_number, btu,
                efficiency_rating, equipment_length, equipment_width, equipment_height, price";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Equipment catalog
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_uuid TEXT UNIQUE NOT NULL,
            idempotency_hash TEXT UNIQUE NOT NULL,
            equipment_type TEXT NOT NULL
                CHECK (equipment_type IN ('furnace', 'outdoor_condenser', 'evaporator_coil')),
            manufacturer TEXT,
            model_number TEXT,
            btu INTEGER CHECK (btu IS NULL OR btu >= 0),
            efficiency_rating REAL,
            equipment_length REAL,
            equipment_width REAL,
            equipment_height REAL,
            price REAL NOT NULL CHECK (price >= 0),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Leads (one per sizing request, write-once)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            form_data TEXT NOT NULL,
            square_footage INTEGER NOT NULL,
            needed_min_btu INTEGER NOT NULL,
            needed_max_btu INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_equipment_type_width ON equipment(equipment_type, equipment_width)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_equipment_type_btu ON equipment(equipment_type, btu)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// CATALOG IMPORT
// ============================================================================

/// One CSV row of a catalog file. Blank cells are absent values.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    manufacturer: Option<String>,
    model_number: Option<String>,
    equipment_type: String,
    btu: Option<u64>,
    efficiency_rating: Option<f64>,
    length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    price: f64,
}

impl CatalogRow {
    fn into_record(self) -> Result<EquipmentRecord> {
        let category: EquipmentCategory = self.equipment_type.parse()?;
        let blank_to_none = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(EquipmentRecord {
            id: Uuid::new_v4(),
            category,
            // Zero means "not rated" in supplier sheets
            capacity_btu: self.btu.filter(|btu| *btu > 0),
            efficiency: self.efficiency_rating.filter(|e| *e > 0.0),
            dimensions: Dimensions {
                length: self.length,
                width: self.width,
                height: self.height,
            },
            price: self.price,
            manufacturer: blank_to_none(self.manufacturer),
            model_number: blank_to_none(self.model_number),
        })
    }
}

/// Read catalog records from CSV
/// (manufacturer,model_number,equipment_type,btu,efficiency_rating,length,width,height,price)
pub fn read_catalog_csv<R: Read>(reader: R) -> Result<Vec<EquipmentRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (line, result) in rdr.deserialize::<CatalogRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to deserialize catalog row {}", line + 1))?;
        let record = row
            .into_record()
            .with_context(|| format!("Invalid catalog row {}", line + 1))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_catalog_csv(csv_path: &Path) -> Result<Vec<EquipmentRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open catalog CSV: {:?}", csv_path))?;
    read_catalog_csv(file)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Insert catalog records, skipping ones already present (same category,
/// manufacturer and model) and ones that fail validation
pub fn insert_equipment(conn: &Connection, records: &[EquipmentRecord]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in records {
        if let Err(e) = record.validate() {
            tracing::warn!(error = %e, "rejecting catalog record");
            summary.rejected += 1;
            continue;
        }

        let btu = record.capacity_btu.map(i64::try_from).transpose()?;

        let result = conn.execute(
            "INSERT INTO equipment (
                equipment_uuid, idempotency_hash, equipment_type, manufacturer, model_number,
                btu, efficiency_rating, equipment_length, equipment_width, equipment_height, price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id.to_string(),
                record.compute_idempotency_hash(),
                record.category.as_str(),
                record.manufacturer,
                record.model_number,
                btu,
                record.efficiency,
                record.dimensions.length,
                record.dimensions.width,
                record.dimensions.height,
                record.price,
            ],
        );

        match result {
            Ok(_) => {
                summary.inserted += 1;
                tracing::debug!(
                    category = %record.category,
                    model = record.model_number.as_deref().unwrap_or_default(),
                    "inserted equipment"
                );
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                summary.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        "catalog import complete"
    );

    Ok(summary)
}

// ============================================================================
// CATALOG QUERIES
// ============================================================================

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_equipment(row: &Row) -> rusqlite::Result<EquipmentRecord> {
    let uuid_str: String = row.get(0)?;
    let type_str: String = row.get(1)?;
    let btu: Option<i64> = row.get(4)?;

    Ok(EquipmentRecord {
        id: Uuid::parse_str(&uuid_str).map_err(|e| conversion_error(0, e))?,
        category: type_str.parse().map_err(|e| conversion_error(1, e))?,
        manufacturer: row.get(2)?,
        model_number: row.get(3)?,
        capacity_btu: btu
            .map(u64::try_from)
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?,
        efficiency: row.get(5)?,
        dimensions: Dimensions {
            length: row.get(6)?,
            width: row.get(7)?,
            height: row.get(8)?,
        },
        price: row.get(9)?,
    })
}

pub fn get_equipment_by_category(
    conn: &Connection,
    category: EquipmentCategory,
) -> Result<Vec<EquipmentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM equipment WHERE equipment_type = ?1 ORDER BY id",
        EQUIPMENT_COLUMNS
    ))?;

    let records = stmt
        .query_map(params![category.as_str()], row_to_equipment)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read {} records", category))?;

    Ok(records)
}

/// Records of a category with the given cabinet width (rows without a width never match)
pub fn get_equipment_by_category_and_width(
    conn: &Connection,
    category: EquipmentCategory,
    width: f64,
) -> Result<Vec<EquipmentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM equipment
         WHERE equipment_type = ?1
           AND equipment_width IS NOT NULL
           AND CAST(ROUND(equipment_width * 100) AS INTEGER) = ?2
         ORDER BY id",
        EQUIPMENT_COLUMNS
    ))?;

    let records = stmt
        .query_map(params![category.as_str(), width_key(width)], row_to_equipment)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read {} records of width {}", category, width))?;

    Ok(records)
}

impl CatalogSource for Connection {
    fn list_by_category(&self, category: EquipmentCategory) -> Result<Vec<EquipmentRecord>> {
        get_equipment_by_category(self, category)
    }

    fn list_by_category_and_width(
        &self,
        category: EquipmentCategory,
        width: f64,
    ) -> Result<Vec<EquipmentRecord>> {
        get_equipment_by_category_and_width(self, category, width)
    }
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))?;

    Ok(count)
}

/// Equipment counts per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: EquipmentCategory,
    pub count: i64,
    pub min_price: f64,
    pub max_price: f64,
}

pub fn catalog_stats(conn: &Connection) -> Result<Vec<CategoryStat>> {
    let mut stmt = conn.prepare(
        "SELECT equipment_type, COUNT(*), MIN(price), MAX(price)
         FROM equipment
         GROUP BY equipment_type
         ORDER BY equipment_type",
    )?;

    let stats = stmt
        .query_map([], |row| {
            let type_str: String = row.get(0)?;
            Ok(CategoryStat {
                category: type_str.parse().map_err(|e| conversion_error(0, e))?,
                count: row.get(1)?,
                min_price: row.get(2)?,
                max_price: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stats)
}

// ============================================================================
// LEADS
// ============================================================================

pub fn insert_lead(conn: &Connection, lead: &Lead) -> Result<()> {
    let form_json = serde_json::to_string(&lead.form_data())?;

    conn.execute(
        "INSERT INTO leads (
            id, form_data, square_footage, needed_min_btu, needed_max_btu, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            lead.id.to_string(),
            form_json,
            lead.request.square_footage,
            i64::try_from(lead.band.min_btu())?,
            i64::try_from(lead.band.max_btu())?,
            lead.created_at.to_rfc3339(),
        ],
    )?;

    tracing::info!(lead_id = %lead.id, band = %lead.band, "lead stored");
    Ok(())
}

/// Fetch a lead; `Ok(None)` when the id is unknown
pub fn get_lead(conn: &Connection, id: &Uuid) -> Result<Option<Lead>> {
    let row = conn
        .query_row(
            "SELECT form_data, needed_min_btu, needed_max_btu, created_at
             FROM leads WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((form_json, min_btu, max_btu, created_at)) = row else {
        return Ok(None);
    };

    let request: LeadRequest = serde_json::from_str(&form_json)
        .with_context(|| format!("Corrupt form data for lead {}", id))?;

    // A stored band that breaks the band invariants is corrupt, never repaired
    let band = CapacityBand::new(u64::try_from(min_btu)?, u64::try_from(max_btu)?)
        .map_err(|e| anyhow!("Corrupt capacity band for lead {}: {}", id, e))?;

    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .with_context(|| format!("Corrupt timestamp for lead {}", id))?
        .with_timezone(&Utc);

    Ok(Some(Lead {
        id: *id,
        request,
        band,
        created_at,
    }))
}

impl LeadStore for Connection {
    fn create_lead(&self, request: LeadRequest, band: CapacityBand) -> Result<Lead> {
        let lead = Lead::new(request, band);
        insert_lead(self, &lead)?;
        Ok(lead)
    }

    fn get_lead(&self, id: &Uuid) -> Result<Option<Lead>> {
        get_lead(self, id)
    }
}
