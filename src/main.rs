use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use hvac_sizing::{
    catalog_stats, compute_capacity_band, default_catalog, find_compatible_bundles,
    insert_equipment, load_catalog_csv, setup_database, verify_count, Config,
};

const USAGE: &str = "\
Usage:
  hvac-sizing seed [catalog.csv]   Load the default catalog (or a CSV catalog)
  hvac-sizing size <sq_ft>         Print the capacity band for a floor area
  hvac-sizing systems <sq_ft>      List compatible systems for a floor area
  hvac-sizing lead <lead_id>       Show a stored lead and its systems
  hvac-sizing stats                Equipment counts by type";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hvac_sizing=info,warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("seed") => run_seed(&config, args.get(2).map(Path::new)),
        Some("size") => run_size(args.get(2)),
        Some("systems") => run_systems(&config, args.get(2)),
        Some("lead") => run_lead(&config, args.get(2)),
        Some("stats") => run_stats(&config),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn open_database(config: &Config) -> Result<Connection> {
    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn parse_area(arg: Option<&String>) -> Result<i64> {
    let Some(raw) = arg else {
        bail!("missing floor area\n\n{}", USAGE);
    };
    raw.parse()
        .with_context(|| format!("floor area must be an integer, got '{}'", raw))
}

fn run_seed(config: &Config, csv_path: Option<&Path>) -> Result<()> {
    let records = match csv_path {
        Some(path) => load_catalog_csv(path)?,
        None => default_catalog(),
    };
    println!("📂 Loaded {} catalog records", records.len());

    let conn = open_database(config)?;
    let summary = insert_equipment(&conn, &records)?;

    println!("✓ Inserted: {}", summary.inserted);
    println!("✓ Skipped duplicates: {}", summary.duplicates);
    if summary.rejected > 0 {
        println!("⚠ Rejected: {}", summary.rejected);
    }
    println!("✓ Catalog contains {} records", verify_count(&conn)?);

    Ok(())
}

fn run_size(arg: Option<&String>) -> Result<()> {
    let area = parse_area(arg)?;
    let band = compute_capacity_band(area)?;

    println!("{} sq ft → {}", area, band);
    Ok(())
}

fn run_systems(config: &Config, arg: Option<&String>) -> Result<()> {
    let area = parse_area(arg)?;
    config.area_bounds.check(area)?;
    let band = compute_capacity_band(area)?;

    let conn = open_database(config)?;
    let bundles = find_compatible_bundles(&band, &conn, &config.policy)?;

    println!("{} sq ft → {}", area, band);
    print_bundles(&bundles);
    Ok(())
}

fn run_lead(config: &Config, arg: Option<&String>) -> Result<()> {
    let Some(raw) = arg else {
        bail!("missing lead id\n\n{}", USAGE);
    };
    let lead_id = Uuid::parse_str(raw).with_context(|| format!("invalid lead id '{}'", raw))?;

    let conn = open_database(config)?;
    let (lead, bundles) = hvac_sizing::compatible_systems(&conn, &conn, &lead_id, &config.policy)?;

    println!("Lead {} ({})", lead.id, lead.created_at.to_rfc3339());
    println!("{} sq ft → {}", lead.request.square_footage, lead.band);
    print_bundles(&bundles);
    Ok(())
}

fn run_stats(config: &Config) -> Result<()> {
    let conn = open_database(config)?;

    println!("Equipment counts by type:");
    for stat in catalog_stats(&conn)? {
        println!(
            "  {:<18} {:>3}   ${:.2} - ${:.2}",
            stat.category.display_name(),
            stat.count,
            stat.min_price,
            stat.max_price
        );
    }
    Ok(())
}

fn print_bundles(bundles: &[hvac_sizing::SystemBundle]) {
    if bundles.is_empty() {
        println!("No compatible systems found.");
        return;
    }

    println!("{} compatible systems:", bundles.len());
    for bundle in bundles {
        println!(
            "  ${:>9.2}  {} + {} {} + {}",
            bundle.total_price,
            bundle.furnace.model_number.as_deref().unwrap_or(""),
            bundle.condenser.model_number.as_deref().unwrap_or(""),
            bundle.condenser_tonnage_label().unwrap_or_default(),
            bundle.coil.model_number.as_deref().unwrap_or(""),
        );
    }
}
