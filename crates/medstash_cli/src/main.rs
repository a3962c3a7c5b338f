//! CLI entry point.
//!
//! # Responsibility
//! - Verify `medstash_core` linkage with deterministic output.
//! - Optionally print a stored inventory in the configured sort order and
//!   report expired medications for a given month.
//!
//! Usage: `medstash_cli [db_path] [YYYY-MM]`.
//!
//! Environment:
//! - `MEDSTASH_DB_PATH`: database used when `db_path` is omitted.
//! - `MEDSTASH_CONFIG`: JSON file read into `InventoryConfig`.
//! - `MEDSTASH_LOG_DIR`: absolute directory; enables file logging.

use log::{info, warn};
use medstash_core::db::open_db;
use medstash_core::{
    expired_medications, init_logging_with_config, InventoryConfig, InventoryEngine,
    MedicationService, SqliteMedicationRepository, YearMonth,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("medstash_core ping={}", medstash_core::ping());
    println!("medstash_core version={}", medstash_core::core_version());

    let config = match load_config(env_value("MEDSTASH_CONFIG").as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };
    if let Some(log_dir) = env_value("MEDSTASH_LOG_DIR") {
        // Listing still works without file logs.
        if let Err(message) = init_logging_with_config(&config, &log_dir) {
            eprintln!("logging disabled: {message}");
        }
    }

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args
        .next()
        .map(PathBuf::from)
        .or_else(|| env_value("MEDSTASH_DB_PATH").map(PathBuf::from))
    else {
        return ExitCode::SUCCESS;
    };
    let today = match args.next() {
        Some(raw) => match YearMonth::parse(&raw) {
            Some(month) => Some(month),
            None => {
                eprintln!("invalid month `{raw}`, expected YYYY-MM");
                return ExitCode::from(2);
            }
        },
        None => None,
    };

    match print_inventory(&config, &db_path, today) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            warn!("event=cli_run module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn load_config(path: Option<&str>) -> Result<InventoryConfig, String> {
    let Some(path) = path else {
        return Ok(InventoryConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("config read failed `{path}`: {err}"))?;
    InventoryConfig::from_json_str(&raw).map_err(|err| format!("config load failed: {err}"))
}

fn print_inventory(
    config: &InventoryConfig,
    db_path: &Path,
    today: Option<YearMonth>,
) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| format!("inventory DB open failed: {err}"))?;
    let repo = SqliteMedicationRepository::try_new(&conn)
        .map_err(|err| format!("inventory repo init failed: {err}"))?;
    let service = MedicationService::new(repo);
    let snapshot = service
        .load_inventory()
        .map_err(|err| format!("inventory load failed: {err}"))?;

    let engine = InventoryEngine::from_config(config);
    let view = engine.derive_view(&snapshot.medications, &snapshot.substances);
    println!("medications={}", view.len());
    for entry in &view {
        let medication = entry.medication;
        let substances = medication
            .resolve_substances(&snapshot.substances)
            .into_iter()
            .map(|substance| match substance.concentration {
                Some(concentration) => format!("{} {concentration}", substance.name),
                None => substance.name,
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}\t{}\t{}\t{}\t{}",
            medication.id,
            medication.expiration(),
            medication.presentation.as_str(),
            medication.name,
            substances
        );
    }

    let expired = today.map(|today| expired_medications(&snapshot.medications, today).len());
    if let (Some(today), Some(count)) = (today, expired) {
        println!("expired_at={today} count={count}");
    }
    info!(
        "event=cli_run module=cli status=ok medications={} substances={} expired={}",
        view.len(),
        snapshot.substances.len(),
        expired.map_or_else(|| "-".to_string(), |count| count.to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::load_config;
    use medstash_core::{InventoryConfig, SortBy};

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).expect("defaults should load");
        assert_eq!(config, InventoryConfig::default());
    }

    #[test]
    fn config_file_overrides_defaults_and_is_validated() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("medstash.json");
        std::fs::write(&path, r#"{"default_sort":"name","undo_grace_ms":8000}"#)
            .expect("config should be written");
        let path = path.to_str().expect("temp path should be valid UTF-8");

        let config = load_config(Some(path)).expect("config should load");
        assert_eq!(config.default_sort, SortBy::Name);
        assert_eq!(config.undo_grace_ms, 8_000);

        std::fs::write(path, r#"{"undo_grace_ms":1}"#).expect("config should be written");
        let error = load_config(Some(path)).expect_err("out-of-range grace is rejected");
        assert!(error.contains("undo_grace_ms"));

        let error = load_config(Some("/nonexistent/medstash.json"))
            .expect_err("missing file is reported");
        assert!(error.contains("config read failed"));
    }
}
