//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let schema_script = config
        .database
        .schema_script
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let delimiter = delimiter_name(config.dataset.delimiter);

    format!(
        r#"[dataset]
; Delimited airport dataset with a header row:
;   name;country;region;municipality;latitude;longitude;type;primary_code[;secondary_code]
airports_file = {}
; Column delimiter: semicolon, comma, tab, pipe, or any other single character
delimiter = {}
; Leave small_airport rows out of the distance cache (default: true)
skip_small_airports = {}

[database]
; SQLite database file (default: ~/.airdist/airdist.db)
path = {}
; SQL script to run instead of the built-in schema (empty = built-in)
schema_script = {}
; Log the text of every query at debug level (default: false)
debug_queries = {}

[import]
; Distance records per bulk insert (default: 1000)
batch_size = {}
; Re-count pairs after the import and insert any that are missing (default: true)
validate = {}
; Worker threads for pair enumeration; 1 runs sequentially (default: 1)
workers = {}

[retry]
; Attempts per store operation, including the first (default: 3)
max_attempts = {}
; Pause between attempts in milliseconds (default: 1000)
delay_ms = {}

[grid]
; Default radius for `airdist nearby`, in kilometres (default: 100)
radius_km = {}
; Airport classes placed in the proximity grid
include_closed = {}
include_small = {}
include_medium = {}

[logging]
; Log directory and file name; the file is truncated at startup
directory = {}
file = {}
; trace, debug, info, warn or error (RUST_LOG overrides this)
level = {}
"#,
        path_to_string(&config.dataset.airports_file),
        delimiter,
        config.dataset.skip_small_airports,
        path_to_string(&config.database.path),
        schema_script,
        config.database.debug_queries,
        config.import.batch_size,
        config.import.validate,
        config.import.workers,
        config.retry.max_attempts,
        config.retry.delay_ms,
        config.grid.radius_km,
        config.grid.include_closed,
        config.grid.include_small,
        config.grid.include_medium,
        path_to_string(&config.logging.directory),
        config.logging.file,
        config.logging.level,
    )
}

/// Punctuation that INI treats specially is written by name.
fn delimiter_name(delimiter: char) -> String {
    match delimiter {
        ';' => "semicolon".to_string(),
        ',' => "comma".to_string(),
        '\t' => "tab".to_string(),
        '|' => "pipe".to_string(),
        c => c.to_string(),
    }
}

/// Write paths under the home directory as `~/...`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogLevel;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let config = ConfigFile::default();
        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_round_trip_custom_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.dataset.airports_file = PathBuf::from("/data/airports.tsv");
        config.dataset.delimiter = '\t';
        config.database.schema_script = Some(PathBuf::from("/data/schema.sql"));
        config.import.batch_size = 50;
        config.import.workers = 8;
        config.retry.delay_ms = 0;
        config.grid.radius_km = 250.5;
        config.grid.include_closed = true;
        config.logging.level = LogLevel::Debug;

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_output_is_commented() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("[import]"));
        assert!(content.contains("batch_size = 1000"));
        assert!(content.contains("delimiter = semicolon"));
        assert!(content.contains("; Pause between attempts"));
    }
}
