//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::log::LogLevel;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [dataset] section
    if let Some(section) = ini.section(Some("dataset")) {
        if let Some(v) = non_empty(section, "airports_file") {
            config.dataset.airports_file = expand_tilde(v);
        }
        if let Some(v) = section.get("delimiter") {
            config.dataset.delimiter = parse_delimiter(v)?;
        }
        if let Some(v) = section.get("skip_small_airports") {
            config.dataset.skip_small_airports = parse_bool(v);
        }
    }

    // [database] section
    if let Some(section) = ini.section(Some("database")) {
        if let Some(v) = non_empty(section, "path") {
            config.database.path = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "schema_script") {
            config.database.schema_script = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("debug_queries") {
            config.database.debug_queries = parse_bool(v);
        }
    }

    // [import] section
    if let Some(section) = ini.section(Some("import")) {
        if let Some(v) = section.get("batch_size") {
            config.import.batch_size = parse_positive(v, "import", "batch_size")?;
        }
        if let Some(v) = section.get("validate") {
            config.import.validate = parse_bool(v);
        }
        if let Some(v) = section.get("workers") {
            config.import.workers = parse_positive(v, "import", "workers")?;
        }
    }

    // [retry] section
    if let Some(section) = ini.section(Some("retry")) {
        if let Some(v) = section.get("max_attempts") {
            config.retry.max_attempts = parse_positive(v, "retry", "max_attempts")?;
        }
        if let Some(v) = section.get("delay_ms") {
            config.retry.delay_ms = parse_number(
                v,
                "retry",
                "delay_ms",
                "must be a non-negative integer (milliseconds)",
            )?;
        }
    }

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("radius_km") {
            let radius: f64 =
                parse_number(v, "grid", "radius_km", "must be a non-negative number")?;
            if !radius.is_finite() || radius < 0.0 {
                return Err(invalid(
                    "grid",
                    "radius_km",
                    v,
                    "must be a non-negative number",
                ));
            }
            config.grid.radius_km = radius;
        }
        if let Some(v) = section.get("include_closed") {
            config.grid.include_closed = parse_bool(v);
        }
        if let Some(v) = section.get("include_small") {
            config.grid.include_small = parse_bool(v);
        }
        if let Some(v) = section.get("include_medium") {
            config.grid.include_medium = parse_bool(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
        if let Some(v) = section.get("level") {
            config.logging.level = v
                .parse::<LogLevel>()
                .map_err(|e| invalid("logging", "level", v, &e.to_string()))?;
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T>(value: &str, section: &str, key: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    let reason = "must be a positive integer";
    let parsed: T = parse_number(value, section, key, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

/// A delimiter is a name (`semicolon`, `comma`, `tab`, `pipe`) or one ASCII character.
fn parse_delimiter(value: &str) -> Result<char, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "semicolon" => return Ok(';'),
        "comma" => return Ok(','),
        "tab" | "\\t" => return Ok('\t'),
        "pipe" => return Ok('|'),
        _ => {}
    }
    if value == "\t" {
        return Ok('\t');
    }
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(invalid(
            "dataset",
            "delimiter",
            value,
            "must be a single ASCII character",
        )),
    }
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[import]
batch_size = 250
workers = 4

[grid]
radius_km = 42.5
include_small = yes
"#,
        )
        .unwrap();

        assert_eq!(config.import.batch_size, 250);
        assert_eq!(config.import.workers, 4);
        assert!(config.import.validate);
        assert_eq!(config.grid.radius_km, 42.5);
        assert!(config.grid.include_small);
        assert!(!config.grid.include_closed);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = load("[import]\nbatch_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("import.batch_size"));
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn test_unparseable_attempts_rejected() {
        let err = load("[retry]\nmax_attempts = many\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "max_attempts"
        ));
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(load("[grid]\nradius_km = -5\n").is_err());
    }

    #[test]
    fn test_delimiter() {
        assert_eq!(load("[dataset]\ndelimiter = ,\n").unwrap().dataset.delimiter, ',');
        assert_eq!(load("[dataset]\ndelimiter = tab\n").unwrap().dataset.delimiter, '\t');
        assert_eq!(load("[dataset]\ndelimiter = semicolon\n").unwrap().dataset.delimiter, ';');
        assert!(load("[dataset]\ndelimiter = ;;\n").is_err());
        assert!(load("[dataset]\ndelimiter = §\n").is_err());
    }

    #[test]
    fn test_log_level() {
        let config = load("[logging]\nlevel = debug\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(load("[logging]\nlevel = chatty\n").is_err());
    }

    #[test]
    fn test_empty_schema_script_stays_builtin() {
        let config = load("[database]\nschema_script =\ndebug_queries = on\n").unwrap();
        assert!(config.database.schema_script.is_none());
        assert!(config.database.debug_queries);
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert!(parse_bool(v), "{}", v);
        }
        for v in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(v), "{}", v);
        }
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/data/airports.csv");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("data/airports.csv"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
