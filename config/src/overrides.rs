//! `-c key=value` overrides layered over `config.toml`.
//!
//! Values are parsed as TOML so `-c display_raw_markdown=true` yields a
//! boolean; anything that is not valid TOML is kept as a plain string, which
//! saves users from quoting paths and ids on the command line.

use toml::Value;

use crate::error::ConfigError;
use crate::error::Result;

pub fn parse_overrides(raw_overrides: &[String]) -> Result<Vec<(String, Value)>> {
    raw_overrides.iter().map(|raw| parse_override(raw)).collect()
}

fn parse_override(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(ConfigError::InvalidOverride {
            raw: raw.to_string(),
            reason: "expected key=value".to_string(),
        });
    };
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidOverride {
            raw: raw.to_string(),
            reason: "empty key segment".to_string(),
        });
    }
    Ok((key.to_string(), parse_value(value.trim())))
}

fn parse_value(value: &str) -> Value {
    toml::from_str::<toml::Table>(&format!("v = {value}"))
        .ok()
        .and_then(|mut table| table.remove("v"))
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// Writes `value` at the dotted `path`, creating intermediate tables and
/// replacing non-table values that sit in the way.
pub fn apply_override(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_table() {
            *current = Value::Table(toml::Table::new());
        }
        let Value::Table(table) = current else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_string(), value);
            return;
        }
        current = table
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(toml::Table::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_typed_and_bare_values() {
        let parsed = parse_overrides(&[
            "display_raw_markdown=true".to_string(),
            "dev_data.dir=/tmp/dev data".to_string(),
        ])
        .expect("overrides");

        assert_eq!(
            parsed,
            vec![
                ("display_raw_markdown".to_string(), Value::Boolean(true)),
                (
                    "dev_data.dir".to_string(),
                    Value::String("/tmp/dev data".to_string())
                ),
            ]
        );
    }

    #[test]
    fn rejects_missing_equals_sign() {
        let err = parse_overrides(&["display_raw_markdown".to_string()]).expect_err("invalid");
        assert!(err.to_string().contains("key=value"), "unexpected: {err}");
    }

    #[test]
    fn rejects_empty_key_segments() {
        assert!(parse_overrides(&["dev_data..enabled=true".to_string()]).is_err());
        assert!(parse_overrides(&["=true".to_string()]).is_err());
    }

    #[test]
    fn apply_creates_nested_tables() {
        let mut root = Value::Table(toml::Table::new());
        apply_override(&mut root, "dev_data.enabled", Value::Boolean(false));

        assert_eq!(
            root.get("dev_data").and_then(|t| t.get("enabled")),
            Some(&Value::Boolean(false))
        );
    }

    #[test]
    fn apply_replaces_scalar_in_the_way() {
        let mut root: Value = toml::from_str("dev_data = 3").expect("toml");
        apply_override(&mut root, "dev_data.enabled", Value::Boolean(true));

        assert_eq!(
            root.get("dev_data").and_then(|t| t.get("enabled")),
            Some(&Value::Boolean(true))
        );
    }
}
