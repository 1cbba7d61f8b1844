//! Typed component manifests for the orchestration catalog.
//!
//! A component ships a `metadata.json` describing its identity, the package
//! groupings it is visible under, and the attributes an operator can set from
//! the management console. This crate parses those files into immutable
//! records, validates them, and indexes them in a catalog. Public functions
//! here are what the helper binaries depend on: repository discovery, default
//! schema and component locations, and manifest stream parsing.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod manifest;
mod schema_loader;
pub mod validation;

pub use catalog::{CatalogLoadReport, ComponentCatalog, compare_versions};
pub use manifest::{
    Access, Attribute, AttributeFormat, AttributeKey, CatalogKey, ComponentIndex,
    ComponentManifest, ComponentMetadata, ComponentName, DataType, FormField, FormHint,
    FormSection, Grouping, GroupingKey, ValueKind, load_manifest_from_path, manifest_from_value,
};
pub use validation::{ManifestSchema, validate_manifest};

/// Relative location of the manifest JSON Schema inside the repository.
pub const MANIFEST_SCHEMA_PATH: &str = "schema/component_manifest.schema.json";
/// Directory holding one subdirectory per shipped component.
pub const COMPONENTS_DIR: &str = "components";
/// File name every component declaration uses.
pub const MANIFEST_FILE: &str = "metadata.json";

const ROOT_ENV: &str = "COMPONENT_CATALOG_ROOT";

/// Returns true when `candidate` looks like the repository root.
fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(MANIFEST_SCHEMA_PATH).is_file() && candidate.join(COMPONENTS_DIR).is_dir()
}

fn repo_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_repo_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the repository holding the schema and the shipped components.
///
/// Honors `COMPONENT_CATALOG_ROOT` when it points at a real root, then climbs
/// up from the current executable, then falls back to the build-time hint.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ROOT_ENV) {
        if let Some(root) = repo_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("COMPONENT_CATALOG_ROOT_HINT") {
        if let Some(root) = repo_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!("Unable to locate the component catalog root. Set {ROOT_ENV} to the repository checkout.");
}

/// Path of the manifest schema, preferring the discovered repository root.
pub fn default_schema_path() -> PathBuf {
    match find_repo_root() {
        Ok(root) => root.join(MANIFEST_SCHEMA_PATH),
        Err(_) => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(MANIFEST_SCHEMA_PATH),
    }
}

/// Directory of shipped components under the repository root.
pub fn default_components_dir() -> Result<PathBuf> {
    Ok(find_repo_root()?.join(COMPONENTS_DIR))
}

/// True for names matching `^[A-Za-z0-9_.-]+$`.
pub fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Parse raw manifest values from a single object, a JSON array, or NDJSON.
///
/// Values are returned unparsed so callers can run schema validation before
/// deserializing. Empty input is an error.
pub fn parse_manifest_stream(input: &str) -> Result<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No input provided");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => {
                if items.iter().any(|item| !item.is_object()) {
                    bail!("Manifest arrays may only contain objects");
                }
                Ok(items)
            }
            Value::Object(_) => Ok(vec![value]),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut records = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse manifest from line {}", idx + 1))?;
        if !value.is_object() {
            bail!("Line {} is not a manifest object", idx + 1);
        }
        records.push(value);
    }

    if records.is_empty() {
        bail!("No manifests found in input stream");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("support"));
        assert!(is_identifier("component_manifest_v1"));
        assert!(is_identifier("0.1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("slash/name"));
    }

    #[test]
    fn stream_accepts_object_array_and_ndjson() {
        assert_eq!(parse_manifest_stream(r#"{"name":"a"}"#).unwrap().len(), 1);
        assert_eq!(
            parse_manifest_stream(r#"[{"name":"a"},{"name":"b"}]"#)
                .unwrap()
                .len(),
            2
        );
        let ndjson = "{\"name\":\"a\"}\n\n{\"name\":\"b\"}\n";
        let values = parse_manifest_stream(ndjson).unwrap();
        assert_eq!(values[1]["name"], "b");
    }

    #[test]
    fn stream_rejects_empty_and_scalar_input() {
        assert!(parse_manifest_stream("   ").is_err());
        assert!(parse_manifest_stream("42").is_err());
        assert!(parse_manifest_stream("[1, 2]").is_err());
        let err = parse_manifest_stream("{\"name\":\"a\"}\nnot json").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn repo_root_contains_schema_and_components() {
        let root = find_repo_root().unwrap();
        assert!(root.join(MANIFEST_SCHEMA_PATH).is_file());
        assert!(default_components_dir().unwrap().is_dir());
        assert!(default_schema_path().is_file());
    }
}
