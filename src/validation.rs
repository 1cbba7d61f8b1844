//! Validation for component manifests.
//!
//! Two layers: `ManifestSchema` checks the raw JSON shape (required fields,
//! types) and `validate_manifest` checks what the schema cannot express:
//! identifier shape, key uniqueness, and defaults that fit the attribute's
//! implied type. Both collect every problem instead of stopping at the first.

use crate::manifest::{ComponentManifest, ValueKind};
use crate::schema_loader::{SchemaLoadOptions, load_json_schema};
use crate::{default_schema_path, is_identifier};
use anyhow::{Context, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Compiled manifest schema plus the `schema_version` it accepts.
pub struct ManifestSchema {
    version: String,
    compiled: JSONSchema,
}

impl ManifestSchema {
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_options(path, SchemaLoadOptions::default())
    }

    /// Load a schema only if its `schema_version` is one of `allowed`.
    pub fn load_pinned(path: &Path, allowed: &BTreeSet<String>) -> Result<Self> {
        Self::load_with_options(
            path,
            SchemaLoadOptions {
                allowed_versions: Some(allowed),
                ..Default::default()
            },
        )
    }

    fn load_with_options(path: &Path, options: SchemaLoadOptions<'_>) -> Result<Self> {
        let loaded = load_json_schema(path, options)
            .with_context(|| format!("loading manifest schema {}", path.display()))?;
        Ok(Self {
            version: loaded.schema_version,
            compiled: loaded.compiled,
        })
    }

    pub fn load_default() -> Result<Self> {
        Self::load(&default_schema_path())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn validate(&self, value: &Value) -> Vec<String> {
        match self.compiled.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect(),
        }
    }
}

pub fn validate_manifest(manifest: &ComponentManifest) -> Vec<String> {
    let mut errors = Vec::new();
    let meta = &manifest.metadata;

    if meta.name.0.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    } else if !is_identifier(&meta.name.0) {
        errors.push(format!(
            "name must match ^[A-Za-z0-9_.-]+$, got '{}'",
            meta.name.0
        ));
    }
    if let Err(reason) = check_version(&meta.version) {
        errors.push(reason);
    }
    if let Some(email) = &meta.maintainer_email {
        if !looks_like_email(email) {
            errors.push(format!("maintainer_email '{email}' is not an address"));
        }
    }

    validate_groupings(manifest, &mut errors);
    validate_attributes(manifest, &mut errors);
    errors
}

fn validate_groupings(manifest: &ComponentManifest, errors: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    for grouping in &manifest.groupings {
        let key = &grouping.key.0;
        if !is_identifier(key) {
            errors.push(format!("grouping key '{key}' must match ^[A-Za-z0-9_.-]+$"));
            continue;
        }
        if !seen.insert(key.as_str()) {
            errors.push(format!("duplicate grouping key '{key}'"));
        }
        if grouping.access.as_str().trim().is_empty() {
            errors.push(format!("grouping '{key}' has empty access"));
        }
        let mut packages = BTreeSet::new();
        for package in &grouping.packages {
            if package.trim().is_empty() {
                errors.push(format!("grouping '{key}' lists an empty package"));
            } else if !packages.insert(package.as_str()) {
                errors.push(format!("grouping '{key}' lists package '{package}' twice"));
            }
        }
    }
}

fn validate_attributes(manifest: &ComponentManifest, errors: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    for attr in &manifest.attributes {
        let key = &attr.key.0;
        if !is_identifier(key) {
            errors.push(format!("attribute key '{key}' must match ^[A-Za-z0-9_.-]+$"));
            continue;
        }
        if !seen.insert(key.as_str()) {
            errors.push(format!("duplicate attribute key '{key}'"));
        }
        if let Some(category) = attr.category() {
            if category.trim().is_empty() {
                errors.push(format!("attribute '{key}' has an empty category"));
            }
        }
        if let Err(reason) = check_default(attr.value_kind(), &attr.default, attr.select_options())
        {
            errors.push(format!("attribute '{key}' default {reason}"));
        }
    }
}

fn check_default(kind: ValueKind, default: &str, options: &[(String, String)]) -> Result<(), String> {
    match kind {
        ValueKind::Plain => Ok(()),
        ValueKind::Boolean => match default {
            "true" | "false" => Ok(()),
            other => Err(format!("'{other}' must be \"true\" or \"false\"")),
        },
        ValueKind::Choice => {
            if default.is_empty() || options.iter().any(|(_, value)| value == default) {
                Ok(())
            } else {
                Err(format!("'{default}' is not one of the select options"))
            }
        }
        ValueKind::JsonObject => match serde_json::from_str::<Value>(default) {
            Ok(Value::Object(_)) => Ok(()),
            _ => Err(format!("'{default}' must be a JSON object")),
        },
        ValueKind::JsonArray => match serde_json::from_str::<Value>(default) {
            Ok(Value::Array(_)) => Ok(()),
            _ => Err(format!("'{default}' must be a JSON array")),
        },
    }
}

/// Versions are dot-separated segments that start with a digit, e.g. `0.1`
/// or `1.2.0-rc1`.
fn check_version(version: &str) -> Result<(), String> {
    if version.trim().is_empty() {
        return Err("version must not be empty".to_string());
    }
    let starts_with_digit = version.chars().next().is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit || !is_identifier(version) || version.contains("..") {
        return Err(format!("version '{version}' is not a dotted version string"));
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> ComponentManifest {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> Value {
        json!({
            "schema_version": "component_manifest_v1",
            "name": "support",
            "version": "0.1",
            "maintainer_email": "support@oneops.com",
            "grouping": [
                {"key": "default", "access": "global", "packages": ["base"]}
            ],
            "attribute": [
                {"key": "enabled", "default": "true",
                 "format": {"form": {"field": "checkbox"}}}
            ]
        })
    }

    #[test]
    fn accepts_well_formed_manifest() {
        assert!(validate_manifest(&manifest(base())).is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let mut value = base();
        value["name"] = json!("bad name");
        value["version"] = json!("v1");
        value["grouping"][0]["packages"] = json!(["base", "base"]);
        value["attribute"][0]["default"] = json!("yes");
        let errors = validate_manifest(&manifest(value));
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("name must match")));
        assert!(errors.iter().any(|e| e.contains("dotted version")));
        assert!(errors.iter().any(|e| e.contains("package 'base' twice")));
        assert!(errors.iter().any(|e| e.contains("must be \"true\" or \"false\"")));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut value = base();
        value["attribute"] = json!([
            {"key": "enabled", "default": ""},
            {"key": "enabled", "default": "x"}
        ]);
        value["grouping"] = json!([
            {"key": "cloud", "access": "global", "packages": []},
            {"key": "cloud", "access": "global", "packages": []}
        ]);
        let errors = validate_manifest(&manifest(value));
        assert!(errors.contains(&"duplicate attribute key 'enabled'".to_string()));
        assert!(errors.contains(&"duplicate grouping key 'cloud'".to_string()));
    }

    #[test]
    fn structured_defaults_must_parse() {
        let mut value = base();
        value["attribute"] = json!([
            {"key": "tags", "default": "{\"a\":\"b\"}", "data_type": "hash"},
            {"key": "hosts", "default": "{}", "data_type": "array"},
            {"key": "layout", "default": "not json", "data_type": "struct"}
        ]);
        let errors = validate_manifest(&manifest(value));
        assert_eq!(
            errors,
            vec![
                "attribute 'hosts' default '{}' must be a JSON array".to_string(),
                "attribute 'layout' default 'not json' must be a JSON object".to_string(),
            ]
        );
    }

    #[test]
    fn select_defaults_must_match_an_option() {
        let mut value = base();
        value["attribute"] = json!([
            {"key": "size", "default": "M", "format": {"form": {
                "field": "select",
                "options_for_select": [["Small", "S"], ["Medium", "M"]]
            }}},
            {"key": "tier", "default": "gold", "format": {"form": {
                "field": "select",
                "options_for_select": [["Silver", "silver"]]
            }}},
            {"key": "zone", "default": "", "format": {"form": {"field": "select"}}},
            {"key": "region", "default": "east", "format": {"form": {"field": "select"}}}
        ]);
        let errors = validate_manifest(&manifest(value));
        assert_eq!(
            errors,
            vec![
                "attribute 'tier' default 'gold' is not one of the select options".to_string(),
                "attribute 'region' default 'east' is not one of the select options".to_string(),
            ]
        );
    }

    #[test]
    fn version_and_email_shapes() {
        assert!(check_version("0.1").is_ok());
        assert!(check_version("1.2.0-rc1").is_ok());
        assert!(check_version("").is_err());
        assert!(check_version("1..2").is_err());
        assert!(check_version("latest").is_err());
        assert!(looks_like_email("support@oneops.com"));
        assert!(!looks_like_email("support"));
        assert!(!looks_like_email("@oneops.com"));
    }

    #[test]
    fn schema_reports_missing_required_fields() {
        let schema = ManifestSchema::load_default().unwrap();
        assert_eq!(schema.version(), "component_manifest_v1");

        let mut value = base();
        assert!(schema.validate(&value).is_empty());
        value.as_object_mut().unwrap().remove("name");
        let errors = schema.validate(&value);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("\"name\" is a required property"));
    }

    #[test]
    fn schema_reports_nested_paths() {
        let schema = ManifestSchema::load_default().unwrap();
        let mut value = base();
        value["attribute"][0]["format"]["order"] = json!("first");
        let errors = schema.validate(&value);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].starts_with("/attribute/0/format/order"));
    }

    #[test]
    fn pinned_schema_requires_allowed_version() {
        let path = default_schema_path();
        let current = BTreeSet::from(["component_manifest_v1".to_string()]);
        let schema = ManifestSchema::load_pinned(&path, &current).unwrap();
        assert_eq!(schema.version(), "component_manifest_v1");

        let other = BTreeSet::from(["component_manifest_v2".to_string()]);
        let err = ManifestSchema::load_pinned(&path, &other).err().expect("pin mismatch");
        assert!(format!("{err:#}").contains("not in allowed set"));
    }
}
