//! Validated, indexed view of one component manifest.
//!
//! Loading goes through every check in order: JSON Schema, deserialization,
//! schema_version, then semantic validation. A failure rejects this one
//! component; catalogs decide what to do with the rest.

use crate::manifest::layout::{FormSection, form_sections};
use crate::manifest::{
    Attribute, AttributeKey, CatalogKey, ComponentManifest, Grouping, GroupingKey,
    manifest_from_value,
};
use crate::schema_loader::read_json_file;
use crate::validation::{ManifestSchema, validate_manifest};
use crate::{MANIFEST_SCHEMA_PATH, default_schema_path};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
/// Component manifest plus lookups keyed by attribute and grouping key.
pub struct ComponentIndex {
    key: CatalogKey,
    manifest: ComponentManifest,
    attributes: BTreeMap<AttributeKey, usize>,
    groupings: BTreeMap<GroupingKey, usize>,
}

impl ComponentIndex {
    /// Load and validate a manifest from disk.
    ///
    /// The schema is looked up next to the manifest's repository first, then
    /// at the default location.
    pub fn load(path: &Path) -> Result<Self> {
        let schema = ManifestSchema::load(&resolve_manifest_schema_path(path))?;
        Self::load_with_schema(path, &schema)
    }

    pub fn load_with_schema(path: &Path, schema: &ManifestSchema) -> Result<Self> {
        let raw = read_json_file(path)?;
        check_schema(schema, &raw, &path.display().to_string())?;
        let manifest = manifest_from_value(raw, path)?;
        Self::from_manifest(manifest, schema.version())
            .with_context(|| format!("validating {}", path.display()))
    }

    /// Validate an in-memory manifest value; `origin` labels error messages.
    pub fn from_value(value: Value, origin: &str, schema: &ManifestSchema) -> Result<Self> {
        check_schema(schema, &value, origin)?;
        let manifest: ComponentManifest =
            serde_json::from_value(value).with_context(|| format!("parsing {origin}"))?;
        Self::from_manifest(manifest, schema.version())
            .with_context(|| format!("validating {origin}"))
    }

    /// Validate an already parsed manifest against `schema_version` and the
    /// semantic rules, then build the lookups.
    pub fn from_manifest(manifest: ComponentManifest, schema_version: &str) -> Result<Self> {
        if manifest.schema_version != schema_version {
            bail!(
                "schema_version '{}' does not match expected '{}'",
                manifest.schema_version,
                schema_version
            );
        }

        let errors = validate_manifest(&manifest);
        if !errors.is_empty() {
            bail!(
                "component {} failed validation:\n{}",
                manifest.key(),
                errors.join("\n")
            );
        }

        let attributes = manifest
            .attributes
            .iter()
            .enumerate()
            .map(|(idx, attr)| (attr.key.clone(), idx))
            .collect();
        let groupings = manifest
            .groupings
            .iter()
            .enumerate()
            .map(|(idx, grouping)| (grouping.key.clone(), idx))
            .collect();

        Ok(Self {
            key: manifest.key(),
            manifest,
            attributes,
            groupings,
        })
    }

    pub fn key(&self) -> &CatalogKey {
        &self.key
    }

    pub fn manifest(&self) -> &ComponentManifest {
        &self.manifest
    }

    pub fn attribute(&self, key: &AttributeKey) -> Option<&Attribute> {
        self.attributes
            .get(key)
            .map(|idx| &self.manifest.attributes[*idx])
    }

    pub fn grouping(&self, key: &GroupingKey) -> Option<&Grouping> {
        self.groupings
            .get(key)
            .map(|idx| &self.manifest.groupings[*idx])
    }

    /// Attribute keys in declaration order.
    pub fn attribute_keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.manifest.attributes.iter().map(|attr| &attr.key)
    }

    /// Default value of every attribute.
    pub fn defaults(&self) -> BTreeMap<AttributeKey, String> {
        self.manifest
            .attributes
            .iter()
            .map(|attr| (attr.key.clone(), attr.default.clone()))
            .collect()
    }

    /// Groupings whose package list includes `package`.
    pub fn groupings_for_package(&self, package: &str) -> Vec<&Grouping> {
        self.manifest
            .groupings
            .iter()
            .filter(|grouping| grouping.packages.iter().any(|p| p == package))
            .collect()
    }

    pub fn form_sections(&self) -> Vec<FormSection<'_>> {
        form_sections(&self.manifest.attributes)
    }
}

fn check_schema(schema: &ManifestSchema, value: &Value, origin: &str) -> Result<()> {
    let errors = schema.validate(value);
    if !errors.is_empty() {
        bail!(
            "component manifest {origin} failed schema validation:\n{}",
            errors.join("\n")
        );
    }
    Ok(())
}

fn resolve_manifest_schema_path(manifest_path: &Path) -> PathBuf {
    for base in manifest_path.ancestors().skip(1) {
        let candidate = base.join(MANIFEST_SCHEMA_PATH);
        if candidate.is_file() {
            return candidate;
        }
    }
    default_schema_path()
}
