//! Serializable representation of a component `metadata.json`.
//!
//! The types mirror `schema/component_manifest.schema.json`. Use
//! `ComponentIndex` when the manifest must be validated before use; these
//! structs only describe the shape.

use crate::manifest::identity::{
    Access, AttributeKey, CatalogKey, ComponentName, DataType, FormField, GroupingKey,
};
use crate::schema_loader::read_json_file;
use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fs;
use std::path::Path;

/// File read as the long description when a manifest does not inline one.
pub const README_FILE: &str = "README.md";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One component declaration as stored on disk.
pub struct ComponentManifest {
    pub schema_version: String,
    #[serde(flatten)]
    pub metadata: ComponentMetadata,
    #[serde(rename = "grouping")]
    pub groupings: Vec<Grouping>,
    #[serde(rename = "attribute")]
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Identity and descriptive fields of a component.
pub struct ComponentMetadata {
    pub name: ComponentName,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Named bundle of packages visible under an access scope.
pub struct Grouping {
    pub key: GroupingKey,
    pub access: Access,
    pub packages: Vec<String>,
    #[serde(default)]
    pub namespace: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// User-configurable setting exposed through the management console.
pub struct Attribute {
    pub key: AttributeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AttributeFormat>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Rendering hints; none of them change what a value means.
pub struct AttributeFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "integral_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<FormHint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormHint {
    pub field: FormField,
    /// `[label, value]` pairs offered by `select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options_for_select: Vec<(String, String)>,
}

/// Value shape implied by an attribute's form control and data type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Boolean,
    Choice,
    Plain,
    JsonObject,
    JsonArray,
}

impl ComponentManifest {
    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            name: self.metadata.name.clone(),
            version: self.metadata.version.clone(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parsing component manifest")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing component manifest")
    }
}

impl Attribute {
    pub fn form_field(&self) -> Option<&FormField> {
        self.format
            .as_ref()
            .and_then(|format| format.form.as_ref())
            .map(|form| &form.field)
    }

    /// The form control wins over `data_type`: a checkbox is boolean even
    /// when the declared type is `string`.
    pub fn value_kind(&self) -> ValueKind {
        match self.form_field() {
            Some(FormField::Checkbox) => return ValueKind::Boolean,
            Some(FormField::Select) => return ValueKind::Choice,
            _ => {}
        }
        match self.data_type.unwrap_or_default() {
            DataType::String | DataType::Text => ValueKind::Plain,
            DataType::Hash | DataType::Struct => ValueKind::JsonObject,
            DataType::Array => ValueKind::JsonArray,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.format.as_ref()?.category.as_deref()
    }

    pub fn order(&self) -> Option<i64> {
        self.format.as_ref()?.order
    }

    pub fn select_options(&self) -> &[(String, String)] {
        self.format
            .as_ref()
            .and_then(|format| format.form.as_ref())
            .map(|form| form.options_for_select.as_slice())
            .unwrap_or(&[])
    }
}

/// JSON Schema treats `1.0` as an integer, so integral floats are accepted
/// here as well.
fn integral_order<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(value) = number.as_i64() {
        return Ok(Some(value));
    }
    match number.as_f64() {
        Some(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(Some(value as i64))
        }
        _ => Err(D::Error::custom(format!(
            "order must be an integer, got {number}"
        ))),
    }
}

/// Read and parse a component manifest from disk without semantic validation.
///
/// A missing `long_description` is filled from a `README.md` next to the
/// manifest when one exists.
pub fn load_manifest_from_path(path: &Path) -> Result<ComponentManifest> {
    manifest_from_value(read_json_file(path)?, path)
}

/// Deserialize a manifest already read from `path`, applying the README
/// fallback relative to that path.
pub fn manifest_from_value(value: Value, path: &Path) -> Result<ComponentManifest> {
    let mut manifest: ComponentManifest =
        serde_json::from_value(value).with_context(|| format!("loading {}", path.display()))?;
    if manifest.metadata.long_description.is_none() {
        manifest.metadata.long_description = read_sibling_readme(path)?;
    }
    Ok(manifest)
}

fn read_sibling_readme(manifest_path: &Path) -> Result<Option<String>> {
    let Some(dir) = manifest_path.parent() else {
        return Ok(None);
    };
    let readme = dir.join(README_FILE);
    if !readme.is_file() {
        return Ok(None);
    }
    let text =
        fs::read_to_string(&readme).with_context(|| format!("reading {}", readme.display()))?;
    Ok(Some(text))
}
