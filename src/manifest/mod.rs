//! Component manifest types.
//!
//! `model` mirrors the on-disk `metadata.json` shape, `identity` holds the
//! keys and enums shared across it, `index` is the validated view callers
//! should use, and `layout` derives console form sections from format hints.

pub mod identity;
pub mod index;
pub mod layout;
pub mod model;

pub use identity::{
    Access, AttributeKey, CatalogKey, ComponentName, DataType, FormField, GroupingKey,
};
pub use index::ComponentIndex;
pub use layout::{FormSection, form_sections};
pub use model::{
    Attribute, AttributeFormat, ComponentManifest, ComponentMetadata, FormHint, Grouping,
    README_FILE, ValueKind,
};

pub use model::{load_manifest_from_path, manifest_from_value};
