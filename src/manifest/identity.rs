use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Catalog name of a component (e.g., `support`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(pub String);

/// Key of a user-facing attribute, unique within one component.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(pub String);

/// Key of a grouping declaration, unique within one component.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingKey(pub String);

/// Name plus version: the identity of a component inside a catalog.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CatalogKey {
    pub name: ComponentName,
    pub version: String,
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name.0, self.version)
    }
}

/// Visibility scope of a grouping.
///
/// Only `global` is used by shipped components; `Other` keeps manifests from
/// newer platform releases loadable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Access {
    Global,
    Other(String),
}

/// Form control the management console renders for an attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormField {
    Checkbox,
    Select,
    Text,
    Textarea,
    Other(String),
}

/// Declared storage type of an attribute value.
///
/// Values are always carried as strings; structured types hold JSON text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Text,
    Hash,
    Array,
    Struct,
}

impl Serialize for Access {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Access {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

impl Access {
    pub fn as_str(&self) -> &str {
        match self {
            Access::Global => "global",
            Access::Other(value) => value.as_str(),
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "global" => Access::Global,
            other => Access::Other(other.to_string()),
        }
    }
}

impl Serialize for FormField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

impl FormField {
    pub fn as_str(&self) -> &str {
        match self {
            FormField::Checkbox => "checkbox",
            FormField::Select => "select",
            FormField::Text => "text",
            FormField::Textarea => "textarea",
            FormField::Other(value) => value.as_str(),
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "checkbox" => FormField::Checkbox,
            "select" => FormField::Select,
            "text" => FormField::Text,
            "textarea" => FormField::Textarea,
            other => FormField::Other(other.to_string()),
        }
    }
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Text => "text",
            DataType::Hash => "hash",
            DataType::Array => "array",
            DataType::Struct => "struct",
        }
    }
}
