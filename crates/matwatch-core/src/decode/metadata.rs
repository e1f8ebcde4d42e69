use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Storage kind of a field as reported by runtime type metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Pointer,
    NativeInt,
    Other,
}

impl FieldKind {
    pub fn is_int32(&self) -> bool {
        matches!(self, Self::Int32 | Self::UInt32)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer | Self::NativeInt | Self::UInt64)
    }
}

/// Location of a field relative to the object address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub offset: u64,
    pub kind: FieldKind,
}

impl FieldInfo {
    pub fn new(offset: u64, kind: FieldKind) -> Self {
        Self { offset, kind }
    }
}

/// Runtime type metadata for the wrapper object being watched.
pub trait TypeMetadata {
    fn type_name(&self) -> &str;

    /// Look up a field by exact name.
    fn field(&self, name: &str) -> Option<FieldInfo>;
}

/// In-memory field table, usually loaded from a layout file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub type_name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldInfo>,
}

impl LayoutTable {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, offset: u64, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldInfo::new(offset, kind));
        self
    }
}

impl TypeMetadata for LayoutTable {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn field(&self, name: &str) -> Option<FieldInfo> {
        self.fields.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        let table = LayoutTable::new("Mat").with_field("_rows", 8, FieldKind::Int32);

        assert_eq!(table.type_name(), "Mat");
        assert_eq!(table.field("_rows"), Some(FieldInfo::new(8, FieldKind::Int32)));
        assert_eq!(table.field("rows"), None);
    }

    #[test]
    fn test_kind_classes() {
        assert!(FieldKind::UInt32.is_int32());
        assert!(!FieldKind::Int64.is_int32());
        assert!(FieldKind::NativeInt.is_pointer());
        assert!(!FieldKind::Int32.is_pointer());
    }

    #[test]
    fn test_kind_json_names() {
        let json = serde_json::to_string(&FieldInfo::new(16, FieldKind::NativeInt)).unwrap();
        assert_eq!(json, r#"{"offset":16,"kind":"native_int"}"#);
    }
}
