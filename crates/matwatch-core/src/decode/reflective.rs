//! Header acquisition through runtime type metadata.
//!
//! Used when the watched value is a managed wrapper object whose field layout
//! is known only by name. Each header field is located by probing an ordered
//! list of candidate names; the first candidate that exists with an accepted
//! kind wins. The resolved offsets are cached until a decode reports
//! [`Error::LayoutMismatch`].

use tracing::{debug, info};

use crate::decode::{FieldInfo, FieldKind, TypeMetadata};
use crate::error::{Error, Result};
use crate::matrix::MatrixDescriptor;
use crate::process::ReadMemory;

/// One header field and the names it may appear under.
#[derive(Debug, Clone, Copy)]
pub struct FieldRole {
    pub role: &'static str,
    pub candidates: &'static [&'static str],
    pub accepts: fn(FieldKind) -> bool,
}

fn int32_kind(kind: FieldKind) -> bool {
    kind.is_int32()
}

fn pointer_kind(kind: FieldKind) -> bool {
    kind.is_pointer()
}

pub const ROWS: FieldRole = FieldRole {
    role: "rows",
    candidates: &["rows", "_rows", "Rows"],
    accepts: int32_kind,
};

pub const COLS: FieldRole = FieldRole {
    role: "cols",
    candidates: &["cols", "_cols", "Cols"],
    accepts: int32_kind,
};

pub const FLAGS: FieldRole = FieldRole {
    role: "flags",
    candidates: &["type", "_type", "Type", "flags"],
    accepts: int32_kind,
};

pub const DATA: FieldRole = FieldRole {
    role: "data",
    candidates: &["data", "_data", "Data", "DataPointer"],
    accepts: pointer_kind,
};

pub const STEP: FieldRole = FieldRole {
    role: "step",
    candidates: &["step", "_step", "Step"],
    accepts: pointer_kind,
};

impl FieldRole {
    /// First candidate present in `metadata` with an accepted kind.
    pub fn probe(&self, metadata: &dyn TypeMetadata) -> Option<FieldInfo> {
        self.candidates
            .iter()
            .filter_map(|name| metadata.field(name))
            .find(|info| (self.accepts)(info.kind))
    }

    fn require(&self, metadata: &dyn TypeMetadata) -> Result<FieldInfo> {
        self.probe(metadata).ok_or_else(|| {
            Error::LayoutMismatch(format!(
                "{} has no usable {} field (tried {})",
                metadata.type_name(),
                self.role,
                self.candidates.join(", ")
            ))
        })
    }
}

/// Field offsets resolved for one wrapper type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFields {
    pub rows: FieldInfo,
    pub cols: FieldInfo,
    pub flags: FieldInfo,
    pub data: FieldInfo,
    pub step: Option<FieldInfo>,
}

pub fn resolve_fields(metadata: &dyn TypeMetadata) -> Result<ResolvedFields> {
    Ok(ResolvedFields {
        rows: ROWS.require(metadata)?,
        cols: COLS.require(metadata)?,
        flags: FLAGS.require(metadata)?,
        data: DATA.require(metadata)?,
        step: STEP.probe(metadata),
    })
}

fn read_int32<R: ReadMemory + ?Sized>(reader: &R, object: u64, field: FieldInfo) -> Result<i32> {
    let address = object.wrapping_add(field.offset);
    match field.kind {
        FieldKind::UInt32 => Ok(reader.read_u32(address)? as i32),
        _ => reader.read_i32(address),
    }
}

fn read_pointer<R: ReadMemory + ?Sized>(reader: &R, object: u64, field: FieldInfo) -> Result<u64> {
    reader.read_pointer(object.wrapping_add(field.offset))
}

/// Metadata-driven decoder with a cached field resolution.
pub struct ReflectiveDecoder {
    metadata: Box<dyn TypeMetadata>,
    resolved: Option<ResolvedFields>,
}

impl ReflectiveDecoder {
    pub fn new(metadata: Box<dyn TypeMetadata>) -> Self {
        Self {
            metadata,
            resolved: None,
        }
    }

    pub fn type_name(&self) -> &str {
        self.metadata.type_name()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Drop the cached resolution so the next decode probes again.
    pub fn invalidate(&mut self) {
        self.resolved = None;
    }

    fn fields(&mut self) -> Result<ResolvedFields> {
        if let Some(fields) = self.resolved {
            return Ok(fields);
        }
        let fields = resolve_fields(self.metadata.as_ref())?;
        info!(
            "Resolved {} fields: rows@{:#x} cols@{:#x} flags@{:#x} data@{:#x} step={:?}",
            self.metadata.type_name(),
            fields.rows.offset,
            fields.cols.offset,
            fields.flags.offset,
            fields.data.offset,
            fields.step.map(|s| s.offset)
        );
        self.resolved = Some(fields);
        Ok(fields)
    }

    /// Build a descriptor from the wrapper object at `object`.
    ///
    /// Fields the wrapper does not carry are synthesized: two dimensions, an
    /// allocation starting at `data` and ending after `rows` packed rows, and
    /// no reference count.
    pub fn decode<R: ReadMemory + ?Sized>(
        &mut self,
        reader: &R,
        object: u64,
    ) -> Result<MatrixDescriptor> {
        if object == 0 {
            return Err(Error::InvalidPointer { address: object });
        }
        let fields = match self.fields() {
            Ok(fields) => fields,
            Err(e) => {
                self.invalidate();
                return Err(e);
            }
        };

        let rows = read_int32(reader, object, fields.rows)?;
        let cols = read_int32(reader, object, fields.cols)?;
        let flags = read_int32(reader, object, fields.flags)?;
        let data = read_pointer(reader, object, fields.data)?;
        let step_addr = match fields.step {
            Some(step) => read_pointer(reader, object, step)?,
            None => 0,
        };

        let mut descriptor = MatrixDescriptor {
            flags,
            dims: 2,
            rows,
            cols,
            data,
            data_start: data,
            data_end: data,
            data_limit: data,
            step_addr,
            ref_count: 0,
        };

        let span = match (descriptor.geometry(), descriptor.expected_step()) {
            (Ok((rows, _)), Ok(step)) => rows.checked_mul(step),
            _ => None,
        };
        if let Some(span) = span {
            descriptor.data_end = data.saturating_add(span as u64);
            descriptor.data_limit = descriptor.data_end;
        }

        debug!(
            "Reflective header at {:#x}: {}x{} flags={:#x} data={:#x}",
            object, cols, rows, flags, data
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::LayoutTable;
    use crate::process::MockMemoryBuilder;

    fn wrapper_layout() -> LayoutTable {
        LayoutTable::new("Mat")
            .with_field("_rows", 0x08, FieldKind::Int32)
            .with_field("_cols", 0x0C, FieldKind::UInt32)
            .with_field("Type", 0x10, FieldKind::Int32)
            .with_field("DataPointer", 0x18, FieldKind::NativeInt)
            .with_field("step", 0x20, FieldKind::Pointer)
    }

    #[test]
    fn test_first_candidate_wins() {
        let table = LayoutTable::new("Mat")
            .with_field("rows", 0x10, FieldKind::Int32)
            .with_field("_rows", 0x20, FieldKind::Int32);

        assert_eq!(ROWS.probe(&table).unwrap().offset, 0x10);
    }

    #[test]
    fn test_wrong_kind_falls_through() {
        let table = LayoutTable::new("Mat")
            .with_field("rows", 0x10, FieldKind::Int64)
            .with_field("Rows", 0x30, FieldKind::UInt32);

        assert_eq!(ROWS.probe(&table).unwrap().offset, 0x30);
    }

    #[test]
    fn test_missing_required_field_is_layout_mismatch() {
        let mut table = wrapper_layout();
        table.fields.remove("DataPointer");

        assert!(matches!(
            resolve_fields(&table),
            Err(Error::LayoutMismatch(_))
        ));
    }

    #[test]
    fn test_step_is_optional() {
        let mut table = wrapper_layout();
        table.fields.remove("step");

        let fields = resolve_fields(&table).unwrap();
        assert!(fields.step.is_none());
    }

    #[test]
    fn test_decode_synthesizes_missing_fields() {
        let reader = MockMemoryBuilder::new()
            .write_i32(0x08, 4)
            .write_u32(0x0C, 3)
            .write_i32(0x10, 16)
            .write_u64(0x18, 0x9000)
            .write_u64(0x20, 0x1800)
            .build();
        let mut decoder = ReflectiveDecoder::new(Box::new(wrapper_layout()));

        let d = decoder.decode(&reader, 0x1000).unwrap();
        assert!(decoder.is_resolved());
        assert_eq!((d.rows, d.cols, d.flags, d.dims), (4, 3, 16, 2));
        assert_eq!(d.data, 0x9000);
        assert_eq!(d.data_start, 0x9000);
        assert_eq!(d.data_end, 0x9000 + 4 * 9);
        assert_eq!(d.data_limit, d.data_end);
        assert_eq!(d.step_addr, 0x1800);
        assert_eq!(d.ref_count, 0);
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let mut decoder = ReflectiveDecoder::new(Box::new(LayoutTable::new("Other")));
        let reader = MockMemoryBuilder::new().with_size(0x40).build();

        assert!(matches!(
            decoder.decode(&reader, 0x1000),
            Err(Error::LayoutMismatch(_))
        ));
        assert!(!decoder.is_resolved());
    }

    #[test]
    fn test_null_object() {
        let mut decoder = ReflectiveDecoder::new(Box::new(wrapper_layout()));
        let reader = MockMemoryBuilder::new().build();
        assert!(matches!(
            decoder.decode(&reader, 0),
            Err(Error::InvalidPointer { .. })
        ));
    }
}
