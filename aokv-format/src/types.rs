//! Typed-array element kind enumeration

use crate::error::AokvError;

/// Recognized typed-array element kinds.
///
/// This is a closed set: decoding an `a` tag string outside this set must
/// fail with `BadTypedArray` rather than being accepted silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit unsigned integer, clamped on construction (decode-side this is
    /// indistinguishable from `U8`; the tag is preserved for round-trip
    /// fidelity of the source typed array's constructor).
    U8Clamped,
    /// 16-bit signed integer.
    I16,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit IEEE-754 float.
    F32,
    /// 64-bit IEEE-754 float.
    F64,
    /// Opaque byte window with no element interpretation (`DataView`).
    OpaqueDataView,
}

impl ElementKind {
    /// Size in bytes of a single element (1 for the opaque-dataview kind).
    pub fn element_size(self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::U8Clamped | ElementKind::OpaqueDataView => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }

    /// The wire tag string persisted in the descriptor's `a` field.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::U8 => "u8",
            ElementKind::U8Clamped => "u8-clamped",
            ElementKind::I16 => "i16",
            ElementKind::U16 => "u16",
            ElementKind::I32 => "i32",
            ElementKind::U32 => "u32",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
            ElementKind::OpaqueDataView => "opaque-dataview",
        }
    }

    /// Parse a wire tag string, rejecting anything outside the recognized set.
    pub fn from_tag(tag: &str) -> Result<Self, AokvError> {
        match tag {
            "u8" => Ok(ElementKind::U8),
            "u8-clamped" => Ok(ElementKind::U8Clamped),
            "i16" => Ok(ElementKind::I16),
            "u16" => Ok(ElementKind::U16),
            "i32" => Ok(ElementKind::I32),
            "u32" => Ok(ElementKind::U32),
            "f32" => Ok(ElementKind::F32),
            "f64" => Ok(ElementKind::F64),
            "opaque-dataview" => Ok(ElementKind::OpaqueDataView),
            other => Err(AokvError::BadTypedArray(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ElementKind] = &[
        ElementKind::U8,
        ElementKind::U8Clamped,
        ElementKind::I16,
        ElementKind::U16,
        ElementKind::I32,
        ElementKind::U32,
        ElementKind::F32,
        ElementKind::F64,
        ElementKind::OpaqueDataView,
    ];

    #[test]
    fn tag_roundtrip() {
        for &kind in ALL {
            assert_eq!(ElementKind::from_tag(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(matches!(
            ElementKind::from_tag("i64"),
            Err(AokvError::BadTypedArray(_))
        ));
    }

    #[test]
    fn element_sizes() {
        assert_eq!(ElementKind::U8.element_size(), 1);
        assert_eq!(ElementKind::OpaqueDataView.element_size(), 1);
        assert_eq!(ElementKind::I16.element_size(), 2);
        assert_eq!(ElementKind::U16.element_size(), 2);
        assert_eq!(ElementKind::I32.element_size(), 4);
        assert_eq!(ElementKind::U32.element_size(), 4);
        assert_eq!(ElementKind::F32.element_size(), 4);
        assert_eq!(ElementKind::F64.element_size(), 8);
    }
}
