//! Element type classification.
//!
//! A `DataList` stores every element as a `DataToken`, a tagged union with one
//! typed field per native kind plus a `Reference` field for everything else.
//! Reading an element therefore means picking the field for the element type,
//! or casting the reference payload back when there is no such field.

use std::fmt;

/// The native kinds a `DataToken` can hold directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Null,
    Boolean,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
    DataList,
    DataDictionary,
    Reference,
    Error,
}

impl NativeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NativeKind; 17] = [
        NativeKind::Null,
        NativeKind::Boolean,
        NativeKind::SByte,
        NativeKind::Byte,
        NativeKind::Short,
        NativeKind::UShort,
        NativeKind::Int,
        NativeKind::UInt,
        NativeKind::Long,
        NativeKind::ULong,
        NativeKind::Float,
        NativeKind::Double,
        NativeKind::String,
        NativeKind::DataList,
        NativeKind::DataDictionary,
        NativeKind::Reference,
        NativeKind::Error,
    ];

    /// The canonical name, which is also the name of the token field.
    pub fn name(self) -> &'static str {
        match self {
            NativeKind::Null => "Null",
            NativeKind::Boolean => "Boolean",
            NativeKind::SByte => "SByte",
            NativeKind::Byte => "Byte",
            NativeKind::Short => "Short",
            NativeKind::UShort => "UShort",
            NativeKind::Int => "Int",
            NativeKind::UInt => "UInt",
            NativeKind::Long => "Long",
            NativeKind::ULong => "ULong",
            NativeKind::Float => "Float",
            NativeKind::Double => "Double",
            NativeKind::String => "String",
            NativeKind::DataList => "DataList",
            NativeKind::DataDictionary => "DataDictionary",
            NativeKind::Reference => "Reference",
            NativeKind::Error => "Error",
        }
    }

    /// Looks a kind up by name, ignoring ASCII case. No aliases: `bool` and
    /// `Int32` are not kinds.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an element of a given type is read back from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Read the typed field directly: `list[i].Int`.
    Direct(NativeKind),
    /// Cast the reference payload: `((Foo)(list[i]).Reference)`.
    CastWrapped(String),
}

/// Classifies an element type by its display text.
pub fn classify(type_display: &str) -> Classification {
    match NativeKind::from_name(type_display) {
        Some(kind) => Classification::Direct(kind),
        None => Classification::CastWrapped(type_display.to_string()),
    }
}
