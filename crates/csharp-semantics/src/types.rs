//! Resolved type information.

use csharp_parser::{TypeKind, TypeSyntax};
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A resolved type, identified by its bare name.
///
/// Qualifiers do not take part in identity: `System.Collections.Generic.List<int>`
/// and `List<int>` compare equal. They are kept for display only, so a type
/// renders the way it was written. Array levels and nullability are kept as
/// flags on the element type, so `int?[]` is `int` with `nullable = true`
/// and `array_rank = 1`.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    /// The bare type name (`List`, `int`, `GameObject`).
    pub name: SmolStr,
    /// The dotted prefix as written (`UnityEngine` for `UnityEngine.GameObject`).
    pub qualifier: Option<SmolStr>,
    /// Generic type arguments.
    pub type_args: Vec<TypeInfo>,
    /// Number of `[]` levels; a multi-dimensional `[,]` counts as one level.
    pub array_rank: u32,
    /// Whether the element type carries a `?`.
    pub nullable: bool,
}

impl TypeInfo {
    /// Creates a non-generic, non-array type.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a generic type with the given arguments.
    pub fn generic(name: impl Into<SmolStr>, type_args: Vec<TypeInfo>) -> Self {
        Self {
            name: name.into(),
            type_args,
            ..Self::default()
        }
    }

    /// Returns this type wrapped in one more array level.
    pub fn array_of(mut self) -> Self {
        self.array_rank += 1;
        self
    }

    /// Resolves a type as written in source.
    pub fn from_syntax(ty: &TypeSyntax) -> Self {
        match &ty.kind {
            TypeKind::Predefined(name) => Self::named(name.clone()),
            TypeKind::Named(segments) => match segments.split_last() {
                Some((segment, outer)) => {
                    let mut info = Self::generic(
                        segment.name.name.clone(),
                        segment.args.iter().map(Self::from_syntax).collect(),
                    );
                    if !outer.is_empty() {
                        let qualifier = outer
                            .iter()
                            .map(|segment| {
                                Self::generic(
                                    segment.name.name.clone(),
                                    segment.args.iter().map(Self::from_syntax).collect(),
                                )
                                .display()
                            })
                            .collect::<Vec<_>>()
                            .join(".");
                        info.qualifier = Some(qualifier.into());
                    }
                    info
                }
                None => Self::default(),
            },
            TypeKind::Array { element, .. } => Self::from_syntax(element).array_of(),
            TypeKind::Nullable(inner) => {
                let mut info = Self::from_syntax(inner);
                info.nullable = true;
                info
            }
        }
    }

    /// Returns true if the type has generic arguments.
    pub fn is_generic(&self) -> bool {
        !self.type_args.is_empty()
    }

    /// Returns true if this is an array type.
    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// Returns true if this is a non-array type with the given bare name.
    pub fn is_named(&self, name: &str) -> bool {
        !self.is_array() && self.name == name
    }

    /// Returns the element type of an array.
    pub fn array_element(&self) -> Option<TypeInfo> {
        self.is_array().then(|| TypeInfo {
            array_rank: self.array_rank - 1,
            ..self.clone()
        })
    }

    /// Renders the type the way it would be written in C#.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.type_args == other.type_args
            && self.array_rank == other.array_rank
            && self.nullable == other.nullable
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_args.hash(state);
        self.array_rank.hash(state);
        self.nullable.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier}.")?;
        }
        f.write_str(&self.name)?;
        if self.is_generic() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        for _ in 0..self.array_rank {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
