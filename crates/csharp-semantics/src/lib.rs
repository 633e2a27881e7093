//! Type information for parsed C# sources.
//!
//! [`bind`] walks a [`CompilationUnit`] once with lexical scopes and returns a
//! [`SemanticModel`] that maps expression, type-syntax and declaration node
//! ids to a resolved [`TypeInfo`]. Consumers query it through the
//! [`TypeOracle`] trait, so tests can substitute a hand-built model.
//!
//! # Example
//!
//! ```
//! use csharp_parser::{parse, Member};
//! use csharp_semantics::{bind, TypeOracle};
//!
//! let result = parse("class C { List<int> xs; }");
//! let model = bind(&result.unit);
//!
//! let Member::Type(class) = &result.unit.members[0] else { unreachable!() };
//! let Member::Field(field) = &class.members[0] else { unreachable!() };
//! let ty = model.type_of(field.declaration.id).unwrap();
//! assert_eq!(ty.display(), "List<int>");
//! ```

mod binder;
mod classes;
mod model;
mod scope;
mod types;

pub use classes::ClassTable;
pub use model::{SemanticModel, TypeOracle};
pub use scope::{Binding, BindingKind, Scope};
pub use types::TypeInfo;

use csharp_parser::visit::Visit;
use csharp_parser::CompilationUnit;

/// Resolves the types of the nodes in a compilation unit.
///
/// Class members are collected first, so fields and methods declared after
/// their first use still resolve. Anything that cannot be resolved is simply
/// absent from the model.
pub fn bind(unit: &CompilationUnit) -> SemanticModel {
    let classes = ClassTable::collect(unit);
    let mut binder = binder::Binder::new(&classes);
    binder.visit_compilation_unit(unit);
    binder.finish()
}

/// Returns the type produced by indexing a value of the given type, for
/// arrays, `List`-like and `Dictionary`-like types and `string`.
pub fn element_type(ty: &TypeInfo) -> Option<TypeInfo> {
    binder::element_type(ty)
}
