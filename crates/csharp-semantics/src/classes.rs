//! Member tables for the types declared in a file.

use crate::types::TypeInfo;
use csharp_parser::{CompilationUnit, Member, TypeDecl};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// The members of one declared type.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    /// Field and property types.
    members: FxHashMap<SmolStr, TypeInfo>,
    /// Method return types; `None` when overloads disagree.
    methods: FxHashMap<SmolStr, Option<TypeInfo>>,
}

/// All classes, structs and interfaces declared in a file, keyed by bare name.
///
/// Partial declarations and same-named types in different namespaces are
/// merged; the first declaration of a member wins.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: FxHashMap<SmolStr, ClassInfo>,
}

impl ClassTable {
    /// Collects the member tables of every type in the file, including nested types.
    pub fn collect(unit: &CompilationUnit) -> Self {
        let mut table = Self::default();
        table.collect_members(&unit.members);
        table
    }

    fn collect_members(&mut self, members: &[Member]) {
        for member in members {
            match member {
                Member::Namespace(ns) => self.collect_members(&ns.members),
                Member::Type(decl) => self.collect_type(decl),
                _ => {}
            }
        }
    }

    fn collect_type(&mut self, decl: &TypeDecl) {
        let info = self.classes.entry(decl.name.name.clone()).or_default();
        for member in &decl.members {
            match member {
                Member::Field(field) => {
                    let declaration = &field.declaration;
                    if declaration.ty.is_var() {
                        continue;
                    }
                    let ty = TypeInfo::from_syntax(&declaration.ty);
                    for declarator in &declaration.declarators {
                        info.members
                            .entry(declarator.name.name.clone())
                            .or_insert_with(|| ty.clone());
                    }
                }
                Member::Property(property) => {
                    info.members
                        .entry(property.name.name.clone())
                        .or_insert_with(|| TypeInfo::from_syntax(&property.ty));
                }
                Member::Method(method) => {
                    let ty = TypeInfo::from_syntax(&method.return_type);
                    info.methods
                        .entry(method.name.name.clone())
                        .and_modify(|existing| {
                            if existing.as_ref() != Some(&ty) {
                                *existing = None;
                            }
                        })
                        .or_insert(Some(ty));
                }
                _ => {}
            }
        }
        for member in &decl.members {
            if let Member::Type(nested) = member {
                self.collect_type(nested);
            }
        }
    }

    /// Returns true if a type with this name is declared in the file.
    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Returns the type of a field or property.
    pub fn member(&self, class: &str, name: &str) -> Option<&TypeInfo> {
        self.classes.get(class)?.members.get(name)
    }

    /// Returns the return type of a method, if all overloads agree.
    pub fn method(&self, class: &str, name: &str) -> Option<&TypeInfo> {
        self.classes.get(class)?.methods.get(name)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csharp_parser::parse;

    #[test]
    fn test_collects_fields_properties_methods() {
        let source = r#"
namespace Game {
    class Board {
        List<int> scores, backup;
        public string Title { get; set; }
        int Count() { return 0; }
        int Pick(int i) { return i; }
        string Pick(string s) { return s; }
        class Cell { float weight; }
    }
}
partial class Board { bool dirty; }
"#;
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let table = ClassTable::collect(&result.unit);

        assert!(table.contains("Board"));
        assert!(table.contains("Cell"));
        assert_eq!(table.member("Board", "backup").map(TypeInfo::display).as_deref(), Some("List<int>"));
        assert_eq!(table.member("Board", "Title"), Some(&TypeInfo::named("string")));
        assert_eq!(table.member("Board", "dirty"), Some(&TypeInfo::named("bool")));
        assert_eq!(table.member("Cell", "weight"), Some(&TypeInfo::named("float")));
        assert_eq!(table.method("Board", "Count"), Some(&TypeInfo::named("int")));
        assert_eq!(table.method("Board", "Pick"), None);
        assert_eq!(table.member("Board", "weight"), None);
    }
}
