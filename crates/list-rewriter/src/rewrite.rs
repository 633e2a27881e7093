//! The rewrite pass: one top-down walk over the immutable tree that edits
//! the buffer wherever a rule matches.

use crate::buffer::EditBuffer;
use crate::classify::{classify, Classification};
use crate::error::RewriteError;
use crate::options::RewriteOptions;
use csharp_parser::visit::{self, Visit};
use csharp_parser::{
    AssignOp, Assignment, CompilationUnit, ElementAccess, Expr, ExprKind, ObjectCreation, Span,
    TypeSyntax, VariableDeclaration,
};
use csharp_semantics::{TypeInfo, TypeOracle};
use regex::Regex;
use tracing::{debug, trace};

/// The rule that produced an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `List<int> xs` → `DataList xs`
    Declaration,
    /// `var xs = new List<int>()` → `var xs = new DataList()`
    DeclaratorInitializer,
    /// `xs = new List<int>()` → `xs = new DataList()`
    Assignment,
    /// `xs[0]` → `xs[0].Int`, `ys[0]` → `((Foo)(ys[0]).Reference)`
    ElementAccess,
}

impl Rule {
    /// A short human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Declaration => "declaration",
            Rule::DeclaratorInitializer => "declarator initializer",
            Rule::Assignment => "assignment",
            Rule::ElementAccess => "element access",
        }
    }
}

/// One applied rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The rule that matched.
    pub rule: Rule,
    /// The rewritten node's span in the original text.
    pub span: Span,
    /// The node's text before the edit.
    pub before: String,
    /// The node's text after the edit.
    pub after: String,
}

pub(crate) struct Rewriter<'a, O: ?Sized> {
    options: &'a RewriteOptions,
    oracle: &'a O,
    pattern: Regex,
    buffer: EditBuffer<'a>,
    edits: Vec<Edit>,
    error: Option<RewriteError>,
}

impl<'a, O: TypeOracle + ?Sized> Rewriter<'a, O> {
    pub(crate) fn new(
        source: &'a str,
        oracle: &'a O,
        options: &'a RewriteOptions,
    ) -> Result<Self, RewriteError> {
        Ok(Self {
            options,
            oracle,
            pattern: options.declaration_pattern()?,
            buffer: EditBuffer::new(source),
            edits: Vec::new(),
            error: None,
        })
    }

    pub(crate) fn run(mut self, unit: &CompilationUnit) -> Result<(String, Vec<Edit>), RewriteError> {
        self.visit_compilation_unit(unit);
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.buffer.into_text(), self.edits)),
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Keeps the first hard failure; returns true if the pass may continue.
    fn settle(&mut self, result: Result<(), RewriteError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }

    fn is_source(&self, ty: Option<&TypeInfo>) -> bool {
        ty.is_some_and(|ty| ty.is_generic() && ty.is_named(&self.options.source_type))
    }

    /// The element type of a resolved single-argument source collection.
    fn source_element(&self, ty: Option<&TypeInfo>) -> Option<TypeInfo> {
        match ty?.type_args.as_slice() {
            [element] if self.is_source(ty) => Some(element.clone()),
            _ => None,
        }
    }

    /// `new List<...>(...)`, judged from the written type.
    fn is_source_creation(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::ObjectCreation(ObjectCreation { ty: Some(ty), .. }) => {
                self.is_source(Some(&TypeInfo::from_syntax(ty)))
            }
            _ => false,
        }
    }

    fn push_edit(&mut self, rule: Rule, span: Span, before: String, after: String) {
        debug!(
            rule = rule.as_str(),
            start = u32::from(span.start),
            "'{before}' -> '{after}'"
        );
        self.edits.push(Edit {
            rule,
            span,
            before,
            after,
        });
    }

    fn rewrite_declared_type(&mut self, ty: &TypeSyntax) -> Result<(), RewriteError> {
        let node = Rule::Declaration.as_str();
        let (before, after) = {
            let text = self.buffer.current_text(ty.span, node)?;
            let found: Vec<_> = self.pattern.find_iter(text).map(|m| m.range()).collect();
            let [range] = found.as_slice() else {
                trace!(matches = found.len(), "declared type '{text}' left as is");
                return Ok(());
            };
            let after = format!(
                "{}{}{}",
                &text[..range.start],
                self.options.target_type,
                &text[range.end..]
            );
            (text.to_string(), after)
        };
        self.buffer.replace(ty.span, &after, node)?;
        self.push_edit(Rule::Declaration, ty.span, before, after);
        Ok(())
    }

    fn replace_creation(&mut self, expr: &Expr, rule: Rule) -> Result<(), RewriteError> {
        let node = rule.as_str();
        let before = self.buffer.current_text(expr.span, node)?.to_string();
        let after = format!("new {}()", self.options.target_type);
        self.buffer.replace(expr.span, &after, node)?;
        self.push_edit(rule, expr.span, before, after);
        Ok(())
    }

    fn wrap_element_access(&mut self, expr: &Expr, element: &TypeInfo) -> Result<(), RewriteError> {
        let node = Rule::ElementAccess.as_str();
        let before = self.buffer.current_text(expr.span, node)?.to_string();
        let (prefix, suffix) = match classify(&element.display()) {
            Classification::Direct(kind) => (String::new(), format!(".{kind}")),
            Classification::CastWrapped(ty) => (
                format!("(({ty})("),
                format!(").{})", self.options.reference_field),
            ),
        };
        // Separate insertions keep the spans inside the access resolvable.
        if !prefix.is_empty() {
            self.buffer.insert_before(expr.span, &prefix, node)?;
        }
        self.buffer.insert_after(expr.span, &suffix, node)?;
        let after = format!("{prefix}{before}{suffix}");
        self.push_edit(Rule::ElementAccess, expr.span, before, after);
        Ok(())
    }
}

impl<O: TypeOracle + ?Sized> Visit for Rewriter<'_, O> {
    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        if self.failed() {
            return;
        }
        if !self.is_source(self.oracle.type_of(decl.ty.id)) {
            visit::walk_variable_declaration(self, decl);
            return;
        }

        let result = self.rewrite_declared_type(&decl.ty);
        if !self.settle(result) {
            return;
        }
        for declarator in &decl.declarators {
            match &declarator.initializer {
                Some(init) if self.is_source_creation(init) => {
                    let result = self.replace_creation(init, Rule::DeclaratorInitializer);
                    if !self.settle(result) {
                        return;
                    }
                }
                _ => self.visit_variable_declarator(declarator),
            }
        }
    }

    fn visit_assignment(&mut self, _expr: &Expr, assignment: &Assignment) {
        if self.failed() {
            return;
        }
        let rewritable = assignment.op == AssignOp::Assign
            && self.is_source(self.oracle.type_of(assignment.left.id))
            && self.is_source_creation(&assignment.right);
        if !rewritable {
            visit::walk_assignment(self, assignment);
            return;
        }

        self.visit_expr(&assignment.left);
        if self.failed() {
            return;
        }
        let result = self.replace_creation(&assignment.right, Rule::Assignment);
        self.settle(result);
    }

    fn visit_element_access(&mut self, expr: &Expr, access: &ElementAccess) {
        if self.failed() {
            return;
        }
        if let ExprKind::Name(name) = &access.target.kind {
            let element = if name.type_args.is_empty() {
                self.source_element(self.oracle.type_of(access.target.id))
            } else {
                None
            };
            if let Some(element) = element {
                let result = self.wrap_element_access(expr, &element);
                if !self.settle(result) {
                    return;
                }
            }
        }
        visit::walk_element_access(self, access);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csharp_parser::{parse, NodeId};
    use csharp_semantics::SemanticModel;
    use pretty_assertions::assert_eq;

    /// Types every expression spelled `name` as `List<element>`.
    struct Spelled<'a> {
        source: &'a str,
        name: &'a str,
        ids: Vec<NodeId>,
    }

    impl Visit for Spelled<'_> {
        fn visit_expr(&mut self, expr: &Expr) {
            if expr.span.slice(self.source) == Some(self.name) {
                self.ids.push(expr.id);
            }
            visit::walk_expr(self, expr);
        }
    }

    fn rewrite_access(element: &str) -> String {
        let source = "class C { void M() { var x = nums[nums[0]]; } }";
        let parsed = parse(source);
        let mut spelled = Spelled {
            source,
            name: "nums",
            ids: Vec::new(),
        };
        spelled.visit_compilation_unit(&parsed.unit);

        let mut model = SemanticModel::new();
        for id in spelled.ids {
            model.insert(
                id,
                TypeInfo::generic("List", vec![TypeInfo::named(element)]),
            );
        }
        let options = RewriteOptions::default();
        let rewriter = Rewriter::new(source, &model, &options).unwrap();
        let (text, edits) = rewriter.run(&parsed.unit).unwrap();
        assert_eq!(edits.len(), 2);
        text
    }

    #[test]
    fn test_nested_direct_access() {
        assert_eq!(
            rewrite_access("int"),
            "class C { void M() { var x = nums[nums[0].Int].Int; } }"
        );
    }

    #[test]
    fn test_nested_cast_wrapped_access() {
        assert_eq!(
            rewrite_access("Foo"),
            "class C { void M() { var x = ((Foo)(nums[((Foo)(nums[0]).Reference)]).Reference); } }"
        );
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(Rule::DeclaratorInitializer.as_str(), "declarator initializer");
        assert_eq!(Rule::ElementAccess.as_str(), "element access");
    }
}
