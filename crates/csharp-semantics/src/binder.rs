//! The binder: walks the AST once and records a type for every node it can
//! resolve.
//!
//! Resolution is deliberately local to the file. Names resolve against the
//! lexical scope first, then against the fields and properties of the
//! enclosing types. Members of types declared elsewhere (Unity, VRChat, the
//! BCL) are unknown, apart from a few collection properties.

use crate::classes::ClassTable;
use crate::model::{SemanticModel, TypeOracle};
use crate::scope::{BindingKind, Scope};
use crate::types::TypeInfo;
use csharp_parser::visit::{self, Visit};
use csharp_parser::{
    BinaryOp, Block, CatchClause, ConstructorDecl, Expr, ExprKind, ForeachStmt, IndexerDecl, Lambda,
    LambdaBody, LiteralKind, MethodDecl, ObjectCreation, Parameter, PropertyDecl, Stmt, TypeDecl,
    TypeSyntax, UnaryOp, UsingResource, VariableDeclaration,
};
use smol_str::SmolStr;

const LIST_TYPES: &[&str] = &["List", "IList", "IReadOnlyList"];
const DICTIONARY_TYPES: &[&str] = &["Dictionary", "IDictionary", "IReadOnlyDictionary"];

pub(crate) struct Binder<'a> {
    classes: &'a ClassTable,
    scope: Scope,
    /// Names of the enclosing type declarations, innermost last.
    enclosing: Vec<SmolStr>,
    model: SemanticModel,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(classes: &'a ClassTable) -> Self {
        Self {
            classes,
            scope: Scope::new(),
            enclosing: Vec::new(),
            model: SemanticModel::new(),
        }
    }

    pub(crate) fn finish(self) -> SemanticModel {
        self.model
    }

    fn type_of(&self, expr: &Expr) -> Option<TypeInfo> {
        self.model.type_of(expr.id).cloned()
    }

    fn record(&mut self, expr: &Expr, ty: Option<TypeInfo>) {
        if let Some(ty) = ty {
            self.model.insert(expr.id, ty);
        }
    }

    fn lookup_name(&self, name: &str) -> Option<TypeInfo> {
        if let Some(binding) = self.scope.lookup(name) {
            return match binding.kind {
                BindingKind::Function => None,
                _ => binding.ty.clone(),
            };
        }
        self.enclosing
            .iter()
            .rev()
            .find_map(|class| self.classes.member(class, name))
            .cloned()
    }

    /// The type whose members `target.x` refers to: an instance type, or a
    /// type declared in this file when `target` names it directly.
    fn receiver_type(&self, target: &Expr) -> Option<TypeInfo> {
        if let Some(ty) = self.type_of(target) {
            return Some(ty);
        }
        match &target.kind {
            ExprKind::Name(name)
                if name.type_args.is_empty() && self.classes.contains(&name.name.name) =>
            {
                Some(TypeInfo::named(name.name.name.clone()))
            }
            _ => None,
        }
    }

    fn member_access_type(&self, target: &Expr, member: &str) -> Option<TypeInfo> {
        let receiver = self.receiver_type(target)?;
        if receiver.is_array() {
            return (member == "Length").then(|| TypeInfo::named("int"));
        }
        if let Some(ty) = self.classes.member(&receiver.name, member) {
            return Some(ty.clone());
        }
        let name = receiver.name.as_str();
        let is_collection = LIST_TYPES.contains(&name) || DICTIONARY_TYPES.contains(&name);
        match member {
            "Count" if is_collection => Some(TypeInfo::named("int")),
            "Length" if name == "string" => Some(TypeInfo::named("int")),
            _ => None,
        }
    }

    fn invocation_type(&self, callee: &Expr) -> Option<TypeInfo> {
        match &callee.kind {
            ExprKind::Name(name) => {
                let name = name.name.name.as_str();
                if let Some(binding) = self.scope.lookup(name) {
                    return match binding.kind {
                        BindingKind::Function => binding.ty.clone(),
                        _ => None,
                    };
                }
                self.enclosing
                    .iter()
                    .rev()
                    .find_map(|class| self.classes.method(class, name))
                    .cloned()
            }
            ExprKind::MemberAccess(access) => {
                let receiver = self.receiver_type(&access.target)?;
                if receiver.is_array() {
                    return None;
                }
                self.classes.method(&receiver.name, &access.name.name).cloned()
            }
            _ => None,
        }
    }

    fn expr_type(&self, expr: &Expr) -> Option<TypeInfo> {
        match &expr.kind {
            ExprKind::Literal(kind) => literal_type(*kind),
            ExprKind::InterpolatedString(_) => Some(TypeInfo::named("string")),
            ExprKind::Name(name) => self.lookup_name(&name.name.name),
            ExprKind::This => self.enclosing.last().cloned().map(TypeInfo::named),
            ExprKind::MemberAccess(access) => {
                self.member_access_type(&access.target, &access.name.name)
            }
            ExprKind::ElementAccess(access) => {
                self.type_of(&access.target).and_then(|ty| element_type(&ty))
            }
            ExprKind::Invocation(call) => self.invocation_type(&call.callee),
            ExprKind::ObjectCreation(creation) => creation.ty.as_ref().map(TypeInfo::from_syntax),
            ExprKind::ArrayCreation(creation) => {
                let element = match &creation.element {
                    Some(ty) => TypeInfo::from_syntax(ty),
                    None => creation
                        .initializer
                        .as_ref()
                        .and_then(|elements| elements.first())
                        .and_then(|first| self.type_of(first))?,
                };
                Some((0..creation.rank).fold(element, |ty, _| ty.array_of()))
            }
            ExprKind::Cast(cast) | ExprKind::As(cast) => Some(TypeInfo::from_syntax(&cast.ty)),
            ExprKind::Parenthesized(inner) => self.type_of(inner),
            ExprKind::Assignment(assignment) => self.type_of(&assignment.left),
            ExprKind::Conditional(conditional) => self
                .type_of(&conditional.when_true)
                .or_else(|| self.type_of(&conditional.when_false)),
            ExprKind::Default(ty) => ty.as_ref().map(TypeInfo::from_syntax),
            ExprKind::Binary(binary) => {
                if binary.op.is_boolean() {
                    return Some(TypeInfo::named("bool"));
                }
                let left = self.type_of(&binary.left);
                let right = self.type_of(&binary.right);
                match binary.op {
                    BinaryOp::Coalesce => left
                        .map(|mut ty| {
                            ty.nullable = false;
                            ty
                        })
                        .or(right),
                    BinaryOp::Add if is_string(&left) || is_string(&right) => {
                        Some(TypeInfo::named("string"))
                    }
                    _ if left == right => left,
                    _ => None,
                }
            }
            ExprKind::Unary(unary) => match unary.op {
                UnaryOp::Not => Some(TypeInfo::named("bool")),
                _ => self.type_of(&unary.operand),
            },
            ExprKind::Is(_) => Some(TypeInfo::named("bool")),
            ExprKind::TypeOf(_) => Some(TypeInfo::named("Type")),
            ExprKind::SizeOf(_) => Some(TypeInfo::named("int")),
            ExprKind::Declaration(decl) => {
                (!decl.ty.is_var()).then(|| TypeInfo::from_syntax(&decl.ty))
            }
            _ => None,
        }
    }

    fn declare_parameter(&mut self, param: &Parameter) {
        self.scope.declare(
            param.name.name.clone(),
            BindingKind::Parameter,
            Some(TypeInfo::from_syntax(&param.ty)),
        );
    }
}

/// The type produced by indexing a value of type `ty`.
pub(crate) fn element_type(ty: &TypeInfo) -> Option<TypeInfo> {
    if ty.is_array() {
        return ty.array_element();
    }
    let name = ty.name.as_str();
    match ty.type_args.as_slice() {
        [arg] if LIST_TYPES.contains(&name) => Some(arg.clone()),
        [_, value] if DICTIONARY_TYPES.contains(&name) => Some(value.clone()),
        [] if name == "string" => Some(TypeInfo::named("char")),
        _ => None,
    }
}

fn is_string(ty: &Option<TypeInfo>) -> bool {
    matches!(ty, Some(ty) if ty.is_named("string"))
}

fn literal_type(kind: LiteralKind) -> Option<TypeInfo> {
    let name = match kind {
        LiteralKind::Int => "int",
        LiteralKind::UInt => "uint",
        LiteralKind::Long => "long",
        LiteralKind::ULong => "ulong",
        LiteralKind::Float => "float",
        LiteralKind::Double => "double",
        LiteralKind::Decimal => "decimal",
        LiteralKind::String => "string",
        LiteralKind::Char => "char",
        LiteralKind::Bool => "bool",
        LiteralKind::Null => return None,
    };
    Some(TypeInfo::named(name))
}

impl Visit for Binder<'_> {
    fn visit_type_decl(&mut self, decl: &TypeDecl) {
        self.enclosing.push(decl.name.name.clone());
        visit::walk_type_decl(self, decl);
        self.enclosing.pop();
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        self.scope.enter();
        visit::walk_method(self, method);
        self.scope.leave();
    }

    fn visit_constructor(&mut self, ctor: &ConstructorDecl) {
        self.scope.enter();
        visit::walk_constructor(self, ctor);
        self.scope.leave();
    }

    fn visit_parameter(&mut self, param: &Parameter) {
        visit::walk_parameter(self, param);
        self.declare_parameter(param);
    }

    fn visit_property(&mut self, property: &PropertyDecl) {
        self.visit_type(&property.ty);
        let ty = TypeInfo::from_syntax(&property.ty);
        for accessor in &property.accessors {
            self.scope.enter();
            self.scope
                .declare("value".into(), BindingKind::Parameter, Some(ty.clone()));
            self.visit_body(accessor);
            self.scope.leave();
        }
        if let Some(expr) = &property.expression_body {
            self.scope.enter();
            self.visit_expr(expr);
            self.scope.leave();
        }
        if let Some(expr) = &property.initializer {
            self.visit_expr(expr);
        }
    }

    fn visit_indexer(&mut self, indexer: &IndexerDecl) {
        self.visit_type(&indexer.ty);
        self.scope.enter();
        for param in &indexer.params {
            self.visit_parameter(param);
        }
        let ty = TypeInfo::from_syntax(&indexer.ty);
        for accessor in &indexer.accessors {
            self.scope.enter();
            self.scope
                .declare("value".into(), BindingKind::Parameter, Some(ty.clone()));
            self.visit_body(accessor);
            self.scope.leave();
        }
        if let Some(expr) = &indexer.expression_body {
            self.visit_expr(expr);
        }
        self.scope.leave();
    }

    fn visit_block(&mut self, block: &Block) {
        self.scope.enter();
        visit::walk_block(self, block);
        self.scope.leave();
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::LocalFunction(method) => {
                self.scope.declare(
                    method.name.name.clone(),
                    BindingKind::Function,
                    Some(TypeInfo::from_syntax(&method.return_type)),
                );
                self.visit_method(method);
            }
            Stmt::For(_) | Stmt::Switch(_) => {
                self.scope.enter();
                visit::walk_stmt(self, stmt);
                self.scope.leave();
            }
            Stmt::Using(using) if matches!(using.resource, UsingResource::Declaration(_)) => {
                self.scope.enter();
                visit::walk_stmt(self, stmt);
                self.scope.leave();
            }
            _ => visit::walk_stmt(self, stmt),
        }
    }

    fn visit_foreach(&mut self, stmt: &ForeachStmt) {
        self.scope.enter();
        self.visit_expr(&stmt.collection);
        let ty = if stmt.ty.is_var() {
            let inferred = self
                .type_of(&stmt.collection)
                .and_then(|collection| element_type(&collection));
            if let Some(ty) = &inferred {
                self.model.insert(stmt.ty.id, ty.clone());
            }
            inferred
        } else {
            self.visit_type(&stmt.ty);
            Some(TypeInfo::from_syntax(&stmt.ty))
        };
        self.scope
            .declare(stmt.name.name.clone(), BindingKind::Iteration, ty);
        self.visit_stmt(&stmt.body);
        self.scope.leave();
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        self.scope.enter();
        if let Some(ty) = &clause.ty {
            self.visit_type(ty);
            if let Some(name) = &clause.name {
                self.scope.declare(
                    name.name.clone(),
                    BindingKind::Catch,
                    Some(TypeInfo::from_syntax(ty)),
                );
            }
        }
        if let Some(filter) = &clause.filter {
            self.visit_expr(filter);
        }
        self.visit_block(&clause.block);
        self.scope.leave();
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        let declared = (!decl.ty.is_var()).then(|| TypeInfo::from_syntax(&decl.ty));
        self.visit_type(&decl.ty);

        let mut inferred = None;
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.initializer {
                self.visit_expr(init);
            }
            let ty = match &declared {
                Some(ty) => Some(ty.clone()),
                None => declarator
                    .initializer
                    .as_ref()
                    .and_then(|init| self.type_of(init)),
            };
            if inferred.is_none() {
                inferred = ty.clone();
            }
            self.scope
                .declare(declarator.name.name.clone(), BindingKind::Local, ty);
        }

        match declared {
            Some(ty) => {
                self.model.insert(decl.id, ty);
            }
            None => {
                if let Some(ty) = inferred {
                    self.model.insert(decl.ty.id, ty.clone());
                    self.model.insert(decl.id, ty);
                }
            }
        }
    }

    fn visit_type(&mut self, ty: &TypeSyntax) {
        if !ty.is_var() {
            self.model.insert(ty.id, TypeInfo::from_syntax(ty));
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        visit::walk_expr(self, expr);
        match &expr.kind {
            ExprKind::Declaration(decl) => {
                let ty = self.expr_type(expr);
                self.scope
                    .declare(decl.name.name.clone(), BindingKind::Local, ty);
            }
            ExprKind::Is(pattern) => {
                if let (Some(ty), Some(name)) = (&pattern.ty, &pattern.designation) {
                    self.scope.declare(
                        name.name.clone(),
                        BindingKind::Pattern,
                        Some(TypeInfo::from_syntax(ty)),
                    );
                }
            }
            _ => {}
        }
        let ty = self.expr_type(expr);
        self.record(expr, ty);
    }

    fn visit_object_creation(&mut self, _expr: &Expr, creation: &ObjectCreation) {
        if let Some(ty) = &creation.ty {
            self.visit_type(ty);
        }
        for arg in creation.args.iter().flatten() {
            self.visit_argument(arg);
        }
        let created = creation.ty.as_ref().map(TypeInfo::from_syntax);
        for element in creation.initializer.iter().flatten() {
            // `new T { Member = value }` names a member of T, not a local.
            let member = match &element.kind {
                ExprKind::Assignment(assignment) => match &assignment.left.kind {
                    ExprKind::Name(name) => Some((assignment, &name.name.name)),
                    _ => None,
                },
                _ => None,
            };
            let Some((assignment, name)) = member else {
                self.visit_expr(element);
                continue;
            };
            self.visit_expr(&assignment.right);
            let ty = created
                .as_ref()
                .filter(|created| !created.is_array())
                .and_then(|created| self.classes.member(&created.name, name))
                .cloned();
            self.record(&assignment.left, ty.clone());
            self.record(element, ty);
        }
    }

    fn visit_lambda(&mut self, _expr: &Expr, lambda: &Lambda) {
        self.scope.enter();
        for param in &lambda.params {
            let ty = param.ty.as_ref().map(|ty| {
                self.visit_type(ty);
                TypeInfo::from_syntax(ty)
            });
            self.scope
                .declare(param.name.name.clone(), BindingKind::Parameter, ty);
        }
        match &lambda.body {
            LambdaBody::Expr(body) => self.visit_expr(body),
            LambdaBody::Block(block) => self.visit_block(block),
        }
        self.scope.leave();
    }
}
