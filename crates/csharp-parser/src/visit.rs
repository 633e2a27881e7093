//! Read-only AST traversal.
//!
//! Implement [`Visit`] and override only the methods of interest. Call the
//! matching `walk_*` function from an override to continue into the children;
//! leave it out to prune the traversal at that node.

use crate::ast::*;

/// Read-only AST visitor. Default implementations recurse into all children
/// in source order.
pub trait Visit {
    fn visit_compilation_unit(&mut self, unit: &CompilationUnit) {
        walk_compilation_unit(self, unit);
    }

    fn visit_member(&mut self, member: &Member) {
        walk_member(self, member);
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl) {
        walk_type_decl(self, decl);
    }

    fn visit_field(&mut self, field: &FieldDecl) {
        walk_field(self, field);
    }

    fn visit_property(&mut self, property: &PropertyDecl) {
        walk_property(self, property);
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        walk_method(self, method);
    }

    fn visit_constructor(&mut self, ctor: &ConstructorDecl) {
        walk_constructor(self, ctor);
    }

    fn visit_indexer(&mut self, indexer: &IndexerDecl) {
        walk_indexer(self, indexer);
    }

    fn visit_parameter(&mut self, param: &Parameter) {
        walk_parameter(self, param);
    }

    fn visit_body(&mut self, body: &Body) {
        walk_body(self, body);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_foreach(&mut self, stmt: &ForeachStmt) {
        walk_foreach(self, stmt);
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        walk_catch_clause(self, clause);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        walk_variable_declaration(self, decl);
    }

    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator) {
        walk_variable_declarator(self, decl);
    }

    fn visit_type(&mut self, _ty: &TypeSyntax) {}

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_assignment(&mut self, _expr: &Expr, assignment: &Assignment) {
        walk_assignment(self, assignment);
    }

    fn visit_element_access(&mut self, _expr: &Expr, access: &ElementAccess) {
        walk_element_access(self, access);
    }

    fn visit_object_creation(&mut self, _expr: &Expr, creation: &ObjectCreation) {
        walk_object_creation(self, creation);
    }

    fn visit_lambda(&mut self, _expr: &Expr, lambda: &Lambda) {
        walk_lambda(self, lambda);
    }

    fn visit_argument(&mut self, arg: &Argument) {
        self.visit_expr(&arg.expr);
    }
}

pub fn walk_compilation_unit<V: Visit + ?Sized>(v: &mut V, unit: &CompilationUnit) {
    for member in &unit.members {
        v.visit_member(member);
    }
}

pub fn walk_member<V: Visit + ?Sized>(v: &mut V, member: &Member) {
    match member {
        Member::Namespace(ns) => {
            for member in &ns.members {
                v.visit_member(member);
            }
        }
        Member::Type(decl) => v.visit_type_decl(decl),
        Member::Field(field) => v.visit_field(field),
        Member::Property(property) => v.visit_property(property),
        Member::Method(method) => v.visit_method(method),
        Member::Constructor(ctor) => v.visit_constructor(ctor),
        Member::Indexer(indexer) => v.visit_indexer(indexer),
        Member::Finalizer(finalizer) => {
            if let Some(body) = &finalizer.body {
                v.visit_body(body);
            }
        }
        Member::Using(_) | Member::Unknown(_) => {}
    }
}

pub fn walk_type_decl<V: Visit + ?Sized>(v: &mut V, decl: &TypeDecl) {
    for member in &decl.members {
        v.visit_member(member);
    }
}

pub fn walk_field<V: Visit + ?Sized>(v: &mut V, field: &FieldDecl) {
    v.visit_variable_declaration(&field.declaration);
}

pub fn walk_property<V: Visit + ?Sized>(v: &mut V, property: &PropertyDecl) {
    v.visit_type(&property.ty);
    for accessor in &property.accessors {
        v.visit_body(accessor);
    }
    if let Some(expr) = &property.expression_body {
        v.visit_expr(expr);
    }
    if let Some(expr) = &property.initializer {
        v.visit_expr(expr);
    }
}

pub fn walk_method<V: Visit + ?Sized>(v: &mut V, method: &MethodDecl) {
    v.visit_type(&method.return_type);
    for param in &method.params {
        v.visit_parameter(param);
    }
    if let Some(body) = &method.body {
        v.visit_body(body);
    }
}

pub fn walk_constructor<V: Visit + ?Sized>(v: &mut V, ctor: &ConstructorDecl) {
    for param in &ctor.params {
        v.visit_parameter(param);
    }
    for arg in &ctor.initializer_args {
        v.visit_argument(arg);
    }
    if let Some(body) = &ctor.body {
        v.visit_body(body);
    }
}

pub fn walk_indexer<V: Visit + ?Sized>(v: &mut V, indexer: &IndexerDecl) {
    v.visit_type(&indexer.ty);
    for param in &indexer.params {
        v.visit_parameter(param);
    }
    for accessor in &indexer.accessors {
        v.visit_body(accessor);
    }
    if let Some(expr) = &indexer.expression_body {
        v.visit_expr(expr);
    }
}

pub fn walk_parameter<V: Visit + ?Sized>(v: &mut V, param: &Parameter) {
    v.visit_type(&param.ty);
    if let Some(default) = &param.default {
        v.visit_expr(default);
    }
}

pub fn walk_body<V: Visit + ?Sized>(v: &mut V, body: &Body) {
    match body {
        Body::Block(block) => v.visit_block(block),
        Body::Expression(expr) => v.visit_expr(expr),
    }
}

pub fn walk_block<V: Visit + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Block(block) => v.visit_block(block),
        Stmt::Local(local) => v.visit_variable_declaration(&local.declaration),
        Stmt::LocalFunction(method) => v.visit_method(method),
        Stmt::Expr(stmt) => v.visit_expr(&stmt.expr),
        Stmt::If(stmt) => {
            v.visit_expr(&stmt.condition);
            v.visit_stmt(&stmt.then_branch);
            if let Some(else_branch) = &stmt.else_branch {
                v.visit_stmt(else_branch);
            }
        }
        Stmt::While(stmt) => {
            v.visit_expr(&stmt.condition);
            v.visit_stmt(&stmt.body);
        }
        Stmt::DoWhile(stmt) => {
            v.visit_stmt(&stmt.body);
            v.visit_expr(&stmt.condition);
        }
        Stmt::For(stmt) => {
            match &stmt.init {
                Some(ForInit::Declaration(decl)) => v.visit_variable_declaration(decl),
                Some(ForInit::Expressions(exprs)) => {
                    for expr in exprs {
                        v.visit_expr(expr);
                    }
                }
                None => {}
            }
            if let Some(condition) = &stmt.condition {
                v.visit_expr(condition);
            }
            for expr in &stmt.iterators {
                v.visit_expr(expr);
            }
            v.visit_stmt(&stmt.body);
        }
        Stmt::Foreach(stmt) => v.visit_foreach(stmt),
        Stmt::Switch(stmt) => {
            v.visit_expr(&stmt.subject);
            for section in &stmt.sections {
                for label in section.labels.iter().flatten() {
                    v.visit_expr(label);
                }
                for stmt in &section.stmts {
                    v.visit_stmt(stmt);
                }
            }
        }
        Stmt::Try(stmt) => {
            v.visit_block(&stmt.block);
            for clause in &stmt.catches {
                v.visit_catch_clause(clause);
            }
            if let Some(finally) = &stmt.finally {
                v.visit_block(finally);
            }
        }
        Stmt::Using(stmt) => {
            match &stmt.resource {
                UsingResource::Declaration(decl) => v.visit_variable_declaration(decl),
                UsingResource::Expr(expr) => v.visit_expr(expr),
            }
            v.visit_stmt(&stmt.body);
        }
        Stmt::Lock(stmt) => {
            v.visit_expr(&stmt.target);
            v.visit_stmt(&stmt.body);
        }
        Stmt::Jump(stmt) => {
            if let Some(value) = &stmt.value {
                v.visit_expr(value);
            }
        }
        Stmt::Simple(_) | Stmt::Unknown(_) => {}
    }
}

pub fn walk_foreach<V: Visit + ?Sized>(v: &mut V, stmt: &ForeachStmt) {
    v.visit_type(&stmt.ty);
    v.visit_expr(&stmt.collection);
    v.visit_stmt(&stmt.body);
}

pub fn walk_catch_clause<V: Visit + ?Sized>(v: &mut V, clause: &CatchClause) {
    if let Some(ty) = &clause.ty {
        v.visit_type(ty);
    }
    if let Some(filter) = &clause.filter {
        v.visit_expr(filter);
    }
    v.visit_block(&clause.block);
}

pub fn walk_variable_declaration<V: Visit + ?Sized>(v: &mut V, decl: &VariableDeclaration) {
    v.visit_type(&decl.ty);
    for declarator in &decl.declarators {
        v.visit_variable_declarator(declarator);
    }
}

pub fn walk_variable_declarator<V: Visit + ?Sized>(v: &mut V, decl: &VariableDeclarator) {
    if let Some(init) = &decl.initializer {
        v.visit_expr(init);
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Assignment(assignment) => v.visit_assignment(expr, assignment),
        ExprKind::ElementAccess(access) => v.visit_element_access(expr, access),
        ExprKind::ObjectCreation(creation) => v.visit_object_creation(expr, creation),
        ExprKind::Lambda(lambda) => v.visit_lambda(expr, lambda),
        ExprKind::InterpolatedString(parts) | ExprKind::InitializerList(parts) => {
            for part in parts {
                v.visit_expr(part);
            }
        }
        ExprKind::Name(name) => {
            for arg in &name.type_args {
                v.visit_type(arg);
            }
        }
        ExprKind::PredefinedType(ty) | ExprKind::TypeOf(ty) | ExprKind::SizeOf(ty) => v.visit_type(ty),
        ExprKind::Default(ty) => {
            if let Some(ty) = ty {
                v.visit_type(ty);
            }
        }
        ExprKind::MemberAccess(access) => {
            v.visit_expr(&access.target);
            for arg in &access.type_args {
                v.visit_type(arg);
            }
        }
        ExprKind::Invocation(call) => {
            v.visit_expr(&call.callee);
            for arg in &call.args {
                v.visit_argument(arg);
            }
        }
        ExprKind::ArrayCreation(creation) => {
            if let Some(element) = &creation.element {
                v.visit_type(element);
            }
            for size in &creation.sizes {
                v.visit_expr(size);
            }
            for element in creation.initializer.iter().flatten() {
                v.visit_expr(element);
            }
        }
        ExprKind::Binary(binary) => {
            v.visit_expr(&binary.left);
            v.visit_expr(&binary.right);
        }
        ExprKind::Unary(unary) => v.visit_expr(&unary.operand),
        ExprKind::Conditional(conditional) => {
            v.visit_expr(&conditional.condition);
            v.visit_expr(&conditional.when_true);
            v.visit_expr(&conditional.when_false);
        }
        ExprKind::Cast(cast) | ExprKind::As(cast) => {
            v.visit_type(&cast.ty);
            v.visit_expr(&cast.operand);
        }
        ExprKind::Is(pattern) => {
            v.visit_expr(&pattern.operand);
            if let Some(ty) = &pattern.ty {
                v.visit_type(ty);
            }
            if let Some(constant) = &pattern.constant {
                v.visit_expr(constant);
            }
        }
        ExprKind::Parenthesized(inner) | ExprKind::Throw(inner) => v.visit_expr(inner),
        ExprKind::Tuple(elements) => {
            for element in elements {
                v.visit_argument(element);
            }
        }
        ExprKind::Declaration(decl) => v.visit_type(&decl.ty),
        ExprKind::Literal(_) | ExprKind::This | ExprKind::Base | ExprKind::Unknown => {}
    }
}

pub fn walk_assignment<V: Visit + ?Sized>(v: &mut V, assignment: &Assignment) {
    v.visit_expr(&assignment.left);
    v.visit_expr(&assignment.right);
}

pub fn walk_element_access<V: Visit + ?Sized>(v: &mut V, access: &ElementAccess) {
    v.visit_expr(&access.target);
    for arg in &access.args {
        v.visit_argument(arg);
    }
}

pub fn walk_object_creation<V: Visit + ?Sized>(v: &mut V, creation: &ObjectCreation) {
    if let Some(ty) = &creation.ty {
        v.visit_type(ty);
    }
    for arg in creation.args.iter().flatten() {
        v.visit_argument(arg);
    }
    for element in creation.initializer.iter().flatten() {
        v.visit_expr(element);
    }
}

pub fn walk_lambda<V: Visit + ?Sized>(v: &mut V, lambda: &Lambda) {
    for param in &lambda.params {
        if let Some(ty) = &param.ty {
            v.visit_type(ty);
        }
    }
    match &lambda.body {
        LambdaBody::Expr(expr) => v.visit_expr(expr),
        LambdaBody::Block(block) => v.visit_block(block),
    }
}
