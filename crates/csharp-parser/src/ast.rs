//! AST types for the supported C# subset.
//!
//! Every node records its span in the original source. Expressions, type
//! syntax and variable declarations also carry a [`NodeId`] that stays unique
//! within one parse, so later passes can attach information to them without
//! touching the tree.

use offset_map::Span;
use smol_str::SmolStr;

/// Identity of a node within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// An identifier with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The identifier text, without a leading `@`.
    pub name: SmolStr,
    /// The span of the identifier (including any `@`).
    pub span: Span,
}

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    /// Top-level members.
    pub members: Vec<Member>,
    /// The span of the whole file.
    pub span: Span,
}

/// A namespace, type or type member.
#[derive(Debug, Clone)]
pub enum Member {
    /// A `using` directive.
    Using(Span),
    /// A namespace declaration (block or file-scoped).
    Namespace(NamespaceDecl),
    /// A class, struct or interface.
    Type(TypeDecl),
    /// A field declaration.
    Field(FieldDecl),
    /// A property declaration.
    Property(PropertyDecl),
    /// A method declaration.
    Method(MethodDecl),
    /// A constructor declaration.
    Constructor(ConstructorDecl),
    /// An indexer declaration (`T this[int i] { ... }`).
    Indexer(IndexerDecl),
    /// A finalizer (`~C() { ... }`).
    Finalizer(FinalizerDecl),
    /// A member the parser steps over (enums, delegates, field-like events, records).
    Unknown(Span),
}

impl Member {
    /// Returns the span of this member.
    pub fn span(&self) -> Span {
        match self {
            Member::Using(span) | Member::Unknown(span) => *span,
            Member::Namespace(n) => n.span,
            Member::Type(n) => n.span,
            Member::Field(n) => n.span,
            Member::Property(n) => n.span,
            Member::Method(n) => n.span,
            Member::Constructor(n) => n.span,
            Member::Indexer(n) => n.span,
            Member::Finalizer(n) => n.span,
        }
    }
}

/// A namespace declaration.
#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    /// The dotted namespace name.
    pub name: SmolStr,
    /// Members declared inside.
    pub members: Vec<Member>,
    /// The span of the declaration.
    pub span: Span,
}

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
}

/// A class, struct or interface declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Class, struct or interface.
    pub kind: TypeDeclKind,
    /// The declared name.
    pub name: Ident,
    /// The members of the type.
    pub members: Vec<Member>,
    /// The span of the declaration.
    pub span: Span,
}

/// A field declaration such as `private List<int> items = new List<int>();`.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// The declared type and declarators.
    pub declaration: VariableDeclaration,
    /// Whether the field is `static` or `const`.
    pub is_static: bool,
    /// The span including modifiers and the trailing `;`.
    pub span: Span,
}

/// A property declaration.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    /// The property type.
    pub ty: TypeSyntax,
    /// The property name.
    pub name: Ident,
    /// Accessor bodies (`get { ... }`, `set => ...`); auto accessors have none.
    pub accessors: Vec<Body>,
    /// The body of an expression-bodied property (`=> expr;`).
    pub expression_body: Option<Expr>,
    /// The initializer of an auto property (`{ get; } = expr;`).
    pub initializer: Option<Expr>,
    /// Whether the property is `static`.
    pub is_static: bool,
    /// The span of the declaration.
    pub span: Span,
}

/// An indexer declaration.
#[derive(Debug, Clone)]
pub struct IndexerDecl {
    /// The element type.
    pub ty: TypeSyntax,
    /// The bracketed parameters.
    pub params: Vec<Parameter>,
    /// Accessor bodies.
    pub accessors: Vec<Body>,
    /// The body of an expression-bodied indexer (`=> expr;`).
    pub expression_body: Option<Expr>,
    /// The span of the declaration.
    pub span: Span,
}

/// A finalizer declaration.
#[derive(Debug, Clone)]
pub struct FinalizerDecl {
    /// The type name after `~`.
    pub name: Ident,
    /// The body.
    pub body: Option<Body>,
    /// The span of the declaration.
    pub span: Span,
}

/// A method or local function.
///
/// Operators and conversion operators are methods named by their header
/// text (`operator +`, `implicit operator`). Explicit interface
/// implementations keep only the member name.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// The declared return type.
    pub return_type: TypeSyntax,
    /// The method name.
    pub name: Ident,
    /// Generic type parameter names.
    pub type_params: Vec<Ident>,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// The body; `None` for abstract and interface methods.
    pub body: Option<Body>,
    /// Whether the method is `static`.
    pub is_static: bool,
    /// The span of the declaration.
    pub span: Span,
}

/// A constructor declaration.
#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    /// The constructor name (same as the type).
    pub name: Ident,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// Arguments of a `: base(...)` or `: this(...)` initializer.
    pub initializer_args: Vec<Argument>,
    /// The body.
    pub body: Option<Body>,
    /// The span of the declaration.
    pub span: Span,
}

/// A method body.
#[derive(Debug, Clone)]
pub enum Body {
    /// `{ ... }`
    Block(Block),
    /// `=> expr`
    Expression(Expr),
}

/// The modifier on a parameter or argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `ref`
    Ref,
    /// `out`
    Out,
    /// `in`
    In,
    /// `params`
    Params,
    /// `this` (extension method receiver)
    This,
}

/// A method, constructor or local function parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// `ref`, `out`, `in`, `params` or `this`.
    pub modifier: Option<RefKind>,
    /// The declared type.
    pub ty: TypeSyntax,
    /// The parameter name.
    pub name: Ident,
    /// The default value, if any.
    pub default: Option<Expr>,
    /// The span of the parameter.
    pub span: Span,
}

/// A type as written in source.
#[derive(Debug, Clone)]
pub struct TypeSyntax {
    /// The node identity.
    pub id: NodeId,
    /// The shape of the type.
    pub kind: TypeKind,
    /// The span of the type.
    pub span: Span,
}

/// The shape of a written type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A keyword type such as `int` or `string`.
    Predefined(SmolStr),
    /// A possibly qualified, possibly generic name: `System.Collections.Generic.List<int>`.
    Named(Vec<NameSegment>),
    /// `T[]`, `T[,]`.
    Array {
        /// The element type.
        element: Box<TypeSyntax>,
        /// The number of dimensions.
        rank: u32,
    },
    /// `T?`
    Nullable(Box<TypeSyntax>),
}

/// One dotted segment of a named type.
#[derive(Debug, Clone)]
pub struct NameSegment {
    /// The segment identifier.
    pub name: Ident,
    /// Generic type arguments.
    pub args: Vec<TypeSyntax>,
}

impl TypeSyntax {
    /// Returns the last segment of a named type.
    pub fn last_segment(&self) -> Option<&NameSegment> {
        match &self.kind {
            TypeKind::Named(segments) => segments.last(),
            _ => None,
        }
    }

    /// Returns true for the contextual `var` keyword.
    pub fn is_var(&self) -> bool {
        matches!(&self.kind, TypeKind::Named(segments)
            if segments.len() == 1 && segments[0].name.name == "var" && segments[0].args.is_empty())
    }
}

/// A block of statements.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// The statements in the block.
    pub stmts: Vec<Stmt>,
    /// The span including braces.
    pub span: Span,
}

/// A statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `{ ... }`
    Block(Block),
    /// A local variable declaration.
    Local(LocalDecl),
    /// A local function.
    LocalFunction(MethodDecl),
    /// An expression statement.
    Expr(ExprStmt),
    /// `if (...) ... else ...`
    If(IfStmt),
    /// `while (...) ...`
    While(WhileStmt),
    /// `do ... while (...);`
    DoWhile(WhileStmt),
    /// `for (...; ...; ...) ...`
    For(ForStmt),
    /// `foreach (T x in ...) ...`
    Foreach(ForeachStmt),
    /// `switch (...) { ... }`
    Switch(SwitchStmt),
    /// `try { ... } catch ... finally ...`
    Try(TryStmt),
    /// `using (...) ...`
    Using(UsingStmt),
    /// `lock (...) ...`
    Lock(LockStmt),
    /// `return`, `throw` or `yield return` with an optional value.
    Jump(JumpStmt),
    /// `break`, `continue`, `goto`, `yield break` or `;`.
    Simple(Span),
    /// A statement the parser could not understand; never rewritten.
    Unknown(Span),
}

impl Stmt {
    /// Returns the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(n) => n.span,
            Stmt::Local(n) => n.span,
            Stmt::LocalFunction(n) => n.span,
            Stmt::Expr(n) => n.span,
            Stmt::If(n) => n.span,
            Stmt::While(n) | Stmt::DoWhile(n) => n.span,
            Stmt::For(n) => n.span,
            Stmt::Foreach(n) => n.span,
            Stmt::Switch(n) => n.span,
            Stmt::Try(n) => n.span,
            Stmt::Using(n) => n.span,
            Stmt::Lock(n) => n.span,
            Stmt::Jump(n) => n.span,
            Stmt::Simple(span) | Stmt::Unknown(span) => *span,
        }
    }
}

/// `T a = x, b;`: the type followed by one or more declarators.
///
/// The span runs from the type to the end of the last declarator and does not
/// include modifiers or the terminating `;`.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    /// The node identity.
    pub id: NodeId,
    /// The declared type (possibly `var`).
    pub ty: TypeSyntax,
    /// The declared variables.
    pub declarators: Vec<VariableDeclarator>,
    /// The span of the declaration.
    pub span: Span,
}

/// One variable of a declaration.
#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    /// The variable name.
    pub name: Ident,
    /// The initializer, if any.
    pub initializer: Option<Expr>,
    /// The span from the name to the end of the initializer.
    pub span: Span,
}

/// A local declaration statement.
#[derive(Debug, Clone)]
pub struct LocalDecl {
    /// The declaration.
    pub declaration: VariableDeclaration,
    /// `const`
    pub is_const: bool,
    /// `using var x = ...;`
    pub is_using: bool,
    /// The span including the `;`.
    pub span: Span,
}

/// An expression statement.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    /// The expression.
    pub expr: Expr,
    /// The span including the `;`.
    pub span: Span,
}

/// An `if` statement.
#[derive(Debug, Clone)]
pub struct IfStmt {
    /// The condition.
    pub condition: Expr,
    /// The `then` branch.
    pub then_branch: Box<Stmt>,
    /// The `else` branch.
    pub else_branch: Option<Box<Stmt>>,
    /// The span of the statement.
    pub span: Span,
}

/// A `while` or `do`/`while` loop.
#[derive(Debug, Clone)]
pub struct WhileStmt {
    /// The loop condition.
    pub condition: Expr,
    /// The loop body.
    pub body: Box<Stmt>,
    /// The span of the statement.
    pub span: Span,
}

/// The initializer part of a `for` loop.
#[derive(Debug, Clone)]
pub enum ForInit {
    /// `for (int i = 0; ...)`
    Declaration(VariableDeclaration),
    /// `for (i = 0, j = 1; ...)`
    Expressions(Vec<Expr>),
}

/// A `for` loop.
#[derive(Debug, Clone)]
pub struct ForStmt {
    /// The initializer.
    pub init: Option<ForInit>,
    /// The condition.
    pub condition: Option<Expr>,
    /// The iterator expressions.
    pub iterators: Vec<Expr>,
    /// The loop body.
    pub body: Box<Stmt>,
    /// The span of the statement.
    pub span: Span,
}

/// A `foreach` loop.
#[derive(Debug, Clone)]
pub struct ForeachStmt {
    /// The iteration variable type (possibly `var`).
    pub ty: TypeSyntax,
    /// The iteration variable.
    pub name: Ident,
    /// The collection being iterated.
    pub collection: Expr,
    /// The loop body.
    pub body: Box<Stmt>,
    /// The span of the statement.
    pub span: Span,
}

/// A `switch` statement.
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    /// The switched-on expression.
    pub subject: Expr,
    /// The sections.
    pub sections: Vec<SwitchSection>,
    /// The span of the statement.
    pub span: Span,
}

/// One `case ...: ...` section.
#[derive(Debug, Clone)]
pub struct SwitchSection {
    /// `case` values; `None` for `default:` and for patterns the parser skips.
    pub labels: Vec<Option<Expr>>,
    /// The statements of the section.
    pub stmts: Vec<Stmt>,
}

/// A `try` statement.
#[derive(Debug, Clone)]
pub struct TryStmt {
    /// The protected block.
    pub block: Block,
    /// `catch` clauses.
    pub catches: Vec<CatchClause>,
    /// The `finally` block.
    pub finally: Option<Block>,
    /// The span of the statement.
    pub span: Span,
}

/// A `catch (T e) when (...) { ... }` clause.
#[derive(Debug, Clone)]
pub struct CatchClause {
    /// The caught exception type.
    pub ty: Option<TypeSyntax>,
    /// The exception variable.
    pub name: Option<Ident>,
    /// The `when` filter.
    pub filter: Option<Expr>,
    /// The handler block.
    pub block: Block,
}

/// The resource of a `using` statement.
#[derive(Debug, Clone)]
pub enum UsingResource {
    /// `using (var x = ...)`
    Declaration(VariableDeclaration),
    /// `using (expr)`
    Expr(Expr),
}

/// A `using (...)` statement.
#[derive(Debug, Clone)]
pub struct UsingStmt {
    /// The acquired resource.
    pub resource: UsingResource,
    /// The body.
    pub body: Box<Stmt>,
    /// The span of the statement.
    pub span: Span,
}

/// A `lock (...)` statement.
#[derive(Debug, Clone)]
pub struct LockStmt {
    /// The lock target.
    pub target: Expr,
    /// The body.
    pub body: Box<Stmt>,
    /// The span of the statement.
    pub span: Span,
}

/// A `return`, `throw` or `yield return` statement.
#[derive(Debug, Clone)]
pub struct JumpStmt {
    /// The returned or thrown value.
    pub value: Option<Expr>,
    /// The span including the `;`.
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The node identity.
    pub id: NodeId,
    /// The expression shape.
    pub kind: ExprKind,
    /// The span of the expression (no surrounding trivia).
    pub span: Span,
}

/// The type of a literal, decided from its spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `1`
    Int,
    /// `1u`
    UInt,
    /// `1L`
    Long,
    /// `1UL`
    ULong,
    /// `1f`
    Float,
    /// `1.0`, `1d`
    Double,
    /// `1m`
    Decimal,
    /// `"a"`, `@"a"`, `$"a"`
    String,
    /// `'a'`
    Char,
    /// `true`, `false`
    Bool,
    /// `null`
    Null,
}

/// The shape of an expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A literal.
    Literal(LiteralKind),
    /// An interpolated string with its hole expressions.
    InterpolatedString(Vec<Expr>),
    /// A simple name, optionally with generic arguments: `nums`, `GetComponent<T>`.
    Name(SimpleName),
    /// A keyword type used as an expression receiver: `int.MaxValue`.
    PredefinedType(TypeSyntax),
    /// `this`
    This,
    /// `base`
    Base,
    /// `a.b`, `a?.b`
    MemberAccess(MemberAccess),
    /// `a[i]`, `a?[i]`
    ElementAccess(ElementAccess),
    /// `f(x)`
    Invocation(Invocation),
    /// `new T(...) { ... }`
    ObjectCreation(ObjectCreation),
    /// `new T[n]`, `new T[] { ... }`, `new[] { ... }`
    ArrayCreation(ArrayCreation),
    /// A nested `{ ... }` initializer.
    InitializerList(Vec<Expr>),
    /// `a = b`, `a += b`, ...
    Assignment(Assignment),
    /// `a + b`, `a ?? b`, ...
    Binary(Binary),
    /// `-a`, `!a`, `a++`, ...
    Unary(Unary),
    /// `c ? a : b`
    Conditional(Conditional),
    /// `(T)x`
    Cast(Cast),
    /// `x is T name`, `x is null`
    Is(IsPattern),
    /// `x as T`
    As(Cast),
    /// `typeof(T)`
    TypeOf(TypeSyntax),
    /// `sizeof(T)`
    SizeOf(TypeSyntax),
    /// `default(T)` or `default`
    Default(Option<TypeSyntax>),
    /// `(x)`
    Parenthesized(Box<Expr>),
    /// `(a, b)`, `(name: a, b)`
    Tuple(Vec<Argument>),
    /// A lambda or anonymous method.
    Lambda(Lambda),
    /// `out int x`, `out var x`
    Declaration(DeclarationExpr),
    /// `throw x` in expression position.
    Throw(Box<Expr>),
    /// An expression that failed to parse.
    Unknown,
}

/// A simple name.
#[derive(Debug, Clone)]
pub struct SimpleName {
    /// The identifier.
    pub name: Ident,
    /// Generic arguments.
    pub type_args: Vec<TypeSyntax>,
}

/// `target.name`
#[derive(Debug, Clone)]
pub struct MemberAccess {
    /// The receiver.
    pub target: Box<Expr>,
    /// The accessed member.
    pub name: Ident,
    /// Generic arguments of a generic method access.
    pub type_args: Vec<TypeSyntax>,
    /// `?.`
    pub conditional: bool,
}

/// `target[args]`
#[derive(Debug, Clone)]
pub struct ElementAccess {
    /// The indexed expression.
    pub target: Box<Expr>,
    /// The index arguments.
    pub args: Vec<Argument>,
    /// `?[`
    pub conditional: bool,
}

/// `callee(args)`
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The invoked expression.
    pub callee: Box<Expr>,
    /// The arguments.
    pub args: Vec<Argument>,
}

/// An argument in a call or index list.
#[derive(Debug, Clone)]
pub struct Argument {
    /// `name:` of a named argument.
    pub name: Option<Ident>,
    /// `ref`, `out` or `in`.
    pub modifier: Option<RefKind>,
    /// The argument value.
    pub expr: Expr,
}

/// `new T(args) { initializer }`
#[derive(Debug, Clone)]
pub struct ObjectCreation {
    /// The created type; `None` for target-typed `new()` and anonymous objects.
    pub ty: Option<TypeSyntax>,
    /// The constructor arguments, if a parenthesized list was written.
    pub args: Option<Vec<Argument>>,
    /// Object or collection initializer elements.
    pub initializer: Option<Vec<Expr>>,
}

/// `new T[n] { ... }`
#[derive(Debug, Clone)]
pub struct ArrayCreation {
    /// The element type; `None` for `new[] { ... }`.
    pub element: Option<TypeSyntax>,
    /// Size expressions of the first rank specifier.
    pub sizes: Vec<Expr>,
    /// Total number of rank specifiers (jagged arrays count each `[]`).
    pub rank: u32,
    /// Initializer elements.
    pub initializer: Option<Vec<Expr>>,
}

/// The operator of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`, `-=`, `??=` and the other compound forms.
    Compound,
}

/// `left op right`
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The operator.
    pub op: AssignOp,
    /// The assigned location.
    pub left: Box<Expr>,
    /// The assigned value.
    pub right: Box<Expr>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `??`
    Coalesce,
}

impl BinaryOp {
    /// Returns true if the operator always yields `bool`.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Or
                | BinaryOp::And
                | BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
        )
    }
}

/// `left op right`
#[derive(Debug, Clone)]
pub struct Binary {
    /// The operator.
    pub op: BinaryOp,
    /// The left operand.
    pub left: Box<Expr>,
    /// The right operand.
    pub right: Box<Expr>,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
    /// `++x`
    PreIncrement,
    /// `--x`
    PreDecrement,
    /// `x++`
    PostIncrement,
    /// `x--`
    PostDecrement,
}

/// `op operand`
#[derive(Debug, Clone)]
pub struct Unary {
    /// The operator.
    pub op: UnaryOp,
    /// The operand.
    pub operand: Box<Expr>,
}

/// `condition ? when_true : when_false`
#[derive(Debug, Clone)]
pub struct Conditional {
    /// The condition.
    pub condition: Box<Expr>,
    /// The value when true.
    pub when_true: Box<Expr>,
    /// The value when false.
    pub when_false: Box<Expr>,
}

/// `(T)operand` or `operand as T`
#[derive(Debug, Clone)]
pub struct Cast {
    /// The target type.
    pub ty: TypeSyntax,
    /// The converted operand.
    pub operand: Box<Expr>,
}

/// `operand is ...`
#[derive(Debug, Clone)]
pub struct IsPattern {
    /// The tested operand.
    pub operand: Box<Expr>,
    /// The type of a type or declaration pattern.
    pub ty: Option<TypeSyntax>,
    /// The variable declared by a declaration pattern.
    pub designation: Option<Ident>,
    /// A constant pattern (`is null`, `is 3`).
    pub constant: Option<Box<Expr>>,
}

/// A lambda parameter; the type is omitted in implicitly typed lambdas.
#[derive(Debug, Clone)]
pub struct LambdaParam {
    /// The declared type.
    pub ty: Option<TypeSyntax>,
    /// The parameter name.
    pub name: Ident,
}

/// The body of a lambda.
#[derive(Debug, Clone)]
pub enum LambdaBody {
    /// `x => expr`
    Expr(Box<Expr>),
    /// `x => { ... }`
    Block(Block),
}

/// A lambda expression or anonymous method.
#[derive(Debug, Clone)]
pub struct Lambda {
    /// The parameters.
    pub params: Vec<LambdaParam>,
    /// The body.
    pub body: LambdaBody,
}

/// `out T name`
#[derive(Debug, Clone)]
pub struct DeclarationExpr {
    /// The declared type (possibly `var`).
    pub ty: TypeSyntax,
    /// The declared variable.
    pub name: Ident,
}
