//! Binder tests over small sources and the shared fixtures.

use csharp_parser::visit::{walk_expr, walk_variable_declaration, Visit};
use csharp_parser::{parse, Expr, NodeId, VariableDeclaration};
use csharp_semantics::{bind, SemanticModel, TypeOracle};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

struct Collector<'a> {
    source: &'a str,
    exprs: Vec<(&'a str, NodeId)>,
    decls: Vec<(&'a str, NodeId)>,
}

impl<'a> Visit for Collector<'a> {
    fn visit_expr(&mut self, expr: &Expr) {
        self.exprs
            .push((&self.source[expr.span.start_usize()..expr.span.end_usize()], expr.id));
        walk_expr(self, expr);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        if let Some(first) = decl.declarators.first() {
            let name = first.name.span;
            self.decls
                .push((&self.source[name.start_usize()..name.end_usize()], decl.id));
        }
        walk_variable_declaration(self, decl);
    }
}

struct Bound<'a> {
    model: SemanticModel,
    collector: Collector<'a>,
}

impl Bound<'_> {
    /// The type of the first expression spelled `text`.
    fn expr(&self, text: &str) -> Option<String> {
        let (_, id) = self
            .collector
            .exprs
            .iter()
            .find(|(spelling, _)| *spelling == text)
            .unwrap_or_else(|| panic!("no expression `{text}`"));
        self.model.type_of(*id).map(|ty| ty.display())
    }

    /// The type of the declaration whose first variable is `name`.
    fn decl(&self, name: &str) -> Option<String> {
        let (_, id) = self
            .collector
            .decls
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .unwrap_or_else(|| panic!("no declaration of `{name}`"));
        self.model.type_of(*id).map(|ty| ty.display())
    }
}

fn bind_source(source: &str) -> Bound<'_> {
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let model = bind(&result.unit);
    let mut collector = Collector {
        source,
        exprs: Vec::new(),
        decls: Vec::new(),
    };
    collector.visit_compilation_unit(&result.unit);
    Bound { model, collector }
}

#[test]
fn test_fields_params_and_element_access() {
    let bound = bind_source(
        r#"
class Player {
    List<int> scores = new List<int>();
    int[] limits;
    void Tick(List<string> names, float dt) {
        var copy = scores;
        var label = names[0];
        int first = scores[0];
        var limit = limits[1];
        var fresh = new List<GameObject>();
        var scaled = dt * 2f;
    }
}
"#,
    );

    assert_eq!(bound.decl("scores").as_deref(), Some("List<int>"));
    assert_eq!(bound.decl("copy").as_deref(), Some("List<int>"));
    assert_eq!(bound.decl("label").as_deref(), Some("string"));
    assert_eq!(bound.decl("limit").as_deref(), Some("int"));
    assert_eq!(bound.decl("fresh").as_deref(), Some("List<GameObject>"));
    assert_eq!(bound.decl("scaled").as_deref(), Some("float"));
    assert_eq!(bound.expr("scores[0]").as_deref(), Some("int"));
    assert_eq!(bound.expr("new List<int>()").as_deref(), Some("List<int>"));
}

#[test]
fn test_locals_shadow_fields() {
    let bound = bind_source(
        r#"
class C {
    List<int> items;
    void A(string items) { var x = items; }
    void B() { var y = items; }
    void D() {
        { string items = ""; }
        var after = items;
    }
}
"#,
    );

    assert_eq!(bound.decl("x").as_deref(), Some("string"));
    assert_eq!(bound.decl("y").as_deref(), Some("List<int>"));
    assert_eq!(bound.decl("after").as_deref(), Some("List<int>"));
}

#[test]
fn test_indexer_finalizer_and_interface_member_scopes() {
    let bound = bind_source(
        r#"
class C : IFoo {
    List<int> xs;
    string i;
    ~C() { var a = xs[0]; }
    void IFoo.Bar(List<float> ys) { var b = ys[1]; }
    int this[int i] {
        get { var c = i; return xs[i]; }
        set { var d = value; }
    }
    public static C operator +(C left, List<string> names) { var e = names[0]; return left; }
}
"#,
    );

    assert_eq!(bound.decl("a").as_deref(), Some("int"));
    assert_eq!(bound.decl("b").as_deref(), Some("float"));
    assert_eq!(bound.decl("c").as_deref(), Some("int"));
    assert_eq!(bound.decl("d").as_deref(), Some("int"));
    assert_eq!(bound.decl("e").as_deref(), Some("string"));
    assert_eq!(bound.expr("xs[i]").as_deref(), Some("int"));
}

#[test]
fn test_this_static_and_method_results() {
    let bound = bind_source(
        r#"
class C {
    static List<float> shared;
    List<bool> flags;
    List<int> Make() { return null; }
    void M() {
        var a = this.flags;
        var b = C.shared;
        var c = Make();
        var d = this.Make();
        var e = flags.Count;
    }
}
"#,
    );

    assert_eq!(bound.decl("a").as_deref(), Some("List<bool>"));
    assert_eq!(bound.decl("b").as_deref(), Some("List<float>"));
    assert_eq!(bound.decl("c").as_deref(), Some("List<int>"));
    assert_eq!(bound.decl("d").as_deref(), Some("List<int>"));
    assert_eq!(bound.decl("e").as_deref(), Some("int"));
}

#[test]
fn test_object_initializer_names_resolve_against_created_type() {
    let bound = bind_source(
        r#"
class Holder { public List<int> Values; }
class C {
    int Values;
    void M() { var h = new Holder { Values = new List<int>() }; }
}
"#,
    );

    assert_eq!(bound.decl("h").as_deref(), Some("Holder"));
    assert_eq!(bound.expr("Values").as_deref(), Some("List<int>"));
}

#[test]
fn test_foreach_lambda_and_pattern_variables() {
    let bound = bind_source(
        r#"
class C {
    List<List<int>> slots;
    List<int> xs;
    void M(object o) {
        foreach (var row in slots) { var cell = row[0]; }
        Func<int, int> f = (int xs) => xs + 1;
        if (o is List<string> words) { var w = words[0]; }
        try { } catch (Exception ex) { var message = ex; }
    }
}
"#,
    );

    assert_eq!(bound.decl("cell").as_deref(), Some("int"));
    assert_eq!(bound.expr("xs + 1").as_deref(), Some("int"));
    assert_eq!(bound.decl("w").as_deref(), Some("string"));
    assert_eq!(bound.decl("message").as_deref(), Some("Exception"));
}

#[test]
fn test_unknown_members_stay_unresolved() {
    let bound = bind_source(
        r#"
class C {
    void M() {
        var u = GetComponent<Renderer>().material;
        var n = null;
        int.TryParse("1", out var parsed);
    }
}
"#,
    );

    assert_eq!(bound.decl("u"), None);
    assert_eq!(bound.decl("n"), None);
}

#[test]
fn test_scoreboard_fixture() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/valid/ScoreBoard.cs");
    let source = std::fs::read_to_string(path).expect("fixture");
    let bound = bind_source(&source);

    assert_eq!(bound.expr("markers[index]").as_deref(), Some("GameObject"));
    assert_eq!(bound.expr("names[index]").as_deref(), Some("string"));
    assert_eq!(bound.expr("scores[index]").as_deref(), Some("int"));
}
