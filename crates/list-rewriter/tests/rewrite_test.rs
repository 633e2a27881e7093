//! Behavioural tests for the rewrite rules, with stub and real type oracles.

use csharp_parser::visit::{walk_expr, Visit};
use csharp_parser::{parse, Expr, Member, TypeSyntax};
use csharp_semantics::{SemanticModel, TypeInfo};
use list_rewriter::{rewrite, rewrite_with_oracle, Rule, RewriteOptions, RewriteResult};
use pretty_assertions::assert_eq;

/// Resolves a type written in C# syntax.
fn type_info(text: &str) -> TypeInfo {
    let source = format!("class Stub {{ {text} field; }}");
    let parsed = parse(&source);
    let Some(Member::Type(class)) = parsed.unit.members.first() else {
        panic!("Expected class");
    };
    let Some(Member::Field(field)) = class.members.first() else {
        panic!("Expected field");
    };
    TypeInfo::from_syntax(&field.declaration.ty)
}

/// A stub oracle: every expression or written type spelled like a key gets
/// the paired type, everything else stays unresolved.
struct Stub<'a> {
    source: &'a str,
    types: &'a [(&'a str, &'a str)],
    model: SemanticModel,
}

impl Stub<'_> {
    fn assign(&mut self, text: Option<&str>, id: csharp_parser::NodeId) {
        if let Some((_, ty)) = self.types.iter().find(|(key, _)| Some(*key) == text) {
            self.model.insert(id, type_info(ty));
        }
    }
}

impl Visit for Stub<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        self.assign(expr.span.slice(self.source), expr.id);
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, ty: &TypeSyntax) {
        self.assign(ty.span.slice(self.source), ty.id);
    }
}

/// Rewrites the statements of one method body with a stub oracle.
fn rewrite_body(body: &str, types: &[(&str, &str)]) -> (String, RewriteResult) {
    let source = format!("class C {{ void M() {{ {body} }} }}");
    let parsed = parse(&source);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let mut stub = Stub {
        source: &source,
        types,
        model: SemanticModel::new(),
    };
    stub.visit_compilation_unit(&parsed.unit);

    let result =
        rewrite_with_oracle(&source, &parsed.unit, &stub.model, &RewriteOptions::default())
            .expect("rewrite should succeed");
    let prefix = "class C { void M() { ".len();
    let suffix = " } }".len();
    let body = result.text[prefix..result.text.len() - suffix].to_string();
    (body, result)
}

#[test]
fn test_declaration_rewrite() {
    let (body, result) = rewrite_body("List<int> nums;", &[("List<int>", "List<int>")]);
    assert_eq!(body, "DataList nums;");
    assert_eq!(result.edits[0].rule, Rule::Declaration);
}

#[test]
fn test_assignment_rewrite() {
    let (body, _) = rewrite_body("nums = new List<int>();", &[("nums", "List<int>")]);
    assert_eq!(body, "nums = new DataList();");
}

#[test]
fn test_assignment_from_other_list_untouched() {
    let (body, result) = rewrite_body(
        "nums = otherNums; nums = (List<int>)other; nums = Make();",
        &[("nums", "List<int>"), ("otherNums", "List<int>")],
    );
    assert_eq!(body, "nums = otherNums; nums = (List<int>)other; nums = Make();");
    assert!(!result.changed());
}

#[test]
fn test_direct_classified_access() {
    let (body, _) = rewrite_body("x = nums[0];", &[("nums", "List<int>")]);
    assert_eq!(body, "x = nums[0].Int;");
}

#[test]
fn test_cast_wrapped_access() {
    let (body, _) = rewrite_body("x = nums[0];", &[("nums", "List<Foo>")]);
    assert_eq!(body, "x = ((Foo)(nums[0]).Reference);");
}

#[test]
fn test_unresolved_types_are_left_alone() {
    let body = "List<int> nums = new List<int>(); nums = new List<int>(); x = nums[0];";
    let (rewritten, result) = rewrite_body(body, &[]);
    assert_eq!(rewritten, body);
    assert!(result.edits.is_empty());
}

#[test]
fn test_non_source_generic_types_are_left_alone() {
    let body = "IList<int> a; x = a[0]; List<int>[] b; y = b[0]; Dictionary<int, int> d;";
    let (rewritten, _) = rewrite_body(
        body,
        &[
            ("IList<int>", "IList<int>"),
            ("a", "IList<int>"),
            ("List<int>[]", "List<int>[]"),
            ("b", "List<int>[]"),
            ("Dictionary<int, int>", "Dictionary<int, int>"),
        ],
    );
    assert_eq!(rewritten, body);
}

#[test]
fn test_three_edits_in_order() {
    let (body, result) = rewrite_body(
        "List<int> a = new List<int>(); a = new List<int>(); b = a[0];",
        &[("List<int>", "List<int>"), ("a", "List<int>")],
    );
    assert_eq!(
        body,
        "DataList a = new DataList(); a = new DataList(); b = a[0].Int;"
    );

    let rules: Vec<Rule> = result.edits.iter().map(|edit| edit.rule).collect();
    assert_eq!(
        rules,
        vec![
            Rule::Declaration,
            Rule::DeclaratorInitializer,
            Rule::Assignment,
            Rule::ElementAccess,
        ]
    );
}

#[test]
fn test_edits_are_disjoint_or_nested() {
    let source = "class C { List<int> a = new List<int>(); List<Foo> f; void M() { a = new List<int>(); x = f[a[0]] + a[1]; } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        result.text,
        "class C { DataList a = new DataList(); DataList f; void M() { a = new DataList(); x = ((Foo)(f[a[0].Int]).Reference) + a[1].Int; } }"
    );

    for (i, first) in result.edits.iter().enumerate() {
        for second in &result.edits[i + 1..] {
            let disjoint = first.span.end <= second.span.start || second.span.end <= first.span.start;
            let nested = first.span.start <= second.span.start && second.span.end <= first.span.end;
            assert!(disjoint || nested, "{first:?} overlaps {second:?}");
        }
    }

    // Edits are recorded in source order of their starting positions.
    let starts: Vec<_> = result.edits.iter().map(|edit| edit.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_identity_without_matches() {
    let source = r#"
// List<int> in a comment stays.
public class Plain : UdonSharpBehaviour
{
    private int[] values = new int[4];
    private IList<int> view;
    private string label = "List<int> xs = new List<int>();";

    void Start()
    {
        values[0] = 1;
        var first = values[0];
        view = null;
    }
}
"#;
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(result.text, source);
    assert!(!result.changed());
}

#[test]
fn test_rerun_on_output_is_identity() {
    let source = r#"
public class Scores : UdonSharpBehaviour
{
    private List<int> points = new List<int>();
    private List<Transform> anchors;

    public int Best()
    {
        var copy = new List<int>();
        copy = points;
        anchors = new List<Transform>();
        return points[0] + copy[1] + anchors[0].childCount;
    }
}
"#;
    let options = RewriteOptions::default();
    let once = rewrite(source, &options).unwrap();
    assert!(once.changed());
    assert_eq!(
        once.text,
        r#"
public class Scores : UdonSharpBehaviour
{
    private DataList points = new DataList();
    private DataList anchors;

    public int Best()
    {
        var copy = new DataList();
        copy = points;
        anchors = new DataList();
        return points[0].Int + copy[1].Int + ((Transform)(anchors[0]).Reference).childCount;
    }
}
"#
    );

    let twice = rewrite(&once.text, &options).unwrap();
    assert_eq!(twice.text, once.text);
    assert!(twice.edits.is_empty());
}

#[test]
fn test_multiple_declarators_and_qualified_names() {
    let source = "class C { System.Collections.Generic.List<string> a = new System.Collections.Generic.List<string>(), b, c = new List<string>(); }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        result.text,
        "class C { DataList a = new DataList(), b, c = new DataList(); }"
    );
}

#[test]
fn test_cast_keeps_qualified_element_type() {
    let source = "class C { List<UnityEngine.GameObject> xs; void M() { var g = xs[0]; } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        result.text,
        "class C { DataList xs; void M() { var g = ((UnityEngine.GameObject)(xs[0]).Reference); } }"
    );
}

#[test]
fn test_cast_keeps_nested_qualified_element_type() {
    let (body, _) = rewrite_body(
        "var g = xs[0];",
        &[(
            "xs",
            "List<System.Collections.Generic.List<UnityEngine.GameObject>>",
        )],
    );
    assert_eq!(
        body,
        "var g = ((System.Collections.Generic.List<UnityEngine.GameObject>)(xs[0]).Reference);"
    );
}

#[test]
fn test_finalizer_indexer_and_interface_bodies_are_rewritten() {
    let source = "class C : IFoo { List<int> xs; ~C() { var a = xs[0]; } void IFoo.Bar() { var b = xs[1]; } int this[int i] => xs[i]; }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert_eq!(
        result.text,
        "class C : IFoo { DataList xs; ~C() { var a = xs[0].Int; } void IFoo.Bar() { var b = xs[1].Int; } int this[int i] => xs[i].Int; }"
    );
}

#[test]
fn test_operator_and_accessor_bodies_are_rewritten() {
    let source = "class C { static List<string> names = new List<string>(); public static implicit operator string(C c) => names[0]; public static C operator +(C a, C b) { names = new List<string>(); return a; } string this[int i] { get { return names[i]; } set { names[i] = value; } } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert_eq!(
        result.text,
        "class C { static DataList names = new DataList(); public static implicit operator string(C c) => names[0].String; public static C operator +(C a, C b) { names = new DataList(); return a; } string this[int i] { get { return names[i].String; } set { names[i].String = value; } } }"
    );
}

#[test]
fn test_tuple_elements_are_rewritten() {
    let source = "class C { List<int> xs; void M() { var t = (xs[0], xs[1]); var n = (first: xs[2], 0); } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert_eq!(
        result.text,
        "class C { DataList xs; void M() { var t = (xs[0].Int, xs[1].Int); var n = (first: xs[2].Int, 0); } }"
    );
}

#[test]
fn test_object_initializer_member_assignment() {
    let source = "class Holder { public List<int> Values; } class C { int Values; void M() { var h = new Holder { Values = new List<int>() }; } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        result.text,
        "class Holder { public DataList Values; } class C { int Values; void M() { var h = new Holder { Values = new DataList() }; } }"
    );
}

#[test]
fn test_only_simple_identifiers_are_indexed() {
    let source = "class C { List<int> xs; void M() { var a = this.xs[0]; var b = xs[0]; } }";
    let result = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        result.text,
        "class C { DataList xs; void M() { var a = this.xs[0]; var b = xs[0].Int; } }"
    );
}

#[test]
fn test_defines_select_the_rewritten_branch() {
    let source = "class C {\n#if COMPILER_UDONSHARP\n    List<int> xs;\n#else\n    List<float> ys;\n#endif\n}";

    let udon = rewrite(source, &RewriteOptions::with_defines(["COMPILER_UDONSHARP"])).unwrap();
    assert_eq!(
        udon.text,
        "class C {\n#if COMPILER_UDONSHARP\n    DataList xs;\n#else\n    List<float> ys;\n#endif\n}"
    );

    let plain = rewrite(source, &RewriteOptions::default()).unwrap();
    assert_eq!(
        plain.text,
        "class C {\n#if COMPILER_UDONSHARP\n    List<int> xs;\n#else\n    DataList ys;\n#endif\n}"
    );
}

#[test]
fn test_custom_type_names() {
    let options = RewriteOptions {
        source_type: "Bag".into(),
        target_type: "TokenBag".into(),
        reference_field: "Payload".into(),
        ..RewriteOptions::default()
    };
    let source = "class C { Bag<Item> items = new Bag<Item>(); List<int> untouched; Item M() { return items[0]; } }";
    let result = rewrite(source, &options).unwrap();
    assert_eq!(
        result.text,
        "class C { TokenBag items = new TokenBag(); List<int> untouched; Item M() { return ((Item)(items[0]).Payload); } }"
    );
}
