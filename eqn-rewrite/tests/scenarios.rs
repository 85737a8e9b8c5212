mod common;

use ariadne::Source;
use common::{expr, rule};
use eqn_rewrite::{
    diff,
    error::UnboundGeneric,
    evaluate,
    rewrite::rewrite_all,
    Change,
    Ctxt,
    Rule,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Applies each rule once, to the first match in either side of the equation.
fn apply_in_order(mut equation: Rule, rules: &[Rule]) -> Rule {
    for r in rules {
        equation = equation.rewrite_first(r, &HashSet::new())
            .unwrap()
            .unwrap_or_else(|| panic!("`{}` does not apply to `{}`", r, equation));
    }
    equation
}

#[test]
fn polar_vector() {
    let mut ctxt = Ctxt::default();
    let start = rule(&mut ctxt, "pvec = vec2d");
    let rules = [
        rule(&mut ctxt, "vec2d = add(mul(x, ihat), mul(y, jhat))"),
        rule(&mut ctxt, "x = px"),
        rule(&mut ctxt, "y = py"),
        rule(&mut ctxt, "px = mul(r, sin(theta))"),
        rule(&mut ctxt, "py = mul(r, cos(theta))"),
        rule(&mut ctxt, "mul(mul(?a, ?b), ?c) = mul(?a, mul(?b, ?c))"),
        rule(&mut ctxt, "mul(mul(?a, ?b), ?c) = mul(?a, mul(?b, ?c))"),
        rule(&mut ctxt, "add(mul(?a, ?b), mul(?a, ?c)) = mul(?a, add(?b, ?c))"),
    ];

    let result = apply_in_order(start, &rules);
    assert_eq!(
        result,
        rule(&mut ctxt, "pvec = mul(r, add(mul(sin(theta), ihat), mul(cos(theta), jhat)))"),
    );
}

#[test]
fn polar_vector_steps_replay_through_diff() {
    let mut ctxt = Ctxt::default();
    let before = expr(&mut ctxt, "add(mul(mul(r, sin(theta)), ihat), mul(mul(r, cos(theta)), jhat))");
    let associate = rule(&mut ctxt, "mul(mul(?a, ?b), ?c) = mul(?a, mul(?b, ?c))");

    let after = rewrite_all(&before, &associate, &HashSet::new()).unwrap();
    assert_eq!(
        after,
        expr(&mut ctxt, "add(mul(r, mul(sin(theta), ihat)), mul(r, mul(cos(theta), jhat)))"),
    );

    let branch = diff(&before, &after, ctxt.rearrangeable());
    assert!(branch.different);
    assert_eq!(branch.apply(&before).unwrap(), after);
}

#[test]
fn reordering_is_a_rearrangement() {
    let mut ctxt = Ctxt::default();
    let a = expr(&mut ctxt, "mul(r, add(mul(sin(theta), ihat), mul(cos(theta), jhat)))");
    let b = expr(&mut ctxt, "mul(add(mul(jhat, cos(theta)), mul(sin(theta), ihat)), r)");

    let branch = diff(&a, &b, ctxt.rearrangeable());
    let changes = branch.changes();
    assert!(!changes.is_empty());
    assert!(changes.iter().all(|change| matches!(change, Change::Rearrange(_))));
    assert_eq!(branch.apply(&a).unwrap(), b);

    // without rearrangeable operators, the same pair is a replacement
    let branch = diff(&a, &b, &HashSet::new());
    assert!(branch.changes().iter().all(|change| matches!(change, Change::Replace { .. })));
    assert_eq!(branch.apply(&a).unwrap(), b);
}

#[test]
fn numeric_mismatch_replaces_enclosing_term() {
    let mut ctxt = Ctxt::default();
    let a = expr(&mut ctxt, "add(mul(x, 2), sin(y))");
    let b = expr(&mut ctxt, "add(mul(x, 3), sin(z))");

    let branch = diff(&a, &b, ctxt.rearrangeable());
    assert_eq!(branch.changes(), vec![
        Change::Replace { position: 1, rule: rule(&mut ctxt, "mul(x, 2) = mul(x, 3)") },
        Change::Replace { position: 5, rule: rule(&mut ctxt, "y = z") },
    ]);
}

#[test]
fn solve_linear_equation() {
    let mut ctxt = Ctxt::default();
    let mut equation = rule(&mut ctxt, "add(mul(x, 2), 5) = 9");
    let transforms = [
        (rule(&mut ctxt, "add(?a, ?b) = ?c"), rule(&mut ctxt, "?a = sub(?c, ?b)")),
        (rule(&mut ctxt, "mul(?a, ?b) = ?c"), rule(&mut ctxt, "?a = div(?c, ?b)")),
    ];

    for (from, to) in &transforms {
        equation = equation.transform(from, to, &HashSet::new())
            .unwrap()
            .unwrap_or_else(|| panic!("`{}` does not apply to `{}`", from, equation));
    }
    assert_eq!(equation, rule(&mut ctxt, "x = div(sub(9, 5), 2)"));

    let solved = Rule::new(
        evaluate(&equation.left, &ctxt).unwrap(),
        evaluate(&equation.right, &ctxt).unwrap(),
    );
    assert_eq!(solved, rule(&mut ctxt, "x = 2"));
}

#[test]
fn transform_does_not_apply() {
    let mut ctxt = Ctxt::default();
    let equation = rule(&mut ctxt, "mul(x, 2) = 9");
    let from = rule(&mut ctxt, "add(?a, ?b) = ?c");
    let to = rule(&mut ctxt, "?a = sub(?c, ?b)");
    assert_eq!(equation.transform(&from, &to, &HashSet::new()).unwrap(), None);
}

#[test]
fn report_unbound_generic() {
    let mut ctxt = Ctxt::default();
    let source = "mul(?a, ?b) = ?c";
    let bad = rule(&mut ctxt, source);
    let target = expr(&mut ctxt, "mul(x, y)");

    let err = rewrite_all(&target, &bad, &HashSet::new()).unwrap_err();
    assert!(err.is::<UnboundGeneric>());

    let mut buf = Vec::new();
    err.with_spans(vec![14..16])
        .build_report("input")
        .write(("input", Source::from(source)), &mut buf)
        .unwrap();
    let report = String::from_utf8_lossy(&buf);
    assert!(report.contains("is not bound to anything"));
}
