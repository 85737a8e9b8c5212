//! Matching concrete expressions against patterns with generic placeholders.
//!
//! A _pattern_ (also called the _superset_ side of a match) is an ordinary [`Expr`] in which some
//! nodes are generic. A node is generic if its `generic` flag is set, or if its id is in the set of
//! generic ids passed to [`match_superset`]. Matching proceeds top-down:
//!
//! - A generic symbol (`?x`) matches anything and binds `x` to it.
//! - A generic function (`?f(?x)`) matches any function application with the same number of
//!   arguments. `f` is bound to the **whole** application, so that its dependent variable can be
//!   recovered later by the [`ExprMapping`](crate::mapping::ExprMapping), and the arguments are
//!   matched pairwise.
//! - Two numbers match if their values are equal.
//! - Two non-generic functions match if they have the same id and arity, and every argument pair
//!   matches.
//!
//! Repeated occurrences of a placeholder must bind to structurally equal expressions. For example,
//! `f(?x, ?x)` matches `f(a, a)`, but not `f(a, b)`.

use crate::expr::{Expr, SymbolId};
use std::collections::{hash_map, HashMap, HashSet};

/// A set of bindings from generic placeholders to the expressions they matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(HashMap<SymbolId, Expr>);

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expression bound to the given placeholder.
    pub fn get(&self, id: SymbolId) -> Option<&Expr> {
        self.0.get(&id)
    }

    /// Returns true if the given placeholder is bound.
    pub fn contains(&self, id: SymbolId) -> bool {
        self.0.contains_key(&id)
    }

    /// Binds `id` to `expr`.
    ///
    /// Returns `false` without changing anything if `id` is already bound to a different
    /// expression. Binding `id` to the expression it is already bound to is a no-op.
    pub fn insert(&mut self, id: SymbolId, expr: Expr) -> bool {
        match self.0.entry(id) {
            hash_map::Entry::Occupied(entry) => *entry.get() == expr,
            hash_map::Entry::Vacant(entry) => {
                entry.insert(expr);
                true
            },
        }
    }

    /// Merges another set of bindings into this one.
    ///
    /// Returns `false` if any placeholder is bound to different expressions in the two sets, in
    /// which case `self` may have been partially extended and should be discarded.
    pub fn merge(&mut self, other: Bindings) -> bool {
        other.0.into_iter().all(|(id, expr)| self.insert(id, expr))
    }

    /// Returns the number of bound placeholders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the bindings, in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, SymbolId, Expr> {
        self.0.iter()
    }
}

impl IntoIterator for Bindings {
    type Item = (SymbolId, Expr);
    type IntoIter = hash_map::IntoIter<SymbolId, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(SymbolId, Expr)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (SymbolId, Expr)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Returns true if a node with the given id and flag is a placeholder.
pub(crate) fn is_generic(id: SymbolId, generic: bool, generics: &HashSet<SymbolId>) -> bool {
    generic || generics.contains(&id)
}

/// Matches `expr` against `pattern`, returning the bindings implied by the pattern, or [`None`] if
/// the pattern does not match.
///
/// Nodes of `pattern` whose id is in `generics` are treated as generic, in addition to nodes that
/// are flagged as generic.
///
/// ```
/// use eqn_rewrite::expr::{Expr, SymbolId};
/// use eqn_rewrite::matcher::match_superset;
/// use std::collections::HashSet;
///
/// let (f, a, x) = (SymbolId(0), SymbolId(1), SymbolId(2));
/// let pattern = Expr::call(f, vec![Expr::generic(x), Expr::generic(x)]);
///
/// let same = Expr::call(f, vec![Expr::symbol(a), Expr::symbol(a)]);
/// let bindings = match_superset(&same, &pattern, &HashSet::new()).unwrap();
/// assert_eq!(bindings.get(x), Some(&Expr::symbol(a)));
///
/// let different = Expr::call(f, vec![Expr::symbol(a), Expr::num(1.0)]);
/// assert!(match_superset(&different, &pattern, &HashSet::new()).is_none());
/// ```
pub fn match_superset(
    expr: &Expr,
    pattern: &Expr,
    generics: &HashSet<SymbolId>,
) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    if match_into(expr, pattern, generics, &mut bindings) {
        Some(bindings)
    } else {
        log::trace!("`{}` does not match `{}`", expr, pattern);
        None
    }
}

/// Implementation of [`match_superset`], accumulating bindings into `bindings`.
fn match_into(
    expr: &Expr,
    pattern: &Expr,
    generics: &HashSet<SymbolId>,
    bindings: &mut Bindings,
) -> bool {
    match pattern {
        Expr::Number(value) => matches!(expr, Expr::Number(other) if other == value),
        Expr::Function { id, generic, args } => {
            let pattern_generic = is_generic(*id, *generic, generics);
            if pattern_generic && args.is_empty() {
                return bindings.insert(*id, expr.clone());
            }

            let Expr::Function { id: expr_id, generic: expr_generic, args: expr_args } = expr else {
                return false;
            };

            if args.len() != expr_args.len() {
                return false;
            }

            if pattern_generic {
                // an unknown function, bound to the whole application
                if !bindings.insert(*id, expr.clone()) {
                    return false;
                }
            } else if id != expr_id || generic != expr_generic {
                return false;
            }

            args.iter()
                .zip(expr_args)
                .all(|(arg_pattern, arg)| match_into(arg, arg_pattern, generics, bindings))
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    const F: SymbolId = SymbolId(0);
    const G: SymbolId = SymbolId(1);
    const SIN: SymbolId = SymbolId(2);
    const A: SymbolId = SymbolId(10);
    const B: SymbolId = SymbolId(11);
    const X: SymbolId = SymbolId(20);
    const Y: SymbolId = SymbolId(21);

    fn none() -> HashSet<SymbolId> {
        HashSet::new()
    }

    fn bindings(pairs: Vec<(SymbolId, Expr)>) -> Bindings {
        pairs.into_iter().collect()
    }

    #[test]
    fn generic_symbol_binds_anything() {
        let pattern = Expr::generic(X);
        for expr in [
            Expr::num(3.0),
            Expr::symbol(A),
            Expr::call(F, vec![Expr::symbol(A), Expr::call(G, vec![Expr::num(1.0)])]),
        ] {
            assert_eq!(
                match_superset(&expr, &pattern, &none()),
                Some(bindings(vec![(X, expr.clone())])),
            );
        }
    }

    #[test]
    fn generic_by_id() {
        let pattern = Expr::call(F, vec![Expr::symbol(X)]);
        let expr = Expr::call(F, vec![Expr::num(2.0)]);
        assert!(match_superset(&expr, &pattern, &none()).is_none());
        assert_eq!(
            match_superset(&expr, &pattern, &HashSet::from([X])),
            Some(bindings(vec![(X, Expr::num(2.0))])),
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(match_superset(&Expr::num(2.0), &Expr::num(2.0), &none()), Some(Bindings::new()));
        assert!(match_superset(&Expr::num(2.0), &Expr::num(3.0), &none()).is_none());
        assert!(match_superset(&Expr::symbol(A), &Expr::num(3.0), &none()).is_none());
        assert!(match_superset(&Expr::num(3.0), &Expr::symbol(A), &none()).is_none());
    }

    #[test]
    fn concrete_patterns() {
        let expr = Expr::call(F, vec![Expr::symbol(A), Expr::num(1.0)]);
        assert_eq!(match_superset(&expr, &expr.clone(), &none()), Some(Bindings::new()));

        let other_id = Expr::call(G, vec![Expr::symbol(A), Expr::num(1.0)]);
        assert!(match_superset(&expr, &other_id, &none()).is_none());

        let other_arity = Expr::call(F, vec![Expr::symbol(A)]);
        assert!(match_superset(&expr, &other_arity, &none()).is_none());
    }

    #[test]
    fn repeated_placeholders() {
        let pattern = Expr::call(F, vec![Expr::generic(X), Expr::generic(X)]);

        let same = Expr::call(F, vec![Expr::symbol(A), Expr::symbol(A)]);
        assert_eq!(
            match_superset(&same, &pattern, &none()),
            Some(bindings(vec![(X, Expr::symbol(A))])),
        );

        let different = Expr::call(F, vec![Expr::symbol(A), Expr::symbol(B)]);
        assert!(match_superset(&different, &pattern, &none()).is_none());
    }

    #[test]
    fn nested_conflict_voids_whole_match() {
        // f(g(?x, ?y), ?x) against f(g(a, b), b)
        let pattern = Expr::call(F, vec![
            Expr::call(G, vec![Expr::generic(X), Expr::generic(Y)]),
            Expr::generic(X),
        ]);
        let expr = Expr::call(F, vec![
            Expr::call(G, vec![Expr::symbol(A), Expr::symbol(B)]),
            Expr::symbol(B),
        ]);
        assert!(match_superset(&expr, &pattern, &none()).is_none());
    }

    #[test]
    fn generic_function_binds_whole_node() {
        // ?f(?x) against sin(y)
        let pattern = Expr::generic_call(F, vec![Expr::generic(X)]);
        let expr = Expr::call(SIN, vec![Expr::symbol(Y)]);
        assert_eq!(
            match_superset(&expr, &pattern, &none()),
            Some(bindings(vec![
                (F, expr.clone()),
                (X, Expr::symbol(Y)),
            ])),
        );
    }

    #[test]
    fn generic_function_requires_same_arity() {
        let pattern = Expr::generic_call(F, vec![Expr::generic(X)]);
        let expr = Expr::call(G, vec![Expr::symbol(A), Expr::symbol(B)]);
        assert!(match_superset(&expr, &pattern, &none()).is_none());
        assert!(match_superset(&Expr::num(1.0), &pattern, &none()).is_none());
    }

    #[test]
    fn generic_free_match_is_equality() {
        let pattern = Expr::call(F, vec![Expr::call(G, vec![Expr::num(1.0)]), Expr::symbol(A)]);
        let candidates = [
            pattern.clone(),
            Expr::call(F, vec![Expr::call(G, vec![Expr::num(2.0)]), Expr::symbol(A)]),
            Expr::call(F, vec![Expr::symbol(A), Expr::call(G, vec![Expr::num(1.0)])]),
        ];
        for expr in candidates {
            match match_superset(&expr, &pattern, &none()) {
                Some(bindings) => {
                    assert!(bindings.is_empty());
                    assert_eq!(expr, pattern);
                },
                None => assert_ne!(expr, pattern),
            }
        }
    }

    #[test]
    fn merge_conflicts() {
        let mut lhs = bindings(vec![(X, Expr::symbol(A))]);
        assert!(lhs.merge(bindings(vec![(X, Expr::symbol(A)), (Y, Expr::num(1.0))])));
        assert_eq!(lhs.len(), 2);
        assert!(!lhs.merge(bindings(vec![(Y, Expr::num(2.0))])));
    }
}
