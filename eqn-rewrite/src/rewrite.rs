//! Applying rules to expressions.
//!
//! A rule `left = right` is applied to a sub-expression by matching `left` against it, and
//! replacing it with `right`, instantiated with the resulting bindings. Every application uses a
//! fresh [`ExprMapping`], so bindings never leak from one application to the next.

use crate::{
    error::AddressNotFound,
    expr::{Expr, SymbolId},
    mapping::ExprMapping,
    rule::Rule,
    step_collector::StepCollector,
};
use eqn_error::Error;
use std::collections::HashSet;

/// A single application of a rule, recorded by [`rewrite_all_with_steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The position of the rewritten sub-expression, in the expression as it was just before
    /// this step.
    pub position: usize,

    /// The sub-expression before and after the step.
    pub replaced: Rule,
}

/// Returns the replacement for `node` if `rule.left` matches it.
fn try_rewrite(node: &Expr, rule: &Rule, generics: &HashSet<SymbolId>) -> Result<Option<Expr>, Error> {
    let mut mapping = ExprMapping::new();
    if !mapping.match_pattern(node, &rule.left, generics)? {
        return Ok(None);
    }

    mapping.finalize()?;
    let replacement = mapping.instantiate(&rule.right, generics)?;
    log::debug!("applied `{}`: `{}` -> `{}`", rule, node, replacement);
    Ok(Some(replacement))
}

/// Applies `rule` to the sub-expression at `position`.
///
/// Returns an [`AddressNotFound`] error if there is no sub-expression at `position`, or if
/// `rule.left` does not match it.
pub fn rewrite_at(
    expr: &Expr,
    position: usize,
    rule: &Rule,
    generics: &HashSet<SymbolId>,
) -> Result<Expr, Error> {
    let node = expr.get(position)
        .ok_or_else(|| Error::bare(AddressNotFound { position }))?;
    let replacement = try_rewrite(node, rule, generics)?
        .ok_or_else(|| Error::bare(AddressNotFound { position }))?;
    expr.replace_at(position, replacement)
}

/// Applies `rule` to the first sub-expression, in pre-order, that `rule.left` matches.
///
/// Returns [`None`] if `rule.left` matches nothing.
pub fn rewrite_first(
    expr: &Expr,
    rule: &Rule,
    generics: &HashSet<SymbolId>,
) -> Result<Option<Expr>, Error> {
    for (position, node) in expr.pre_order_iter().enumerate() {
        if let Some(replacement) = try_rewrite(node, rule, generics)? {
            return expr.replace_at(position, replacement).map(Some);
        }
    }
    Ok(None)
}

/// Applies `rule` to every sub-expression that `rule.left` matches.
///
/// See [`rewrite_all_with_steps`] for details.
pub fn rewrite_all(expr: &Expr, rule: &Rule, generics: &HashSet<SymbolId>) -> Result<Expr, Error> {
    rewrite_all_with_steps(expr, rule, generics, &mut ())
}

/// Applies `rule` to every sub-expression that `rule.left` matches, recording each application in
/// `step_collector`.
///
/// The expression is visited in pre-order. Once a sub-expression is rewritten, neither its
/// replacement nor anything inside of it is visited again, so matches never overlap. Replaying
/// the recorded steps in order on `expr` reproduces the result.
pub fn rewrite_all_with_steps(
    expr: &Expr,
    rule: &Rule,
    generics: &HashSet<SymbolId>,
    step_collector: &mut dyn StepCollector<Step>,
) -> Result<Expr, Error> {
    rewrite_all_inner(expr, 0, rule, generics, step_collector)
}

fn rewrite_all_inner(
    expr: &Expr,
    position: usize,
    rule: &Rule,
    generics: &HashSet<SymbolId>,
    step_collector: &mut dyn StepCollector<Step>,
) -> Result<Expr, Error> {
    if let Some(replacement) = try_rewrite(expr, rule, generics)? {
        step_collector.push(Step {
            position,
            replaced: Rule::new(expr.clone(), replacement.clone()),
        });
        return Ok(replacement);
    }

    let Expr::Function { id, generic, args } = expr else {
        return Ok(expr.clone());
    };

    let mut offset = position + 1;
    let mut new_args = Vec::with_capacity(args.len());
    for arg in args {
        let new_arg = rewrite_all_inner(arg, offset, rule, generics, step_collector)?;
        offset += new_arg.size();
        new_args.push(new_arg);
    }

    Ok(Expr::Function { id: *id, generic: *generic, args: new_args })
}

impl Rule {
    /// Applies `rule` to the first matching sub-expression of the left side of this equation, or,
    /// if there is none, of the right side.
    ///
    /// Returns [`None`] if `rule.left` matches nothing on either side.
    pub fn rewrite_first(&self, rule: &Rule, generics: &HashSet<SymbolId>) -> Result<Option<Rule>, Error> {
        if let Some(left) = rewrite_first(&self.left, rule, generics)? {
            return Ok(Some(Rule::new(left, self.right.clone())));
        }
        if let Some(right) = rewrite_first(&self.right, rule, generics)? {
            return Ok(Some(Rule::new(self.left.clone(), right)));
        }
        Ok(None)
    }

    /// Transforms this whole equation using a rule between equations.
    ///
    /// Both sides of this equation are matched against the corresponding sides of `from` at once,
    /// so a placeholder shared by both sides of `from` must match the same expression in both.
    /// The bindings are then used to instantiate `to`. Returns [`None`] if `from` does not match.
    ///
    /// ```
    /// use eqn_rewrite::expr::{Expr, SymbolId};
    /// use eqn_rewrite::rule::Rule;
    /// use std::collections::HashSet;
    ///
    /// let (add, sub, a, b, c, x) = (SymbolId(0), SymbolId(1), SymbolId(2), SymbolId(3), SymbolId(4), SymbolId(5));
    ///
    /// // ?a + ?b = ?c  =>  ?a = ?c - ?b
    /// let from = Rule::new(
    ///     Expr::call(add, vec![Expr::generic(a), Expr::generic(b)]),
    ///     Expr::generic(c),
    /// );
    /// let to = Rule::new(
    ///     Expr::generic(a),
    ///     Expr::call(sub, vec![Expr::generic(c), Expr::generic(b)]),
    /// );
    ///
    /// // x + 3 = 5
    /// let equation = Rule::new(
    ///     Expr::call(add, vec![Expr::symbol(x), Expr::num(3.0)]),
    ///     Expr::num(5.0),
    /// );
    /// let solved = equation.transform(&from, &to, &HashSet::new()).unwrap().unwrap();
    /// assert_eq!(solved, Rule::new(
    ///     Expr::symbol(x),
    ///     Expr::call(sub, vec![Expr::num(5.0), Expr::num(3.0)]),
    /// ));
    /// ```
    pub fn transform(&self, from: &Rule, to: &Rule, generics: &HashSet<SymbolId>) -> Result<Option<Rule>, Error> {
        let mut mapping = ExprMapping::new();
        let pairs = [(&self.left, &from.left), (&self.right, &from.right)];
        if !mapping.match_patterns(&pairs, generics)? {
            return Ok(None);
        }

        mapping.finalize()?;
        let left = mapping.instantiate(&to.left, generics)?;
        let right = mapping.instantiate(&to.right, generics)?;
        log::debug!("transformed `{}` into `{} = {}` using `{}`", self, left, right, from);
        Ok(Some(Rule::new(left, right)))
    }
}
