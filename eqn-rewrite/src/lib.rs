//! Pattern matching, rearrangement and minimal-diff rewriting of symbolic expressions.
//!
//! # Expression representation
//!
//! Every module in this crate operates on the same tree type, [`Expr`], which is either a number
//! or an application of an opaque [`SymbolId`] to a list of arguments. Nodes can be flagged as
//! _generic_, turning them into pattern placeholders. Sub-expressions are addressed by their
//! offset in the pre-order traversal of the whole tree.
//!
//! The crate never decides what an id means. Names, numeric evaluation, and the set of
//! commutative operators are supplied by the caller through a [`Context`], with [`Ctxt`] as a
//! ready-made implementation.
//!
//! # Rewriting
//!
//! A [`Rule`] `left = right` is applied by matching `left` against a sub-expression
//! ([`match_superset`]), collecting the bindings in an [`ExprMapping`], and instantiating `right`
//! with them. See the [`rewrite`] module.
//!
//! ```
//! use eqn_rewrite::{Context, Ctxt, Expr, Rule, rewrite::rewrite_first};
//! use std::collections::HashSet;
//!
//! let mut ctxt = Ctxt::default();
//! let (mul, add, x, a) = (ctxt.resolve("mul"), ctxt.resolve("add"), ctxt.resolve("x"), ctxt.resolve("a"));
//!
//! // ?a * 2 = ?a + ?a
//! let rule = Rule::new(
//!     Expr::call(mul, vec![Expr::generic(a), Expr::num(2.0)]),
//!     Expr::call(add, vec![Expr::generic(a), Expr::generic(a)]),
//! );
//!
//! let expr = Expr::call(mul, vec![Expr::symbol(x), Expr::num(2.0)]);
//! let rewritten = rewrite_first(&expr, &rule, &HashSet::new()).unwrap();
//! assert_eq!(rewritten, Some(Expr::call(add, vec![Expr::symbol(x), Expr::symbol(x)])));
//! ```
//!
//! # Diffing
//!
//! The reverse question, "which rule turns this expression into that one?", is answered by
//! [`diff`]. The result describes the smallest set of edits, preferring reorderings of
//! commutative operators ([`compute_rearrangement`]) over replacements.

pub mod ctxt;
pub mod diff;
pub mod error;
pub mod eval;
pub mod expr;
pub mod mapping;
pub mod matcher;
pub mod rearrange;
pub mod rewrite;
pub mod rule;
pub mod step_collector;

pub use ctxt::{Context, Ctxt};
pub use diff::{diff, diff_at, Change, DiffBranch, DiffResult};
pub use eval::evaluate;
pub use expr::{Expr, SymbolId};
pub use mapping::ExprMapping;
pub use matcher::{match_superset, Bindings};
pub use rearrange::{canonical_hash, compute_rearrangement, Rearrangement};
pub use rule::Rule;
pub use step_collector::StepCollector;

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
