//! Computing the smallest rewrite that turns one expression into another.
//!
//! [`diff`] walks two expressions in lockstep and describes how they differ as a tree of
//! [`DiffBranch`]es, mirroring the structure of the expressions. When several descriptions are
//! possible, the engine prefers, in order:
//!
//! 1. no change at all,
//! 2. reordering the arguments of rearrangeable operators,
//! 3. replacing one or more independent sub-expressions,
//! 4. replacing the smallest enclosing sub-expression that contains a numeric mismatch.
//!
//! The last point deserves explanation. Two unequal numbers are never described as a standalone
//! replacement; instead, the mismatch is reported to the parent as
//! [`DiffResult::NumericInequality`], and the parent replaces itself as a whole. For example, the
//! difference between `f(1, x)` and `f(2, y)` is the single rule `f(1, x) = f(2, y)`, rather
//! than the two rules `1 = 2` and `x = y`.
//!
//! ```
//! use eqn_rewrite::diff::{diff, Change};
//! use eqn_rewrite::expr::{Expr, SymbolId};
//! use eqn_rewrite::rule::Rule;
//! use std::collections::HashSet;
//!
//! let (f, x, y) = (SymbolId(0), SymbolId(1), SymbolId(2));
//! let a = Expr::call(f, vec![Expr::num(1.0), Expr::symbol(x)]);
//! let b = Expr::call(f, vec![Expr::num(2.0), Expr::symbol(y)]);
//!
//! let branch = diff(&a, &b, &HashSet::new());
//! assert_eq!(branch.changes(), vec![Change::Replace {
//!     position: 0,
//!     rule: Rule::new(a.clone(), b.clone()),
//! }]);
//! assert_eq!(branch.apply(&a).unwrap(), b);
//! ```

use crate::{
    expr::{Expr, SymbolId},
    rearrange::{compute_rearrangement, Rearrangement},
    rule::Rule,
};
use eqn_error::Error;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Describes how the sub-expression at [`DiffBranch::position`] differs between two expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiffBranch {
    /// The position of the sub-expression in the whole expression.
    pub position: usize,

    /// Whether the two sub-expressions differ at all.
    pub different: bool,

    /// The rule that replaces the first sub-expression with the second, if they differ.
    pub replaced: Option<Rule>,

    /// The rearrangements that turn the first sub-expression into the second. If non-empty, the
    /// two sub-expressions differ only in the order of arguments of rearrangeable operators.
    pub rearrangements: Vec<Rearrangement>,

    /// The differences between each pair of arguments, in argument order. Empty unless the two
    /// sub-expressions are applications of the same function to the same number of arguments.
    pub argument_difference: Vec<DiffBranch>,
}

impl DiffBranch {
    /// Creates a branch for two equal sub-expressions.
    fn same(position: usize) -> Self {
        Self {
            position,
            different: false,
            replaced: None,
            rearrangements: Vec::new(),
            argument_difference: Vec::new(),
        }
    }

    /// Creates a branch that replaces `a` with `b` as a whole.
    fn replace(position: usize, a: &Expr, b: &Expr) -> Self {
        Self {
            position,
            different: true,
            replaced: Some(Rule::new(a.clone(), b.clone())),
            rearrangements: Vec::new(),
            argument_difference: Vec::new(),
        }
    }

    /// Returns the minimal list of edits described by this branch, in pre-order.
    pub fn changes(&self) -> Vec<Change> {
        if !self.different {
            return Vec::new();
        }

        if !self.rearrangements.is_empty() {
            return self.rearrangements.iter()
                .cloned()
                .map(Change::Rearrange)
                .collect();
        }

        let nested = self.argument_difference.iter()
            .flat_map(DiffBranch::changes)
            .collect::<Vec<_>>();
        if !nested.is_empty() {
            return nested;
        }

        self.replaced.iter()
            .map(|rule| Change::Replace { position: self.position, rule: rule.clone() })
            .collect()
    }

    /// Replays the edits described by this branch on `expr`, which should be the first of the two
    /// expressions that were compared. The result is the second expression.
    pub fn apply(&self, expr: &Expr) -> Result<Expr, Error> {
        if !self.different {
            return Ok(expr.clone());
        }

        if !self.rearrangements.is_empty() {
            return expr.apply_rearrangements(&self.rearrangements);
        }

        let mut children = self.argument_difference.iter()
            .filter(|child| child.different)
            .peekable();
        if children.peek().is_some() {
            // later siblings first, so that the positions of earlier siblings stay valid
            return children
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .try_fold(expr.clone(), |expr, child| child.apply(&expr));
        }

        match &self.replaced {
            Some(rule) => expr.replace_at(self.position, rule.right.clone()),
            None => Ok(expr.clone()),
        }
    }
}

/// The result of comparing two sub-expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiffResult {
    /// The sub-expressions were compared successfully.
    Branch(DiffBranch),

    /// Both sub-expressions are numbers, and they are not equal. The caller should replace the
    /// nearest enclosing sub-expression instead.
    NumericInequality,
}

impl DiffResult {
    /// Returns true if this is a [`DiffResult::NumericInequality`].
    pub fn is_numeric_inequality(&self) -> bool {
        matches!(self, Self::NumericInequality)
    }

    /// Returns the branch, if any.
    pub fn into_branch(self) -> Option<DiffBranch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::NumericInequality => None,
        }
    }
}

/// A single edit produced by [`DiffBranch::changes`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Change {
    /// Replace the sub-expression at `position`, which is `rule.left`, with `rule.right`.
    Replace {
        position: usize,
        rule: Rule,
    },

    /// Reorder the arguments of a rearrangeable operator.
    Rearrange(Rearrangement),
}

/// Compares `a` and `b`, where both are located at `position` in their respective whole
/// expressions.
pub fn diff_at(
    a: &Expr,
    b: &Expr,
    rearrangeable: &HashSet<SymbolId>,
    position: usize,
) -> DiffResult {
    if a == b {
        return DiffResult::Branch(DiffBranch::same(position));
    }

    if a.is_number() && b.is_number() {
        log::trace!("numeric inequality at position {}: `{}` != `{}`", position, a, b);
        return DiffResult::NumericInequality;
    }

    let mut branch = DiffBranch::replace(position, a, b);

    let rearrangements = compute_rearrangement(position, a, b, rearrangeable);
    if !rearrangements.is_empty() {
        branch.rearrangements = rearrangements;
        return DiffResult::Branch(branch);
    }

    let (
        Expr::Function { id: a_id, generic: a_generic, args: a_args },
        Expr::Function { id: b_id, generic: b_generic, args: b_args },
    ) = (a, b) else {
        return DiffResult::Branch(branch);
    };

    if a_args.is_empty() || a_id != b_id || a_generic != b_generic || a_args.len() != b_args.len() {
        return DiffResult::Branch(branch);
    }

    let mut children = Vec::with_capacity(a_args.len());
    let mut offset = position + 1;
    for (a_arg, b_arg) in a_args.iter().zip(b_args) {
        match diff_at(a_arg, b_arg, rearrangeable, offset) {
            DiffResult::Branch(child) => children.push(child),
            DiffResult::NumericInequality => {
                log::debug!("absorbed numeric inequality into `{}` at position {}", a, position);
                return DiffResult::Branch(branch);
            },
        }
        offset += a_arg.size();
    }

    branch.argument_difference = children;
    DiffResult::Branch(branch)
}

/// Compares two whole expressions.
///
/// A numeric mismatch at the root is reported as a replacement of the whole expression.
pub fn diff(a: &Expr, b: &Expr, rearrangeable: &HashSet<SymbolId>) -> DiffBranch {
    match diff_at(a, b, rearrangeable, 0) {
        DiffResult::Branch(branch) => branch,
        DiffResult::NumericInequality => DiffBranch::replace(0, a, b),
    }
}
