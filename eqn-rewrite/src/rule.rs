use crate::expr::Expr;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An equation between two expressions.
///
/// A rule can be read bidirectionally, as a statement that both sides are equal, or directionally,
/// as an instruction to replace anything matching [`Rule::left`] with [`Rule::right`]. Both sides
/// may contain generic placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    /// The left-hand side of the equation.
    pub left: Expr,

    /// The right-hand side of the equation.
    pub right: Expr,
}

impl Rule {
    /// Creates a new rule.
    pub fn new(left: Expr, right: Expr) -> Self {
        Self { left, right }
    }

    /// Returns the rule with its sides swapped.
    pub fn reversed(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}
