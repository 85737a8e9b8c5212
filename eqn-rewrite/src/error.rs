//! Error kinds raised by the rewriting engine.
//!
//! Matching failures are **not** errors: [`match_superset`](crate::matcher::match_superset)
//! returns [`None`] when a pattern does not apply, and callers are expected to branch on it. The
//! kinds in this module describe situations that abort the current rewrite attempt, such as a
//! malformed pattern or a position that does not exist.

use ariadne::Fmt;
use crate::expr::{Expr, SymbolId};
use eqn_attrs::ErrorKind;
use eqn_error::EXPR;

/// A generic placeholder was bound to two different expressions.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is already bound to a different expression", self.id),
    labels = [
        format!("bound to `{}` here", self.existing),
        format!("but `{}` was required here", self.attempted),
    ],
    help = "every occurrence of a placeholder in a pattern must match the same expression",
)]
pub struct BindingConflict {
    /// The placeholder that was bound twice.
    pub id: SymbolId,

    /// The expression the placeholder is already bound to.
    pub existing: Expr,

    /// The expression the placeholder was about to be bound to.
    pub attempted: Expr,
}

/// The dependent variables of a generic function were declared twice, differently.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("the dependent variables of `{}` were declared inconsistently", self.id),
    labels = ["first declared here", "declared differently here"],
    help = format!(
        "`{}` depends on [{}], but was later declared to depend on [{}]",
        self.id.fg(EXPR),
        self.existing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        self.attempted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
    ),
)]
pub struct DependentVariablesConflict {
    /// The generic function.
    pub id: SymbolId,

    /// The dependent variables recorded first.
    pub existing: Vec<SymbolId>,

    /// The dependent variables declared later.
    pub attempted: Vec<SymbolId>,
}

/// A generic function was declared with more than one dependent variable.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` depends on {} variables", self.id, self.count),
    labels = ["this generic function"],
    help = "a generic function may depend on at most one variable",
)]
pub struct TooManyDependentVariables {
    /// The generic function.
    pub id: SymbolId,

    /// The number of dependent variables declared.
    pub count: usize,
}

/// A dependent variable of a generic function is not a generic symbol.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` cannot be a dependent variable of `{}`", self.variable, self.id),
    labels = ["this argument"],
    help = format!(
        "the arguments of a generic function must be generic symbols, such as `{}`",
        "?x".fg(EXPR),
    ),
)]
pub struct NonGenericDependentVariable {
    /// The generic function.
    pub id: SymbolId,

    /// The offending argument.
    pub variable: Expr,
}

/// The binding of a dependent variable could not be inferred from its generic function.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot infer the dependent variables of `{}`", self.id),
    labels = ["this generic function"],
    help = match &self.bound {
        Some(expr) => format!(
            "`{}` is bound to `{}`, which is not a function of exactly one argument",
            self.id,
            expr.to_string().fg(EXPR),
        ),
        None => format!("`{}` is not bound to anything yet", self.id),
    },
)]
pub struct InferenceFailure {
    /// The generic function.
    pub id: SymbolId,

    /// The dependent variables that could not be inferred.
    pub variables: Vec<SymbolId>,

    /// The expression the generic function is bound to, if any.
    pub bound: Option<Expr>,
}

/// A template referred to a generic placeholder that has no binding.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not bound to anything", self.id),
    labels = ["this placeholder"],
    help = "placeholders on the right-hand side of a rule must also appear on its left-hand side",
)]
pub struct UnboundGeneric {
    /// The unbound placeholder.
    pub id: SymbolId,
}

/// There is no node at the given position, or the node there is not what the operation requires.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("no applicable expression at position {}", self.position),
    labels = ["this expression"],
    help = "positions count nodes in pre-order, starting from 0 at the root",
)]
pub struct AddressNotFound {
    /// The requested position.
    pub position: usize,
}

/// A rearrangement cannot be applied to the node it addresses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid rearrangement at position {}: {}", self.position, self.reason),
    labels = ["this expression"],
)]
pub struct InvalidRearrangement {
    /// The position of the addressed node.
    pub position: usize,

    /// Why the rearrangement was rejected.
    pub reason: &'static str,
}

/// The function cannot be computed by the context.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("the `{}` function does not exist", self.name),
    labels = ["this function"],
    help = if self.suggestions.is_empty() {
        "only builtin functions can be computed".to_string()
    } else if self.suggestions.len() == 1 {
        format!("did you mean the `{}` function?", (&*self.suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these functions? {}",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    },
)]
pub struct UndefinedFunction {
    /// The name of the function, or its id if it has no name.
    pub name: String,

    /// A list of similarly named functions, if any.
    pub suggestions: Vec<String>,
}

/// A function was computed with the wrong number of arguments.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("wrong number of arguments given to the `{}` function", self.name),
    labels = ["this function call"],
    help = format!(
        "the `{}` function takes {} argument(s); there are {} argument(s) provided here",
        (&self.name).fg(EXPR),
        self.expected,
        self.given
    ),
)]
pub struct WrongArgumentCount {
    /// The name of the function.
    pub name: String,

    /// The number of arguments that were expected.
    pub expected: usize,

    /// The number of arguments that were given.
    pub given: usize,
}
