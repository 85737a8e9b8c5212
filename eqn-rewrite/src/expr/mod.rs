//! The expression tree that every other module in this crate operates on.
//!
//! An [`Expr`] is either a numeric leaf ([`Expr::Number`]) or an application of some symbol to an
//! ordered list of arguments ([`Expr::Function`]). A function with no arguments is a _symbol_,
//! such as a variable `x` or a constant `pi`. What a [`SymbolId`] actually names is decided by
//! whoever built the tree, usually through [`Context::resolve`](crate::ctxt::Context::resolve).
//!
//! # Generic nodes
//!
//! A function node may be flagged as _generic_, which turns it into a pattern placeholder. A
//! generic symbol (`?x`) can bind to any sub-expression, and a generic function (`?f(?x)`) can bind
//! to any function application with the same number of arguments. See the
//! [`matcher`](crate::matcher) module for the exact rules.
//!
//! # Equality
//!
//! Unlike algebraic equality, the [`PartialEq`] and [`Eq`] implementations for [`Expr`] are purely
//! **structural** and **order-sensitive**: `add(x, y)` and `add(y, x)` are different expressions
//! until a [`Rearrangement`](crate::rearrange::Rearrangement) is explicitly applied. Use
//! [`canonical_hash`](crate::rearrange::canonical_hash) to compare expressions up to reordering
//! of commutative operators.
//!
//! # Addressing
//!
//! Sub-expressions are addressed by their offset in the pre-order (node before children)
//! traversal of the whole tree. The root is always at position `0`, its first argument at
//! position `1`, and its second argument at `1 + size(first argument)`.
//!
//! ```
//! use eqn_rewrite::expr::{Expr, SymbolId};
//!
//! let (f, g, x, y) = (SymbolId(0), SymbolId(1), SymbolId(2), SymbolId(3));
//!
//! // f(g(x), y)
//! let expr = Expr::call(f, vec![
//!     Expr::call(g, vec![Expr::symbol(x)]),
//!     Expr::symbol(y),
//! ]);
//!
//! assert_eq!(expr.size(), 4);
//! assert_eq!(expr.search(&Expr::symbol(y)), vec![3]);
//! assert_eq!(expr.get(2), Some(&Expr::symbol(x)));
//! ```

mod iter;

use crate::error::AddressNotFound;
use eqn_error::Error;
pub use iter::PreOrderIter;
use std::{fmt, hash::{Hash, Hasher}, mem};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque identifier for a symbol, assigned by a resolver.
///
/// Identifiers are only meaningful relative to the resolver that assigned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A mathematical expression.
///
/// For more information about this type, see the [module-level documentation](self).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A numeric leaf, such as `2` or `0.5`.
    Number(f64),

    /// An application of a symbol to zero or more arguments, such as `x`, `sin(x)` or
    /// `add(x, y, z)`.
    Function {
        /// The symbol being applied.
        id: SymbolId,

        /// Whether this node is a pattern placeholder.
        generic: bool,

        /// The arguments of the application, in order. Empty for plain symbols.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Creates a numeric leaf.
    pub fn num(value: f64) -> Self {
        Self::Number(value)
    }

    /// Creates a plain (non-generic) symbol.
    pub fn symbol(id: SymbolId) -> Self {
        Self::Function { id, generic: false, args: Vec::new() }
    }

    /// Creates a generic symbol, which can bind to any sub-expression.
    pub fn generic(id: SymbolId) -> Self {
        Self::Function { id, generic: true, args: Vec::new() }
    }

    /// Creates an application of the given symbol to the given arguments.
    pub fn call(id: SymbolId, args: Vec<Expr>) -> Self {
        Self::Function { id, generic: false, args }
    }

    /// Creates an application of a generic function to the given arguments.
    pub fn generic_call(id: SymbolId, args: Vec<Expr>) -> Self {
        Self::Function { id, generic: true, args }
    }

    /// If the expression is an [`Expr::Number`], returns the contained value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Function { .. } => None,
        }
    }

    /// Returns true if the expression is an [`Expr::Number`].
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Returns the symbol this expression applies, if it is an [`Expr::Function`].
    pub fn id(&self) -> Option<SymbolId> {
        match self {
            Self::Number(_) => None,
            Self::Function { id, .. } => Some(*id),
        }
    }

    /// Returns true if the expression is a pattern placeholder.
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Function { generic: true, .. })
    }

    /// Returns true if the expression is a function with no arguments.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Function { args, .. } if args.is_empty())
    }

    /// Returns the arguments of the expression. Numbers and symbols have none.
    pub fn args(&self) -> &[Expr] {
        match self {
            Self::Number(_) => &[],
            Self::Function { args, .. } => args,
        }
    }

    /// Returns a copy of the expression where every node whose id is in `ids` is marked generic.
    pub fn mark_generic(&self, ids: &std::collections::HashSet<SymbolId>) -> Self {
        match self {
            Self::Number(value) => Self::Number(*value),
            Self::Function { id, generic, args } => Self::Function {
                id: *id,
                generic: *generic || ids.contains(id),
                args: args.iter().map(|arg| arg.mark_generic(ids)).collect(),
            },
        }
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right pre-order. The
    /// `n`-th item yielded is the node at position `n`.
    pub fn pre_order_iter(&self) -> PreOrderIter {
        PreOrderIter::new(self)
    }

    /// Returns the pre-order traversal of the expression as a list.
    pub fn flatten(&self) -> Vec<&Expr> {
        self.pre_order_iter().collect()
    }

    /// Returns the number of nodes in the expression.
    pub fn size(&self) -> usize {
        self.pre_order_iter().count()
    }

    /// Returns every position, relative to this expression, at which a sub-expression equal to
    /// `target` occurs.
    pub fn search(&self, target: &Expr) -> Vec<usize> {
        self.pre_order_iter()
            .enumerate()
            .filter(|(_, expr)| *expr == target)
            .map(|(position, _)| position)
            .collect()
    }

    /// Returns the sub-expression at the given position.
    pub fn get(&self, position: usize) -> Option<&Expr> {
        self.pre_order_iter().nth(position)
    }

    /// Returns the position of the argument at `index`, relative to this expression.
    pub fn arg_offset(&self, index: usize) -> Option<usize> {
        let args = self.args();
        if index >= args.len() {
            return None;
        }
        Some(1 + args[..index].iter().map(Expr::size).sum::<usize>())
    }

    /// Builds a new expression where the node at `position` is replaced by the output of `f`.
    ///
    /// Returns an [`AddressNotFound`] error if there is no node at `position`, or any error
    /// returned by `f`.
    pub fn try_map_at<F>(&self, position: usize, f: F) -> Result<Expr, Error>
    where
        F: FnOnce(&Expr) -> Result<Expr, Error>,
    {
        match self.map_at_inner(position, f) {
            Ok(expr) => expr,
            Err(_) => Err(Error::bare(AddressNotFound { position })),
        }
    }

    /// Implementation of [`Expr::try_map_at`]. The outer `Err` signals that the position was out
    /// of bounds and hands `f` back to the caller.
    fn map_at_inner<F>(&self, position: usize, f: F) -> Result<Result<Expr, Error>, F>
    where
        F: FnOnce(&Expr) -> Result<Expr, Error>,
    {
        if position == 0 {
            return Ok(f(self));
        }

        let Self::Function { id, generic, args } = self else {
            return Err(f);
        };

        let mut offset = 1;
        for (i, arg) in args.iter().enumerate() {
            let size = arg.size();
            if position < offset + size {
                return match arg.map_at_inner(position - offset, f)? {
                    Ok(new_arg) => {
                        let mut new_args = args.clone();
                        new_args[i] = new_arg;
                        Ok(Ok(Self::Function { id: *id, generic: *generic, args: new_args }))
                    },
                    Err(err) => Ok(Err(err)),
                };
            }
            offset += size;
        }

        Err(f)
    }

    /// Builds a new expression where the node at `position` is replaced by `replacement`.
    pub fn replace_at(&self, position: usize, replacement: Expr) -> Result<Expr, Error> {
        self.try_map_at(position, |_| Ok(replacement))
    }

    /// Builds a new expression where every occurrence of `from` is replaced by `to`. Occurrences
    /// inside an already replaced sub-expression are not visited.
    pub fn substitute(&self, from: &Expr, to: &Expr) -> Expr {
        if self == from {
            return to.clone();
        }

        match self {
            Self::Number(value) => Self::Number(*value),
            Self::Function { id, generic, args } => Self::Function {
                id: *id,
                generic: *generic,
                args: args.iter().map(|arg| arg.substitute(from, to)).collect(),
            },
        }
    }
}

/// Checks if two expressions are **structurally** equal.
///
/// Two numbers are equal if their values are equal. Two functions are equal if they have the same
/// id, the same generic flag, and pairwise equal arguments in the same order.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(lhs), Self::Number(rhs)) => lhs == rhs,
            (
                Self::Function { id: lhs_id, generic: lhs_generic, args: lhs_args },
                Self::Function { id: rhs_id, generic: rhs_generic, args: rhs_args },
            ) => lhs_id == rhs_id && lhs_generic == rhs_generic && lhs_args == rhs_args,
            _ => false,
        }
    }
}

/// [`Eq`] is implemented manually to allow comparing [`Expr::Number`]s. This crate **must never**
/// produce `NaN`s on its own; a `NaN` handed to it by a caller never equals anything, including
/// itself.
impl Eq for Expr {}

/// [`Hash`] is implemented manually to allow hashing [`Expr::Number`]s. `0.0` and `-0.0` compare
/// equal, so both hash the same.
impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Number(value) => {
                let value = if *value == 0.0 { 0.0 } else { *value };
                value.to_bits().hash(state);
            },
            Self::Function { id, generic, args } => {
                id.hash(state);
                generic.hash(state);
                args.hash(state);
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Function { id, generic, args } => {
                if *generic {
                    write!(f, "?")?;
                }
                write!(f, "{}", id)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    let mut iter = args.iter();
                    if let Some(arg) = iter.next() {
                        write!(f, "{}", arg)?;
                        for arg in iter {
                            write!(f, ", {}", arg)?;
                        }
                    }
                    write!(f, ")")?;
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AddressNotFound;
    use pretty_assertions::assert_eq;
    use std::collections::hash_map::DefaultHasher;
    use super::*;

    const F: SymbolId = SymbolId(0);
    const G: SymbolId = SymbolId(1);
    const X: SymbolId = SymbolId(2);
    const Y: SymbolId = SymbolId(3);

    fn hash_of(expr: &Expr) -> u64 {
        let mut hasher = DefaultHasher::new();
        expr.hash(&mut hasher);
        hasher.finish()
    }

    /// `f(g(x, 2), y, x)`
    fn sample() -> Expr {
        Expr::call(F, vec![
            Expr::call(G, vec![Expr::symbol(X), Expr::num(2.0)]),
            Expr::symbol(Y),
            Expr::symbol(X),
        ])
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = Expr::call(F, vec![Expr::symbol(X), Expr::symbol(Y)]);
        let b = Expr::call(F, vec![Expr::symbol(Y), Expr::symbol(X)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn equality_checks_generic_flag() {
        assert_ne!(Expr::symbol(X), Expr::generic(X));
    }

    #[test]
    fn signed_zero() {
        assert_eq!(Expr::num(0.0), Expr::num(-0.0));
        assert_eq!(hash_of(&Expr::num(0.0)), hash_of(&Expr::num(-0.0)));
    }

    #[test]
    fn flatten_pre_order() {
        let expr = sample();
        let flat = expr.flatten();
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[0], &expr);
        assert_eq!(flat[1], &expr.args()[0]);
        assert_eq!(flat[2], &Expr::symbol(X));
        assert_eq!(flat[3], &Expr::num(2.0));
        assert_eq!(flat[4], &Expr::symbol(Y));
        assert_eq!(flat[5], &Expr::symbol(X));
    }

    #[test]
    fn search_all_occurrences() {
        let expr = sample();
        assert_eq!(expr.search(&Expr::symbol(X)), vec![2, 5]);
        assert_eq!(expr.search(&Expr::num(2.0)), vec![3]);
        assert!(expr.search(&Expr::symbol(F)).is_empty());
    }

    #[test]
    fn arg_offsets() {
        let expr = sample();
        assert_eq!(expr.arg_offset(0), Some(1));
        assert_eq!(expr.arg_offset(1), Some(4));
        assert_eq!(expr.arg_offset(2), Some(5));
        assert_eq!(expr.arg_offset(3), None);
    }

    #[test]
    fn replace_nested() {
        let expr = sample();
        let replaced = expr.replace_at(3, Expr::symbol(Y)).unwrap();
        assert_eq!(replaced, Expr::call(F, vec![
            Expr::call(G, vec![Expr::symbol(X), Expr::symbol(Y)]),
            Expr::symbol(Y),
            Expr::symbol(X),
        ]));

        // the original is untouched
        assert_eq!(expr, sample());
    }

    #[test]
    fn replace_out_of_bounds() {
        let err = sample().replace_at(6, Expr::num(1.0)).unwrap_err();
        assert!(err.is::<AddressNotFound>());
    }

    #[test]
    fn substitute_every_occurrence() {
        let expr = sample().substitute(&Expr::symbol(X), &Expr::num(7.0));
        assert_eq!(expr, Expr::call(F, vec![
            Expr::call(G, vec![Expr::num(7.0), Expr::num(2.0)]),
            Expr::symbol(Y),
            Expr::num(7.0),
        ]));
    }

    #[test]
    fn fmt_expr() {
        let expr = Expr::generic_call(F, vec![Expr::generic(X), Expr::num(2.5)]);
        assert_eq!(expr.to_string(), "?#0(?#2, 2.5)");
        assert_eq!(sample().to_string(), "#0(#1(#2, 2), #3, #2)");
    }
}
