//! Detecting and applying reorderings of commutative / associative operators.
//!
//! Some operators, such as addition and multiplication, do not care about the order of their
//! arguments. We call them _rearrangeable_. The set of rearrangeable operators is always supplied
//! by the caller (see [`Ctxt::rearrangeable`](crate::ctxt::Ctxt::rearrangeable)); nothing in this
//! module assumes what any [`SymbolId`] means.
//!
//! # Canonical hashing
//!
//! [`canonical_hash`] hashes an expression such that reordering the arguments of any
//! rearrangeable operator, at any depth, does not change the hash. It is used to quickly pair up
//! the arguments of two applications before checking them for real.
//!
//! # Rearrangements
//!
//! A [`Rearrangement`] permutes the arguments of the node at some position. When one expression
//! is a reordering of another, [`compute_rearrangement`] constructs the list of rearrangements
//! that turns the first into the second. Nested reorderings are listed before the reordering of
//! their parent, and all positions refer to the layout of the **original** expression, so the
//! list can be applied in order with [`Expr::apply_rearrangements`].
//!
//! ```
//! use eqn_rewrite::expr::{Expr, SymbolId};
//! use eqn_rewrite::rearrange::{compute_rearrangement, Rearrangement};
//! use std::collections::HashSet;
//!
//! let (add, x, y, z) = (SymbolId(0), SymbolId(1), SymbolId(2), SymbolId(3));
//! let rearrangeable = HashSet::from([add]);
//!
//! // add(x, y, z) -> add(z, x, y)
//! let a = Expr::call(add, vec![Expr::symbol(x), Expr::symbol(y), Expr::symbol(z)]);
//! let b = Expr::call(add, vec![Expr::symbol(z), Expr::symbol(x), Expr::symbol(y)]);
//!
//! let steps = compute_rearrangement(0, &a, &b, &rearrangeable);
//! assert_eq!(steps, vec![Rearrangement::new(0, vec![2, 0, 1])]);
//! assert_eq!(a.apply_rearrangements(&steps).unwrap(), b);
//! ```

use crate::{error::InvalidRearrangement, expr::{Expr, SymbolId}};
use eqn_error::Error;
use std::collections::{hash_map::DefaultHasher, HashMap, HashSet};
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A permutation of the arguments of the node at `position`.
///
/// The `i`-th argument of the rearranged node is the `format[i]`-th argument of the original
/// node. A [`None`] slot marks an argument with no counterpart in the original node; such a
/// rearrangement is never produced by [`compute_rearrangement`] and is rejected when applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rearrangement {
    /// The position of the node whose arguments are permuted.
    pub position: usize,

    /// For each argument of the result, the index of the original argument it comes from.
    pub format: Vec<Option<usize>>,
}

impl Rearrangement {
    /// Creates a rearrangement where every slot has a counterpart.
    pub fn new(position: usize, format: Vec<usize>) -> Self {
        Self {
            position,
            format: format.into_iter().map(Some).collect(),
        }
    }
}

/// Computes a hash of `expr` that does not depend on the order of the arguments of rearrangeable
/// operators.
///
/// For an application of a rearrangeable operator, the canonical hashes of the arguments are
/// sorted before being combined with the operator. Any other expression is hashed structurally.
pub fn canonical_hash(expr: &Expr, rearrangeable: &HashSet<SymbolId>) -> u64 {
    let mut hasher = DefaultHasher::new();
    match expr {
        Expr::Function { id, generic, args } if rearrangeable.contains(id) => {
            let mut hashes = args.iter()
                .map(|arg| canonical_hash(arg, rearrangeable))
                .collect::<Vec<_>>();
            hashes.sort_unstable();

            id.hash(&mut hasher);
            generic.hash(&mut hasher);
            hashes.hash(&mut hasher);
        },
        _ => expr.hash(&mut hasher),
    }
    hasher.finish()
}

/// Computes the rearrangements that turn `a` into `b`, where `a` is located at `position` in the
/// whole expression.
///
/// Returns an empty list if `b` is not a reordering of `a`, including when `a == b`. A non-empty
/// result is always complete: applying it to `a` produces exactly `b`.
pub fn compute_rearrangement(
    position: usize,
    a: &Expr,
    b: &Expr,
    rearrangeable: &HashSet<SymbolId>,
) -> Vec<Rearrangement> {
    let (
        Expr::Function { id: a_id, generic: a_generic, args: a_args },
        Expr::Function { id: b_id, generic: b_generic, args: b_args },
    ) = (a, b) else {
        return Vec::new();
    };

    if a_id != b_id
        || a_generic != b_generic
        || !rearrangeable.contains(a_id)
        || a_args.len() != b_args.len()
    {
        return Vec::new();
    }

    let differing = a_args.iter()
        .zip(b_args)
        .enumerate()
        .filter(|(_, (a_arg, b_arg))| a_arg != b_arg)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    match differing.as_slice() {
        [] => return Vec::new(),
        [index] => {
            // only one argument differs, so the reordering must be inside of it
            let offset = arg_position(a, *index);
            return compute_rearrangement(position + offset, &a_args[*index], &b_args[*index], rearrangeable);
        },
        _ => (),
    }

    // group the arguments of `a` by their canonical hash
    let mut groups: HashMap<u64, Vec<usize>> = HashMap::new();
    for (i, arg) in a_args.iter().enumerate() {
        groups.entry(canonical_hash(arg, rearrangeable)).or_default().push(i);
    }

    let mut rearrangements = Vec::new();
    let mut format = Vec::with_capacity(b_args.len());
    for b_arg in b_args {
        let candidates = match groups.get_mut(&canonical_hash(b_arg, rearrangeable)) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => {
                log::trace!("`{}` has no counterpart in `{}`", b_arg, a);
                return Vec::new();
            },
        };

        // prefer an argument that needs no further rearranging
        let slot = candidates.iter()
            .position(|&i| a_args[i] == *b_arg)
            .unwrap_or(0);
        let index = candidates.remove(slot);

        if a_args[index] != *b_arg {
            let nested = compute_rearrangement(
                position + arg_position(a, index),
                &a_args[index],
                b_arg,
                rearrangeable,
            );
            if nested.is_empty() {
                return Vec::new();
            }
            rearrangements.extend(nested);
        }

        format.push(Some(index));
    }

    log::debug!("found rearrangement of `{}` at position {}: {:?}", a, position, format);
    rearrangements.push(Rearrangement { position, format });
    rearrangements
}

/// Returns the position of argument `index` of `expr`, relative to `expr`.
///
/// The argument must exist.
fn arg_position(expr: &Expr, index: usize) -> usize {
    1 + expr.args()[..index].iter().map(Expr::size).sum::<usize>()
}

impl Expr {
    /// Applies a single rearrangement to this expression.
    pub fn rearrange(&self, rearrangement: &Rearrangement) -> Result<Expr, Error> {
        let position = rearrangement.position;
        let invalid = |reason| Error::bare(InvalidRearrangement { position, reason });

        self.try_map_at(position, |node| {
            let Expr::Function { id, generic, args } = node else {
                return Err(invalid("the node is a number"));
            };

            if rearrangement.format.len() != args.len() {
                return Err(invalid("the format does not cover every argument"));
            }

            let mut used = vec![false; args.len()];
            let mut new_args = Vec::with_capacity(args.len());
            for slot in &rearrangement.format {
                let Some(index) = *slot else {
                    return Err(invalid("the format contains a gap"));
                };
                if index >= args.len() || used[index] {
                    return Err(invalid("the format is not a permutation"));
                }
                used[index] = true;
                new_args.push(args[index].clone());
            }

            Ok(Expr::Function { id: *id, generic: *generic, args: new_args })
        })
    }

    /// Applies a list of rearrangements to this expression, in order.
    pub fn apply_rearrangements(&self, rearrangements: &[Rearrangement]) -> Result<Expr, Error> {
        rearrangements.iter()
            .try_fold(self.clone(), |expr, rearrangement| expr.rearrange(rearrangement))
    }
}
