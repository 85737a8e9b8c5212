//! The generic binding environment.
//!
//! An [`ExprMapping`] accumulates the bindings produced by one or more matches, and records which
//! variables each generic function depends on. For the pattern `?f(?x)`, `f` depends on `x`.
//! Because a generic function is bound to the whole application it matched (see
//! [`matcher`](crate::matcher)), the binding of its dependent variable can always be recovered
//! from it, as long as the application has exactly one argument:
//!
//! ```
//! use eqn_rewrite::expr::{Expr, SymbolId};
//! use eqn_rewrite::mapping::ExprMapping;
//!
//! let (g, v, sin, y) = (SymbolId(0), SymbolId(1), SymbolId(2), SymbolId(3));
//!
//! let mut mapping = ExprMapping::new();
//! mapping.add_expression(g, Expr::call(sin, vec![Expr::symbol(y)]), &[Expr::generic(v)]).unwrap();
//! assert_eq!(mapping.get_dependant_vars(g).unwrap(), vec![v]);
//! assert_eq!(mapping.get(v), Some(&Expr::symbol(y)));
//! ```
//!
//! The environment is strict: a generic function may depend on at most one variable, and once its
//! dependent variables are recorded they cannot be redeclared differently. Each rewrite attempt
//! should use its own environment.

use crate::{
    error::{
        BindingConflict,
        DependentVariablesConflict,
        InferenceFailure,
        NonGenericDependentVariable,
        TooManyDependentVariables,
        UnboundGeneric,
    },
    expr::{Expr, SymbolId},
    matcher::{is_generic, match_superset, Bindings},
};
use eqn_error::Error;
use std::collections::{HashMap, HashSet};

/// The maximum number of dependent variables a generic function may declare.
pub const MAX_DEPENDENT_VARS: usize = 1;

/// Bindings of generic placeholders, and the dependent variables of generic functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprMapping {
    /// The bindings of generic placeholders.
    bindings: Bindings,

    /// The dependent variables of each generic function, in declaration order.
    dependent_vars: HashMap<SymbolId, Vec<SymbolId>>,
}

impl ExprMapping {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expression bound to the given placeholder.
    pub fn get(&self, id: SymbolId) -> Option<&Expr> {
        self.bindings.get(id)
    }

    /// Returns all bindings in the environment.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Returns the recorded dependent variables of a generic function, without inferring
    /// anything.
    pub fn declared_dependent_vars(&self, id: SymbolId) -> Option<&[SymbolId]> {
        self.dependent_vars.get(&id).map(Vec::as_slice)
    }

    /// Binds `id` to `target`, optionally declaring the dependent variables of `id` if it is a
    /// generic function.
    ///
    /// Each dependent variable must be a generic symbol. Binding an already bound placeholder to
    /// the same expression again is allowed.
    pub fn add_expression(
        &mut self,
        id: SymbolId,
        target: Expr,
        dependent_vars: &[Expr],
    ) -> Result<(), Error> {
        if !dependent_vars.is_empty() {
            self.declare_dependent_vars(id, dependent_vars)?;
        }
        self.bind(id, target)
    }

    /// Records the dependent variables of the generic function `id`.
    fn declare_dependent_vars(&mut self, id: SymbolId, vars: &[Expr]) -> Result<(), Error> {
        if vars.len() > MAX_DEPENDENT_VARS {
            return Err(Error::bare(TooManyDependentVariables { id, count: vars.len() }));
        }

        let ids = vars.iter()
            .map(|var| match var {
                Expr::Function { id: var_id, generic: true, args } if args.is_empty() => Ok(*var_id),
                _ => Err(Error::bare(NonGenericDependentVariable { id, variable: var.clone() })),
            })
            .collect::<Result<Vec<_>, _>>()?;

        match self.dependent_vars.get(&id) {
            Some(existing) if *existing != ids => Err(Error::bare(DependentVariablesConflict {
                id,
                existing: existing.clone(),
                attempted: ids,
            })),
            Some(_) => Ok(()),
            None => {
                self.dependent_vars.insert(id, ids);
                Ok(())
            },
        }
    }

    /// Binds `id` to `target`, reporting a conflict if it is bound to something else.
    fn bind(&mut self, id: SymbolId, target: Expr) -> Result<(), Error> {
        if let Some(existing) = self.bindings.get(id) {
            if *existing != target {
                return Err(Error::bare(BindingConflict {
                    id,
                    existing: existing.clone(),
                    attempted: target,
                }));
            }
            return Ok(());
        }

        self.bindings.insert(id, target);
        Ok(())
    }

    /// Returns the dependent variables of the generic function `fn_id`, inferring the bindings of
    /// those that are not bound yet.
    ///
    /// Inference is only possible if `fn_id` has exactly one dependent variable and is bound to
    /// a function application with exactly one argument; the variable is then bound to that
    /// argument. Returns an empty list if `fn_id` has no recorded dependent variables.
    pub fn get_dependant_vars(&mut self, fn_id: SymbolId) -> Result<Vec<SymbolId>, Error> {
        let Some(vars) = self.dependent_vars.get(&fn_id).cloned() else {
            return Ok(Vec::new());
        };

        for var in &vars {
            if self.bindings.contains(*var) {
                continue;
            }

            let inferred = match (vars.as_slice(), self.bindings.get(fn_id)) {
                ([_], Some(Expr::Function { args, .. })) if args.len() == 1 => args[0].clone(),
                (_, bound) => return Err(Error::bare(InferenceFailure {
                    id: fn_id,
                    variables: vars.clone(),
                    bound: bound.cloned(),
                })),
            };

            log::debug!("inferred `{}` = `{}` from `{}`", var, inferred, fn_id);
            self.bindings.insert(*var, inferred);
        }

        Ok(vars)
    }

    /// Infers the bindings of every dependent variable, reporting the first failure.
    pub fn finalize(&mut self) -> Result<(), Error> {
        let mut ids = self.dependent_vars.keys().copied().collect::<Vec<_>>();
        ids.sort();
        for id in ids {
            self.get_dependant_vars(id)?;
        }
        Ok(())
    }

    /// Matches `expr` against `pattern` and commits the resulting bindings, declaring the
    /// dependent variables of every generic function in `pattern`.
    ///
    /// Returns `Ok(false)`, leaving the environment untouched, if the pattern does not match.
    /// Returns an error if the pattern is malformed, or if its bindings conflict with bindings
    /// already in the environment.
    pub fn match_pattern(
        &mut self,
        expr: &Expr,
        pattern: &Expr,
        generics: &HashSet<SymbolId>,
    ) -> Result<bool, Error> {
        self.match_patterns(&[(expr, pattern)], generics)
    }

    /// Matches several `(expr, pattern)` pairs as if they were one pattern: a placeholder shared
    /// between two patterns must bind to the same expression in both, otherwise the pairs do not
    /// match.
    ///
    /// See [`ExprMapping::match_pattern`] for the meaning of the result.
    pub fn match_patterns(
        &mut self,
        pairs: &[(&Expr, &Expr)],
        generics: &HashSet<SymbolId>,
    ) -> Result<bool, Error> {
        let mut bindings = Bindings::new();
        for (expr, pattern) in pairs {
            let Some(pair_bindings) = match_superset(expr, pattern, generics) else {
                return Ok(false);
            };
            if !bindings.merge(pair_bindings) {
                return Ok(false);
            }
        }

        let mut next = self.clone();
        for (_, pattern) in pairs {
            for (id, vars) in generic_functions(pattern, generics) {
                next.declare_dependent_vars(id, &vars)?;
            }
        }
        for (id, expr) in bindings {
            next.bind(id, expr)?;
        }

        *self = next;
        Ok(true)
    }

    /// Instantiates `template` with the bindings in this environment.
    ///
    /// Generic symbols are replaced by their bindings. An application `?f(u)` of a generic
    /// function bound to `B`, whose dependent variable is bound to `V`, is replaced by `B` with
    /// every occurrence of `V` replaced by the instantiated `u`. Non-generic nodes are copied.
    pub fn instantiate(&self, template: &Expr, generics: &HashSet<SymbolId>) -> Result<Expr, Error> {
        let Expr::Function { id, generic, args } = template else {
            return Ok(template.clone());
        };

        if !is_generic(*id, *generic, generics) {
            return Ok(Expr::Function {
                id: *id,
                generic: *generic,
                args: args.iter()
                    .map(|arg| self.instantiate(arg, generics))
                    .collect::<Result<_, _>>()?,
            });
        }

        let bound = self.bindings.get(*id)
            .ok_or_else(|| Error::bare(UnboundGeneric { id: *id }))?;
        if args.is_empty() {
            return Ok(bound.clone());
        }

        let inference_failure = || Error::bare(InferenceFailure {
            id: *id,
            variables: self.dependent_vars.get(id).cloned().unwrap_or_default(),
            bound: Some(bound.clone()),
        });

        let variable = match self.dependent_vars.get(id).map(Vec::as_slice) {
            Some([var]) => self.bindings.get(*var).ok_or_else(inference_failure)?,
            _ => return Err(inference_failure()),
        };

        let [arg] = args.as_slice() else {
            return Err(inference_failure());
        };
        let arg = self.instantiate(arg, generics)?;
        Ok(bound.substitute(variable, &arg))
    }
}

/// Returns every generic function application in `pattern`, paired with its arguments (its
/// declared dependent variables), in pre-order.
fn generic_functions(pattern: &Expr, generics: &HashSet<SymbolId>) -> Vec<(SymbolId, Vec<Expr>)> {
    pattern.pre_order_iter()
        .filter_map(|node| match node {
            Expr::Function { id, generic, args }
                if !args.is_empty() && is_generic(*id, *generic, generics) =>
            {
                let vars = args.iter().map(|arg| arg.mark_generic(generics)).collect();
                Some((*id, vars))
            },
            _ => None,
        })
        .collect()
}
