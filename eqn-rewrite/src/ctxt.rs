//! Identifier resolution and numeric evaluation.
//!
//! The engine never assumes what a [`SymbolId`] means. Whenever it needs to know, it asks a
//! [`Context`], which assigns ids to names, turns ids back into names, and evaluates the
//! functions it knows about.
//!
//! [`Ctxt`] is the reference implementation. Its [`Default`] implementation contains a small set
//! of arithmetic and trigonometric builtins, and registers `add` and `mul` as rearrangeable:
//!
//! ```
//! use eqn_rewrite::ctxt::{Context, Ctxt};
//!
//! let mut ctxt = Ctxt::default();
//! let add = ctxt.resolve("add");
//! let x = ctxt.resolve("x");
//!
//! assert!(ctxt.can_compute(add));
//! assert!(!ctxt.can_compute(x));
//! assert!(ctxt.rearrangeable().contains(&add));
//! assert_eq!(ctxt.compute(add, &[1.0, 2.0, 3.0]).unwrap(), 6.0);
//! assert_eq!(ctxt.resolve_name(x), Some("x"));
//! ```

use crate::{
    error::{UndefinedFunction, WrongArgumentCount},
    expr::SymbolId,
};
use eqn_error::Error;
use levenshtein::levenshtein;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// A capability that gives meaning to [`SymbolId`]s.
pub trait Context {
    /// Returns the id of the symbol with the given name, assigning a new id if the name has not
    /// been seen before.
    fn resolve(&mut self, name: &str) -> SymbolId;

    /// Returns the name of the symbol with the given id, if any.
    fn resolve_name(&self, id: SymbolId) -> Option<&str>;

    /// Returns true if the given symbol can be evaluated numerically.
    fn can_compute(&self, id: SymbolId) -> bool;

    /// Evaluates the given symbol with the given arguments.
    fn compute(&self, id: SymbolId, args: &[f64]) -> Result<f64, Error>;
}

/// A numerically evaluable function.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// The number of arguments the function takes, or [`None`] if it takes any number of
    /// arguments.
    pub arity: Option<usize>,

    /// Evaluates the function. The number of arguments has already been checked.
    pub eval: fn(&[f64]) -> f64,
}

/// The builtin functions and constants available in [`Ctxt::default`].
pub static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    fn fixed(arity: usize, eval: fn(&[f64]) -> f64) -> Builtin {
        Builtin { arity: Some(arity), eval }
    }

    HashMap::from([
        ("add", Builtin { arity: None, eval: |args| args.iter().sum() }),
        ("mul", Builtin { arity: None, eval: |args| args.iter().product() }),
        ("sub", fixed(2, |args| args[0] - args[1])),
        ("div", fixed(2, |args| args[0] / args[1])),
        ("pow", fixed(2, |args| args[0].powf(args[1]))),
        ("neg", fixed(1, |args| -args[0])),
        ("sqrt", fixed(1, |args| args[0].sqrt())),
        ("sin", fixed(1, |args| args[0].sin())),
        ("cos", fixed(1, |args| args[0].cos())),
        ("tan", fixed(1, |args| args[0].tan())),
        ("pi", fixed(0, |_| std::f64::consts::PI)),
        ("e", fixed(0, |_| std::f64::consts::E)),
    ])
});

/// The builtins that are rearrangeable in [`Ctxt::default`].
const REARRANGEABLE: [&str; 2] = ["add", "mul"];

/// An interning [`Context`] with a table of builtin functions.
#[derive(Debug, Clone)]
pub struct Ctxt {
    /// The name of each symbol, indexed by id.
    names: Vec<String>,

    /// The id of each name.
    ids: HashMap<String, SymbolId>,

    /// The functions that can be computed.
    funcs: HashMap<SymbolId, &'static Builtin>,

    /// The ids of rearrangeable operators.
    rearrangeable: HashSet<SymbolId>,
}

impl Default for Ctxt {
    fn default() -> Self {
        let mut ctxt = Ctxt::new();

        // sorted, so that every default context assigns the same ids
        let mut names = BUILTINS.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        for name in names {
            ctxt.add_builtin(name);
        }

        for name in REARRANGEABLE {
            let id = ctxt.resolve(name);
            ctxt.mark_rearrangeable(id);
        }

        ctxt
    }
}

impl Ctxt {
    /// Creates a new empty context.
    ///
    /// The empty context cannot compute anything and has no rearrangeable operators. Consider
    /// using the [`Default`] implementation instead.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            ids: HashMap::new(),
            funcs: HashMap::new(),
            rearrangeable: HashSet::new(),
        }
    }

    /// Makes the builtin with the given name computable in this context. Returns [`None`] if
    /// there is no such builtin.
    pub fn add_builtin(&mut self, name: &str) -> Option<SymbolId> {
        let builtin = BUILTINS.get(name)?;
        let id = self.resolve(name);
        self.funcs.insert(id, builtin);
        Some(id)
    }

    /// Returns the id of the given name, without assigning a new one.
    pub fn get_id(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    /// Returns the ids of the rearrangeable operators in this context.
    pub fn rearrangeable(&self) -> &HashSet<SymbolId> {
        &self.rearrangeable
    }

    /// Marks the given operator as rearrangeable.
    pub fn mark_rearrangeable(&mut self, id: SymbolId) {
        self.rearrangeable.insert(id);
    }

    /// Returns all computable functions in the context with a name similar to the given name.
    pub fn get_similar_funcs(&self, name: &str) -> Vec<&str> {
        let mut similar = self.funcs
            .keys()
            .filter_map(|id| self.resolve_name(*id))
            .filter(|n| levenshtein(n, name) < 2)
            .collect::<Vec<_>>();
        similar.sort_unstable();
        similar
    }
}

impl Context for Ctxt {
    fn resolve(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }

        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    fn resolve_name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    fn can_compute(&self, id: SymbolId) -> bool {
        self.funcs.contains_key(&id)
    }

    fn compute(&self, id: SymbolId, args: &[f64]) -> Result<f64, Error> {
        let name = || self.resolve_name(id)
            .map(ToString::to_string)
            .unwrap_or_else(|| id.to_string());

        let Some(builtin) = self.funcs.get(&id) else {
            let name = name();
            let suggestions = self.get_similar_funcs(&name)
                .into_iter()
                .map(ToString::to_string)
                .collect();
            return Err(Error::bare(UndefinedFunction { name, suggestions }));
        };

        match builtin.arity {
            Some(expected) if expected != args.len() => Err(Error::bare(WrongArgumentCount {
                name: name(),
                expected,
                given: args.len(),
            })),
            _ => Ok((builtin.eval)(args)),
        }
    }
}
