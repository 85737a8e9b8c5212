//! A tiny prefix-notation reader for building test expressions, e.g. `add(mul(?a, 2), x)`.
//!
//! Identifiers are resolved through the given [`Ctxt`]; a `?` prefix marks a node as generic.
//! Malformed input panics.

use eqn_rewrite::{Context, Ctxt, Expr, Rule};
use std::{iter::Peekable, str::Chars};

struct Reader<'a, 'c> {
    chars: Peekable<Chars<'a>>,
    ctxt: &'c mut Ctxt,
}

impl Reader<'_, '_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        self.chars.next_if_eq(&expected).is_some()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.chars.next_if(|c| pred(*c)) {
            out.push(c);
        }
        out
    }

    fn expr(&mut self) -> Expr {
        self.skip_whitespace();
        let generic = self.eat('?');

        match self.chars.peek() {
            Some(c) if c.is_ascii_digit() || *c == '-' || *c == '.' => {
                let text = self.take_while(|c| c.is_ascii_digit() || c == '-' || c == '.');
                Expr::num(text.parse().unwrap_or_else(|_| panic!("bad number `{}`", text)))
            },
            Some(c) if c.is_alphabetic() || *c == '_' => {
                let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
                let id = self.ctxt.resolve(&name);

                let mut args = Vec::new();
                if self.eat('(') {
                    if !self.eat(')') {
                        loop {
                            args.push(self.expr());
                            if self.eat(')') {
                                break;
                            }
                            assert!(self.eat(','), "expected `,` or `)` after argument of `{}`", name);
                        }
                    }
                }

                if generic {
                    Expr::generic_call(id, args)
                } else {
                    Expr::call(id, args)
                }
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    fn finish(&mut self) {
        self.skip_whitespace();
        assert!(self.chars.peek().is_none(), "trailing input: {}", self.chars.clone().collect::<String>());
    }
}

/// Reads an expression.
pub fn expr(ctxt: &mut Ctxt, source: &str) -> Expr {
    let mut reader = Reader { chars: source.chars().peekable(), ctxt };
    let expr = reader.expr();
    reader.finish();
    expr
}

/// Reads an equation of the form `left = right`.
pub fn rule(ctxt: &mut Ctxt, source: &str) -> Rule {
    let (left, right) = source.split_once('=')
        .unwrap_or_else(|| panic!("`{}` is not an equation", source));
    Rule::new(expr(ctxt, left), expr(ctxt, right))
}
