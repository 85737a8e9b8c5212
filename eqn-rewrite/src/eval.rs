use crate::{ctxt::Context, expr::Expr};
use eqn_error::Error;

/// Numerically folds every sub-expression of `expr` that can be computed.
///
/// The expression is evaluated bottom-up. A non-generic function application whose arguments are
/// all numbers, and which the context [can compute](Context::can_compute), is replaced by the
/// number it evaluates to. Everything else is left symbolic, so `add(mul(2, 3), x)` becomes
/// `add(6, x)`. A computation that produces `NaN` is also left symbolic.
///
/// ```
/// use eqn_rewrite::ctxt::{Context, Ctxt};
/// use eqn_rewrite::eval::evaluate;
/// use eqn_rewrite::expr::Expr;
///
/// let mut ctxt = Ctxt::default();
/// let (add, mul, x) = (ctxt.resolve("add"), ctxt.resolve("mul"), ctxt.resolve("x"));
///
/// let expr = Expr::call(add, vec![
///     Expr::call(mul, vec![Expr::num(2.0), Expr::num(3.0)]),
///     Expr::symbol(x),
/// ]);
/// assert_eq!(
///     evaluate(&expr, &ctxt).unwrap(),
///     Expr::call(add, vec![Expr::num(6.0), Expr::symbol(x)]),
/// );
/// ```
pub fn evaluate(expr: &Expr, ctxt: &dyn Context) -> Result<Expr, Error> {
    let Expr::Function { id, generic, args } = expr else {
        return Ok(expr.clone());
    };

    let args = args.iter()
        .map(|arg| evaluate(arg, ctxt))
        .collect::<Result<Vec<_>, _>>()?;

    if !*generic && ctxt.can_compute(*id) {
        if let Some(values) = args.iter().map(Expr::as_number).collect::<Option<Vec<_>>>() {
            let value = ctxt.compute(*id, &values)?;
            if !value.is_nan() {
                log::trace!("evaluated `{}` to {}", expr, value);
                return Ok(Expr::Number(value));
            }
        }
    }

    Ok(Expr::Function { id: *id, generic: *generic, args })
}

#[cfg(test)]
mod tests {
    use crate::{ctxt::Ctxt, error::WrongArgumentCount};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn fold_nested() {
        let mut ctxt = Ctxt::default();
        let (div, sub) = (ctxt.resolve("div"), ctxt.resolve("sub"));

        // div(sub(9, 5), 2)
        let expr = Expr::call(div, vec![
            Expr::call(sub, vec![Expr::num(9.0), Expr::num(5.0)]),
            Expr::num(2.0),
        ]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), Expr::num(2.0));
    }

    #[test]
    fn keep_symbolic() {
        let mut ctxt = Ctxt::default();
        let (sin, f, x) = (ctxt.resolve("sin"), ctxt.resolve("f"), ctxt.resolve("x"));

        let expr = Expr::call(sin, vec![Expr::symbol(x)]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), expr);

        // unknown functions are not computed, but their arguments are
        let expr = Expr::call(f, vec![Expr::call(sin, vec![Expr::num(0.0)])]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), Expr::call(f, vec![Expr::num(0.0)]));

        // neither are generic nodes
        let expr = Expr::generic_call(sin, vec![Expr::num(0.0)]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), expr);
    }

    #[test]
    fn constants() {
        let mut ctxt = Ctxt::default();
        let (cos, pi) = (ctxt.resolve("cos"), ctxt.resolve("pi"));
        let expr = Expr::call(cos, vec![Expr::symbol(pi)]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), Expr::num(-1.0));
    }

    #[test]
    fn nan_stays_symbolic() {
        let mut ctxt = Ctxt::default();
        let sqrt = ctxt.resolve("sqrt");
        let expr = Expr::call(sqrt, vec![Expr::num(-1.0)]);
        assert_eq!(evaluate(&expr, &ctxt).unwrap(), expr);
    }

    #[test]
    fn wrong_argument_count() {
        let mut ctxt = Ctxt::default();
        let neg = ctxt.resolve("neg");
        let expr = Expr::call(neg, vec![Expr::num(1.0), Expr::num(2.0)]);
        assert!(evaluate(&expr, &ctxt).unwrap_err().is::<WrongArgumentCount>());
    }
}
