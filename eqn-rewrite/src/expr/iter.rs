use super::Expr;

/// An iterator that iteratively traverses the tree of expressions in left-to-right pre-order
/// (i.e. each node before its arguments).
///
/// The `n`-th expression yielded by this iterator is the expression at position `n`. This iterator
/// is created by [`Expr::pre_order_iter`].
pub struct PreOrderIter<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> PreOrderIter<'a> {
    /// Creates a new iterator that traverses the tree of expressions in left-to-right pre-order.
    pub fn new(expr: &'a Expr) -> Self {
        Self { stack: vec![expr] }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        // push in reverse so the leftmost argument is visited first
        self.stack.extend(expr.args().iter().rev());
        Some(expr)
    }
}
