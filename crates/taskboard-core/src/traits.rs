/// Entities positioned by an integer `order` within their parent
/// (columns within a project, tasks within a column).
pub trait Ordered {
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

/// Order value that places a new item after every existing one.
pub fn next_order<T: Ordered>(items: &[T]) -> i32 {
    items
        .iter()
        .map(Ordered::order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Rewrite `order` so it equals array position.
pub fn resequence<T: Ordered>(items: &mut [T]) {
    for (order, item) in (0..).zip(items.iter_mut()) {
        item.set_order(order);
    }
}
