//! In-memory collections the views read from.
//!
//! Each store is only changed through its own operations, and only after the
//! backend accepted the change: a failed call leaves the collection as it was.

pub mod departments;
pub mod tickets;
pub mod users;

pub use self::{departments::Departments, tickets::Tickets, users::Users};

/// Replaces the element `same` matches, or appends `item`. Returns the stored
/// element.
fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) -> &T {
    match items.iter().position(|i| same(i, &item)) {
        Some(pos) => {
            items[pos] = item;
            &items[pos]
        }
        None => {
            items.push(item);
            &items[items.len() - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_in_place() {
        let mut items = vec![(1, "a"), (2, "b")];

        assert_eq!(*upsert(&mut items, (2, "c"), |x, y| x.0 == y.0), (2, "c"));
        assert_eq!(*upsert(&mut items, (3, "d"), |x, y| x.0 == y.0), (3, "d"));

        assert_eq!(items, [(1, "a"), (2, "c"), (3, "d")]);
    }
}
