// Row predicates shared by the SQL and in-memory paths.

use serde::{Deserialize, Serialize};

use crate::model::Quantity;

pub const DEFAULT_MIN_AGE: i64 = 18;
pub const DEFAULT_MAX_AGE: i64 = 35;

/// Inclusive age range a customer must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeWindow {
    pub min_age: i64,
    pub max_age: i64,
}

impl Default for AgeWindow {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl AgeWindow {
    pub fn new(min_age: i64, max_age: i64) -> Self {
        Self { min_age, max_age }
    }

    /// Same semantics as `age BETWEEN min AND max`.
    pub fn contains(&self, age: i64) -> bool {
        self.min_age <= age && age <= self.max_age
    }

    pub fn is_empty(&self) -> bool {
        self.min_age > self.max_age
    }
}

/// An order line counts only when its quantity is present and non-zero.
pub fn quantity_qualifies(quantity: Option<Quantity>) -> bool {
    matches!(quantity, Some(q) if !q.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let w = AgeWindow::default();
        assert!(!w.contains(17));
        assert!(w.contains(18));
        assert!(w.contains(35));
        assert!(!w.contains(36));
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(AgeWindow::new(40, 30).is_empty());
        assert!(!AgeWindow::new(30, 30).is_empty());
    }

    #[test]
    fn null_and_zero_quantities_do_not_qualify() {
        assert!(!quantity_qualifies(None));
        assert!(!quantity_qualifies(Some(Quantity::Integer(0))));
        assert!(!quantity_qualifies(Some(Quantity::Real(0.0))));
        assert!(quantity_qualifies(Some(Quantity::Integer(3))));
        assert!(quantity_qualifies(Some(Quantity::Integer(-2))));
    }
}
