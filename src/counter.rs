//! Shared counter behaviour for the coin bank and slot stock.
//!
//! The counter itself knows nothing about capacity: range checks live in
//! [`Countable::store_count`], which each record implements with its own
//! bounds. Every mutation is written straight through and reports both the
//! prior and the new value.

use crate::machine::CounterError;
use crate::model::Count;

pub trait Countable {
    /// Current value of the counter.
    fn count(&self) -> Count;

    /// Persist a new value, enforcing the record's range invariant.
    fn store_count(&mut self, value: Count) -> Result<(), CounterError>;

    /// Returns `(prior, new)`.
    fn add_to(&mut self, n: Count) -> Result<(Count, Count), CounterError> {
        let prior = self.count();
        let new = prior
            .checked_add(n)
            .ok_or(CounterError::Overflow { prior, delta: n })?;
        self.store_count(new)?;
        Ok((prior, new))
    }

    /// Returns `(prior, new)`.
    fn subtract_from(&mut self, n: Count) -> Result<(Count, Count), CounterError> {
        let prior = self.count();
        let new = prior.checked_sub(n).ok_or(CounterError::Overflow {
            prior,
            delta: n.saturating_neg(),
        })?;
        self.store_count(new)?;
        Ok((prior, new))
    }

    /// Returns the prior value.
    fn reset_to_zero(&mut self) -> Result<Count, CounterError> {
        let prior = self.count();
        self.store_count(0)?;
        Ok(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unbounded counter, to exercise the provided methods alone.
    struct Tally(Count);

    impl Countable for Tally {
        fn count(&self) -> Count {
            self.0
        }

        fn store_count(&mut self, value: Count) -> Result<(), CounterError> {
            self.0 = value;
            Ok(())
        }
    }

    #[test]
    fn add_reports_prior_and_new() {
        let mut tally = Tally(2);
        assert_eq!(tally.add_to(3).unwrap(), (2, 5));
        assert_eq!(tally.count(), 5);
    }

    #[test]
    fn subtract_is_not_guarded_by_the_counter() {
        let mut tally = Tally(1);
        assert_eq!(tally.subtract_from(4).unwrap(), (1, -3));
        assert_eq!(tally.count(), -3);
    }

    #[test]
    fn overflow_is_reported_not_clamped() {
        let mut tally = Tally(Count::MAX - 1);
        assert_eq!(
            tally.add_to(2),
            Err(CounterError::Overflow {
                prior: Count::MAX - 1,
                delta: 2,
            })
        );
        assert_eq!(tally.count(), Count::MAX - 1);

        let mut tally = Tally(Count::MIN + 1);
        assert_eq!(
            tally.subtract_from(2),
            Err(CounterError::Overflow {
                prior: Count::MIN + 1,
                delta: -2,
            })
        );
        assert_eq!(tally.count(), Count::MIN + 1);
    }

    #[test]
    fn reset_returns_prior() {
        let mut tally = Tally(7);
        assert_eq!(tally.reset_to_zero().unwrap(), 7);
        assert_eq!(tally.count(), 0);
    }
}
