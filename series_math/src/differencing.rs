//! Differencing and its inverse
//!
//! `difference` turns a level series into its `order`-th difference.
//! `Integrator` remembers the last value at every differencing level so
//! forecasts made on the differenced scale can be carried back to levels.

use crate::{MathError, Result};

/// Apply `order` rounds of first differencing
pub fn difference(values: &[f64], order: usize) -> Result<Vec<f64>> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Differencing of order {} needs more than {} observations, have {}",
            order,
            order,
            values.len()
        )));
    }

    let mut result = values.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }

    Ok(result)
}

/// Rebuilds levels from values forecast on the differenced scale
#[derive(Debug, Clone)]
pub struct Integrator {
    /// Last observed value of the k-th difference, k = 0..order
    tails: Vec<f64>,
}

impl Integrator {
    /// Capture the tails of every differencing level of `values`
    pub fn new(values: &[f64], order: usize) -> Result<Self> {
        let mut tails = Vec::with_capacity(order);
        for k in 0..order {
            let level = difference(values, k)?;
            if level.is_empty() {
                return Err(MathError::InsufficientData(
                    "No observations left to integrate from".to_string(),
                ));
            }
            tails.push(level[level.len() - 1]);
        }

        Ok(Self { tails })
    }

    /// Differencing order this integrator undoes
    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Feed the next differenced value and get the next level value back
    pub fn next_level(&mut self, differenced: f64) -> f64 {
        let mut current = differenced;
        for tail in self.tails.iter_mut().rev() {
            *tail += current;
            current = *tail;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_first_and_second_difference() {
        let values = [1.0, 4.0, 9.0, 16.0, 25.0];

        assert_eq!(difference(&values, 0).unwrap(), values.to_vec());
        assert_eq!(difference(&values, 1).unwrap(), vec![3.0, 5.0, 7.0, 9.0]);
        assert_eq!(difference(&values, 2).unwrap(), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_difference_needs_observations() {
        assert!(difference(&[1.0, 2.0], 2).is_err());
    }

    #[test]
    fn test_integrator_continues_quadratic() {
        let values = [1.0, 4.0, 9.0, 16.0, 25.0];
        let mut integrator = Integrator::new(&values, 2).unwrap();

        // constant second difference of 2 continues the squares
        assert_relative_eq!(integrator.next_level(2.0), 36.0);
        assert_relative_eq!(integrator.next_level(2.0), 49.0);
    }

    #[test]
    fn test_integrator_order_zero_is_identity() {
        let mut integrator = Integrator::new(&[3.0, 5.0], 0).unwrap();
        assert_eq!(integrator.order(), 0);
        assert_relative_eq!(integrator.next_level(7.5), 7.5);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn test_integrator_undoes_difference(#[case] order: usize) {
        let levels: Vec<f64> = (0..10).map(|t| (t * t * t) as f64 - 4.0 * t as f64).collect();
        let split = 6;
        let differenced = difference(&levels, order).unwrap();
        assert_eq!(differenced.len(), levels.len() - order);

        let mut integrator = Integrator::new(&levels[..split], order).unwrap();
        for t in split..levels.len() {
            assert_relative_eq!(integrator.next_level(differenced[t - order]), levels[t]);
        }
    }
}
