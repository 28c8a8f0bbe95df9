//! Ordinary least squares
//!
//! Solves the normal equations `(X'X) b = X'y` with Gaussian elimination
//! and partial pivoting. Design matrices here are small (an intercept plus
//! a handful of lags), so forming `X'X` explicitly is fine.

use crate::{MathError, Result};

/// Relative pivot size below which the system is treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Fit `targets ~ rows` and return one coefficient per column
pub fn least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    if rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but {} targets were given",
            rows.len(),
            targets.len()
        )));
    }

    let columns = match rows.first() {
        Some(row) => row.len(),
        None => {
            return Err(MathError::InsufficientData(
                "Least squares needs at least one observation".to_string(),
            ))
        }
    };

    if columns == 0 {
        return Ok(Vec::new());
    }

    if rows.iter().any(|row| row.len() != columns) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different lengths".to_string(),
        ));
    }

    if rows.len() < columns {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} observations to estimate {} coefficients, have {}",
            columns,
            columns,
            rows.len()
        )));
    }

    // Augmented normal equations [X'X | X'y]
    let mut system = vec![vec![0.0; columns + 1]; columns];
    for (row, &y) in rows.iter().zip(targets) {
        for i in 0..columns {
            for j in 0..columns {
                system[i][j] += row[i] * row[j];
            }
            system[i][columns] += row[i] * y;
        }
    }

    solve(system)
}

/// Gaussian elimination with partial pivoting on an augmented matrix
fn solve(mut system: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = system.len();
    let scale = system
        .iter()
        .flat_map(|row| row[..n].iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .unwrap_or(col);

        if system[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return Err(MathError::CalculationError(
                "Normal equations are singular".to_string(),
            ));
        }
        system.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = system[row][col] / system[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                system[row][k] -= factor * system[col][k];
            }
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| system[row][k] * solution[k]).sum();
        solution[row] = (system[row][n] - tail) / system[row][row];
    }

    if solution.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares produced non-finite coefficients".to_string(),
        ));
    }

    Ok(solution)
}
