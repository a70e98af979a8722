//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! Solves `min_p ||f(p)||²` where `f` is a residual vector. Each
//! iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λI) δ = -Jᵀr
//! ```
//!
//! with the damping factor λ decreased on accepted steps and increased
//! on rejected ones. The Jacobian is built by forward finite
//! differences; the normal equations are solved by Cholesky
//! factorisation.
//!
//! # Example
//!
//! ```
//! use deam_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
//! let solver = LevenbergMarquardtSolver::with_defaults();
//! let result = solver.solve(residuals, vec![0.0, 0.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

use crate::types::SolverError;

/// Configuration for the Levenberg-Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Convergence tolerance on the residual norm.
    pub tolerance: f64,
    /// Convergence tolerance on the relative parameter change.
    pub param_tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Maximum consecutive iterations without improvement before
    /// the solve stops at a stationary point.
    pub max_stationary_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor applied to lambda on a rejected step.
    pub lambda_up: f64,
    /// Factor applied to lambda on an accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            param_tolerance: 1e-10,
            max_iterations: 100,
            max_stationary_iterations: 20,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
        }
    }
}

impl LMConfig {
    /// Create a configuration with explicit end criteria.
    pub fn new(tolerance: f64, max_iterations: usize, max_stationary_iterations: usize) -> Self {
        Self {
            tolerance,
            param_tolerance: tolerance,
            max_iterations,
            max_stationary_iterations,
            ..Default::default()
        }
    }
}

/// Result of a Levenberg-Marquardt solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameter values.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether an end criterion other than the iteration cap fired.
    pub converged: bool,
}

impl LMResult {
    /// Root mean squared error over `n_observations` residuals.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Damped nonlinear least-squares solver.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Create a new solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: LMConfig::default(),
        }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Minimise the residual sum of squares starting from `initial_params`.
    ///
    /// # Errors
    ///
    /// - `SolverError::NumericalInstability` for empty parameter or
    ///   residual vectors, or a non-finite initial residual
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "empty parameter vector".to_string(),
            ));
        }

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "empty residual vector".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        if !ss.is_finite() {
            return Err(SolverError::NumericalInstability(
                "non-finite residual at initial parameters".to_string(),
            ));
        }

        let mut stationary = 0usize;

        for iteration in 0..self.config.max_iterations {
            if ss.sqrt() < self.config.tolerance {
                return Ok(LMResult {
                    params,
                    residual_ss: ss,
                    iterations: iteration,
                    converged: true,
                });
            }
            if stationary >= self.config.max_stationary_iterations {
                // Stuck at a local minimum the damping cannot escape.
                return Ok(LMResult {
                    params,
                    residual_ss: ss,
                    iterations: iteration,
                    converged: true,
                });
            }

            let jacobian = compute_jacobian(&residuals, &params, &r);

            let delta = match solve_normal_equations(&jacobian, &r, lambda, n_params) {
                Some(d) => d,
                None => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    stationary += 1;
                    continue;
                }
            };

            let param_change = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
            if param_change / param_norm < self.config.param_tolerance {
                return Ok(LMResult {
                    params,
                    residual_ss: ss,
                    iterations: iteration,
                    converged: true,
                });
            }

            let new_params: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let new_r = residuals(&new_params);
            let new_ss = sum_of_squares(&new_r);

            if new_ss.is_finite() && new_ss < ss {
                params = new_params;
                r = new_r;
                ss = new_ss;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
                stationary = 0;
            } else {
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                stationary += 1;
            }
        }

        Ok(LMResult {
            params,
            residual_ss: ss,
            iterations: self.config.max_iterations,
            converged: false,
        })
    }
}

fn sum_of_squares(r: &[f64]) -> f64 {
    r.iter().map(|x| x * x).sum()
}

/// Forward finite-difference Jacobian, one column per parameter.
fn compute_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n_params = params.len();
    let n_residuals = r0.len();
    let mut jacobian = vec![vec![0.0; n_params]; n_residuals];

    let mut bumped = params.to_vec();
    for j in 0..n_params {
        let h = 1e-7 * params[j].abs().max(1e-7);
        bumped[j] = params[j] + h;
        let r_bumped = residuals(&bumped);
        bumped[j] = params[j];

        for (i, row) in jacobian.iter_mut().enumerate() {
            let r1 = r_bumped.get(i).copied().unwrap_or(f64::NAN);
            row[j] = (r1 - r0[i]) / h;
        }
    }
    jacobian
}

/// Solve `(JᵀJ + λI) δ = -Jᵀr`; `None` if the system is not SPD.
fn solve_normal_equations(
    jacobian: &[Vec<f64>],
    residuals: &[f64],
    lambda: f64,
    n_params: usize,
) -> Option<Vec<f64>> {
    let n_residuals = residuals.len();

    let mut jtj = vec![vec![0.0; n_params]; n_params];
    for i in 0..n_params {
        for j in 0..n_params {
            let mut sum = 0.0;
            for row in jacobian.iter().take(n_residuals) {
                sum += row[i] * row[j];
            }
            if !sum.is_finite() {
                return None;
            }
            jtj[i][j] = sum;
        }
        jtj[i][i] += lambda;
    }

    let mut jtr = vec![0.0; n_params];
    for i in 0..n_params {
        let mut sum = 0.0;
        for (k, row) in jacobian.iter().enumerate().take(n_residuals) {
            sum += row[i] * residuals[k];
        }
        jtr[i] = -sum;
    }

    solve_cholesky(&jtj, &jtr)
}

/// Cholesky solve for a symmetric positive-definite system.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }

    // Back substitution: Lᵀ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_minimum() {
        let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver.solve(residuals, vec![0.0, 0.0]).unwrap();
        assert!(result.converged);
        assert!((result.params[0] - 2.0).abs() < 1e-6);
        assert!((result.params[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_exponential_fit() {
        let x_data: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y_data: Vec<f64> = x_data.iter().map(|&x| 1.3 * (-0.8 * x).exp()).collect();

        let residuals = move |p: &[f64]| -> Vec<f64> {
            x_data
                .iter()
                .zip(&y_data)
                .map(|(&x, &y)| p[0] * (-p[1] * x).exp() - y)
                .collect()
        };

        let solver = LevenbergMarquardtSolver::new(LMConfig::new(1e-8, 500, 50));
        let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
        assert!(result.converged);
        assert!((result.params[0] - 1.3).abs() < 1e-4);
        assert!((result.params[1] - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_empty_params_rejected() {
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver.solve(|_: &[f64]| vec![1.0], vec![]);
        assert!(matches!(
            result,
            Err(SolverError::NumericalInstability(_))
        ));
    }

    #[test]
    fn test_stationary_stop_reports_converged() {
        // Any move away from the start makes the residual worse, so
        // every step is rejected and the stationary counter must
        // terminate the solve.
        let solver = LevenbergMarquardtSolver::new(LMConfig::new(1e-12, 500, 5));
        let residuals = |p: &[f64]| {
            if (p[0] - 0.5).abs() < 1e-15 {
                vec![1.0]
            } else {
                vec![2.0]
            }
        };
        let result = solver.solve(residuals, vec![0.5]).unwrap();
        assert!(result.converged);
        assert!(result.iterations < 500);
    }

    #[test]
    fn test_rmse() {
        let result = LMResult {
            params: vec![0.0],
            residual_ss: 4.0,
            iterations: 1,
            converged: true,
        };
        assert!((result.rmse(4) - 1.0).abs() < 1e-12);
        assert_eq!(result.rmse(0), 0.0);
    }
}
