//! Brent's method root finder.

use super::SolverConfig;
use crate::types::SolverError;

/// Brent's method root finder.
///
/// Combines bisection, the secant method and inverse quadratic
/// interpolation. Requires a bracket with a sign change; converges for
/// any continuous objective without derivatives.
///
/// # Example
///
/// ```
/// use deam_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver {
    config: SolverConfig,
}

impl BrentSolver {
    /// Create a new solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find a root of `f` inside the bracket `[a, b]`.
    ///
    /// `f(a)` and `f(b)` must have opposite signs.
    ///
    /// # Errors
    ///
    /// - `SolverError::NoBracket` if there is no sign change
    /// - `SolverError::NumericalInstability` if an endpoint evaluates
    ///   to a non-finite value
    /// - `SolverError::MaxIterationsExceeded` on convergence failure
    pub fn find_root<F>(&self, f: F, a: f64, b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let fa = f(a);
        let fb = f(b);
        self.solve_bracketed(&f, a, fa, b, fb)
    }

    /// Find a root using an initial guess inside the bracket `[lo, hi]`.
    ///
    /// The guess splits the bracket: whichever half still contains the
    /// sign change becomes the working bracket, so a good guess saves
    /// most of the early bisection steps. A guess outside `(lo, hi)` or
    /// one that evaluates non-finite is ignored.
    pub fn find_root_with_guess<F>(
        &self,
        f: F,
        guess: f64,
        lo: f64,
        hi: f64,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let flo = f(lo);
        let fhi = f(hi);
        if !flo.is_finite() || !fhi.is_finite() {
            return Err(SolverError::NumericalInstability(format!(
                "non-finite objective at bracket: f({lo}) = {flo}, f({hi}) = {fhi}"
            )));
        }
        if flo * fhi > 0.0 {
            return Err(SolverError::NoBracket { a: lo, b: hi });
        }

        if guess > lo && guess < hi {
            let fg = f(guess);
            if fg.is_finite() {
                if fg.abs() < self.config.tolerance {
                    return Ok(guess);
                }
                return if flo * fg < 0.0 {
                    self.solve_bracketed(&f, lo, flo, guess, fg)
                } else {
                    self.solve_bracketed(&f, guess, fg, hi, fhi)
                };
            }
        }
        self.solve_bracketed(&f, lo, flo, hi, fhi)
    }

    fn solve_bracketed<F>(
        &self,
        f: &F,
        mut a: f64,
        mut fa: f64,
        mut b: f64,
        mut fb: f64,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        if !fa.is_finite() || !fb.is_finite() {
            return Err(SolverError::NumericalInstability(format!(
                "non-finite objective at bracket: f({a}) = {fa}, f({b}) = {fb}"
            )));
        }
        if fa * fb > 0.0 {
            return Err(SolverError::NoBracket { a, b });
        }

        // b tracks the best estimate: keep |f(b)| <= |f(a)|.
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }

        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut e = d;

        let tol = self.config.tolerance;

        for _ in 0..self.config.max_iterations {
            if fb.abs() < tol {
                return Ok(b);
            }

            let m = (c - b) / 2.0;
            if m.abs() <= tol {
                return Ok(b);
            }

            let use_bisection;
            if fa != fc && fb != fc {
                // Inverse quadratic interpolation
                let r = fb / fc;
                let s = fb / fa;
                let t = fa / fc;
                let p = s * (t * (r - t) * (c - b) - (1.0 - r) * (b - a));
                let q = (t - 1.0) * (r - 1.0) * (s - 1.0);
                if p.abs() < (3.0 * m * q).abs() / 2.0 && p.abs() < (e * q).abs() / 2.0 {
                    e = d;
                    d = p / q;
                    use_bisection = false;
                } else {
                    use_bisection = true;
                }
            } else if fb != fa {
                // Secant step
                let s = fb / fa;
                let p = 2.0 * m * s;
                let q = 1.0 - s;
                if p.abs() < (3.0 * m * q).abs() / 2.0 && p.abs() < (e * q).abs() / 2.0 {
                    e = d;
                    d = p / q;
                    use_bisection = false;
                } else {
                    use_bisection = true;
                }
            } else {
                use_bisection = true;
            }

            if use_bisection {
                d = m;
                e = m;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol {
                d
            } else if m > 0.0 {
                tol
            } else {
                -tol
            };
            fb = f(b);
            if !fb.is_finite() {
                return Err(SolverError::NumericalInstability(format!(
                    "non-finite objective at x = {b}"
                )));
            }

            // Re-anchor c so f(b) and f(c) keep opposite signs.
            if (fb > 0.0) == (fc > 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }

            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
