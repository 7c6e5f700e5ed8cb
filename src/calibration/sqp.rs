use super::{evaluate_all, Constraint};
use crate::StrError;
use russell_lab::{mat_inverse, mat_vec_mul, vec_inner, vec_norm, Matrix, Norm, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative step of the forward-difference derivatives (square root of machine epsilon)
pub const FD_STEP: f64 = 1.4901161193847656e-8;

/// Holds the options of the SQP solver
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SqpParams {
    /// Stops at a feasible point once the objective change or the step length is below this value
    pub ftol: f64,

    /// Maximum number of iterations
    pub n_max_iterations: usize,

    /// Maximum allowed constraint violation at a converged point
    pub tol_feasibility: f64,

    /// Maximum number of step halvings in the line search
    pub n_max_line_search: usize,

    /// Maximum number of sweeps of the QP subproblem solver
    pub n_max_qp_sweeps: usize,

    /// Tolerance on the multiplier updates of the QP subproblem solver
    pub tol_qp: f64,

    /// Prints the iterations
    pub verbose: bool,

    /// Records the objective and parameters of every iteration
    pub record_history: bool,
}

impl SqpParams {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        SqpParams {
            ftol: 1e-29,
            n_max_iterations: 3000,
            tol_feasibility: 1e-8,
            n_max_line_search: 40,
            n_max_qp_sweeps: 1000,
            tol_qp: 1e-14,
            verbose: false,
            record_history: true,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.ftol < 0.0 {
            return Some(format!("ftol = {:?} is incorrect; it must be ≥ 0.0", self.ftol));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_feasibility < 0.0 {
            return Some(format!(
                "tol_feasibility = {:?} is incorrect; it must be ≥ 0.0",
                self.tol_feasibility
            ));
        }
        if self.n_max_line_search < 1 {
            return Some(format!(
                "n_max_line_search = {} is incorrect; it must be ≥ 1",
                self.n_max_line_search
            ));
        }
        if self.n_max_qp_sweeps < 1 {
            return Some(format!(
                "n_max_qp_sweeps = {} is incorrect; it must be ≥ 1",
                self.n_max_qp_sweeps
            ));
        }
        if self.tol_qp <= 0.0 {
            return Some(format!("tol_qp = {:?} is incorrect; it must be > 0.0", self.tol_qp));
        }
        None
    }
}

impl Default for SqpParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the final state of the optimization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationStatus {
    /// A feasible stationary point was found
    Converged,

    /// The maximum number of iterations was reached
    MaxIterationsReached,

    /// The solver stopped without a feasible stationary point
    Failed(&'static str),
}

impl CalibrationStatus {
    /// Returns true if the status is Converged
    pub fn converged(&self) -> bool {
        *self == CalibrationStatus::Converged
    }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationStatus::Converged => write!(f, "converged"),
            CalibrationStatus::MaxIterationsReached => write!(f, "maximum number of iterations reached"),
            CalibrationStatus::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Holds the optimization history (the first entry is the initial point)
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct History {
    /// Objective value at each iteration
    pub objective: Vec<f64>,

    /// Maximum constraint violation at each iteration
    pub violation: Vec<f64>,

    /// Parameters at each iteration
    pub params: Vec<Vec<f64>>,
}

impl History {
    fn push(&mut self, f: f64, violation: f64, x: &Vector) {
        self.objective.push(f);
        self.violation.push(violation);
        self.params.push(x.as_data().clone());
    }

    /// Returns the number of recorded points
    pub fn len(&self) -> usize {
        self.objective.len()
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.objective.is_empty()
    }
}

/// Holds the results of the SQP solver
#[derive(Clone, Debug)]
pub struct SqpResult {
    /// Final parameters
    pub x: Vec<f64>,

    /// Objective at the final parameters
    pub f: f64,

    /// Maximum constraint violation at the final parameters
    pub violation: f64,

    /// Final status
    pub status: CalibrationStatus,

    /// Number of iterations
    pub n_iterations: usize,

    /// Number of objective function evaluations
    pub n_function_evals: usize,

    /// Optimization history (if requested)
    pub history: Option<History>,
}

/// Computes the maximum violation of `c ≥ 0`
fn max_violation(c: &[f64]) -> f64 {
    c.iter().fold(0.0, |acc, ci| f64::max(acc, -ci))
}

/// Returns the forward-difference step for the j-th variable
fn fd_step(xj: f64) -> f64 {
    FD_STEP * f64::max(f64::abs(xj), 1.0)
}

/// Implements a sequential quadratic programming (SLSQP-like) solver
///
/// Solves:
///
/// ```text
/// min f(x)   subject to   c(x) ≥ 0
/// ```
///
/// Each iteration solves the quadratic subproblem
///
/// ```text
/// min ½ dᵀ B d + gᵀ d   subject to   A d + c ≥ 0
/// ```
///
/// by dual coordinate ascent (Hildreth's method), where `g` and `A` are
/// forward-difference gradients and `B` is a damped BFGS approximation of the
/// Hessian of the Lagrangian. The step is then globalized by a backtracking
/// line search on the L1 merit function `f + Σ r_j max(0, -c_j)`.
pub struct SqpSolver {
    params: SqpParams,
    n_function_evals: usize,
}

impl SqpSolver {
    /// Allocates a new instance
    pub fn new(params: SqpParams) -> Result<Self, StrError> {
        if let Some(msg) = params.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate SqpSolver because params.validate() failed");
        }
        Ok(SqpSolver {
            params,
            n_function_evals: 0,
        })
    }

    /// Evaluates the objective function and counts the evaluation
    fn eval<F>(&mut self, objective: &mut F, x: &Vector) -> Result<f64, StrError>
    where
        F: FnMut(&[f64]) -> Result<f64, StrError>,
    {
        self.n_function_evals += 1;
        objective(x.as_data())
    }

    /// Computes the gradient of the objective by forward differences
    fn gradient<F>(&mut self, objective: &mut F, x: &Vector, f: f64) -> Result<Vector, StrError>
    where
        F: FnMut(&[f64]) -> Result<f64, StrError>,
    {
        let n = x.dim();
        let mut g = Vector::new(n);
        let mut xh = x.clone();
        for j in 0..n {
            let h = fd_step(x[j]);
            xh[j] = x[j] + h;
            let fh = self.eval(objective, &xh)?;
            g[j] = (fh - f) / h;
            xh[j] = x[j];
        }
        Ok(g)
    }

    /// Computes the Jacobian of the constraints by forward differences (m × n)
    fn jacobian(constraints: &[&dyn Constraint], x: &Vector, c: &[f64]) -> Result<Matrix, StrError> {
        let (m, n) = (c.len(), x.dim());
        let mut a = Matrix::new(m, n);
        let mut xh = x.as_data().clone();
        for j in 0..n {
            let h = fd_step(x[j]);
            xh[j] = x[j] + h;
            let ch = evaluate_all(constraints, &xh)?;
            if ch.len() != m {
                return Err("the number of constraint components must not change");
            }
            for i in 0..m {
                a.set(i, j, (ch[i] - c[i]) / h);
            }
            xh[j] = x[j];
        }
        Ok(a)
    }

    /// Solves the quadratic subproblem; returns the step and the multipliers
    fn solve_qp(&self, bb: &Matrix, g: &Vector, a: &Matrix, c: &[f64]) -> Result<(Vector, Vec<f64>), StrError> {
        let n = g.dim();
        let m = c.len();
        let mut bi = Matrix::new(n, n);
        mat_inverse(&mut bi, bb)?;

        // unconstrained step: u0 = -B⁻¹ g
        let mut u0 = Vector::new(n);
        mat_vec_mul(&mut u0, -1.0, &bi, g)?;
        if m == 0 {
            return Ok((u0, Vec::new()));
        }

        // columns of B⁻¹ Aᵀ
        let mut bi_at = Vec::with_capacity(m);
        for i in 0..m {
            let mut ai = Vector::new(n);
            for j in 0..n {
                ai[j] = a.get(i, j);
            }
            let mut col = Vector::new(n);
            mat_vec_mul(&mut col, 1.0, &bi, &ai)?;
            bi_at.push((ai, col));
        }

        // dual problem: min ½ λᵀ H λ + λᵀ k  subject to  λ ≥ 0
        let mut hh = vec![vec![0.0; m]; m];
        let mut k = vec![0.0; m];
        for i in 0..m {
            for j in 0..m {
                hh[i][j] = vec_inner(&bi_at[i].0, &bi_at[j].1);
            }
            k[i] = c[i] + vec_inner(&bi_at[i].0, &u0);
        }
        let mut lambda = vec![0.0; m];
        for _ in 0..self.params.n_max_qp_sweeps {
            let mut max_change: f64 = 0.0;
            let mut max_lambda: f64 = 0.0;
            for i in 0..m {
                if hh[i][i] <= f64::EPSILON {
                    continue;
                }
                let w = k[i] + (0..m).map(|j| hh[i][j] * lambda[j]).sum::<f64>();
                let updated = f64::max(0.0, lambda[i] - w / hh[i][i]);
                max_change = f64::max(max_change, f64::abs(updated - lambda[i]));
                max_lambda = f64::max(max_lambda, updated);
                lambda[i] = updated;
            }
            if max_change <= self.params.tol_qp * (1.0 + max_lambda) {
                break;
            }
        }

        // primal step: d = u0 + B⁻¹ Aᵀ λ
        let mut d = u0;
        for i in 0..m {
            for j in 0..n {
                d[j] += lambda[i] * bi_at[i].1[j];
            }
        }
        Ok((d, lambda))
    }

    /// Computes the gradient of the Lagrangian `g - Aᵀ λ`
    fn lagrangian_gradient(g: &Vector, a: &Matrix, lambda: &[f64]) -> Vector {
        let mut gl = g.clone();
        for i in 0..lambda.len() {
            for j in 0..g.dim() {
                gl[j] -= a.get(i, j) * lambda[i];
            }
        }
        gl
    }

    /// Applies the damped BFGS update (Powell) to the Hessian approximation
    fn update_hessian(bb: &mut Matrix, s: &Vector, y: &Vector) -> Result<(), StrError> {
        let n = s.dim();
        let mut bs = Vector::new(n);
        mat_vec_mul(&mut bs, 1.0, bb, s)?;
        let s_bs = vec_inner(s, &bs);
        if s_bs <= f64::MIN_POSITIVE {
            return Ok(());
        }
        let mut y = y.clone();
        let mut sy = vec_inner(s, &y);
        if sy < 0.2 * s_bs {
            let theta = 0.8 * s_bs / (s_bs - sy);
            for j in 0..n {
                y[j] = theta * y[j] + (1.0 - theta) * bs[j];
            }
            sy = vec_inner(s, &y);
        }
        if sy <= f64::MIN_POSITIVE {
            return Ok(());
        }
        for i in 0..n {
            for j in 0..n {
                let value = bb.get(i, j) + y[i] * y[j] / sy - bs[i] * bs[j] / s_bs;
                bb.set(i, j, value);
            }
        }
        Ok(())
    }

    /// Prints the header of the iterations table
    fn print_header(&self) {
        if self.params.verbose {
            println!("\nHYPERCAL === SQP ITERATIONS ===================================================");
            println!("\nLegend:");
            println!("🔹 ─ step accepted");
            println!("✅ ─ converged");
            println!("❌ ─ failed\n");
            println!("{}", "─".repeat(79));
            println!(
                "{:>6} {:>14} {:>11} {:>11} {:>11} {:>3}",
                "iter", "f", "‖d‖∞", "violation", "α", ""
            );
            println!("{}", "─".repeat(79));
        }
    }

    /// Prints one line of the iterations table
    fn print_iteration(&self, iteration: usize, f: f64, norm_d: f64, violation: f64, alpha: f64, icon: &str) {
        if self.params.verbose {
            println!(
                "{:>6} {:>14.6e} {:>11.3e} {:>11.3e} {:>11.3e} {:>3}",
                iteration, f, norm_d, violation, alpha, icon
            );
        }
    }

    /// Prints the footer of the iterations table
    fn print_footer(&self, status: &CalibrationStatus) {
        if self.params.verbose {
            println!("{}", "─".repeat(79));
            println!("status: {}", status);
        }
    }

    /// Minimizes the objective subject to the constraints
    ///
    /// # Input
    ///
    /// * `objective` -- the objective function f(x)
    /// * `x0` -- the initial guess
    /// * `constraints` -- the inequality constraints c(x) ≥ 0
    ///
    /// # Output
    ///
    /// Returns the result with the final status. Errors are only returned if the
    /// objective or the constraints fail to evaluate; a non-converged run is
    /// reported in [SqpResult::status].
    pub fn minimize<F>(
        &mut self,
        mut objective: F,
        x0: &[f64],
        constraints: &[&dyn Constraint],
    ) -> Result<SqpResult, StrError>
    where
        F: FnMut(&[f64]) -> Result<f64, StrError>,
    {
        let n = x0.len();
        if n == 0 {
            return Err("the initial guess must have at least one entry");
        }
        self.n_function_evals = 0;
        let eps = f64::EPSILON;

        // initial state
        let mut x = Vector::from(&x0);
        let mut f = self.eval(&mut objective, &x)?;
        let mut c = evaluate_all(constraints, x.as_data())?;
        let mut violation = max_violation(&c);
        let mut history = if self.params.record_history {
            let mut h = History::default();
            h.push(f, violation, &x);
            Some(h)
        } else {
            None
        };
        if !f.is_finite() {
            return Ok(SqpResult {
                x: x0.to_vec(),
                f,
                violation,
                status: CalibrationStatus::Failed("objective is not finite at the initial point"),
                n_iterations: 0,
                n_function_evals: self.n_function_evals,
                history,
            });
        }
        let m = c.len();
        let mut g = self.gradient(&mut objective, &x, f)?;
        let mut a = SqpSolver::jacobian(constraints, &x, &c)?;
        let mut bb = Matrix::new(n, n);
        for i in 0..n {
            bb.set(i, i, 1.0);
        }
        let mut penalty = vec![0.0; m];

        self.print_header();
        self.print_iteration(0, f, 0.0, violation, 0.0, "");
        let mut status = CalibrationStatus::MaxIterationsReached;
        let mut n_iterations = 0;
        for iteration in 1..=self.params.n_max_iterations {
            n_iterations = iteration;

            // search direction
            let (d, lambda) = self.solve_qp(&bb, &g, &a, &c)?;
            let norm_d = vec_norm(&d, Norm::Max);
            let norm_x = vec_norm(&x, Norm::Max);
            if !norm_d.is_finite() {
                status = CalibrationStatus::Failed("search direction is not finite");
                break;
            }
            if norm_d <= eps * (1.0 + norm_x) {
                status = if violation <= self.params.tol_feasibility {
                    CalibrationStatus::Converged
                } else {
                    CalibrationStatus::Failed("cannot reduce the constraint violation")
                };
                break;
            }

            // merit function
            for j in 0..m {
                penalty[j] = f64::max(f64::abs(lambda[j]), 0.5 * (penalty[j] + f64::abs(lambda[j])));
            }
            let infeasibility: f64 = (0..m).map(|j| penalty[j] * f64::max(0.0, -c[j])).sum();
            let merit0 = f + infeasibility;
            let dmerit = f64::min(0.0, vec_inner(&g, &d) - infeasibility);

            // line search
            let mut alpha = 1.0;
            let mut accepted = None;
            let mut x_new = Vector::new(n);
            for _ in 0..self.params.n_max_line_search {
                for j in 0..n {
                    x_new[j] = x[j] + alpha * d[j];
                }
                let f_new = self.eval(&mut objective, &x_new)?;
                let c_new = evaluate_all(constraints, x_new.as_data())?;
                let merit: f64 = f_new + (0..m).map(|j| penalty[j] * f64::max(0.0, -c_new[j])).sum::<f64>();
                if merit.is_finite() && merit <= merit0 + 0.1 * alpha * dmerit {
                    accepted = Some((f_new, c_new));
                    break;
                }
                alpha *= 0.5;
            }
            let (f_new, c_new) = match accepted {
                Some(values) => values,
                None => {
                    let stationary = f64::abs(dmerit) <= f64::sqrt(eps) * (1.0 + f64::abs(f));
                    status = if violation <= self.params.tol_feasibility && stationary {
                        CalibrationStatus::Converged
                    } else {
                        CalibrationStatus::Failed("line search failed")
                    };
                    self.print_iteration(iteration, f, norm_d, violation, 0.0, "❌");
                    break;
                }
            };

            // quasi-Newton update with the gradients of the Lagrangian
            let g_new = self.gradient(&mut objective, &x_new, f_new)?;
            let a_new = SqpSolver::jacobian(constraints, &x_new, &c_new)?;
            let gl_old = SqpSolver::lagrangian_gradient(&g, &a, &lambda);
            let gl_new = SqpSolver::lagrangian_gradient(&g_new, &a_new, &lambda);
            let mut s = Vector::new(n);
            let mut y = Vector::new(n);
            for j in 0..n {
                s[j] = x_new[j] - x[j];
                y[j] = gl_new[j] - gl_old[j];
            }
            SqpSolver::update_hessian(&mut bb, &s, &y)?;

            // move to the new point
            let df = f64::abs(f_new - f);
            x = x_new;
            f = f_new;
            c = c_new;
            g = g_new;
            a = a_new;
            violation = max_violation(&c);
            if let Some(h) = history.as_mut() {
                h.push(f, violation, &x);
            }

            // convergence
            let norm_s = vec_norm(&s, Norm::Euc);
            let small_change = df < self.params.ftol || norm_s < self.params.ftol;
            let stagnated = vec_norm(&s, Norm::Max) <= eps * (1.0 + vec_norm(&x, Norm::Max));
            if violation <= self.params.tol_feasibility && (small_change || stagnated) {
                status = CalibrationStatus::Converged;
                self.print_iteration(iteration, f, norm_d, violation, alpha, "✅");
                break;
            }
            self.print_iteration(iteration, f, norm_d, violation, alpha, "🔹");
        }
        self.print_footer(&status);
        Ok(SqpResult {
            x: x.as_data().clone(),
            f,
            violation,
            status,
            n_iterations,
            n_function_evals: self.n_function_evals,
            history,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
