use std::collections::VecDeque;
use thiserror::Error;

/// A differentiable scalar function of a flat coordinate vector.
pub trait Objective {
    /// Length of the coordinate vector the objective expects.
    fn dimension(&self) -> usize;

    /// Returns the value at `x` and writes the gradient into `grad`.
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizerSettings {
    pub max_iterations: usize,
    /// Convergence threshold on the root-mean-square gradient component.
    pub gradient_tolerance: f64,
    /// Convergence threshold on the relative value change of an accepted step.
    pub value_tolerance: f64,
    /// Largest displacement of any single coordinate in one step.
    pub max_step: f64,
}

impl Default for MinimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            gradient_tolerance: 1e-2,
            value_tolerance: 1e-8,
            max_step: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimizationStatus {
    Converged,
    /// The iteration cap was reached first. This is a non-zero (unsuccessful) status.
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizationReport {
    pub status: MinimizationStatus,
    pub iterations: usize,
    pub initial_value: f64,
    pub final_value: f64,
}

impl MinimizationReport {
    pub fn converged(&self) -> bool {
        self.status == MinimizationStatus::Converged
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MinimizeError {
    #[error("Coordinate vector has length {found}, objective expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Objective is not finite at the starting point")]
    NonFiniteStart,
}

const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
/// Number of correction pairs kept for the inverse-Hessian estimate.
const HISTORY: usize = 8;
/// Pairs with a smaller curvature `s·y` are discarded.
const MIN_CURVATURE: f64 = 1e-12;

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Step and gradient differences of one accepted iteration.
struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// Two-loop recursion: writes `-H·grad` into `direction` for the current inverse-Hessian
/// estimate, which is a scaled identity when `history` is empty.
fn search_direction(history: &VecDeque<Correction>, grad: &[f64], direction: &mut [f64]) {
    direction.copy_from_slice(grad);
    let mut alphas = Vec::with_capacity(history.len());
    for pair in history.iter().rev() {
        let alpha = pair.rho * dot(&pair.s, direction);
        direction.iter_mut().zip(&pair.y).for_each(|(d, y)| *d -= alpha * y);
        alphas.push(alpha);
    }
    let gamma = history
        .back()
        .map_or(1.0, |last| dot(&last.s, &last.y) / dot(&last.y, &last.y));
    direction.iter_mut().for_each(|d| *d *= gamma);
    for (pair, alpha) in history.iter().zip(alphas.into_iter().rev()) {
        let beta = pair.rho * dot(&pair.y, direction);
        direction
            .iter_mut()
            .zip(&pair.s)
            .for_each(|(d, s)| *d += (alpha - beta) * s);
    }
    direction.iter_mut().for_each(|d| *d = -*d);
}

/// Limited-memory BFGS minimization with a backtracking line search.
///
/// `x` is updated in place to the best point found. A line search that cannot make
/// progress along the steepest-descent direction is treated as convergence.
pub fn minimize(
    objective: &impl Objective,
    x: &mut [f64],
    settings: &MinimizerSettings,
) -> Result<MinimizationReport, MinimizeError> {
    let n = objective.dimension();
    if x.len() != n {
        return Err(MinimizeError::DimensionMismatch {
            expected: n,
            found: x.len(),
        });
    }

    let mut grad = vec![0.0; n];
    let mut value = objective.evaluate(x, &mut grad);
    if !value.is_finite() || grad.iter().any(|g| !g.is_finite()) {
        return Err(MinimizeError::NonFiniteStart);
    }
    let initial_value = value;
    let report = |status, iterations, final_value| MinimizationReport {
        status,
        iterations,
        initial_value,
        final_value,
    };
    if n == 0 {
        return Ok(report(MinimizationStatus::Converged, 0, value));
    }

    let mut history: VecDeque<Correction> = VecDeque::with_capacity(HISTORY);
    let mut direction = vec![0.0; n];
    let mut trial = vec![0.0; n];
    let mut trial_grad = vec![0.0; n];

    for iteration in 0..settings.max_iterations {
        let grad_sq = dot(&grad, &grad);
        if (grad_sq / n as f64).sqrt() < settings.gradient_tolerance {
            return Ok(report(MinimizationStatus::Converged, iteration, value));
        }

        search_direction(&history, &grad, &mut direction);
        let mut slope = dot(&grad, &direction);
        let steepest = history.is_empty() || slope >= 0.0;
        if slope >= 0.0 || !slope.is_finite() {
            history.clear();
            direction.iter_mut().zip(&grad).for_each(|(d, g)| *d = -g);
            slope = -grad_sq;
        }

        let largest = direction.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        let mut step = (settings.max_step / largest).min(1.0);
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            for ((t, xi), d) in trial.iter_mut().zip(x.iter()).zip(&direction) {
                *t = xi + step * d;
            }
            let trial_value = objective.evaluate(&trial, &mut trial_grad);
            if trial_value.is_finite() && trial_value <= value + ARMIJO * step * slope {
                accepted = Some(trial_value);
                break;
            }
            step *= 0.5;
        }

        let Some(new_value) = accepted else {
            if steepest {
                return Ok(report(MinimizationStatus::Converged, iteration, value));
            }
            history.clear();
            continue;
        };

        let s: Vec<f64> = trial.iter().zip(x.iter()).map(|(t, xi)| t - xi).collect();
        let y: Vec<f64> = trial_grad.iter().zip(&grad).map(|(tg, g)| tg - g).collect();
        let curvature = dot(&s, &y);
        if curvature > MIN_CURVATURE {
            if history.len() == HISTORY {
                history.pop_front();
            }
            history.push_back(Correction {
                s,
                y,
                rho: 1.0 / curvature,
            });
        }

        let change = value - new_value;
        x.copy_from_slice(&trial);
        value = new_value;
        std::mem::swap(&mut grad, &mut trial_grad);

        if change.abs() <= settings.value_tolerance * value.abs().max(1.0) {
            return Ok(report(MinimizationStatus::Converged, iteration + 1, value));
        }
    }

    Ok(report(
        MinimizationStatus::IterationLimit,
        settings.max_iterations,
        value,
    ))
}
