use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A root refined by bisection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// The parameter value at the last midpoint.
    pub x: f64,
    /// Objective value at `x`.
    pub residual: f64,
    /// Number of bisection steps taken.
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("No sign change found in [{start}, {end}]")]
    NoBracket { start: f64, end: f64 },
    #[error("Objective is not finite at t = {at}")]
    NonFinite { at: f64 },
    #[error("Bisection did not converge after {iterations} iterations (residual: {residual})")]
    DidNotConverge { iterations: usize, residual: f64 },
    #[error("No trial succeeded in {steps} warm-start steps")]
    NoWarmStart { steps: usize },
}

/// Configuration for bracket search and bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Bisection iteration cap.
    pub max_iterations: usize,
    /// Stop once the bracket half-width falls below this.
    pub tolerance: f64,
    /// Number of samples used when scanning for a sign change.
    pub bracket_steps: usize,
    /// A root is accepted when `|residual| <= residual_epsilon * max(1, scale)`.
    pub residual_epsilon: f64,
    /// Upper bound on warm-start trials.
    pub warm_start_steps: usize,
    /// Parameter increment between warm-start trials (radians).
    pub warm_start_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-15,
            bracket_steps: 100,
            residual_epsilon: 1e-9,
            warm_start_steps: 900,
            warm_start_step: std::f64::consts::PI / 1800.0,
        }
    }
}

/// Sign of `x` as -1, 0 or 1.
pub fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

fn checked<E: From<SolverError>>(t: f64, value: f64) -> Result<f64, E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::NonFinite { at: t }.into())
    }
}

/// Scan `f` for the first sign change.
///
/// Samples `start + i * span / steps` for `i` in `0..steps` and returns the
/// sample pair that straddles the first change of sign (a transition to or
/// from an exact zero counts as a change).
pub fn first_bracket<F, E>(f: &mut F, start: f64, span: f64, steps: usize) -> Result<(f64, f64), E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    let steps = steps.max(2);
    let frac = span / steps as f64;
    let mut prev = sign(checked::<E>(start, f(start)?)?);
    for i in 1..steps {
        let x = start + i as f64 * frac;
        let curr = sign(checked::<E>(x, f(x)?)?);
        if curr != prev {
            let lo = start + (i - 1) as f64 * frac;
            debug!(lo, hi = x, "bracketed sign change");
            return Ok((lo, x));
        }
        prev = curr;
    }
    Err(SolverError::NoBracket {
        start,
        end: start + (steps - 1) as f64 * frac,
    }
    .into())
}

/// Standard bisection on `[lo, hi]`.
///
/// Stops on an exact zero, when the half-width drops below
/// `config.tolerance`, or after `config.max_iterations` steps. The returned
/// root is not checked against `residual_epsilon`; see [`find_root`].
pub fn bisect<F, E>(f: &mut F, mut lo: f64, mut hi: f64, config: &SolverConfig) -> Result<Root, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    let mut f_lo = checked::<E>(lo, f(lo)?)?;
    let mut c = 0.5 * (lo + hi);
    let mut f_c = checked::<E>(c, f(c)?)?;
    let mut iterations = 0;

    for i in 1..=config.max_iterations {
        iterations = i;
        c = 0.5 * (lo + hi);
        f_c = checked::<E>(c, f(c)?)?;
        if f_c == 0.0 || (hi - lo) / 2.0 < config.tolerance {
            break;
        }
        if sign(f_c) == sign(f_lo) {
            lo = c;
            f_lo = f_c;
        } else {
            hi = c;
        }
    }

    Ok(Root {
        x: c,
        residual: f_c,
        iterations,
    })
}

/// Bracket the first root of `f` in `[start, start + span)` and refine it.
///
/// `scale` is the characteristic length of the problem; the root is accepted
/// when its residual is within `residual_epsilon * max(1, scale)`.
pub fn find_root<F, E>(f: &mut F, start: f64, span: f64, scale: f64, config: &SolverConfig) -> Result<Root, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    let (lo, hi) = first_bracket(f, start, span, config.bracket_steps)?;
    let root = bisect(f, lo, hi, config)?;
    let limit = config.residual_epsilon * scale.abs().max(1.0);
    if root.residual.abs() > limit {
        return Err(SolverError::DidNotConverge {
            iterations: root.iterations,
            residual: root.residual,
        }
        .into());
    }
    debug!(x = root.x, residual = root.residual, iterations = root.iterations, "root accepted");
    Ok(root)
}

/// Return the first `t = i * config.warm_start_step` for which `trial` succeeds.
///
/// Trials run for `i` in `0..config.warm_start_steps`.
pub fn warm_start<F, T, E>(mut trial: F, config: &SolverConfig) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<T, E>,
    E: From<SolverError>,
{
    for i in 0..config.warm_start_steps {
        let t = i as f64 * config.warm_start_step;
        if trial(t).is_ok() {
            if i > config.warm_start_steps / 2 {
                warn!(steps = i, t, "warm start needed more than half its budget");
            }
            return Ok(t);
        }
    }
    Err(SolverError::NoWarmStart {
        steps: config.warm_start_steps,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(f: impl Fn(f64) -> f64) -> impl FnMut(f64) -> Result<f64, SolverError> {
        move |t| Ok(f(t))
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.0), 1);
        assert_eq!(sign(-0.5), -1);
        assert_eq!(sign(0.0), 0);
    }

    #[test]
    fn test_first_bracket_straddles_root() {
        let mut f = ok(|t| t - 0.37);
        let (lo, hi) = first_bracket(&mut f, 0.0, 1.0, 100).unwrap();
        assert!(lo <= 0.37 && 0.37 <= hi);
        assert!((hi - lo - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_first_bracket_picks_first_change() {
        // Roots at pi/2 and 3pi/2; the scan must stop at the first.
        let mut f = ok(|t: f64| t.cos());
        let (lo, hi) = first_bracket(&mut f, 0.0, 2.0 * std::f64::consts::PI, 100).unwrap();
        assert!(lo < std::f64::consts::FRAC_PI_2 && std::f64::consts::FRAC_PI_2 <= hi);
    }

    #[test]
    fn test_first_bracket_none() {
        let mut f = ok(|t| t * t + 1.0);
        let result = first_bracket(&mut f, -1.0, 2.0, 50);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_first_bracket_rejects_nan() {
        let mut f = ok(|t: f64| if t > 0.5 { f64::NAN } else { 1.0 });
        let result = first_bracket(&mut f, 0.0, 1.0, 10);
        assert!(matches!(result, Err(SolverError::NonFinite { .. })));
    }

    #[test]
    fn test_bisect_sqrt2() {
        let mut f = ok(|t| t * t - 2.0);
        let root = bisect(&mut f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        approx::assert_abs_diff_eq!(root.x, 2.0f64.sqrt(), epsilon = 1e-14);
        assert!(root.residual.abs() < 1e-13);
        assert!(root.iterations <= 100);
    }

    #[test]
    fn test_bisect_respects_iteration_cap() {
        let config = SolverConfig {
            max_iterations: 5,
            ..SolverConfig::default()
        };
        let mut f = ok(|t| t - 0.3);
        let root = bisect(&mut f, 0.0, 1.0, &config).unwrap();
        assert_eq!(root.iterations, 5);
        assert!((root.x - 0.3).abs() < 1.0 / 32.0);
    }

    #[test]
    fn test_find_root_rejects_discontinuity() {
        // A jump through zero brackets but never converges to a small residual.
        let mut f = ok(|t| if t < 0.5 { -1.0 } else { 1.0 });
        let result = find_root(&mut f, 0.0, 1.0, 1.0, &SolverConfig::default());
        assert!(matches!(result, Err(SolverError::DidNotConverge { .. })));
    }

    #[test]
    fn test_find_root_with_offset_start() {
        // The scan covers [start, start + span).
        let mut f = ok(|t: f64| (t - 2.2).sin());
        let root = find_root(&mut f, 2.0, 1.0, 1.0, &SolverConfig::default()).unwrap();
        assert!((root.x - 2.2).abs() < 1e-12);
    }

    #[test]
    fn test_warm_start_first_success() {
        let config = SolverConfig::default();
        let t = warm_start(
            |t| if t >= 0.1 { Ok(()) } else { Err(SolverError::NoBracket { start: t, end: t }) },
            &config,
        )
        .unwrap();
        assert!(t >= 0.1 && t < 0.1 + config.warm_start_step);
    }

    #[test]
    fn test_warm_start_exhausted() {
        let config = SolverConfig {
            warm_start_steps: 10,
            ..SolverConfig::default()
        };
        let result: Result<f64, SolverError> =
            warm_start(|t| Err::<(), _>(SolverError::NonFinite { at: t }), &config);
        assert_eq!(result, Err(SolverError::NoWarmStart { steps: 10 }));
    }
}
