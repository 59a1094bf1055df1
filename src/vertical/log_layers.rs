//! Log-increasing layer widths.
//!
//! Both the core of the depth grid and the air layers above topography use
//! widths that grow on a log10 scale from a fixed first layer. The widths must
//! fit inside a target thickness, so the largest width is shrunk
//! geometrically until they do.
//!
//! # Example
//!
//! ```
//! use modem_mesh::vertical::LogLayering;
//!
//! let layers = LogLayering::new(10.0, 5_000.0, 20).compute().unwrap();
//! assert!(layers.converged);
//! assert_eq!(layers.widths.len(), 20);
//! assert!(layers.total() <= 5_000.0);
//! ```

use log::warn;

use crate::error::{MeshError, Result};
use crate::numeric::logspace_between;

/// Shrink factor applied to the largest width per attempt.
pub const DEFAULT_INCREMENT_FACTOR: f64 = 0.9;

/// Attempt ceiling before giving up.
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Result of a log-increasing layering derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct LogLayers {
    /// Layer widths, first one equal to the requested first layer.
    pub widths: Vec<f64>,
    /// Number of times the largest width was shrunk.
    pub iterations: usize,
    /// False when the attempt ceiling was hit with the sum still too large.
    pub converged: bool,
}

impl LogLayers {
    /// Sum of all widths.
    pub fn total(&self) -> f64 {
        self.widths.iter().sum()
    }

    /// Largest (last) width.
    pub fn last(&self) -> f64 {
        self.widths.last().copied().unwrap_or(0.0)
    }
}

/// Parameters of a log-increasing layering.
///
/// ```
/// use modem_mesh::vertical::LogLayering;
///
/// // Air layers shrink very gently
/// let air = LogLayering::new(10.0, 1_200.0, 6)
///     .with_increment_factor(0.999)
///     .compute()
///     .unwrap();
/// assert!(air.total() <= 1_200.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LogLayering {
    first_layer: f64,
    target_depth: f64,
    n_layers: usize,
    increment_factor: f64,
    max_iterations: usize,
}

impl LogLayering {
    /// Layering of `n_layers` widths starting at `first_layer` whose sum
    /// must not exceed `target_depth`.
    pub fn new(first_layer: f64, target_depth: f64, n_layers: usize) -> Self {
        Self {
            first_layer,
            target_depth,
            n_layers,
            increment_factor: DEFAULT_INCREMENT_FACTOR,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Set the shrink factor (strictly between 0 and 1).
    pub fn with_increment_factor(mut self, factor: f64) -> Self {
        self.increment_factor = factor;
        self
    }

    /// Set the attempt ceiling.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.first_layer.is_finite() && self.first_layer > 0.0) {
            return Err(MeshError::config(format!(
                "first layer thickness must be positive, got {}",
                self.first_layer
            )));
        }
        if !(self.target_depth.is_finite() && self.target_depth > 0.0) {
            return Err(MeshError::config(format!(
                "target depth must be positive, got {}",
                self.target_depth
            )));
        }
        if self.n_layers == 0 {
            return Err(MeshError::config("layering needs at least one layer"));
        }
        if !(self.increment_factor > 0.0 && self.increment_factor < 1.0) {
            return Err(MeshError::config(format!(
                "increment factor must lie in (0, 1), got {}",
                self.increment_factor
            )));
        }
        Ok(())
    }

    /// Derive the widths.
    ///
    /// Hitting the attempt ceiling is not an error: the last attempt is
    /// returned with `converged == false` and a warning is logged.
    pub fn compute(&self) -> Result<LogLayers> {
        self.validate()?;

        let mut max_width = self.target_depth;
        let mut widths = logspace_between(self.first_layer, max_width, self.n_layers);
        let mut iterations = 0;
        let mut converged = true;

        while widths.iter().sum::<f64>() > self.target_depth {
            if iterations >= self.max_iterations {
                converged = false;
                break;
            }
            max_width *= self.increment_factor;
            widths = logspace_between(self.first_layer, max_width, self.n_layers);
            iterations += 1;
        }

        if !converged {
            warn!(
                "log layering did not fit {} layers from {} m into {} m after {} attempts",
                self.n_layers, self.first_layer, self.target_depth, iterations
            );
        }

        Ok(LogLayers {
            widths,
            iterations,
            converged,
        })
    }
}

/// Log-increasing widths from `first_layer`, summing to at most
/// `target_depth`.
pub fn make_log_increasing_array(
    first_layer: f64,
    target_depth: f64,
    n_layers: usize,
    increment_factor: f64,
) -> Result<LogLayers> {
    LogLayering::new(first_layer, target_depth, n_layers)
        .with_increment_factor(increment_factor)
        .compute()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_widths_fit_target() {
        let layers = make_log_increasing_array(10.0, 50_000.0, 26, 0.9).unwrap();
        assert!(layers.converged);
        assert_eq!(layers.widths.len(), 26);
        assert!((layers.widths[0] - 10.0).abs() < TOL);
        assert!(layers.total() <= 50_000.0);
        assert!(layers.iterations > 0);
        assert!(layers.widths.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_no_shrink_when_already_fitting() {
        // A single layer below the target fits immediately
        let layers = make_log_increasing_array(10.0, 11.0, 1, 0.9).unwrap();
        assert!(layers.converged);
        assert_eq!(layers.iterations, 0);
        assert_eq!(layers.widths.len(), 1);
    }

    #[test]
    fn test_ceiling_reports_non_convergence() {
        // Ten shrinks leave the largest width near 17 m, far too wide
        let layers = LogLayering::new(10.0, 50.0, 20)
            .with_max_iterations(10)
            .compute()
            .unwrap();
        assert!(!layers.converged);
        assert_eq!(layers.iterations, 10);
        assert_eq!(layers.widths.len(), 20);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(make_log_increasing_array(0.0, 100.0, 5, 0.9).is_err());
        assert!(make_log_increasing_array(10.0, -1.0, 5, 0.9).is_err());
        assert!(make_log_increasing_array(10.0, 100.0, 0, 0.9).is_err());
        assert!(make_log_increasing_array(10.0, 100.0, 5, 1.0).is_err());
    }
}
