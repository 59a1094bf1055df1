//! Depth node widths for the vertical axis.
//!
//! The vertical axis has `n_layers - pad_z` core layers, log-increasing
//! from `z1_layer` and rounded to two significant figures, followed by
//! `pad_z - 1` padding layers that reach down to `z_bottom`.

use log::{debug, warn};

use super::log_layers::{LogLayering, DEFAULT_INCREMENT_FACTOR};
use crate::error::{MeshError, Result};
use crate::mesh::MeshConfig;
use crate::numeric::{logspace_between, round_significant};
use crate::padding::{offsets_to_widths, padding_cells};

/// Depth node widths (positive down, top layer first).
///
/// ```
/// use modem_mesh::mesh::MeshConfig;
/// use modem_mesh::vertical::depth_nodes;
///
/// let config = MeshConfig::default();
/// let nodes = depth_nodes(&config).unwrap();
/// assert_eq!(nodes.len(), config.n_layers - 1);
/// assert_eq!(nodes[0], 10.0);
/// ```
pub fn depth_nodes(config: &MeshConfig) -> Result<Vec<f64>> {
    config.validate()?;

    let n_core = config.n_layers - config.pad_z;
    let z1 = config.z1_layer;

    // The core target leaves room for the last log-spaced layer
    let aux = logspace_between(z1, config.z_target_depth, config.n_layers);
    let core_target = config.z_target_depth - aux[config.n_layers - 2];
    if core_target <= z1 {
        return Err(MeshError::config(format!(
            "z_target_depth {} is too shallow for {} layers starting at {} m",
            config.z_target_depth, config.n_layers, z1
        )));
    }

    let layers = LogLayering::new(z1, core_target, n_core)
        .with_increment_factor(DEFAULT_INCREMENT_FACTOR)
        .compute()?;
    if !layers.converged {
        warn!("core layer widths exceed their target depth {} m", core_target);
    }

    let mut nodes: Vec<f64> = layers
        .widths
        .iter()
        .map(|&z| round_significant(z, 2))
        .collect();

    let last = nodes.last().copied().unwrap_or(z1);
    let core_depth: f64 = nodes.iter().sum();
    let remaining = config.z_bottom - core_depth;
    if remaining <= 0.0 {
        return Err(MeshError::config(format!(
            "z_bottom {} lies above the core layers ({} m)",
            config.z_bottom, core_depth
        )));
    }

    let offsets = padding_cells(last, remaining, config.pad_z, config.pad_stretch_v)?;
    nodes.extend(offsets_to_widths(&offsets));

    debug!(
        "depth axis: {} core layers to {:.1} m, {} padding layers to {:.1} m",
        n_core,
        core_depth,
        config.pad_z - 1,
        nodes.iter().sum::<f64>()
    );

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth_nodes() {
        let config = MeshConfig::default();
        let nodes = depth_nodes(&config).unwrap();

        assert_eq!(nodes.len(), 29);
        assert_eq!(nodes[0], 10.0);
        assert!(nodes.iter().all(|&dz| dz > 0.0));

        // Core layers grow and carry two significant figures
        for &dz in &nodes[..26] {
            assert_eq!(dz, round_significant(dz, 2));
        }
        assert!(nodes[..26].windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_padding_layers_extend_below_core() {
        let config = MeshConfig::default();
        let nodes = depth_nodes(&config).unwrap();
        let core: f64 = nodes[..26].iter().sum();
        let total: f64 = nodes.iter().sum();
        assert!(core < config.z_target_depth);
        assert!(total > core);
    }

    #[test]
    fn test_invalid_layering_is_configuration_error() {
        let config = MeshConfig::default().with_vertical(10.0, 50_000.0, 300_000.0, 3, 4);
        assert!(matches!(depth_nodes(&config), Err(MeshError::Configuration(_))));
    }
}
