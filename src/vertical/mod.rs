//! Vertical discretization.
//!
//! Depth layers grow logarithmically from a thin first layer so that the
//! shallow subsurface, where the data resolve the most, gets the finest
//! cells. Below the target depth the layers switch to padding that stretches
//! down to the model bottom.
//!
//! - [`LogLayering`] / [`make_log_increasing_array`]: log-increasing widths
//!   fitted into a target thickness. Also used for air layers.
//! - [`depth_nodes`]: the full vertical node sequence for a [`MeshConfig`].
//!
//! [`MeshConfig`]: crate::mesh::MeshConfig

mod depth;
mod log_layers;

pub use depth::depth_nodes;
pub use log_layers::{
    make_log_increasing_array, LogLayering, LogLayers, DEFAULT_INCREMENT_FACTOR, MAX_ITERATIONS,
};
