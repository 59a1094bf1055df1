//! Small shared types.
//!
//! - [`Axis`]: selects the north, east or depth axis of a grid
//! - [`Extent2D`]: horizontal bounding box of stations or grid lines
//!
//! ```
//! use modem_mesh::types::{Axis, Extent2D};
//!
//! assert_eq!(Axis::Depth.index(), 2);
//! assert!(Axis::East.is_horizontal());
//!
//! let extent = Extent2D::new(-1000.0, 1000.0, -500.0, 500.0);
//! assert_eq!(extent.center(), (0.0, 0.0));
//! ```

mod axis;
mod extent;

pub use axis::Axis;
pub use extent::Extent2D;
