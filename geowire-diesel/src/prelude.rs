//! Convenience re-exports for geowire-diesel.
//!
//! ```rust,ignore
//! use geowire_diesel::prelude::*;
//! ```

pub use crate::types::{Geography, Geometry, GEOGRAPHY_SRID};
pub use geowire_core::{ByteOrder, Shape};
