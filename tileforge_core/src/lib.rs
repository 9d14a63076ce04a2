//! Leaf types for the tileforge tile server.
//!
//! Contains tile coordinates, Mercator bounding boxes, tile-row schemes,
//! raster formats and the render error taxonomy. This crate is pure and
//! synchronous: no I/O, no async, no server code.

pub mod error;
pub mod types;

pub use error::RenderError;
pub use types::{MercBBox, RasterFormat, TileCoord, TileScheme};
