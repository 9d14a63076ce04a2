//! Coordinate and format types used across the workspace.

mod merc_bbox;
mod raster_format;
mod tile_coord;
mod tile_scheme;

pub use merc_bbox::MercBBox;
pub use raster_format::RasterFormat;
pub use tile_coord::{MAX_ZOOM, TileCoord};
pub use tile_scheme::TileScheme;
