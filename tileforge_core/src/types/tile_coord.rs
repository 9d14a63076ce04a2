//! Tile coordinates in a Web Mercator tile pyramid.
//!
//! A [`TileCoord`] can only be constructed through its validating
//! constructor, so holding one is proof that the address lies inside the
//! pyramid for its zoom level.
//!
//! # Examples
//!
//! ```
//! use tileforge_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 6, 7).unwrap();
//! assert_eq!(coord.level, 5);
//! assert_eq!(coord.x, 6);
//! assert_eq!(coord.y, 7);
//!
//! // x = 2^z is the first invalid column
//! assert!(TileCoord::new(3, 8, 0).is_err());
//! ```

use crate::{MercBBox, RenderError};
use std::fmt::{self, Debug};

/// Highest zoom level the render pipeline supports.
pub const MAX_ZOOM: u8 = 22;

/// A tile address `(z, x, y)` in the internal XYZ convention
/// (y = 0 is the northernmost row).
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The column index of the tile.
	pub x: u32,
	/// The row index of the tile.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at zoom `level` with tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns [`RenderError::InvalidTileAddress`] if `level` exceeds
	/// [`MAX_ZOOM`] or if `x` or `y` is not smaller than `2^level`.
	/// Out-of-range indices are rejected, never clamped.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord, RenderError> {
		if level > MAX_ZOOM {
			return Err(RenderError::InvalidTileAddress(format!(
				"level ({level}) must be <= {MAX_ZOOM}"
			)));
		}
		let max = 2u32.pow(u32::from(level));
		if x >= max {
			return Err(RenderError::InvalidTileAddress(format!(
				"x ({x}) out of bounds for level {level}"
			)));
		}
		if y >= max {
			return Err(RenderError::InvalidTileAddress(format!(
				"y ({y}) out of bounds for level {level}"
			)));
		}
		Ok(TileCoord { level, x, y })
	}

	/// Get the maximum valid x or y index for this tile's zoom level,
	/// i.e. `2^level - 1`.
	#[must_use]
	pub fn max_value(&self) -> u32 {
		(1u32 << self.level) - 1
	}

	/// Return the coordinate with its row index mirrored vertically,
	/// converting between TMS (y up) and XYZ (y down) row ordering.
	#[must_use]
	pub fn flipped_y(&self) -> TileCoord {
		TileCoord {
			level: self.level,
			x: self.x,
			y: self.max_value() - self.y,
		}
	}

	/// Return the projected bounding box of this tile in EPSG:3857 meters.
	#[must_use]
	pub fn to_merc_bbox(&self) -> MercBBox {
		MercBBox::from_tile(self)
	}

	/// Serialize this coordinate to a compact JSON string `{"z":…,"x":…,"y":…}`.
	#[must_use]
	pub fn as_json(&self) -> String {
		format!("{{\"z\":{},\"x\":{},\"y\":{}}}", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}/{}/{})", self.level, self.x, self.y))
	}
}
