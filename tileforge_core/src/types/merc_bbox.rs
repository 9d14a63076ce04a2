//! Projected bounding boxes in spherical Mercator (EPSG:3857) meters.

use crate::{RenderError, TileCoord};
use std::fmt::{self, Debug};

/// Earth radius of the spherical Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the edge length of the square world extent, in meters
/// (`PI * EARTH_RADIUS`).
pub const HALF_WORLD: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// A rectangular area in projected EPSG:3857 meters.
///
/// Invariant: `x_min < x_max` and `y_min < y_max`. The private marker field
/// forces construction through [`MercBBox::new`] or [`MercBBox::from_tile`],
/// so the invariant holds for every value in circulation.
#[derive(Clone, Copy, PartialEq)]
#[allow(clippy::manual_non_exhaustive)]
pub struct MercBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
	checked: (),
}

impl MercBBox {
	/// Creates a new `MercBBox` from `x_min, y_min, x_max, y_max`.
	///
	/// # Errors
	/// Returns [`RenderError::InvalidTileAddress`] if the box is empty or
	/// inverted, or if any coordinate is not finite.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<MercBBox, RenderError> {
		let invalid = |message: String| Err(RenderError::InvalidTileAddress(message));
		if !(x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite()) {
			return invalid("bbox coordinates must be finite".to_string());
		}
		if x_min >= x_max {
			return invalid(format!("x_min ({x_min}) must be < x_max ({x_max})"));
		}
		if y_min >= y_max {
			return invalid(format!("y_min ({y_min}) must be < y_max ({y_max})"));
		}
		Ok(MercBBox {
			x_min,
			y_min,
			x_max,
			y_max,
			checked: (),
		})
	}

	/// Computes the projected bounding box of a tile.
	///
	/// The world extent (`2 * HALF_WORLD` on each axis) is divided into
	/// `2^level` tiles per axis; edges are derived from the tile indices
	/// alone, so the right edge of tile `x` and the left edge of tile
	/// `x + 1` are the same `f64` value, not merely close.
	#[must_use]
	pub fn from_tile(coord: &TileCoord) -> MercBBox {
		let edge = (2.0 * HALF_WORLD) / f64::from(2u32.pow(u32::from(coord.level)));
		MercBBox {
			x_min: f64::from(coord.x) * edge - HALF_WORLD,
			y_min: HALF_WORLD - f64::from(coord.y + 1) * edge,
			x_max: f64::from(coord.x + 1) * edge - HALF_WORLD,
			y_max: HALF_WORLD - f64::from(coord.y) * edge,
			checked: (),
		}
	}

	/// Width of the box in meters.
	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	/// Height of the box in meters.
	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// Returns the box grown by `margin` meters on every side.
	#[must_use]
	pub fn expanded(&self, margin: f64) -> MercBBox {
		MercBBox {
			x_min: self.x_min - margin,
			y_min: self.y_min - margin,
			x_max: self.x_max + margin,
			y_max: self.y_max + margin,
			checked: (),
		}
	}

	/// True if the projected point `(x, y)` lies inside the box
	/// (edges inclusive).
	#[must_use]
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
	}

	/// Returns the box as `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}
}

impl Debug for MercBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!(
			"MercBBox[{}, {}, {}, {}]",
			self.x_min, self.y_min, self.x_max, self.y_max
		))
	}
}
