//! Tile-row ordering conventions.
//!
//! Tile pyramids disagree on whether row 0 is the northernmost (XYZ, used
//! by most web maps) or the southernmost (TMS) row. The scheme is part of
//! the server configuration and applied once per request when the inbound
//! address is normalized; all internal code uses XYZ.

use crate::TileCoord;
use serde::Deserialize;

/// Row-ordering convention of inbound tile addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileScheme {
	/// y = 0 is the northernmost row (slippy map default).
	#[default]
	Xyz,
	/// y = 0 is the southernmost row.
	Tms,
}

impl TileScheme {
	/// Map an inbound coordinate into the internal XYZ convention.
	#[must_use]
	pub fn normalize(&self, coord: TileCoord) -> TileCoord {
		match self {
			TileScheme::Xyz => coord,
			TileScheme::Tms => coord.flipped_y(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn xyz_is_identity() {
		let coord = TileCoord::new(4, 3, 5).unwrap();
		assert_eq!(TileScheme::Xyz.normalize(coord), coord);
	}

	#[test]
	fn tms_flips_the_row() {
		let coord = TileCoord::new(4, 3, 5).unwrap();
		assert_eq!(TileScheme::Tms.normalize(coord), TileCoord::new(4, 3, 10).unwrap());
	}

	#[test]
	fn deserialize_from_lowercase() {
		let scheme: TileScheme = deserialize_str("tms");
		assert_eq!(scheme, TileScheme::Tms);
		let scheme: TileScheme = deserialize_str("xyz");
		assert_eq!(scheme, TileScheme::Xyz);
	}

	fn deserialize_str(text: &str) -> TileScheme {
		serde::Deserialize::deserialize(serde::de::value::StrDeserializer::<serde::de::value::Error>::new(text))
			.unwrap()
	}
}
