//! Target raster formats for encoded tiles.

use serde::Deserialize;
use std::fmt::{self, Display};

/// Encoding of a rendered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
	#[default]
	Png,
	Jpeg,
}

impl RasterFormat {
	/// The canonical file extension, without the dot.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			RasterFormat::Png => "png",
			RasterFormat::Jpeg => "jpeg",
		}
	}

	/// The MIME type sent as `Content-Type`.
	#[must_use]
	pub fn mime(&self) -> &'static str {
		match self {
			RasterFormat::Png => "image/png",
			RasterFormat::Jpeg => "image/jpeg",
		}
	}
}

impl Display for RasterFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
