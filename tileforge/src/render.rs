//! The render request dispatcher.
//!
//! One dispatcher serves the whole process: it holds the shared immutable
//! [`MapStyle`] and the [`RenderEngine`], resolves tile addresses to
//! projected bounding boxes and awaits the engine. Each render is a
//! single-shot request/response; there is no session, no retry and no
//! shared mutable state, so any number of renders may be in flight at
//! once. Completion order follows the engine, not submission order.

use crate::{
	engine::{RenderEngine, RenderedTile},
	style::MapStyle,
};
use std::sync::Arc;
use tileforge_core::{RasterFormat, RenderError, TileCoord, TileScheme, types::MAX_ZOOM};
use tokio::sync::oneshot;

pub struct RenderDispatcher {
	style: Arc<MapStyle>,
	engine: Arc<dyn RenderEngine>,
	scheme: TileScheme,
	format: RasterFormat,
	max_zoom: u8,
}

impl RenderDispatcher {
	/// Create a dispatcher with the default XYZ scheme, PNG output and the
	/// full supported zoom range.
	pub fn new(style: Arc<MapStyle>, engine: Arc<dyn RenderEngine>) -> RenderDispatcher {
		RenderDispatcher {
			style,
			engine,
			scheme: TileScheme::default(),
			format: RasterFormat::default(),
			max_zoom: MAX_ZOOM,
		}
	}

	/// Set the row ordering of inbound tile addresses.
	#[must_use]
	pub fn with_scheme(mut self, scheme: TileScheme) -> RenderDispatcher {
		self.scheme = scheme;
		self
	}

	/// Set the raster format of rendered tiles.
	#[must_use]
	pub fn with_format(mut self, format: RasterFormat) -> RenderDispatcher {
		self.format = format;
		self
	}

	/// Lower the accepted zoom range below the supported maximum.
	#[must_use]
	pub fn with_max_zoom(mut self, max_zoom: u8) -> RenderDispatcher {
		self.max_zoom = max_zoom.min(MAX_ZOOM);
		self
	}

	/// The shared map style this dispatcher renders.
	pub fn style(&self) -> &Arc<MapStyle> {
		&self.style
	}

	/// Render one tile.
	///
	/// The coordinate is validated against the configured zoom range
	/// before any engine call, normalized per the configured scheme and
	/// resolved to its Mercator bounding box; the engine then rasterizes
	/// and encodes it. The call suspends, it never blocks the executor.
	pub async fn render(&self, coord: TileCoord) -> Result<RenderedTile, RenderError> {
		if coord.level > self.max_zoom {
			return Err(RenderError::InvalidTileAddress(format!(
				"level ({}) exceeds the configured maximum ({})",
				coord.level, self.max_zoom
			)));
		}
		let coord = self.scheme.normalize(coord);
		let bbox = coord.to_merc_bbox();
		log::debug!("render {coord:?} -> {bbox:?}");

		self.engine.render(&self.style, bbox, self.format).await
	}

	/// Render one tile, giving up as soon as `cancel` resolves (its sender
	/// fired or was dropped). A cancelled render returns
	/// [`RenderError::Cancelled`] and leaves no orphaned work behind: the
	/// engine future is dropped at this boundary.
	pub async fn render_cancellable(
		&self,
		coord: TileCoord,
		mut cancel: oneshot::Receiver<()>,
	) -> Result<RenderedTile, RenderError> {
		tokio::select! {
			result = self.render(coord) => result,
			_ = &mut cancel => {
				log::debug!("render {coord:?} cancelled");
				Err(RenderError::Cancelled)
			}
		}
	}
}

impl std::fmt::Debug for RenderDispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RenderDispatcher")
			.field("scheme", &self.scheme)
			.field("format", &self.format)
			.field("max_zoom", &self.max_zoom)
			.finish_non_exhaustive()
	}
}
