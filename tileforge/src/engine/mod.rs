//! The render engine seam.
//!
//! The dispatcher talks to a renderer only through [`RenderEngine`], so the
//! actual rasterizer can be swapped: the built-in [`MemoryEngine`] paints
//! point markers from in-memory feature tables, while a production
//! deployment can plug in a foreign-function binding to a native renderer
//! behind the same trait.

mod memory;

pub use memory::MemoryEngine;

use crate::style::MapStyle;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use tileforge_core::{MercBBox, RasterFormat, RenderError};

/// The result of one render: encoded raster bytes plus whether any feature
/// was actually drawn ("painted"). A blank canvas is a valid result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTile {
	pub blob: Bytes,
	pub format: RasterFormat,
	pub painted: bool,
}

/// An asynchronous single-shot rasterizer.
///
/// Contract: `render` must not block the calling thread, must not mutate
/// `style`, and must keep any mutable rendering state (canvas, symbolizer
/// context) private to the invocation, so arbitrarily many renders may run
/// concurrently against one shared `MapStyle`.
#[async_trait]
pub trait RenderEngine: Send + Sync + Debug {
	/// Render the area `bbox` of the map described by `style` and encode
	/// the raster as `format`.
	async fn render(&self, style: &MapStyle, bbox: MercBBox, format: RasterFormat)
	-> Result<RenderedTile, RenderError>;
}
