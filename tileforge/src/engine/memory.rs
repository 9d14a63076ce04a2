//! A self-contained render engine over in-memory feature tables.
//!
//! This is the engine the server ships with: enough to serve real tiles
//! and to exercise the whole pipeline in tests without a native renderer.
//! It resolves `memory` datasources against feature tables registered at
//! startup and paints point symbolizers onto an RGBA canvas.

use super::{RenderEngine, RenderedTile};
use crate::style::{Datasource, MapStyle, Symbolizer};
use async_trait::async_trait;
use bytes::Bytes;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage, codecs};
use std::collections::BTreeMap;
use tileforge_core::{MercBBox, RasterFormat, RenderError};

/// Feature tables keyed by name; each feature is a point `[x, y]` in
/// EPSG:3857 meters. Tables are registered once and never mutated, so the
/// engine is freely shared across concurrent renders.
#[derive(Debug, Default)]
pub struct MemoryEngine {
	tables: BTreeMap<String, Vec<[f64; 2]>>,
}

impl MemoryEngine {
	#[must_use]
	pub fn new() -> MemoryEngine {
		MemoryEngine::default()
	}

	#[must_use]
	pub fn from_tables(tables: BTreeMap<String, Vec<[f64; 2]>>) -> MemoryEngine {
		MemoryEngine { tables }
	}

	pub fn insert_table(&mut self, name: &str, points: Vec<[f64; 2]>) {
		self.tables.insert(name.to_string(), points);
	}

	fn points_of(&self, layer_name: &str, datasource: &Datasource) -> Result<&[[f64; 2]], RenderError> {
		match datasource {
			Datasource::Memory { table } => self
				.tables
				.get(table)
				.map(Vec::as_slice)
				.ok_or_else(|| RenderError::EngineFailure(format!("unknown feature table '{table}'"))),
			Datasource::Postgis(_) => Err(RenderError::EngineFailure(format!(
				"layer '{layer_name}' uses a postgis datasource, which the in-memory engine cannot resolve"
			))),
		}
	}
}

#[async_trait]
impl RenderEngine for MemoryEngine {
	async fn render(
		&self,
		style: &MapStyle,
		bbox: MercBBox,
		format: RasterFormat,
	) -> Result<RenderedTile, RenderError> {
		// The canvas is grown by the buffer margin on every side and
		// cropped back after painting, so markers centered just outside
		// the tile still contribute their overlapping pixels.
		let buffer = style.buffer_size;
		let full_width = style.width + 2 * buffer;
		let full_height = style.height + 2 * buffer;
		let units_per_px = bbox.width() / f64::from(style.width);
		let paint_bbox = bbox.expanded(f64::from(buffer) * units_per_px);

		let mut canvas = RgbaImage::from_pixel(full_width, full_height, Rgba([0, 0, 0, 0]));
		let mut painted = false;

		for layer in style.layers() {
			let points = self.points_of(&layer.name, &layer.datasource)?;
			for style_name in &layer.style_names {
				let def = style.style(style_name).ok_or_else(|| {
					RenderError::EngineFailure(format!("style '{style_name}' disappeared from the map definition"))
				})?;
				for rule in &def.rules {
					painted |= paint_rule(&mut canvas, &paint_bbox, points, &rule.symbolizer);
				}
			}
		}

		let tile = if buffer > 0 {
			image::imageops::crop_imm(&canvas, buffer, buffer, style.width, style.height).to_image()
		} else {
			canvas
		};

		Ok(RenderedTile {
			blob: encode(&tile, format)?,
			format,
			painted,
		})
	}
}

/// Paint one rule over all features; returns true if any pixel was set.
fn paint_rule(canvas: &mut RgbaImage, paint_bbox: &MercBBox, points: &[[f64; 2]], symbolizer: &Symbolizer) -> bool {
	let Symbolizer::Point {
		color,
		size,
		allow_overlap,
	} = symbolizer;

	let mut painted = false;
	let mut occupied: Vec<[i64; 4]> = Vec::new();

	for &[px, py] in points {
		if !paint_bbox.contains(px, py) {
			continue;
		}
		let fx = (px - paint_bbox.x_min) / paint_bbox.width() * f64::from(canvas.width());
		let fy = (paint_bbox.y_max - py) / paint_bbox.height() * f64::from(canvas.height());
		let half = i64::from(*size) / 2;
		let rect = [
			fx as i64 - half,
			fy as i64 - half,
			fx as i64 + i64::from(*size) - half,
			fy as i64 + i64::from(*size) - half,
		];

		if !allow_overlap && occupied.iter().any(|other| rects_overlap(&rect, other)) {
			continue;
		}

		painted |= fill_rect(canvas, &rect, Rgba(*color));
		if !allow_overlap {
			occupied.push(rect);
		}
	}
	painted
}

fn rects_overlap(a: &[i64; 4], b: &[i64; 4]) -> bool {
	a[0] < b[2] && b[0] < a[2] && a[1] < b[3] && b[1] < a[3]
}

/// Fill the part of `rect` that intersects the canvas; returns true if any
/// pixel was set.
fn fill_rect(canvas: &mut RgbaImage, rect: &[i64; 4], color: Rgba<u8>) -> bool {
	let x0 = rect[0].max(0);
	let y0 = rect[1].max(0);
	let x1 = rect[2].min(i64::from(canvas.width()));
	let y1 = rect[3].min(i64::from(canvas.height()));
	if x0 >= x1 || y0 >= y1 {
		return false;
	}
	for y in y0..y1 {
		for x in x0..x1 {
			canvas.put_pixel(x as u32, y as u32, color);
		}
	}
	true
}

fn encode(image: &RgbaImage, format: RasterFormat) -> Result<Bytes, RenderError> {
	let failure = |message: String| RenderError::EncodingFailure {
		format: format.as_str().to_string(),
		message,
	};

	let mut buffer: Vec<u8> = Vec::new();
	match format {
		RasterFormat::Png => {
			codecs::png::PngEncoder::new(&mut buffer)
				.write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
				.map_err(|e| failure(e.to_string()))?;
		}
		RasterFormat::Jpeg => {
			// jpeg has no alpha channel
			let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
			codecs::jpeg::JpegEncoder::new(&mut buffer)
				.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
				.map_err(|e| failure(e.to_string()))?;
		}
	}
	Ok(Bytes::from(buffer))
}
