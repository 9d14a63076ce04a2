//! The immutable map style descriptor.
//!
//! A [`MapStyle`] is built once from the [`StyleConfig`] at startup,
//! validated, and then shared read-only (behind an `Arc`) by every
//! concurrent render. Nothing here is mutated per request; rebuilding the
//! style per tile is exactly the legacy defect this design removes.

use crate::config::{DatasourceConfig, LayerConfig, StyleConfig, SymbolizerConfig};
use std::collections::BTreeMap;
use tileforge_core::RenderError;

/// Spherical Mercator as a proj4 string, the default map projection.
pub const MERCATOR_SRS: &str =
	"+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +no_defs +over";

/// Upper bound for a canvas edge including the buffer margin, in pixels.
pub const MAX_CANVAS_EDGE: u32 = 65_536;

/// A validated, immutable map definition: canvas, projection, style rule
/// sets and layers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
	/// Canvas width in pixels.
	pub width: u32,
	/// Canvas height in pixels.
	pub height: u32,
	/// Map projection as a proj4 string.
	pub projection: String,
	/// Extra margin in pixels rendered beyond the tile edge.
	pub buffer_size: u32,
	styles: BTreeMap<String, StyleDef>,
	layers: Vec<Layer>,
}

/// A named set of rendering rules.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDef {
	pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
	pub symbolizer: Symbolizer,
}

/// How a geometry is painted.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbolizer {
	Point {
		color: [u8; 4],
		size: u32,
		allow_overlap: bool,
	},
}

/// A styled layer bound to a datasource. Owned by its [`MapStyle`] and
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
	pub name: String,
	pub style_names: Vec<String>,
	pub datasource: Datasource,
	/// Coordinate system of the layer's geometries.
	pub srs: String,
}

/// A validated datasource binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Datasource {
	/// A feature table resolved by the built-in in-memory engine.
	Memory { table: String },
	/// A spatial database table; interpreted only by an external engine,
	/// which also owns the connection pool lifecycle.
	Postgis(PostgisParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostgisParams {
	pub dbname: String,
	pub table: String,
	pub geometry_field: String,
	pub srid: u32,
	pub user: Option<String>,
	pub extent: Option<[f64; 4]>,
	pub pool: PoolSize,
}

/// Bounds of a datasource connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize {
	pub initial: u32,
	pub max: u32,
}

impl MapStyle {
	/// Build a `MapStyle` from its configuration.
	///
	/// # Errors
	/// Returns [`RenderError::InvalidStyleDefinition`] if the canvas has a
	/// zero dimension, the buffer margin grows an edge beyond
	/// [`MAX_CANVAS_EDGE`], a layer references an undefined style name or no
	/// style at all, or a datasource misses required parameters. Startup
	/// must abort on this error; the server never serves with a broken
	/// style.
	pub fn from_config(config: &StyleConfig) -> Result<MapStyle, RenderError> {
		let invalid = |message: String| RenderError::InvalidStyleDefinition(message);

		let width = config.width.unwrap_or(256);
		let height = config.height.unwrap_or(256);
		if width == 0 || height == 0 {
			return Err(invalid(format!(
				"canvas dimensions must be positive, got {width}x{height}"
			)));
		}

		let buffer_size = config.buffer_size.unwrap_or(0);
		// the render canvas is grown by the buffer on every side, so the
		// padded dimensions must stay representable
		let padded = |edge: u32| {
			buffer_size
				.checked_mul(2)
				.and_then(|margin| edge.checked_add(margin))
				.filter(|padded| *padded <= MAX_CANVAS_EDGE)
		};
		if padded(width).is_none() || padded(height).is_none() {
			return Err(invalid(format!(
				"buffer_size ({buffer_size}) grows the {width}x{height} canvas beyond {MAX_CANVAS_EDGE} pixels per edge"
			)));
		}

		let projection = config.projection.clone().unwrap_or_else(|| MERCATOR_SRS.to_string());

		let styles: BTreeMap<String, StyleDef> = config
			.styles
			.iter()
			.map(|(name, rules)| {
				let rules = rules
					.iter()
					.map(|rule| Rule {
						symbolizer: match rule.symbolizer {
							SymbolizerConfig::Point {
								color,
								size,
								allow_overlap,
							} => Symbolizer::Point {
								color,
								size,
								allow_overlap,
							},
						},
					})
					.collect();
				(name.clone(), StyleDef { rules })
			})
			.collect();

		let mut layers = Vec::with_capacity(config.layers.len());
		for layer in &config.layers {
			if layer.styles.is_empty() {
				return Err(invalid(format!("layer '{}' references no style", layer.name)));
			}
			for style_name in &layer.styles {
				if !styles.contains_key(style_name) {
					return Err(invalid(format!(
						"layer '{}' references undefined style '{style_name}'",
						layer.name
					)));
				}
			}
			layers.push(Layer {
				name: layer.name.clone(),
				style_names: layer.styles.clone(),
				datasource: Datasource::from_config(layer)?,
				srs: layer.srs.clone().unwrap_or_else(|| projection.clone()),
			});
		}

		Ok(MapStyle {
			width,
			height,
			projection,
			buffer_size,
			styles,
			layers,
		})
	}

	/// The layers of this map, bottom to top. May be empty, which renders
	/// a blank canvas.
	pub fn layers(&self) -> &[Layer] {
		&self.layers
	}

	/// Look up a style rule set by name. Guaranteed to succeed for every
	/// name referenced by a layer of this map.
	pub fn style(&self, name: &str) -> Option<&StyleDef> {
		self.styles.get(name)
	}
}

impl Datasource {
	fn from_config(layer: &LayerConfig) -> Result<Datasource, RenderError> {
		let missing = |parameter: &str| {
			RenderError::InvalidStyleDefinition(format!(
				"datasource of layer '{}' misses required parameter '{parameter}'",
				layer.name
			))
		};

		Ok(match &layer.datasource {
			DatasourceConfig::Memory { table } => Datasource::Memory {
				table: table.clone().ok_or_else(|| missing("table"))?,
			},
			DatasourceConfig::Postgis {
				dbname,
				table,
				geometry_field,
				srid,
				user,
				extent,
				initial_size,
				max_size,
			} => {
				let pool = PoolSize {
					initial: initial_size.unwrap_or(1),
					max: max_size.unwrap_or(10),
				};
				if pool.initial > pool.max {
					return Err(RenderError::InvalidStyleDefinition(format!(
						"datasource of layer '{}' has initial_size ({}) > max_size ({})",
						layer.name, pool.initial, pool.max
					)));
				}
				Datasource::Postgis(PostgisParams {
					dbname: dbname.clone().ok_or_else(|| missing("dbname"))?,
					table: table.clone().ok_or_else(|| missing("table"))?,
					geometry_field: geometry_field.clone().ok_or_else(|| missing("geometry_field"))?,
					srid: srid.ok_or_else(|| missing("srid"))?,
					user: user.clone(),
					extent: *extent,
					pool,
				})
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Config;
	use pretty_assertions::assert_eq;

	fn style_config(text: &str) -> StyleConfig {
		Config::from_string(text).unwrap().style
	}

	const VALID: &str = r#"
style:
  width: 512
  height: 256
  buffer_size: 128
  styles:
    points:
      - symbolizer:
          type: point
  layers:
    - name: world
      styles: [points]
      datasource:
        type: memory
        table: points9
"#;

	#[test]
	fn valid_config_produces_matching_canvas() {
		let style = MapStyle::from_config(&style_config(VALID)).unwrap();
		assert_eq!(style.width, 512);
		assert_eq!(style.height, 256);
		assert_eq!(style.buffer_size, 128);
		assert_eq!(style.projection, MERCATOR_SRS);
		assert_eq!(style.layers().len(), 1);
		assert_eq!(style.layers()[0].srs, MERCATOR_SRS);
		assert!(style.style("points").is_some());
	}

	#[test]
	fn defaults_to_blank_256_canvas() {
		let style = MapStyle::from_config(&StyleConfig::default()).unwrap();
		assert_eq!((style.width, style.height), (256, 256));
		assert_eq!(style.buffer_size, 0);
		assert!(style.layers().is_empty());
	}

	#[test]
	fn undefined_style_name_fails() {
		let cfg = style_config(
			r#"
style:
  layers:
    - name: world
      styles: [missing]
      datasource:
        type: memory
        table: points9
"#,
		);
		let err = MapStyle::from_config(&cfg).unwrap_err();
		assert!(matches!(err, RenderError::InvalidStyleDefinition(_)));
		assert!(err.to_string().contains("undefined style 'missing'"));
	}

	#[test]
	fn layer_without_styles_fails() {
		let cfg = style_config(
			r#"
style:
  layers:
    - name: world
      datasource:
        type: memory
        table: points9
"#,
		);
		assert!(matches!(
			MapStyle::from_config(&cfg),
			Err(RenderError::InvalidStyleDefinition(_))
		));
	}

	#[test]
	fn zero_canvas_fails() {
		let cfg = style_config("style:\n  width: 0");
		assert!(matches!(
			MapStyle::from_config(&cfg),
			Err(RenderError::InvalidStyleDefinition(_))
		));
	}

	#[test]
	fn oversized_buffer_fails_at_build_time() {
		// 2 * buffer alone overflows u32
		let cfg = style_config("style:\n  buffer_size: 3000000000");
		let err = MapStyle::from_config(&cfg).unwrap_err();
		assert!(matches!(err, RenderError::InvalidStyleDefinition(_)));
		assert!(err.to_string().contains("buffer_size"));

		// width + 2 * buffer exceeds the canvas bound without overflowing
		let cfg = style_config("style:\n  width: 256\n  buffer_size: 40000");
		assert!(matches!(
			MapStyle::from_config(&cfg),
			Err(RenderError::InvalidStyleDefinition(_))
		));

		// the largest buffer below the bound still builds
		let cfg = style_config("style:\n  buffer_size: 32640");
		assert_eq!(MapStyle::from_config(&cfg).unwrap().buffer_size, 32_640);
	}

	#[test]
	fn postgis_missing_parameters_fail() {
		let cfg = style_config(
			r#"
style:
  styles:
    s:
      - symbolizer:
          type: point
  layers:
    - name: world
      styles: [s]
      datasource:
        type: postgis
        dbname: tiledb
        table: points9
"#,
		);
		let err = MapStyle::from_config(&cfg).unwrap_err();
		assert!(err.to_string().contains("geometry_field"));
	}

	#[test]
	fn postgis_full_parameters_build() {
		let cfg = style_config(
			r#"
style:
  styles:
    s:
      - symbolizer:
          type: point
  layers:
    - name: world
      styles: [s]
      datasource:
        type: postgis
        dbname: tiledb
        table: points9
        geometry_field: the_geom
        srid: 900913
        user: postgres
        initial_size: 1
        max_size: 1
"#,
		);
		let style = MapStyle::from_config(&cfg).unwrap();
		match &style.layers()[0].datasource {
			Datasource::Postgis(params) => {
				assert_eq!(params.table, "points9");
				assert_eq!(params.srid, 900_913);
				assert_eq!(params.pool, PoolSize { initial: 1, max: 1 });
			}
			Datasource::Memory { .. } => panic!("expected a postgis datasource"),
		}
	}

	#[test]
	fn inverted_pool_bounds_fail() {
		let cfg = style_config(
			r#"
style:
  styles:
    s:
      - symbolizer:
          type: point
  layers:
    - name: world
      styles: [s]
      datasource:
        type: postgis
        dbname: tiledb
        table: points9
        geometry_field: the_geom
        srid: 900913
        initial_size: 5
        max_size: 2
"#,
		);
		let err = MapStyle::from_config(&cfg).unwrap_err();
		assert!(err.to_string().contains("initial_size"));
	}
}
