//! YAML configuration for the server, the map style and the built-in
//! feature tables.
//!
//! Configuration is read once at startup; command line arguments override
//! individual server settings afterwards. Everything here is plain data —
//! validation with meaning (style name resolution, datasource parameters)
//! happens when the [`MapStyle`](crate::style::MapStyle) is built.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	collections::BTreeMap,
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tileforge_core::{RasterFormat, TileScheme};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// Map style: canvas, projection, styles and layers
	#[serde(default)]
	pub style: StyleConfig,

	/// In-memory feature tables for the built-in engine, keyed by table
	/// name. Each feature is a point `[x, y]` in EPSG:3857 meters.
	#[serde(default)]
	pub features: BTreeMap<String, Vec<[f64; 2]>>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config file {path:?}"))?;
		Config::from_reader(BufReader::new(file)).with_context(|| format!("parsing config file {path:?}"))
	}
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// IP to bind to. Default: 0.0.0.0
	pub ip: Option<String>,

	/// TCP port to bind to.
	pub port: Option<u16>,

	/// Row ordering of inbound tile addresses ("xyz" or "tms").
	/// Default: xyz
	pub scheme: Option<TileScheme>,

	/// Highest zoom level the server accepts. Default: 22
	pub max_zoom: Option<u8>,

	/// Raster format of rendered tiles ("png" or "jpeg"). Default: png
	pub format: Option<RasterFormat>,
}

impl ServerConfig {
	pub fn override_optional_ip(&mut self, ip: &Option<String>) {
		if ip.is_some() {
			self.ip = ip.clone();
		}
	}
	pub fn override_optional_port(&mut self, port: &Option<u16>) {
		if port.is_some() {
			self.port = *port;
		}
	}
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
	/// Canvas width in pixels. Default: 256
	pub width: Option<u32>,

	/// Canvas height in pixels. Default: 256
	pub height: Option<u32>,

	/// Projection of the map as a proj4 string.
	/// Default: spherical Mercator
	pub projection: Option<String>,

	/// Extra margin in pixels rendered beyond the tile edge, so symbols
	/// crossing tile boundaries are not clipped. Default: 0
	pub buffer_size: Option<u32>,

	/// Named style rule sets referenced by layers.
	#[serde(default)]
	pub styles: BTreeMap<String, Vec<RuleConfig>>,

	/// Ordered list of layers, drawn bottom to top.
	#[serde(default)]
	pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
	pub symbolizer: SymbolizerConfig,
}

/// A rendering rule for a geometry type. Only point markers are understood
/// by the built-in engine; an external engine may interpret more.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum SymbolizerConfig {
	Point {
		/// Marker color as RGBA.
		#[serde(default = "default_color")]
		color: [u8; 4],
		/// Marker edge length in pixels.
		#[serde(default = "default_marker_size")]
		size: u32,
		/// Whether overlapping markers are all drawn.
		#[serde(default = "default_true")]
		allow_overlap: bool,
	},
}

fn default_color() -> [u8; 4] {
	[0, 0, 0, 255]
}

fn default_marker_size() -> u32 {
	4
}

fn default_true() -> bool {
	true
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
	/// Layer name, unique within the style.
	pub name: String,

	/// Names of the style rule sets applied to this layer.
	#[serde(default)]
	pub styles: Vec<String>,

	/// Coordinate system of the layer's geometries as a proj4 string.
	/// Defaults to the map projection.
	pub srs: Option<String>,

	/// Where the layer's features come from.
	pub datasource: DatasourceConfig,
}

/// Datasource connection parameters.
///
/// Required parameters are optional here so that their absence surfaces as
/// an `InvalidStyleDefinition` when the style is built, not as a YAML
/// parsing error.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum DatasourceConfig {
	/// A feature table resolved by the built-in in-memory engine.
	Memory { table: Option<String> },

	/// A spatial database table, interpreted by an external engine.
	Postgis {
		dbname: Option<String>,
		table: Option<String>,
		geometry_field: Option<String>,
		srid: Option<u32>,
		user: Option<String>,
		/// Maximum extent of the table as `[x_min, y_min, x_max, y_max]`.
		extent: Option<[f64; 4]>,
		/// Connections opened when the style is built.
		initial_size: Option<u32>,
		/// Upper bound of the connection pool.
		max_size: Option<u32>,
	},
}
