//! HTTP handlers and small response helpers for the tile server.
//!
//! Two routes expose the same render operation: the legacy query-parameter
//! form (`/tile?x=&y=&z=`) and the path form (`/tiles/{z}/{x}/{y}`).
//! Missing or malformed parameters yield a structured 400, not the legacy
//! 200 "no x,y,z provided"; engine failures yield a 500 with the engine's
//! message.

use crate::{engine::RenderedTile, render::RenderDispatcher};
use axum::{
	body::Body,
	extract::{Path, Query, State},
	http::header,
	response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tileforge_core::{RenderError, TileCoord, types::MAX_ZOOM};

/// Raw query parameters of a tile request. Kept as strings so malformed
/// values produce our structured error instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct TileQuery {
	pub x: Option<String>,
	pub y: Option<String>,
	pub z: Option<String>,
}

/// `GET /tile?x=&y=&z=`
pub async fn serve_tile_query(
	State(dispatcher): State<Arc<RenderDispatcher>>,
	Query(query): Query<TileQuery>,
) -> Response<Body> {
	let (Some(x), Some(y), Some(z)) = (query.x, query.y, query.z) else {
		return error_400("missing required query parameters 'x', 'y' and 'z'");
	};
	render_tile(&dispatcher, &z, &x, &y).await
}

/// `GET /tiles/{z}/{x}/{y}` — an optional file extension on `y` is ignored.
pub async fn serve_tile_path(
	State(dispatcher): State<Arc<RenderDispatcher>>,
	Path((z, x, y)): Path<(String, String, String)>,
) -> Response<Body> {
	let y = y.split('.').next().unwrap_or(&y);
	render_tile(&dispatcher, &z, &x, y).await
}

async fn render_tile(dispatcher: &RenderDispatcher, z: &str, x: &str, y: &str) -> Response<Body> {
	let coord = match parse_coord(z, x, y) {
		Ok(coord) => coord,
		Err(err) => {
			log::debug!("rejecting tile request: {err}");
			return error_400(&err.to_string());
		}
	};

	match dispatcher.render(coord).await {
		Ok(tile) => {
			log::debug!("send tile {coord:?} ({} bytes)", tile.blob.len());
			ok_image(&tile)
		}
		Err(err) if err.is_client_error() => error_400(&err.to_string()),
		Err(err) => {
			log::warn!("render {coord:?} failed: {err}");
			error_500(&err.to_string())
		}
	}
}

fn parse_coord(z: &str, x: &str, y: &str) -> Result<TileCoord, RenderError> {
	let parse = |name: &str, value: &str| {
		value.parse::<u32>().map_err(|_| {
			RenderError::InvalidTileAddress(format!(
				"parameter '{name}' ('{value}') is not a non-negative integer"
			))
		})
	};
	let z = parse("z", z)?;
	let level = u8::try_from(z)
		.ok()
		.filter(|level| *level <= MAX_ZOOM)
		.ok_or_else(|| RenderError::InvalidTileAddress(format!("z ({z}) must be <= {MAX_ZOOM}")))?;
	TileCoord::new(level, parse("x", x)?, parse("y", y)?)
}

// --- small helpers -----------------------------------------------------------

fn ok_image(tile: &RenderedTile) -> Response<Body> {
	Response::builder()
		.status(200)
		.header(header::CONTENT_TYPE, tile.format.mime())
		.body(Body::from(tile.blob.clone()))
		.expect("failed to build OK response")
}

fn error_400(message: &str) -> Response<Body> {
	Response::builder()
		.status(400)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(format!("{{\"error\":\"{}\"}}", json_escape(message))))
		.expect("failed to build error response")
}

/// Escape a string for embedding in a JSON string literal. The message may
/// echo raw request parameters, so quotes, backslashes and control
/// characters must all be escaped for the body to stay valid JSON.
fn json_escape(message: &str) -> String {
	let mut escaped = String::with_capacity(message.len());
	for c in message.chars() {
		match c {
			'"' => escaped.push_str("\\\""),
			'\\' => escaped.push_str("\\\\"),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
			c => escaped.push(c),
		}
	}
	escaped
}

fn error_500(message: &str) -> Response<Body> {
	Response::builder()
		.status(500)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from(message.to_string()))
		.expect("failed to build error response")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn parse_coord_accepts_the_pyramid_boundary() {
		assert!(parse_coord("3", "7", "7").is_ok());
		assert!(parse_coord("3", "8", "7").is_err());
		assert!(parse_coord("3", "7", "8").is_err());
	}

	#[rstest]
	#[case::non_numeric("a", "0", "0")]
	#[case::negative("0", "-1", "0")]
	#[case::fractional("0", "0", "1.5")]
	#[case::zoom_23("23", "0", "0")]
	#[case::zoom_300("300", "0", "0")]
	fn parse_coord_rejects_garbage(#[case] z: &str, #[case] x: &str, #[case] y: &str) {
		let err = parse_coord(z, x, y).unwrap_err();
		assert!(matches!(err, RenderError::InvalidTileAddress(_)), "{z}/{x}/{y}");
	}

	#[rstest]
	#[case::backslash("parameter 'x' ('\\q') is bad", "parameter 'x' ('\\\\q') is bad")]
	#[case::quote("say \"hi\"", "say \\\"hi\\\"")]
	#[case::nul("nul \u{0} byte", "nul \\u0000 byte")]
	#[case::newline("two\nlines", "two\\nlines")]
	#[case::plain("just text", "just text")]
	fn error_messages_stay_valid_json(#[case] raw: &str, #[case] escaped: &str) {
		assert_eq!(json_escape(raw), escaped);
	}

	#[tokio::test]
	async fn error_400_body_escapes_the_echoed_parameter() {
		let resp = error_400("parameter 'x' ('\\q\u{0}') is not a non-negative integer");
		let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		let body = std::str::from_utf8(&body).unwrap();
		assert_eq!(
			body,
			"{\"error\":\"parameter 'x' ('\\\\q\\u0000') is not a non-negative integer\"}"
		);
	}

	#[test]
	fn error_bodies() {
		let resp = error_400("missing \"x\"");
		assert_eq!(resp.status(), 400);
		assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");

		let resp = error_500("engine exploded");
		assert_eq!(resp.status(), 500);
		assert_eq!(
			resp.headers().get(header::CONTENT_TYPE).unwrap(),
			"text/plain; charset=utf-8"
		);
	}
}
