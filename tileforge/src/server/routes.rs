//! Router composition for the tile server.
//!
//! Wires the handlers into an axum `Router` without mixing in server
//! lifecycle. Intentionally tiny and declarative.

use super::handlers::{serve_tile_path, serve_tile_query};
use crate::render::RenderDispatcher;
use axum::{Router, routing::get};
use std::sync::Arc;

/// Build the application router around one shared dispatcher.
pub fn build_router(dispatcher: Arc<RenderDispatcher>) -> Router {
	Router::new()
		.route("/status", get(|| async { "ready!" }))
		.route("/tile", get(serve_tile_query))
		.route("/tiles/{z}/{x}/{y}", get(serve_tile_path))
		.with_state(dispatcher)
}

// --- tests -------------------------------------------------------------------
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{config::Config, engine::MemoryEngine, style::MapStyle};
	use axum::{body::Body, http::StatusCode};
	use tower::ServiceExt as _; // for `oneshot`

	const ONE_POINT_LAYER: &str = r#"
style:
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
features:
  points9:
    - [0.0, 0.0]
"#;

	fn app(config_text: &str) -> Router {
		let config = Config::from_string(config_text).unwrap();
		let style = Arc::new(MapStyle::from_config(&config.style).unwrap());
		let engine = Arc::new(MemoryEngine::from_tables(config.features));
		build_router(Arc::new(RenderDispatcher::new(style, engine)))
	}

	async fn get_response(app: Router, path: &str) -> (StatusCode, Option<String>, Vec<u8>) {
		let req = axum::http::Request::builder().uri(path).body(Body::empty()).unwrap();
		let res = app.oneshot(req).await.unwrap();
		let status = res.status();
		let content_type = res
			.headers()
			.get(axum::http::header::CONTENT_TYPE)
			.map(|v| v.to_str().unwrap().to_string());
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		(status, content_type, bytes.to_vec())
	}

	#[tokio::test]
	async fn status_route() {
		let (status, _, body) = get_response(app(""), "/status").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, b"ready!");
	}

	#[tokio::test]
	async fn query_route_serves_a_png() {
		let (status, content_type, body) = get_response(app(ONE_POINT_LAYER), "/tile?x=0&y=0&z=0").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("image/png"));
		// PNG signature
		assert_eq!(&body[0..4], &[137, 80, 78, 71]);
	}

	#[tokio::test]
	async fn path_route_serves_the_same_tile() {
		let query = get_response(app(ONE_POINT_LAYER), "/tile?x=0&y=0&z=0").await;
		let path = get_response(app(ONE_POINT_LAYER), "/tiles/0/0/0").await;
		let path_png = get_response(app(ONE_POINT_LAYER), "/tiles/0/0/0.png").await;
		assert_eq!(query.2, path.2);
		assert_eq!(query.2, path_png.2);
	}

	#[tokio::test]
	async fn missing_parameters_yield_a_structured_400() {
		let (status, content_type, body) = get_response(app(ONE_POINT_LAYER), "/tile?x=0&y=0").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(content_type.as_deref(), Some("application/json"));
		let body = String::from_utf8(body).unwrap();
		assert!(body.starts_with("{\"error\":"), "{body}");
	}

	#[tokio::test]
	async fn out_of_range_address_yields_400() {
		// x = 2^z is the first invalid column
		let (status, _, _) = get_response(app(ONE_POINT_LAYER), "/tile?x=8&y=0&z=3").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, _, _) = get_response(app(ONE_POINT_LAYER), "/tile?x=abc&y=0&z=3").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn engine_failure_yields_500_with_message() {
		// the layer references a feature table that was never registered
		let broken = r#"
style:
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
		let (status, content_type, body) = get_response(app(broken), "/tile?x=0&y=0&z=0").await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
		assert!(String::from_utf8(body).unwrap().contains("points9"));
	}

	#[tokio::test]
	async fn unknown_route_yields_404() {
		let (status, _, _) = get_response(app(""), "/nope").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}
}
