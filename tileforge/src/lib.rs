//! # tileforge
//!
//! A slippy-map tile server that turns `z/x/y` tile addresses into projected
//! bounding boxes and renders them through a pluggable [`engine::RenderEngine`].
//!
//! The map definition is built once at startup as an immutable
//! [`style::MapStyle`] and shared read-only by every concurrent render; the
//! [`render::RenderDispatcher`] owns the async render contract and its error
//! surface.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tileforge::{config::Config, engine::MemoryEngine, render::RenderDispatcher, style::MapStyle};
//! use tileforge_core::TileCoord;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let style = Arc::new(MapStyle::from_config(&config.style).unwrap());
//!     let engine = Arc::new(MemoryEngine::from_tables(config.features));
//!     let dispatcher = RenderDispatcher::new(style, engine);
//!
//!     let tile = dispatcher.render(TileCoord::new(0, 0, 0).unwrap()).await.unwrap();
//!     assert!(!tile.blob.is_empty());
//! }
//! ```

pub mod config;
pub mod engine;
pub mod render;
pub mod server;
pub mod style;

pub use tileforge_core as core;
