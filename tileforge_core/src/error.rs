//! The error taxonomy shared by the transformer, the style descriptor and
//! the render dispatcher.
//!
//! Every failure a render request can produce is one of these variants, so
//! callers can map them to distinct responses (client error vs. server
//! error) without string matching.

use thiserror::Error;

/// All errors surfaced by tile rendering.
#[derive(Debug, Error)]
pub enum RenderError {
	/// The requested tile address is malformed or outside the tile pyramid.
	/// Surfaced before any engine call is made; never retried.
	#[error("invalid tile address: {0}")]
	InvalidTileAddress(String),

	/// The style configuration is inconsistent (undefined style name,
	/// missing datasource parameters, zero-sized canvas). Fatal at startup.
	#[error("invalid style definition: {0}")]
	InvalidStyleDefinition(String),

	/// The render engine failed during rasterization.
	#[error("render engine failure: {0}")]
	EngineFailure(String),

	/// A raster was produced but could not be serialized to the requested
	/// format.
	#[error("failed to encode raster as {format}: {message}")]
	EncodingFailure { format: String, message: String },

	/// The render was cancelled before the engine completed.
	#[error("render was cancelled")]
	Cancelled,
}

impl RenderError {
	/// True if the error is the caller's fault (maps to an HTTP 4xx).
	pub fn is_client_error(&self) -> bool {
		matches!(self, RenderError::InvalidTileAddress(_))
	}
}
