//! Server lifecycle: bind, serve, graceful shutdown.

use super::routes::build_router;
use crate::render::RenderDispatcher;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::oneshot::Sender;

pub struct TileServer {
	ip: String,
	port: u16,
	dispatcher: Arc<RenderDispatcher>,
	exit_signal: Option<Sender<()>>,
}

impl TileServer {
	pub fn new(ip: &str, port: u16, dispatcher: Arc<RenderDispatcher>) -> TileServer {
		TileServer {
			ip: ip.to_owned(),
			port,
			dispatcher,
			exit_signal: None,
		}
	}

	/// Bind the listener and serve in a background task until
	/// [`stop`](Self::stop) is called.
	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() {
			self.stop().await;
		}

		log::info!("starting server");

		let router = build_router(Arc::clone(&self.dispatcher));

		let addr = format!("{}:{}", self.ip, self.port);
		eprintln!("server starts listening on {addr}");

		let listener = tokio::net::TcpListener::bind(&addr)
			.await
			.with_context(|| format!("binding to {addr}"))?;
		let (tx, rx) = tokio::sync::oneshot::channel::<()>();

		tokio::spawn(async {
			axum::serve(listener, router)
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
				.expect("server failed")
		});

		self.exit_signal = Some(tx);

		Ok(())
	}

	pub async fn stop(&mut self) {
		if let Some(tx) = self.exit_signal.take() {
			log::info!("stopping server");
			tx.send(()).ok();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{config::Config, engine::MemoryEngine, style::MapStyle};

	const IP: &str = "127.0.0.1";

	fn dispatcher() -> Arc<RenderDispatcher> {
		let config = Config::default();
		let style = Arc::new(MapStyle::from_config(&config.style).unwrap());
		let engine = Arc::new(MemoryEngine::from_tables(config.features));
		Arc::new(RenderDispatcher::new(style, engine))
	}

	#[tokio::test]
	async fn start_and_stop() {
		let mut server = TileServer::new(IP, 53201, dispatcher());
		assert!(server.exit_signal.is_none());

		server.start().await.unwrap();
		assert!(server.exit_signal.is_some());

		server.stop().await;
		assert!(server.exit_signal.is_none());
	}

	#[tokio::test]
	async fn stop_without_start_is_a_no_op() {
		let mut server = TileServer::new(IP, 53202, dispatcher());
		server.stop().await;
		assert!(server.exit_signal.is_none());
	}
}
