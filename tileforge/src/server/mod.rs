//! HTTP serving of rendered tiles.

mod handlers;
mod routes;
mod tile_server;

pub use routes::build_router;
pub use tile_server::TileServer;
