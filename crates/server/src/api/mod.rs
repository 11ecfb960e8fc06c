pub mod config;
pub mod handlers;
pub mod history;
pub mod middleware;
pub mod reserve;
pub mod routes;
pub mod schedule;
pub mod ws;

pub use routes::create_router;
