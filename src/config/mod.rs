use std::env;
use std::net::SocketAddr;

pub mod cors;
pub mod headers;

pub use cors::create_cors_layer;

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://campus-events.db?mode=rwc".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3001);

        Self {
            database_url,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        }
    }
}
