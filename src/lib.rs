pub mod app;
pub mod auth;
pub mod circles;
pub mod config;
pub mod error;
pub mod events;
pub mod expenses;
pub mod identity;
pub mod mail;
pub mod plugins;
pub mod polls;
pub mod retention;
pub mod shopping;
pub mod state;
pub mod storage;
pub mod todos;
pub mod tracking;
pub mod transport;
pub mod uploads;

pub use app::{build_app, serve};
pub use state::AppState;
