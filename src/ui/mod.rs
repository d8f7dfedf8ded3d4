pub mod app;
pub mod chat_session;
pub mod components;
pub mod projection;
pub mod record_map;
pub mod theme;

pub use app::AyurTraceApp;
