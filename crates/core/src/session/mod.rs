//! Session orchestration: boot, login, logout and access token renewal

pub mod callback;
pub mod service;

pub use callback::{detect_callback, strip_callback_params, Callback};
pub use service::SessionOrchestrator;
