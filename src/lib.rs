// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod passage;
pub mod runtime;
pub mod score;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{Error, Result};
