pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod readiness;
