//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Forecast cleanup: reclaims expired forecasts at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
