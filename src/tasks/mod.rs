//! Background Tasks Module
//!
//! Periodic maintenance that runs alongside a shared cache.
//!
//! # Tasks
//! - Expiry sweep: removes entries whose TTL elapsed at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
