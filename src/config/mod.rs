//! Configuration constants
//!
//! - [`defaults`] - Default values (variant set, file names, build settings)
//! - [`urls`] - Distribution mirror URLs

pub mod defaults;
pub mod urls;
