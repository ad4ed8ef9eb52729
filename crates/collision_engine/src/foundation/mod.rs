//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and geometric operations
//! - Logging utilities

pub mod logging;
pub mod math;
