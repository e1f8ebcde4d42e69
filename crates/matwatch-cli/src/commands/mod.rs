//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod capture;
pub mod colorbar;
pub mod hex_utils;
pub mod inspect;
pub mod pixel;
pub mod watch;
