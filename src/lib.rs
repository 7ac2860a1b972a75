// src/lib.rs

//! tender-watch: procurement listing tracker library

pub mod artifacts;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
