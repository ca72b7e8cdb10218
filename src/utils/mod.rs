//! Utils Module - Helper Functions & Shared Utilities
//!
//! Berisi konstanta kalibrasi dan cache yang digunakan di seluruh aplikasi.

pub mod cache;
pub mod constants;

pub use cache::{AnalysisCache, CacheStats};
pub use constants::*;
