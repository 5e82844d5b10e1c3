//! Token acquisition

pub mod engine;
pub mod ports;

pub use engine::TokenAcquisitionEngine;
