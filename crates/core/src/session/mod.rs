//! Session persistence

pub mod ports;
pub mod service;

pub use service::SessionService;
