//! Session store adapters
//!
//! - [`RedisSessionStore`]: RedisJSON documents with sliding expiry
//! - [`InMemorySessionStore`]: process-local store with the same semantics
//! - [`StoreConnectionManager`]: connection lifecycle for the RedisJSON store

pub mod connection;
pub mod memory;
pub mod redis;

pub use connection::{connection_url, ConnectionState, StoreConnectionManager};
pub use memory::InMemorySessionStore;
pub use self::redis::RedisSessionStore;
