//! Interval-based suppression of repeated notifications.
//!
//! A successful send with an interval writes a record keyed by the
//! notification's [`SuppressionKey`]. While the record lives, identical sends
//! are skipped. Backends:
//! - Redis (default, shared between hosts)
//! - Disk (persistent, one host)
//! - Memory (one process)
//! - None (never suppresses)
//!
//! ```toml
//! [suppression]
//! backend = "redis"  # or "disk", "memory", "none"
//! key_prefix = "sendnotification"
//!
//! [suppression.redis]
//! url = "redis://127.0.0.1:6379"
//! pool_size = 2
//! connection_timeout = 2
//! ```

mod disk;
mod error;
mod key;
mod manager;
mod memory;
mod noop;
mod redis;
mod traits;

pub use disk::DiskBackend;
pub use error::SuppressionError;
pub use key::SuppressionKey;
pub use manager::SuppressionStore;
pub use memory::MemoryBackend;
pub use noop::NoOpBackend;
pub use self::redis::RedisBackend;
pub use traits::SuppressionBackend;
