//! Type-safe key-value persistence for the storefront client.
//!
//! Plays the role a browser's local storage plays for a web storefront: a
//! flat string map holding the cart, the auth token and the cached profile.
//! Callers receive a store by injection, so tests can swap the on-disk
//! [`FileStore`] for a [`MemoryStore`].
//!
//! # Example
//!
//! ```
//! use shop_cache::{cache_key, Cache, MemoryStore};
//!
//! let cache = Cache::new(MemoryStore::new());
//! let key = cache_key!("shop", "cart");
//!
//! cache.set(&key, &vec![1, 2, 3]).unwrap();
//! let lines: Option<Vec<u32>> = cache.get(&key).unwrap();
//! assert_eq!(lines, Some(vec![1, 2, 3]));
//!
//! cache.delete(&key).unwrap();
//! assert!(!cache.exists(&key).unwrap());
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
