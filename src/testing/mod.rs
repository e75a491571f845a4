//! # Testing Support
//!
//! 실제 Redis 서버 없이 캐시 함수를 테스트하기 위한 도구입니다.
//!
//! ```rust
//! use std::sync::Arc;
//! use redis_caching::caching::redis_caching::RedisCaching;
//! use redis_caching::config::ConnectionOptions;
//! use redis_caching::testing::{FakeRedis, SharedFakeConnector};
//!
//! let fake = Arc::new(FakeRedis::new());
//! let caching = RedisCaching::with_connector(
//!     Some("redis://doc-test/testing"),
//!     ConnectionOptions::default(),
//!     SharedFakeConnector(fake.clone()),
//! );
//!
//! let greet = caching
//!     .cache_string(|name: &String| format!("hello, {}", name))
//!     .with_cache_key(|name: &String| format!("greeting:{}", name));
//!
//! assert_eq!(greet.call(&"kim".to_string()).unwrap(), "hello, kim");
//! assert_eq!(fake.command_count("SET"), 1);
//! ```

pub mod fake_redis;

pub use fake_redis::{FakeRedis, FakeRedisConnector, RecordedCommand, SharedFakeConnector};
