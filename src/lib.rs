//! Redis 함수 결과 캐싱 라이브러리
//!
//! 비용이 큰 함수 호출 결과를 Redis에 저장해 두고, 같은 키로 다시 호출되면
//! 함수를 실행하지 않고 저장된 값을 돌려줍니다.
//!
//! # Features
//!
//! - **저장 형태**: 문자열, 해시, 해시 필드, 리스트, 불리언, 날짜/시간
//! - **키 함수**: 호출 인자(메서드는 수신자 포함)로 캐시 키 생성
//! - **만료**: 고정 TTL 또는 반환값 기반 TTL
//! - **연결 공유**: 같은 URL의 래퍼는 하나의 연결을 공유
//! - **늦은 설정**: 래퍼 선언 후 `init`으로 URL 지정
//! - **테스트 지원**: 명령 기록을 남기는 인메모리 `FakeRedis`
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use redis_caching::RedisCaching;
//!
//! let caching = RedisCaching::from_env();
//!
//! let profile = caching
//!     .cache_dict(|user_id: &u64| load_profile(*user_id))
//!     .with_cache_key(|user_id: &u64| format!("profile:{}", user_id))
//!     .with_expire_in(Duration::from_secs(600));
//!
//! let first = profile.call(&7)?;   // 실행 후 저장
//! let again = profile.call(&7)?;   // 캐시에서 반환
//! ```

pub mod core;
pub mod config;
pub mod caching;
pub mod utils;
pub mod testing;

pub use crate::caching::{
    CacheBackend, CacheDateTime, CacheElement, Cacheable, CachedFunction, CachedMethod, RedisCaching,
    SingleType,
};
pub use crate::config::{ConnectionOptions, RedisConfig};
pub use crate::core::errors::{CacheError, CacheResult};
