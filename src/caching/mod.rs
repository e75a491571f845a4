//! 캐싱 계층 모듈
//!
//! 함수 결과를 Redis에 자동으로 캐싱하는 래퍼와, 그 아래의 저장 형태
//! 어댑터를 제공합니다.
//!
//! # 구성
//!
//! ```text
//! ┌──────────────────────────┐
//! │  RedisCaching            │ ← 설정 보관, 래퍼 생성
//! └──────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │  CachedFunction / Method │ ← 캐시 우선 조회, 미스 시 실행 후 저장
//! └──────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │  CacheElement            │ ← 애플리케이션 타입 ⇄ 저장 형태
//! └──────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │  Cacheable               │ ← 문자열 / 해시 / 해시 필드 / 리스트
//! └──────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │  CacheBackend            │ ← RedisClient, FakeRedis
//! └──────────────────────────┘
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379/0
//! # 또는
//! REDIS_HOST=localhost:6379
//! REDIS_PASSWORD=secret
//! REDIS_DB=2
//! REDIS_USE_SSL=true
//! ```

pub mod backend;
pub mod cache_element;
pub mod cacheable;
pub mod memoize;
pub mod redis;
pub mod redis_caching;

pub use backend::{CacheBackend, SharedBackend};
pub use cache_element::{CacheDateTime, CacheElement, SingleType};
pub use cacheable::{
    BoolCacheable, Cacheable, DictCacheType, DictCacheable, DictStringCacheable, ListCacheType,
    ListCacheable, StringCacheable,
};
pub use memoize::{BoundMethod, CachedFunction, CachedMethod};
pub use redis::{Connector, RedisClient, RedisConnector};
pub use redis_caching::RedisCaching;
