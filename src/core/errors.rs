//! # Cache Error Handling
//!
//! 캐싱 계층 전역에서 사용하는 에러 타입을 정의합니다.
//! `thiserror` 기반으로 구현되어 있으며, Redis 클라이언트에서 발생한 에러는
//! 변형 없이 그대로 전달됩니다.
//!
//! ## 에러 분류
//!
//! | CacheError | 발생 시점 |
//! |------------|-----------|
//! | `MissingCacheKey` | 키 생성 함수 없이 캐시 함수를 호출한 경우 |
//! | `NotConfigured` | Redis URL 없이 연결을 요청한 경우 |
//! | `Redis` | 네트워크, 프로토콜, WRONGTYPE 등 Redis 오류 |
//! | `Deserialization` | 저장된 문자열을 애플리케이션 타입으로 변환하지 못한 경우 |
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use redis_caching::core::errors::{CacheError, CacheResult};
//!
//! fn lookup(caching: &RedisCaching) -> CacheResult<Option<String>> {
//!     let client = caching.get_cache()?;
//!     client.get("user:123")
//! }
//!
//! match lookup(&caching) {
//!     Err(CacheError::NotConfigured) => println!("REDIS_URL을 설정하세요"),
//!     Err(e) => println!("캐시 오류: {}", e),
//!     Ok(value) => println!("{:?}", value),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// 캐시 함수에 키 생성 함수가 지정되지 않았습니다.
    #[error("Missing cache key function: {0}")]
    MissingCacheKey(String),

    #[error("Redis URL is not configured")]
    NotConfigured,

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// 외부 에러에 문맥 정보를 붙여 `CacheError::Deserialization`으로 변환합니다.
///
/// 저장된 값을 파싱하는 과정에서 발생한 에러에 키 이름 등의
/// 정보를 덧붙일 때 사용합니다.
///
/// ```rust,ignore
/// let parsed = raw.parse::<i64>()
///     .with_context(|| format!("invalid counter at {}", key))?;
/// ```
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> CacheResult<T>;

    fn with_context<F>(self, f: F) -> CacheResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> CacheResult<T> {
        self.map_err(|e| CacheError::Deserialization(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> CacheResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| CacheError::Deserialization(format!("{}: {}", f(), e)))
    }
}
