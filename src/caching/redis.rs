//! # Redis 클라이언트 구현
//!
//! 이 모듈은 `redis` 크레이트의 동기 API 위에 [`CacheBackend`]를 구현합니다.
//!
//! ## 연결 관리
//!
//! - 클라이언트 하나는 TCP(또는 TLS) 연결 하나를 보유합니다.
//! - 명령은 `Mutex`로 직렬화되어 한 번에 하나씩 전송됩니다.
//! - 연결 풀링, 재시도, 자동 재연결은 제공하지 않습니다. 에러는 그대로
//!   호출자에게 전달됩니다.
//! - URL 단위의 공유는 [`ConnectionRegistry`](crate::core::registry::ConnectionRegistry)가
//!   담당합니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use redis::{Client, Commands, Connection};

use crate::caching::backend::{CacheBackend, SharedBackend};
use crate::config::ConnectionOptions;
use crate::core::errors::{CacheResult, ErrorContext};
use crate::utils::url_utils::mask_url;

/// Redis 서버에 대한 동기식 클라이언트
///
/// ## 사용 예제
///
/// ```rust,ignore
/// use redis_caching::caching::redis::RedisClient;
/// use redis_caching::caching::backend::CacheBackend;
///
/// let client = RedisClient::open("redis://localhost:6379", &ConnectionOptions::default())?;
/// client.set("greeting", "hello")?;
/// assert_eq!(client.get("greeting")?, Some("hello".to_string()));
/// ```
pub struct RedisClient {
    connection: Mutex<Connection>,
    decode_responses: bool,
}

impl RedisClient {
    /// URL로 연결을 열고 소켓 타임아웃을 적용합니다.
    ///
    /// ## 에러 케이스
    ///
    /// - 잘못된 URL 형식
    /// - 서버에 연결할 수 없는 경우 (연결 타임아웃 포함)
    /// - 인증 실패
    pub fn open(url: &str, options: &ConnectionOptions) -> CacheResult<Self> {
        let client = Client::open(url)?;

        let connection = match options.connect_timeout() {
            Some(timeout) => client.get_connection_with_timeout(timeout)?,
            None => client.get_connection()?,
        };

        let socket_timeout = options.socket_timeout();
        connection.set_read_timeout(socket_timeout)?;
        connection.set_write_timeout(socket_timeout)?;

        info!("✅ Redis 연결 성공: {}", mask_url(url));

        Ok(Self {
            connection: Mutex::new(connection),
            decode_responses: options.decode_responses,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode(&self, raw: Vec<u8>) -> CacheResult<String> {
        decode_bytes(raw, self.decode_responses)
    }
}

fn decode_bytes(raw: Vec<u8>, strict: bool) -> CacheResult<String> {
    if strict {
        return String::from_utf8(raw).context("invalid UTF-8 in redis response");
    }

    match String::from_utf8(raw) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            warn!("⚠️ non-UTF-8 redis response decoded lossily ({} bytes)", e.as_bytes().len());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

impl CacheBackend for RedisClient {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let raw: Option<Vec<u8>> = self.conn().get(key)?;
        raw.map(|bytes| self.decode(bytes)).transpose()
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let _: () = self.conn().set(key, value)?;
        Ok(())
    }

    fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let raw: Option<Vec<u8>> = self.conn().hget(key, field)?;
        raw.map(|bytes| self.decode(bytes)).transpose()
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        let _: () = self.conn().hset(key, field, value)?;
        Ok(())
    }

    fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let raw: HashMap<String, Vec<u8>> = self.conn().hgetall(key)?;
        raw.into_iter()
            .map(|(field, bytes)| Ok((field, self.decode(bytes)?)))
            .collect()
    }

    fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> CacheResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let _: () = self.conn().hset_multiple(key, items)?;
        Ok(())
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let raw: Vec<Vec<u8>> = self.conn().lrange(key, start, stop)?;
        raw.into_iter().map(|bytes| self.decode(bytes)).collect()
    }

    fn rpush(&self, key: &str, values: &[String]) -> CacheResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        let _: () = self.conn().rpush(key, values)?;
        Ok(())
    }

    fn del(&self, key: &str) -> CacheResult<bool> {
        let deleted: i64 = self.conn().del(key)?;
        Ok(deleted > 0)
    }

    fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool> {
        let applied: bool = self.conn().expire(key, seconds)?;
        Ok(applied)
    }

    fn ttl(&self, key: &str) -> CacheResult<i64> {
        let ttl: i64 = self.conn().ttl(key)?;
        Ok(ttl)
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        let exists: bool = self.conn().exists(key)?;
        Ok(exists)
    }

    fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let keys: Vec<String> = self.conn().keys(pattern)?;
        Ok(keys)
    }
}

/// URL과 옵션으로 백엔드를 생성하는 팩토리
///
/// [`RedisCaching`](crate::caching::redis_caching::RedisCaching)은 기본적으로
/// [`RedisConnector`]를 사용하며, 테스트에서는 인메모리 구현을 돌려주는
/// 커넥터로 교체합니다. 클로저도 그대로 커넥터로 쓸 수 있습니다.
///
/// ```rust,ignore
/// let fake = Arc::new(FakeRedis::new());
/// let connector = move |_url: &str, _options: &ConnectionOptions| {
///     Ok(fake.clone() as SharedBackend)
/// };
/// ```
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str, options: &ConnectionOptions) -> CacheResult<SharedBackend>;
}

impl<F> Connector for F
where
    F: Fn(&str, &ConnectionOptions) -> CacheResult<SharedBackend> + Send + Sync,
{
    fn connect(&self, url: &str, options: &ConnectionOptions) -> CacheResult<SharedBackend> {
        self(url, options)
    }
}

/// 실제 Redis 서버에 연결하는 기본 커넥터
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl Connector for RedisConnector {
    fn connect(&self, url: &str, options: &ConnectionOptions) -> CacheResult<SharedBackend> {
        Ok(Arc::new(RedisClient::open(url, options)?))
    }
}
