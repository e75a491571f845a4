//! # Cache Backend Abstraction
//!
//! 캐싱 계층이 사용하는 Redis 명령 집합을 트레이트로 정의합니다.
//! 실제 Redis 연결([`RedisClient`](crate::caching::redis::RedisClient))과
//! 테스트용 인메모리 구현([`FakeRedis`](crate::testing::FakeRedis))이
//! 동일한 인터페이스를 구현합니다.
//!
//! ## 명령 매핑
//!
//! | 메서드 | Redis 명령 |
//! |--------|------------|
//! | `get` / `set` | `GET` / `SET` |
//! | `hget` / `hset` | `HGET` / `HSET key field value` |
//! | `hgetall` / `hset_multiple` | `HGETALL` / `HSET key f1 v1 f2 v2 ...` |
//! | `lrange` / `rpush` | `LRANGE` / `RPUSH` |
//! | `del`, `expire`, `ttl`, `exists`, `keys` | 동일 이름의 명령 |

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::errors::CacheResult;

/// 캐싱 계층이 의존하는 Redis 클라이언트 표면.
///
/// 모든 메서드는 동기식이며 블로킹 호출입니다. 키가 존재하지 않을 때
/// 조회 메서드는 `None` 또는 빈 컬렉션을 반환하고, 타입이 맞지 않는 키에
/// 대한 명령은 Redis의 `WRONGTYPE` 에러를 그대로 돌려줍니다.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()>;

    /// 해시 전체를 조회합니다. 키가 없으면 빈 맵을 반환합니다.
    fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>>;

    /// 여러 필드를 한 번에 저장합니다. 기존 필드는 유지되고 덮어쓰기만 일어납니다.
    fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> CacheResult<()>;

    /// `start`, `stop`은 Redis와 같이 음수 인덱스를 허용합니다 (`0, -1` = 전체).
    fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>>;

    fn rpush(&self, key: &str, values: &[String]) -> CacheResult<()>;

    /// 삭제된 키가 있으면 `true`.
    fn del(&self, key: &str) -> CacheResult<bool>;

    /// 키가 존재해서 만료 시간이 설정되었으면 `true`.
    fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool>;

    /// 남은 TTL(초). 키가 없으면 `-2`, 만료 시간이 없으면 `-1`.
    fn ttl(&self, key: &str) -> CacheResult<i64>;

    fn exists(&self, key: &str) -> CacheResult<bool>;

    /// glob 패턴(`*`, `?`)과 일치하는 키 목록.
    fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

/// 프로세스 전역에서 공유되는 백엔드 핸들
pub type SharedBackend = Arc<dyn CacheBackend>;
