//! 인메모리 Redis 대체 구현
//!
//! 캐싱 계층이 사용하는 명령만 Redis와 같은 의미로 구현합니다.
//!
//! - 타입이 맞지 않는 키에 대한 명령은 `WRONGTYPE` 에러
//! - 만료 시간은 접근 시점에 검사해서 지난 키를 제거 (lazy expiry)
//! - `TTL`은 키가 없으면 `-2`, 만료 시간이 없으면 `-1`
//! - `SET`은 기존 만료 시간을 지움, `HSET`/`RPUSH`는 유지
//! - 비어 버린 해시/리스트는 키 자체가 사라짐
//!
//! 모든 명령은 [`RecordedCommand`]로 기록되어, 테스트에서 어떤 명령이
//! 어떤 키로 호출되었는지 검증할 수 있습니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use redis::{ErrorKind, RedisError};

use crate::caching::backend::{CacheBackend, SharedBackend};
use crate::caching::redis::Connector;
use crate::config::ConnectionOptions;
use crate::core::errors::{CacheError, CacheResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub name: &'static str,
    pub key: String,
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    entries: HashMap<String, Entry>,
    commands: Vec<RecordedCommand>,
}

impl FakeState {
    fn record(&mut self, name: &'static str, key: &str) {
        self.commands.push(RecordedCommand {
            name,
            key: key.to_string(),
        });
    }

    /// 만료된 키를 제거한 뒤 살아 있는 항목을 돌려줍니다.
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        let now = Instant::now();
        if self.entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn purge_expired(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

fn wrong_type() -> CacheError {
    CacheError::Redis(RedisError::from((
        ErrorKind::TypeError,
        "WRONGTYPE",
        "Operation against a key holding the wrong kind of value".to_string(),
    )))
}

fn invalid_expire_time() -> CacheError {
    CacheError::Redis(RedisError::from((
        ErrorKind::ResponseError,
        "An error was signalled by the server",
        "invalid expire time in 'expire' command".to_string(),
    )))
}

/// Redis 명령 일부를 메모리에서 흉내 내는 테스트용 백엔드
///
/// ```rust
/// use redis_caching::caching::backend::CacheBackend;
/// use redis_caching::testing::FakeRedis;
///
/// let fake = FakeRedis::new();
/// fake.set("greeting", "hello").unwrap();
///
/// assert_eq!(fake.get("greeting").unwrap(), Some("hello".to_string()));
/// assert_eq!(fake.ttl("greeting").unwrap(), -1);
/// assert_eq!(fake.ttl("missing").unwrap(), -2);
/// ```
#[derive(Debug, Default)]
pub struct FakeRedis {
    state: Mutex<FakeState>,
}

impl FakeRedis {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 지금까지 기록된 명령 목록
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.state().commands.clone()
    }

    /// 이름이 `name`인 명령이 호출된 횟수
    pub fn command_count(&self, name: &str) -> usize {
        self.state().commands.iter().filter(|c| c.name == name).count()
    }

    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    /// 모든 키를 삭제합니다. 명령 기록은 유지됩니다.
    pub fn flushall(&self) {
        self.state().entries.clear();
    }
}

impl CacheBackend for FakeRedis {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut state = self.state();
        state.record("GET", key);
        match state.live(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut state = self.state();
        state.record("SET", key);
        state
            .entries
            .insert(key.to_string(), Entry::new(Value::Str(value.to_string())));
        Ok(())
    }

    fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut state = self.state();
        state.record("HGET", key);
        match state.live(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(_) => Err(wrong_type()),
        }
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        self.hset_multiple_as("HSET", key, &[(field.to_string(), value.to_string())])
    }

    fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let mut state = self.state();
        state.record("HGETALL", key);
        match state.live(key).map(|entry| &entry.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(_) => Err(wrong_type()),
        }
    }

    fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> CacheResult<()> {
        self.hset_multiple_as("HSET", key, items)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let mut state = self.state();
        state.record("LRANGE", key);
        match state.live(key).map(|entry| &entry.value) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => Ok(slice_range(list, start, stop).to_vec()),
            Some(_) => Err(wrong_type()),
        }
    }

    fn rpush(&self, key: &str, values: &[String]) -> CacheResult<()> {
        let mut state = self.state();
        state.record("RPUSH", key);
        if values.is_empty() {
            return Ok(());
        }
        match state.live(key) {
            None => {
                state
                    .entries
                    .insert(key.to_string(), Entry::new(Value::List(values.to_vec())));
                Ok(())
            }
            Some(Entry {
                value: Value::List(list),
                ..
            }) => {
                list.extend_from_slice(values);
                Ok(())
            }
            Some(_) => Err(wrong_type()),
        }
    }

    fn del(&self, key: &str) -> CacheResult<bool> {
        let mut state = self.state();
        state.record("DEL", key);
        let existed = state.live(key).is_some();
        state.entries.remove(key);
        Ok(existed)
    }

    fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool> {
        let mut state = self.state();
        state.record("EXPIRE", key);
        if state.live(key).is_none() {
            return Ok(false);
        }
        if seconds <= 0 {
            state.entries.remove(key);
            return Ok(true);
        }
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(seconds.unsigned_abs()))
            .ok_or_else(invalid_expire_time)?;
        if let Some(entry) = state.entries.get_mut(key) {
            entry.expires_at = Some(expires_at);
        }
        Ok(true)
    }

    fn ttl(&self, key: &str) -> CacheResult<i64> {
        let mut state = self.state();
        state.record("TTL", key);
        let Some(entry) = state.live(key) else {
            return Ok(-2);
        };
        Ok(match entry.expires_at {
            None => -1,
            Some(at) => {
                let remaining = at.saturating_duration_since(Instant::now());
                ((remaining.as_millis() + 500) / 1000) as i64
            }
        })
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut state = self.state();
        state.record("EXISTS", key);
        Ok(state.live(key).is_some())
    }

    fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut state = self.state();
        state.record("KEYS", pattern);
        state.purge_expired();
        let mut keys: Vec<String> = state
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl FakeRedis {
    fn hset_multiple_as(&self, name: &'static str, key: &str, items: &[(String, String)]) -> CacheResult<()> {
        let mut state = self.state();
        state.record(name, key);
        if items.is_empty() {
            return Ok(());
        }
        match state.live(key) {
            None => {
                let hash = items.iter().cloned().collect();
                state.entries.insert(key.to_string(), Entry::new(Value::Hash(hash)));
                Ok(())
            }
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => {
                hash.extend(items.iter().cloned());
                Ok(())
            }
            Some(_) => Err(wrong_type()),
        }
    }
}

/// Redis `LRANGE`의 인덱스 규칙(음수는 끝에서부터, 범위 밖은 잘라냄)
fn slice_range(list: &[String], start: isize, stop: isize) -> &[String] {
    let len = list.len() as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return &[];
    }
    &list[start as usize..=stop as usize]
}

/// `*`, `?`만 지원하는 glob 매칭
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

/// 연결 요청마다 새 [`FakeRedis`]를 만드는 커넥터
///
/// URL별 공유는 레지스트리가 담당하므로, 같은 URL은 같은 인스턴스를 받습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeRedisConnector;

impl Connector for FakeRedisConnector {
    fn connect(&self, _url: &str, _options: &ConnectionOptions) -> CacheResult<SharedBackend> {
        Ok(Arc::new(FakeRedis::new()))
    }
}

/// 미리 만들어 둔 [`FakeRedis`]를 돌려주는 커넥터
///
/// 테스트 코드에서 같은 인스턴스의 명령 기록을 확인할 때 사용합니다.
#[derive(Debug, Clone)]
pub struct SharedFakeConnector(pub Arc<FakeRedis>);

impl Connector for SharedFakeConnector {
    fn connect(&self, _url: &str, _options: &ConnectionOptions) -> CacheResult<SharedBackend> {
        Ok(self.0.clone())
    }
}
