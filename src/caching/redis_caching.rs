//! # RedisCaching
//!
//! 연결 설정을 보관하고, 함수 결과를 자동으로 캐싱하는 래퍼를 만들어 주는
//! 진입점입니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use redis_caching::caching::redis_caching::RedisCaching;
//!
//! let caching = RedisCaching::new("rediss://:secret@cache.internal:6380/0");
//!
//! // 1. 키 생성 함수와 함께 선언
//! let display_name = caching
//!     .cache_string(|user_id: &u64| user_repo.load_display_name(*user_id))
//!     .with_cache_key(|user_id: &u64| format!("user:{}:display_name", user_id))
//!     .with_expire_in(Duration::from_secs(300));
//!
//! // 2. 키 생성 함수를 나중에 지정
//! let mut roles = caching.cache_list(|user_id: &u64| user_repo.load_roles(*user_id));
//! roles.cache_key(|user_id: &u64| format!("user:{}:roles", user_id));
//!
//! let name = display_name.call(&42)?;   // 캐시 미스 → 함수 실행 후 저장
//! let name = display_name.call(&42)?;   // 캐시 히트 → 함수 실행 없음
//! ```
//!
//! ## 나중에 설정하기
//!
//! 애플리케이션 시작 전에 래퍼를 선언해 두고, 설정이 준비되면
//! [`RedisCaching::init`]으로 URL을 지정할 수 있습니다. 같은 `RedisCaching`에서
//! 만들어진 모든 래퍼가 새 설정을 따릅니다.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::caching::backend::{CacheBackend, SharedBackend};
use crate::caching::cache_element::{CacheDateTime, CacheElement, SingleType};
use crate::caching::cacheable::{
    BoolCacheable, DictCacheType, DictCacheable, DictStringCacheable, ListCacheType, ListCacheable,
    StringCacheable,
};
use crate::caching::memoize::{CachedFunction, CachedMethod};
use crate::caching::redis::{Connector, RedisConnector};
use crate::config::{ConnectionOptions, RedisConfig, load_env_file};
use crate::core::errors::{CacheError, CacheResult};
use crate::core::registry::ConnectionRegistry;

pub type StringElement = SingleType<StringCacheable>;
pub type DictElement = SingleType<DictCacheable>;
pub type DictStringElement = SingleType<DictStringCacheable>;
pub type ListElement = SingleType<ListCacheable>;
pub type BoolElement = SingleType<BoolCacheable>;

#[derive(Debug, Clone)]
struct CachingState {
    url: Option<String>,
    options: ConnectionOptions,
}

struct CachingInner {
    state: RwLock<CachingState>,
    connector: Box<dyn Connector>,
}

/// 캐시 연결 설정 보관소이자 캐시 래퍼 팩토리
///
/// 복제 비용이 낮으며(`Arc`), 복제본끼리 설정을 공유합니다.
#[derive(Clone)]
pub struct RedisCaching {
    inner: Arc<CachingInner>,
}

impl RedisCaching {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_options(url, ConnectionOptions::default())
    }

    pub fn with_options(url: impl Into<String>, options: ConnectionOptions) -> Self {
        Self::build(Some(url.into()), options, Box::new(RedisConnector))
    }

    /// URL 없이 생성합니다. [`init`](Self::init) 전에 캐시 함수를 호출하면
    /// `CacheError::NotConfigured`가 발생합니다.
    pub fn unconfigured() -> Self {
        Self::build(None, ConnectionOptions::default(), Box::new(RedisConnector))
    }

    /// `.env` 파일과 환경 변수에서 설정을 읽어 생성합니다.
    ///
    /// URL 관련 변수가 없으면 설정되지 않은 상태로 만들어집니다.
    pub fn from_env() -> Self {
        load_env_file();
        Self::build(RedisConfig::url(), RedisConfig::connection_options(), Box::new(RedisConnector))
    }

    /// 백엔드 생성 방식을 직접 지정합니다. 테스트에서 인메모리 구현을 쓸 때 사용합니다.
    pub fn with_connector(
        url: Option<&str>,
        options: ConnectionOptions,
        connector: impl Connector + 'static,
    ) -> Self {
        Self::build(url.map(str::to_string), options, Box::new(connector))
    }

    fn build(url: Option<String>, options: ConnectionOptions, connector: Box<dyn Connector>) -> Self {
        Self {
            inner: Arc::new(CachingInner {
                state: RwLock::new(CachingState { url, options }),
                connector,
            }),
        }
    }

    /// 연결 대상을 (다시) 지정합니다.
    ///
    /// 이미 다른 URL로 만들어진 연결은 레지스트리에 그대로 남습니다.
    pub fn init(&self, url: impl Into<String>, options: ConnectionOptions) {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.url = Some(url.into());
        state.options = options;
    }

    pub fn url(&self) -> Option<String> {
        self.state().url
    }

    pub fn options(&self) -> ConnectionOptions {
        self.state().options
    }

    fn state(&self) -> CachingState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 설정된 URL의 공유 클라이언트를 반환합니다. 처음 호출될 때 연결됩니다.
    pub fn get_cache(&self) -> CacheResult<SharedBackend> {
        let CachingState { url, options } = self.state();
        let url = url.ok_or(CacheError::NotConfigured)?;

        ConnectionRegistry::get_or_connect(&url, || self.inner.connector.connect(&url, &options))
    }

    /// 캐시 키를 삭제합니다. 키가 존재했으면 `true`.
    pub fn delete(&self, cache_key: &str) -> CacheResult<bool> {
        self.get_cache()?.del(cache_key)
    }

    /// 임의의 [`CacheElement`]로 함수 결과를 캐싱하는 래퍼를 만듭니다.
    ///
    /// 키 생성 함수는 `with_cache_key` 또는 `cache_key`로 지정합니다.
    pub fn cache_value<A, E, F>(&self, element: E, func: F) -> CachedFunction<A, E>
    where
        E: CacheElement,
        F: Fn(&A) -> E::Value + Send + Sync + 'static,
    {
        CachedFunction::new(self.clone(), element, func)
    }

    /// 문자열을 반환하는 함수를 캐싱합니다.
    pub fn cache_string<A, F>(&self, func: F) -> CachedFunction<A, StringElement>
    where
        F: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.cache_value(SingleType::new(StringCacheable), func)
    }

    /// `{String: String}` 맵을 반환하는 함수를 캐싱합니다.
    pub fn cache_dict<A, F>(&self, func: F) -> CachedFunction<A, DictElement>
    where
        F: Fn(&A) -> DictCacheType + Send + Sync + 'static,
    {
        self.cache_value(SingleType::new(DictCacheable), func)
    }

    /// 해시의 특정 필드에 문자열 결과를 캐싱합니다.
    pub fn cache_dict_string<A, F>(&self, dict_key: impl Into<String>, func: F) -> CachedFunction<A, DictStringElement>
    where
        F: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.cache_value(SingleType::new(DictStringCacheable::new(dict_key)), func)
    }

    pub fn cache_list<A, F>(&self, func: F) -> CachedFunction<A, ListElement>
    where
        F: Fn(&A) -> ListCacheType + Send + Sync + 'static,
    {
        self.cache_value(SingleType::new(ListCacheable), func)
    }

    pub fn cache_datetime<A, F>(&self, func: F) -> CachedFunction<A, CacheDateTime>
    where
        F: Fn(&A) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.cache_value(CacheDateTime::default(), func)
    }

    pub fn cache_bool<A, F>(&self, func: F) -> CachedFunction<A, BoolElement>
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.cache_value(SingleType::new(BoolCacheable), func)
    }

    /// 메서드(수신자 `&R`를 받는 함수)를 캐싱하는 래퍼를 만듭니다.
    ///
    /// ```rust,ignore
    /// struct Directory {
    ///     lookups: CachedMethod<Directory, (u64,), StringElement>,
    /// }
    ///
    /// impl Directory {
    ///     fn display_name(&self, id: u64) -> CacheResult<String> {
    ///         self.lookups.call(self, &(id,))
    ///     }
    /// }
    /// ```
    pub fn cache_method<R, A, E, F>(&self, element: E, func: F) -> CachedMethod<R, A, E>
    where
        E: CacheElement,
        F: Fn(&R, &A) -> E::Value + Send + Sync + 'static,
    {
        CachedMethod::new(self.clone(), element, func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::same_backend;
    use crate::testing::{FakeRedis, FakeRedisConnector, SharedFakeConnector};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn fake_caching(url: &str) -> (RedisCaching, Arc<FakeRedis>) {
        init_logging();
        let fake = Arc::new(FakeRedis::new());
        let caching = RedisCaching::with_connector(
            Some(url),
            ConnectionOptions::default(),
            SharedFakeConnector(fake.clone()),
        );
        (caching, fake)
    }

    fn names(fake: &FakeRedis) -> Vec<(&'static str, String)> {
        fake.commands().into_iter().map(|c| (c.name, c.key)).collect()
    }

    /// 첫 호출은 조회 1회 + 저장, 두 번째 호출은 조회 1회만 일어나는지 검증
    fn assert_memoized<E>(
        fake: &FakeRedis,
        cached: &CachedFunction<(String, String), E>,
        calls: &AtomicUsize,
        expected: E::Value,
        fetch_command: &'static str,
        store_commands: &[&'static str],
    ) where
        E: CacheElement,
        E::Value: PartialEq + std::fmt::Debug,
    {
        let args = ("123".to_string(), "abc".to_string());
        assert!(!fake.exists("cache-key").unwrap());
        fake.clear_commands();

        let returned = cached.call(&args).unwrap();
        assert_eq!(returned, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut expected_commands = vec![(fetch_command, "cache-key".to_string())];
        expected_commands.extend(store_commands.iter().map(|name| (*name, "cache-key".to_string())));
        assert_eq!(names(fake), expected_commands);
        assert!(fake.exists("cache-key").unwrap());

        fake.clear_commands();
        let returned = cached.call(&args).unwrap();
        assert_eq!(returned, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(names(fake), vec![(fetch_command, "cache-key".to_string())]);
    }

    fn key_of(args: &(String, String)) -> String {
        assert_eq!(args, &("123".to_string(), "abc".to_string()));
        "cache-key".to_string()
    }

    #[test]
    fn test_cache_string() {
        let (caching, fake) = fake_caching("redis://caching-test/string");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let cached = caching
            .cache_string(move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                "string-value".to_string()
            })
            .with_cache_key(key_of);

        assert_memoized(&fake, &cached, &calls, "string-value".to_string(), "GET", &["SET"]);
    }

    #[test]
    fn test_cache_dict() {
        let (caching, fake) = fake_caching("redis://caching-test/dict");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value: HashMap<String, String> = HashMap::from([("hash".to_string(), "value".to_string())]);
        let returned = value.clone();

        let cached = caching
            .cache_dict(move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                returned.clone()
            })
            .with_cache_key(key_of);

        assert_memoized(&fake, &cached, &calls, value, "HGETALL", &["HSET"]);
    }

    #[test]
    fn test_cache_dict_string() {
        let (caching, fake) = fake_caching("redis://caching-test/dict-string");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let cached = caching
            .cache_dict_string("dict-key", move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                "string-value".to_string()
            })
            .with_cache_key(key_of);

        assert_memoized(&fake, &cached, &calls, "string-value".to_string(), "HGET", &["HSET"]);
        assert_eq!(fake.hget("cache-key", "dict-key").unwrap(), Some("string-value".to_string()));
    }

    #[test]
    fn test_cache_list() {
        let (caching, fake) = fake_caching("redis://caching-test/list");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let cached = caching
            .cache_list(move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                vec!["list".to_string(), "value".to_string()]
            })
            .with_cache_key(key_of);

        assert_memoized(
            &fake,
            &cached,
            &calls,
            vec!["list".to_string(), "value".to_string()],
            "LRANGE",
            &["DEL", "RPUSH"],
        );
    }

    #[test]
    fn test_cache_datetime() {
        let (caching, fake) = fake_caching("redis://caching-test/datetime");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 8, 15, 0).unwrap();

        let cached = caching
            .cache_datetime(move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                now
            })
            .with_cache_key(key_of);

        assert_memoized(&fake, &cached, &calls, now, "GET", &["SET"]);
        assert_eq!(fake.get("cache-key").unwrap(), Some("2024-05-17T08:15:00+00:00".to_string()));
    }

    #[test]
    fn test_cache_bool() {
        let (caching, fake) = fake_caching("redis://caching-test/bool");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let cached = caching
            .cache_bool(move |_: &(String, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            })
            .with_cache_key(key_of);

        // false도 캐시 히트로 취급되어야 함
        assert_memoized(&fake, &cached, &calls, false, "GET", &["SET"]);
    }

    #[test]
    fn test_cache_key_attached_later() {
        let (caching, fake) = fake_caching("redis://caching-test/late-key");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut cached = caching.cache_string(move |_: &(String, String)| {
            counter.fetch_add(1, Ordering::SeqCst);
            "string-value".to_string()
        });
        cached.cache_key(key_of);

        assert_memoized(&fake, &cached, &calls, "string-value".to_string(), "GET", &["SET"]);
    }

    #[test]
    fn test_same_url_shares_connection() {
        init_logging();
        let url = "redis://caching-test/shared-url";
        let first = RedisCaching::with_connector(Some(url), ConnectionOptions::default(), FakeRedisConnector);
        let second = RedisCaching::with_connector(Some(url), ConnectionOptions::default(), FakeRedisConnector);

        let a = first.get_cache().unwrap();
        let b = second.get_cache().unwrap();
        let c = first.get_cache().unwrap();

        assert!(same_backend(&a, &b));
        assert!(same_backend(&a, &c));
    }

    #[test]
    fn test_unconfigured_then_init() {
        init_logging();
        let caching = RedisCaching::with_connector(None, ConnectionOptions::default(), FakeRedisConnector);
        let cached = caching
            .cache_string(|name: &String| name.to_uppercase())
            .with_cache_key(|name: &String| format!("upper:{}", name));

        assert!(matches!(caching.get_cache(), Err(CacheError::NotConfigured)));
        assert!(matches!(cached.call(&"kim".to_string()), Err(CacheError::NotConfigured)));

        caching.init("redis://caching-test/late-init", ConnectionOptions::default());

        assert_eq!(caching.url().as_deref(), Some("redis://caching-test/late-init"));
        assert_eq!(cached.call(&"kim".to_string()).unwrap(), "KIM");
    }

    #[test]
    fn test_init_replaces_options() {
        let caching = RedisCaching::unconfigured();
        let options = ConnectionOptions::default().with_socket_timeout(Duration::from_secs(2));

        caching.init("redis://caching-test/options", options.clone());

        assert_eq!(caching.options(), options);
        assert_eq!(caching.clone().url(), caching.url());
    }

    #[test]
    fn test_delete() {
        let (caching, fake) = fake_caching("redis://caching-test/delete");
        fake.set("stale", "value").unwrap();

        assert!(caching.delete("stale").unwrap());
        assert!(!caching.delete("stale").unwrap());
        assert_eq!(fake.get("stale").unwrap(), None);
    }

    #[test]
    fn test_out_of_band_change_is_observed() {
        let (caching, fake) = fake_caching("redis://caching-test/out-of-band");
        let cached = caching
            .cache_string(|_: &()| "computed".to_string())
            .with_cache_key(|_: &()| "oob".to_string());

        assert_eq!(cached.call(&()).unwrap(), "computed");

        fake.set("oob", "changed elsewhere").unwrap();
        assert_eq!(cached.call(&()).unwrap(), "changed elsewhere");

        fake.del("oob").unwrap();
        assert_eq!(cached.call(&()).unwrap(), "computed");
    }

    #[test]
    fn test_connector_error_propagates() {
        init_logging();
        let connector = |_: &str, _: &ConnectionOptions| -> CacheResult<SharedBackend> {
            Err(CacheError::Deserialization("refused".to_string()))
        };
        let caching = RedisCaching::with_connector(
            Some("redis://caching-test/refused"),
            ConnectionOptions::default(),
            connector,
        );

        assert!(matches!(caching.get_cache(), Err(CacheError::Deserialization(_))));
        assert!(!ConnectionRegistry::contains("redis://caching-test/refused"));
    }
}
