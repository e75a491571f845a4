//! # Memoizing Wrappers
//!
//! 함수 호출을 가로채서 캐시를 먼저 확인하고, 캐시 미스일 때만 원래 함수를
//! 실행하는 래퍼입니다.
//!
//! ## 호출 흐름
//!
//! ```text
//! call(args)
//!   │
//!   ├─ 1. key = cache_key(args)          ← 키 함수가 없으면 MissingCacheKey
//!   ├─ 2. element.get_value(key)
//!   │     ├─ Some(value) → 반환 (함수 실행 없음)
//!   │     └─ None
//!   ├─ 3. value = func(args)
//!   ├─ 4. element.set_value(key, value)
//!   ├─ 5. ttl = expire_in(value, args) → EXPIRE key ttl
//!   └─ 6. value 반환
//! ```
//!
//! 동시에 같은 키로 캐시 미스가 나면 양쪽 모두 함수를 실행하고 저장합니다.
//! 마지막 저장이 남습니다.

use std::time::Duration;

use log::debug;

use crate::caching::backend::CacheBackend;
use crate::caching::cache_element::CacheElement;
use crate::caching::redis_caching::RedisCaching;
use crate::core::errors::{CacheError, CacheResult};

pub type KeyFn<A> = dyn Fn(&A) -> String + Send + Sync;
pub type ExpireFn<A, V> = dyn Fn(&V, &A) -> Option<Duration> + Send + Sync;
pub type MethodKeyFn<R, A> = dyn Fn(&R, &A) -> String + Send + Sync;
pub type MethodExpireFn<R, A, V> = dyn Fn(&V, &R, &A) -> Option<Duration> + Send + Sync;

enum Expiry<F: ?Sized> {
    Never,
    After(Duration),
    Computed(Box<F>),
}

impl<F: ?Sized> Expiry<F> {
    fn resolve(&self, compute: impl FnOnce(&F) -> Option<Duration>) -> Option<Duration> {
        match self {
            Expiry::Never => None,
            Expiry::After(ttl) => Some(*ttl),
            Expiry::Computed(f) => compute(&**f),
        }
    }
}

/// Redis `EXPIRE`에 넘길 초 단위 값. 0이면 만료를 설정하지 않고,
/// 1초 미만은 1초로 올립니다.
fn expire_seconds(ttl: Duration) -> Option<i64> {
    if ttl.is_zero() {
        return None;
    }
    Some(i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX))
}

fn memoize<E: CacheElement>(
    caching: &RedisCaching,
    element: &E,
    key: &str,
    compute: impl FnOnce() -> E::Value,
    expire_in: impl FnOnce(&E::Value) -> Option<Duration>,
) -> CacheResult<E::Value> {
    let client = caching.get_cache()?;

    if let Some(value) = element.get_value(client.as_ref(), key)? {
        debug!("cache hit: {}", key);
        return Ok(value);
    }

    debug!("cache miss: {}", key);
    let value = compute();
    element.set_value(client.as_ref(), key, &value)?;

    if let Some(seconds) = expire_in(&value).and_then(expire_seconds) {
        debug!("cache expire: {} in {}s", key, seconds);
        client.expire(key, seconds)?;
    }

    Ok(value)
}

/// 함수 결과를 자동으로 캐싱하는 래퍼
///
/// [`RedisCaching`]의 `cache_*` 메서드로 생성합니다. `A`는 함수 인자 묶음
/// (보통 튜플)입니다.
///
/// ```rust,ignore
/// let weather = caching
///     .cache_dict(|(city, date): &(String, NaiveDate)| api.fetch_weather(city, *date))
///     .with_cache_key(|(city, date): &(String, NaiveDate)| format!("weather:{}:{}", city, date))
///     .with_expire_in_fn(|forecast, _| {
///         // 예보가 확정되면 오래 보관
///         if forecast.contains_key("final") { Some(Duration::from_secs(86_400)) } else { Some(Duration::from_secs(600)) }
///     });
///
/// let forecast = weather.call(&("Seoul".to_string(), today))?;
/// ```
pub struct CachedFunction<A, E: CacheElement> {
    caching: RedisCaching,
    name: &'static str,
    element: E,
    func: Box<dyn Fn(&A) -> E::Value + Send + Sync>,
    key_fn: Option<Box<KeyFn<A>>>,
    expiry: Expiry<ExpireFn<A, E::Value>>,
}

impl<A, E: CacheElement> CachedFunction<A, E> {
    pub(crate) fn new<F>(caching: RedisCaching, element: E, func: F) -> Self
    where
        F: Fn(&A) -> E::Value + Send + Sync + 'static,
    {
        Self {
            caching,
            name: std::any::type_name::<F>(),
            element,
            func: Box::new(func),
            key_fn: None,
            expiry: Expiry::Never,
        }
    }

    pub fn with_cache_key<K>(mut self, key_fn: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.cache_key(key_fn);
        self
    }

    /// 키 생성 함수를 지정하거나 교체합니다.
    pub fn cache_key<K>(&mut self, key_fn: K) -> &mut Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Box::new(key_fn));
        self
    }

    /// 저장 후 고정된 만료 시간을 적용합니다.
    pub fn with_expire_in(mut self, ttl: Duration) -> Self {
        self.expiry = Expiry::After(ttl);
        self
    }

    pub fn with_expire_in_fn<T>(mut self, expire_fn: T) -> Self
    where
        T: Fn(&E::Value, &A) -> Option<Duration> + Send + Sync + 'static,
    {
        self.expire_in(expire_fn);
        self
    }

    /// 저장된 값과 호출 인자로 만료 시간을 계산하는 함수를 지정합니다.
    /// 고정 만료 시간이 있었다면 대체합니다.
    pub fn expire_in<T>(&mut self, expire_fn: T) -> &mut Self
    where
        T: Fn(&E::Value, &A) -> Option<Duration> + Send + Sync + 'static,
    {
        self.expiry = Expiry::Computed(Box::new(expire_fn));
        self
    }

    /// 캐시된 값이 있으면 반환하고, 없으면 함수를 실행해 저장한 뒤 반환합니다.
    pub fn call(&self, args: &A) -> CacheResult<E::Value> {
        let key = self.cache_key_for(args)?;

        memoize(
            &self.caching,
            &self.element,
            &key,
            || (self.func)(args),
            |value| self.expiry.resolve(|expire_fn| expire_fn(value, args)),
        )
    }

    pub fn cache_key_for(&self, args: &A) -> CacheResult<String> {
        match &self.key_fn {
            Some(key_fn) => Ok(key_fn(args)),
            None => Err(CacheError::MissingCacheKey(self.name.to_string())),
        }
    }

    /// `args`에 해당하는 캐시 항목을 삭제합니다.
    pub fn invalidate(&self, args: &A) -> CacheResult<bool> {
        let key = self.cache_key_for(args)?;
        self.caching.delete(&key)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 메서드 결과를 캐싱하는 래퍼
///
/// 원래 함수, 키 함수, 만료 함수 모두 수신자 `&R`와 호출 인자 `&A`를 받습니다.
/// 수신자를 고정하려면 [`bind`](Self::bind)를 사용합니다.
pub struct CachedMethod<R, A, E: CacheElement> {
    caching: RedisCaching,
    name: &'static str,
    element: E,
    func: Box<dyn Fn(&R, &A) -> E::Value + Send + Sync>,
    key_fn: Option<Box<MethodKeyFn<R, A>>>,
    expiry: Expiry<MethodExpireFn<R, A, E::Value>>,
}

impl<R, A, E: CacheElement> CachedMethod<R, A, E> {
    pub(crate) fn new<F>(caching: RedisCaching, element: E, func: F) -> Self
    where
        F: Fn(&R, &A) -> E::Value + Send + Sync + 'static,
    {
        Self {
            caching,
            name: std::any::type_name::<F>(),
            element,
            func: Box::new(func),
            key_fn: None,
            expiry: Expiry::Never,
        }
    }

    pub fn with_cache_key<K>(mut self, key_fn: K) -> Self
    where
        K: Fn(&R, &A) -> String + Send + Sync + 'static,
    {
        self.cache_key(key_fn);
        self
    }

    pub fn cache_key<K>(&mut self, key_fn: K) -> &mut Self
    where
        K: Fn(&R, &A) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Box::new(key_fn));
        self
    }

    pub fn with_expire_in(mut self, ttl: Duration) -> Self {
        self.expiry = Expiry::After(ttl);
        self
    }

    pub fn with_expire_in_fn<T>(mut self, expire_fn: T) -> Self
    where
        T: Fn(&E::Value, &R, &A) -> Option<Duration> + Send + Sync + 'static,
    {
        self.expire_in(expire_fn);
        self
    }

    pub fn expire_in<T>(&mut self, expire_fn: T) -> &mut Self
    where
        T: Fn(&E::Value, &R, &A) -> Option<Duration> + Send + Sync + 'static,
    {
        self.expiry = Expiry::Computed(Box::new(expire_fn));
        self
    }

    pub fn call(&self, receiver: &R, args: &A) -> CacheResult<E::Value> {
        let key = self.cache_key_for(receiver, args)?;

        memoize(
            &self.caching,
            &self.element,
            &key,
            || (self.func)(receiver, args),
            |value| self.expiry.resolve(|expire_fn| expire_fn(value, receiver, args)),
        )
    }

    pub fn cache_key_for(&self, receiver: &R, args: &A) -> CacheResult<String> {
        match &self.key_fn {
            Some(key_fn) => Ok(key_fn(receiver, args)),
            None => Err(CacheError::MissingCacheKey(self.name.to_string())),
        }
    }

    pub fn invalidate(&self, receiver: &R, args: &A) -> CacheResult<bool> {
        let key = self.cache_key_for(receiver, args)?;
        self.caching.delete(&key)
    }

    /// 수신자를 고정한 호출 핸들을 반환합니다.
    pub fn bind<'a>(&'a self, receiver: &'a R) -> BoundMethod<'a, R, A, E> {
        BoundMethod {
            method: self,
            receiver,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 수신자가 고정된 [`CachedMethod`]
pub struct BoundMethod<'a, R, A, E: CacheElement> {
    method: &'a CachedMethod<R, A, E>,
    receiver: &'a R,
}

impl<R, A, E: CacheElement> BoundMethod<'_, R, A, E> {
    pub fn call(&self, args: &A) -> CacheResult<E::Value> {
        self.method.call(self.receiver, args)
    }

    pub fn invalidate(&self, args: &A) -> CacheResult<bool> {
        self.method.invalidate(self.receiver, args)
    }
}
