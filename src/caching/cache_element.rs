//! # Cache Elements
//!
//! 어댑터([`Cacheable`])와 변환 함수(`load` / `dump`)를 묶어,
//! Redis에 저장되는 표현과 애플리케이션 타입 사이를 오갑니다.
//!
//! - [`SingleType`] - 변환 없이 그대로 저장/조회
//! - [`CacheDateTime`] - `DateTime<Utc>` ⇄ ISO-8601 문자열

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::caching::backend::CacheBackend;
use crate::caching::cacheable::{Cacheable, StringCacheable};
use crate::core::errors::{CacheError, CacheResult};

pub trait CacheElement: Send + Sync {
    /// 애플리케이션에서 다루는 타입
    type Value;
    /// Redis에 저장되는 형태
    type Stored;

    fn cacheable(&self) -> &dyn Cacheable<Value = Self::Stored>;

    fn load(&self, stored: Self::Stored) -> CacheResult<Self::Value>;

    fn dump(&self, value: &Self::Value) -> Self::Stored;

    /// 캐시된 값을 반환합니다. 값이 없으면 `None`.
    fn get_value(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<Self::Value>> {
        match self.cacheable().fetch(client, key)? {
            Some(stored) => self.load(stored).map(Some),
            None => Ok(None),
        }
    }

    fn set_value(&self, client: &dyn CacheBackend, key: &str, value: &Self::Value) -> CacheResult<()> {
        self.cacheable().store(client, key, &self.dump(value))
    }
}

/// 저장 형태와 조회 형태가 같은 요소
///
/// 문자열, 해시, 리스트처럼 Redis 표현을 그대로 쓰는 값에 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct SingleType<C> {
    pub cacheable: C,
}

impl<C> SingleType<C> {
    pub fn new(cacheable: C) -> Self {
        Self { cacheable }
    }
}

impl<C> CacheElement for SingleType<C>
where
    C: Cacheable,
    C::Value: Clone,
{
    type Value = C::Value;
    type Stored = C::Value;

    fn cacheable(&self) -> &dyn Cacheable<Value = C::Value> {
        &self.cacheable
    }

    fn load(&self, stored: C::Value) -> CacheResult<C::Value> {
        Ok(stored)
    }

    fn dump(&self, value: &C::Value) -> C::Value {
        value.clone()
    }
}

/// `DateTime<Utc>`를 RFC 3339 문자열로 저장하는 요소
///
/// 오프셋이 없는 ISO-8601 문자열(`2024-01-02T03:04:05.123456`)도 UTC로
/// 간주해 읽어들입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheDateTime {
    pub cacheable: StringCacheable,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl CacheElement for CacheDateTime {
    type Value = DateTime<Utc>;
    type Stored = String;

    fn cacheable(&self) -> &dyn Cacheable<Value = String> {
        &self.cacheable
    }

    fn load(&self, stored: String) -> CacheResult<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&stored) {
            return Ok(parsed.with_timezone(&Utc));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&stored, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| CacheError::Deserialization(format!("invalid datetime: {:?}", stored)))
    }

    fn dump(&self, value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}
