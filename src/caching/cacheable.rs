//! # Cacheable Adapters
//!
//! 값의 형태별로 Redis 저장/조회 명령을 매핑하는 어댑터 모음입니다.
//!
//! | 어댑터 | 값 타입 | 저장 | 조회 |
//! |--------|---------|------|------|
//! | [`StringCacheable`] | `String` | `SET` | `GET` |
//! | [`DictStringCacheable`] | `String` | `HSET key field` | `HGET key field` |
//! | [`DictCacheable`] | `HashMap<String, String>` | `HSET key f v ...` | `HGETALL` |
//! | [`ListCacheable`] | `Vec<String>` | `DEL` + `RPUSH` | `LRANGE 0 -1` |
//! | [`BoolCacheable`] | `bool` | `SET "True"/"False"` | `GET` |
//!
//! 어댑터는 상태를 갖지 않으므로 여러 스레드에서 그대로 공유할 수 있습니다.
//! 키가 없으면 `fetch`는 `None`을 반환합니다. Redis는 빈 해시나 빈 리스트를
//! 보관하지 않기 때문에, 빈 컬렉션 역시 `None`으로 조회됩니다.

use std::collections::HashMap;

use log::warn;

use crate::caching::backend::CacheBackend;
use crate::core::errors::{CacheError, CacheResult};

pub type DictCacheType = HashMap<String, String>;
pub type ListCacheType = Vec<String>;

/// 특정 형태의 값을 저장하고 조회하는 전략
pub trait Cacheable: Send + Sync {
    type Value;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &Self::Value) -> CacheResult<()>;

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<Self::Value>>;
}

/// 일반 문자열 값
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCacheable;

impl Cacheable for StringCacheable {
    type Value = String;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &String) -> CacheResult<()> {
        client.set(key, value)
    }

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<String>> {
        client.get(key)
    }
}

/// 해시의 특정 필드 하나에 저장되는 문자열 값
///
/// 같은 키의 해시에 여러 캐시 함수가 필드별로 값을 나눠 담을 때 사용합니다.
///
/// ```rust,ignore
/// let profile_name = DictStringCacheable::new("name");
/// let profile_email = DictStringCacheable::new("email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictStringCacheable {
    pub dict_key: String,
}

impl DictStringCacheable {
    pub fn new(dict_key: impl Into<String>) -> Self {
        Self {
            dict_key: dict_key.into(),
        }
    }
}

impl Cacheable for DictStringCacheable {
    type Value = String;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &String) -> CacheResult<()> {
        client.hset(key, &self.dict_key, value)
    }

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<String>> {
        client.hget(key, &self.dict_key)
    }
}

/// 해시 전체 (`{String: String}`)
///
/// 저장은 기존 해시에 필드를 병합합니다. 저장할 맵에 없는 기존 필드는 남아 있습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictCacheable;

impl Cacheable for DictCacheable {
    type Value = DictCacheType;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &DictCacheType) -> CacheResult<()> {
        if value.is_empty() {
            warn!("empty hash is not stored: {}", key);
            return Ok(());
        }

        let items: Vec<(String, String)> = value
            .iter()
            .map(|(field, v)| (field.clone(), v.clone()))
            .collect();
        client.hset_multiple(key, &items)
    }

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<DictCacheType>> {
        let value = client.hgetall(key)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

/// 문자열 리스트
///
/// Redis에는 리스트 전체를 원자적으로 교체하는 명령이 없으므로 `DEL` 후
/// `RPUSH`로 교체합니다. 두 명령 사이에 다른 클라이언트가 조회하면 키가
/// 비어 있는 것으로 보일 수 있습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCacheable;

impl Cacheable for ListCacheable {
    type Value = ListCacheType;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &ListCacheType) -> CacheResult<()> {
        client.del(key)?;
        if value.is_empty() {
            return Ok(());
        }
        client.rpush(key, value)
    }

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<ListCacheType>> {
        let value = client.lrange(key, 0, -1)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

/// 불리언 값
///
/// `"True"` / `"False"` 문자열로 저장합니다. 조회 시에는 대소문자를 구분하지
/// 않으며 `"1"` / `"0"`도 허용합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCacheable;

impl Cacheable for BoolCacheable {
    type Value = bool;

    fn store(&self, client: &dyn CacheBackend, key: &str, value: &bool) -> CacheResult<()> {
        client.set(key, if *value { "True" } else { "False" })
    }

    fn fetch(&self, client: &dyn CacheBackend, key: &str) -> CacheResult<Option<bool>> {
        match client.get(key)? {
            None => Ok(None),
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(CacheError::Deserialization(format!(
                    "invalid bool at {}: {:?}",
                    key, raw
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRedis;

    #[test]
    fn test_string_cacheable() {
        let client = FakeRedis::new();
        let cacheable = StringCacheable;

        assert_eq!(cacheable.fetch(&client, "greeting").unwrap(), None);

        cacheable.store(&client, "greeting", &"hello".to_string()).unwrap();
        assert_eq!(cacheable.fetch(&client, "greeting").unwrap(), Some("hello".to_string()));

        // 빈 문자열은 부재와 구분됨
        cacheable.store(&client, "empty", &String::new()).unwrap();
        assert_eq!(cacheable.fetch(&client, "empty").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_dict_string_cacheable() {
        let client = FakeRedis::new();
        let name = DictStringCacheable::new("name");
        let email = DictStringCacheable::new("email");

        assert_eq!(name.fetch(&client, "profile:1").unwrap(), None);

        name.store(&client, "profile:1", &"Kim".to_string()).unwrap();
        assert_eq!(name.fetch(&client, "profile:1").unwrap(), Some("Kim".to_string()));
        assert_eq!(email.fetch(&client, "profile:1").unwrap(), None);

        email.store(&client, "profile:1", &"kim@example.com".to_string()).unwrap();
        assert_eq!(client.hgetall("profile:1").unwrap().len(), 2);
    }

    #[test]
    fn test_dict_cacheable() {
        let client = FakeRedis::new();
        let cacheable = DictCacheable;
        let value: DictCacheType = [("a", "1"), ("b", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert_eq!(cacheable.fetch(&client, "hash").unwrap(), None);

        cacheable.store(&client, "hash", &value).unwrap();
        assert_eq!(cacheable.fetch(&client, "hash").unwrap(), Some(value));
    }

    #[test]
    fn test_dict_cacheable_empty_is_absent() {
        let client = FakeRedis::new();

        DictCacheable.store(&client, "hash", &DictCacheType::new()).unwrap();

        assert_eq!(DictCacheable.fetch(&client, "hash").unwrap(), None);
        assert!(!client.exists("hash").unwrap());
    }

    #[test]
    fn test_list_cacheable_replaces_existing() {
        let client = FakeRedis::new();
        let cacheable = ListCacheable;

        assert_eq!(cacheable.fetch(&client, "list").unwrap(), None);

        cacheable
            .store(&client, "list", &vec!["a".to_string(), "b".to_string(), "c".to_string()])
            .unwrap();
        cacheable.store(&client, "list", &vec!["x".to_string()]).unwrap();

        assert_eq!(cacheable.fetch(&client, "list").unwrap(), Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_list_cacheable_empty_clears_key() {
        let client = FakeRedis::new();
        ListCacheable.store(&client, "list", &vec!["a".to_string()]).unwrap();

        ListCacheable.store(&client, "list", &Vec::new()).unwrap();

        assert_eq!(ListCacheable.fetch(&client, "list").unwrap(), None);
    }

    #[test]
    fn test_bool_cacheable() {
        let client = FakeRedis::new();
        let cacheable = BoolCacheable;

        assert_eq!(cacheable.fetch(&client, "flag").unwrap(), None);

        cacheable.store(&client, "flag", &false).unwrap();
        assert_eq!(client.get("flag").unwrap(), Some("False".to_string()));
        assert_eq!(cacheable.fetch(&client, "flag").unwrap(), Some(false));

        cacheable.store(&client, "flag", &true).unwrap();
        assert_eq!(cacheable.fetch(&client, "flag").unwrap(), Some(true));
    }

    #[test]
    fn test_bool_cacheable_rejects_garbage() {
        let client = FakeRedis::new();
        client.set("flag", "perhaps").unwrap();

        let result = BoolCacheable.fetch(&client, "flag");

        assert!(matches!(result, Err(CacheError::Deserialization(_))));
    }

    #[test]
    fn test_wrong_type_propagates() {
        let client = FakeRedis::new();
        client.set("key", "plain").unwrap();

        let result = ListCacheable.fetch(&client, "key");

        assert!(matches!(result, Err(CacheError::Redis(_))));
    }
}
