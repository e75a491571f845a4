//! # Connection Registry
//!
//! URL 단위로 캐시 백엔드 인스턴스를 프로세스 전역에서 공유하는 레지스트리입니다.
//!
//! ## 동작 방식
//!
//! 1. 읽기 잠금으로 이미 생성된 인스턴스가 있는지 확인합니다.
//! 2. 없으면 잠금 없이 커넥터로 새 인스턴스를 만듭니다. 연결이 느려도 다른
//!    URL의 조회는 막히지 않습니다.
//! 3. 쓰기 잠금을 잡고 등록합니다. 그 사이 같은 URL이 먼저 등록되었다면
//!    새 인스턴스는 버리고 먼저 등록된 것을 돌려줍니다.
//! 4. 생성에 실패하면 아무것도 등록하지 않고 에러를 돌려줍니다.
//!
//! 한 번 등록된 인스턴스는 [`ConnectionRegistry::remove`]로 제거하기 전까지
//! 같은 URL에 대한 모든 요청에 재사용됩니다. 이후 다른 옵션으로 요청하더라도
//! 처음 생성된 인스턴스가 반환됩니다.
//!
//! ```rust,ignore
//! use redis_caching::core::registry::ConnectionRegistry;
//!
//! let first = ConnectionRegistry::get_or_connect(url, || connector.connect(url, &options))?;
//! let second = ConnectionRegistry::get_or_connect(url, || unreachable!())?;
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use once_cell::sync::Lazy;

use crate::caching::backend::SharedBackend;
use crate::core::errors::CacheResult;
use crate::utils::url_utils::mask_url;

pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, SharedBackend>>,
}

static REGISTRY: Lazy<ConnectionRegistry> = Lazy::new(ConnectionRegistry::new);

impl ConnectionRegistry {
    fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// URL에 해당하는 공유 인스턴스를 반환하고, 없으면 `connect`로 생성해 등록합니다.
    pub fn get_or_connect<F>(url: &str, connect: F) -> CacheResult<SharedBackend>
    where
        F: FnOnce() -> CacheResult<SharedBackend>,
    {
        if let Some(existing) = Self::get(url) {
            return Ok(existing);
        }

        let backend = connect()?;

        let mut connections = REGISTRY
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // 연결하는 동안 다른 스레드가 먼저 등록했을 수 있음
        match connections.entry(url.to_string()) {
            Entry::Occupied(existing) => {
                debug!("📦 Connection already registered, discarding new one: {}", mask_url(url));
                Ok(existing.get().clone())
            }
            Entry::Vacant(slot) => {
                debug!("📦 Registering connection: {}", mask_url(url));
                Ok(slot.insert(backend).clone())
            }
        }
    }

    pub fn get(url: &str) -> Option<SharedBackend> {
        REGISTRY
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// 인스턴스를 직접 등록합니다. 같은 URL의 기존 인스턴스는 교체됩니다.
    pub fn set(url: &str, backend: SharedBackend) {
        REGISTRY
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), backend);
    }

    /// 등록된 인스턴스를 제거합니다. 이미 인스턴스를 들고 있는 호출자에게는
    /// 영향을 주지 않습니다.
    pub fn remove(url: &str) -> Option<SharedBackend> {
        REGISTRY
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
    }

    pub fn contains(url: &str) -> bool {
        REGISTRY
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(url)
    }
}

/// 두 핸들이 같은 인스턴스를 가리키는지 확인합니다.
pub fn same_backend(a: &SharedBackend, b: &SharedBackend) -> bool {
    Arc::ptr_eq(a, b)
}
