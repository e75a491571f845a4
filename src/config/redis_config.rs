//! Redis 연결 설정 관리 모듈
//!
//! 연결 URL과 소켓 옵션을 환경 변수 또는 코드로 구성합니다.

use std::env;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::utils::url_utils::build_redis_url;

/// 기본 소켓 타임아웃 (초)
pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 15;

/// Redis 클라이언트 생성 시 사용하는 연결 옵션
///
/// 같은 URL로 여러 번 연결을 요청하면 처음 생성된 연결이 재사용되므로,
/// 옵션은 해당 URL에 대한 첫 연결 시점에만 적용됩니다.
///
/// ## 필드
///
/// - `decode_responses` - `true`면 응답을 엄격한 UTF-8로 디코딩하고 잘못된
///   바이트는 에러로 처리합니다. `false`면 손실 허용 디코딩을 사용합니다.
///   이때 잘못된 바이트는 U+FFFD로 바뀐 채 캐시 히트로 반환되므로, 바이너리
///   값이 저장되는 키에는 `false`를 쓰지 마십시오.
/// - `socket_timeout_secs` - 읽기/쓰기 타임아웃 (기본 15초)
/// - `connect_timeout_secs` - 연결 타임아웃 (없으면 OS 기본값)
///
/// ## 예제
///
/// ```rust,ignore
/// let options = ConnectionOptions::default()
///     .with_socket_timeout(Duration::from_secs(5))
///     .with_decode_responses(false);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    pub decode_responses: bool,
    pub socket_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            decode_responses: true,
            socket_timeout_secs: Some(DEFAULT_SOCKET_TIMEOUT_SECS),
            connect_timeout_secs: None,
        }
    }
}

impl ConnectionOptions {
    pub fn with_decode_responses(mut self, decode_responses: bool) -> Self {
        self.decode_responses = decode_responses;
        self
    }

    /// 초 단위로 저장되며, 1초 미만의 타임아웃은 1초로 올립니다.
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout_secs = Some(whole_seconds(timeout));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = Some(whole_seconds(timeout));
        self
    }

    /// 0초는 타임아웃 없음으로 취급합니다.
    pub fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

fn whole_seconds(timeout: Duration) -> u64 {
    if timeout.is_zero() {
        0
    } else {
        timeout.as_secs().max(1)
    }
}

/// 환경 변수 기반 Redis 설정
///
/// ## 환경 변수
///
/// ```bash
/// # 완성된 URL을 직접 지정 (최우선)
/// export REDIS_URL="rediss://:secret@cache.internal:6380/2"
///
/// # 또는 구성 요소별로 지정
/// export REDIS_HOST="cache.internal:6380"
/// export REDIS_PASSWORD="secret"
/// export REDIS_DB="2"
/// export REDIS_USE_SSL="true"          # 기본값 true
///
/// # 연결 옵션
/// export REDIS_SOCKET_TIMEOUT="15"
/// export REDIS_CONNECT_TIMEOUT="5"
/// export REDIS_DECODE_RESPONSES="true"
/// ```
pub struct RedisConfig;

impl RedisConfig {
    /// 연결 URL을 반환합니다.
    ///
    /// `REDIS_URL`이 있으면 그대로 사용하고, 없으면 `REDIS_HOST`를 기준으로
    /// [`build_redis_url`]을 통해 조립합니다. 둘 다 없으면 `None`입니다.
    pub fn url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            if !url.trim().is_empty() {
                return Some(url);
            }
        }

        let host = env::var("REDIS_HOST").ok().filter(|h| !h.trim().is_empty())?;
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").ok().and_then(|db| parse_db(&db));

        Some(build_redis_url(&host, password.as_deref(), db, Self::use_ssl()))
    }

    pub fn use_ssl() -> bool {
        env::var("REDIS_USE_SSL")
            .map(|v| parse_flag(&v).unwrap_or(true))
            .unwrap_or(true)
    }

    /// 환경 변수에서 연결 옵션을 읽습니다. 값이 없거나 잘못되면 기본값을 씁니다.
    pub fn connection_options() -> ConnectionOptions {
        let defaults = ConnectionOptions::default();

        ConnectionOptions {
            decode_responses: env::var("REDIS_DECODE_RESPONSES")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.decode_responses),
            socket_timeout_secs: env::var("REDIS_SOCKET_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.socket_timeout_secs),
            connect_timeout_secs: env::var("REDIS_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.connect_timeout_secs),
        }
    }
}

fn parse_db(value: &str) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(db) => Some(db),
        Err(_) => {
            warn!("REDIS_DB is not a valid database index ({:?}), using default db", value);
            None
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
