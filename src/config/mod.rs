//! # Configuration Module
//!
//! Redis 연결 설정을 담당하는 모듈입니다.
//! 환경 변수와 `.env` 파일을 기반으로 연결 URL과 소켓 옵션을 구성하며,
//! 코드에서 직접 [`ConnectionOptions`]를 만들어 넘길 수도 있습니다.
//!
//! ## 모듈 구성
//!
//! - [`redis_config`] - 연결 옵션, 환경 변수 기반 URL 구성
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use redis_caching::config::{load_env_file, RedisConfig};
//!
//! load_env_file();
//!
//! let url = RedisConfig::url().expect("REDIS_URL or REDIS_HOST must be set");
//! let options = RedisConfig::connection_options();
//! ```

pub mod redis_config;

pub use redis_config::*;

use log::debug;

/// 현재 디렉터리의 `.env` 파일을 읽어 환경 변수로 등록합니다.
///
/// 파일이 없으면 아무 일도 하지 않습니다. 이미 설정된 환경 변수는
/// 덮어쓰지 않습니다.
pub fn load_env_file() {
    match dotenv::dotenv() {
        Ok(path) => debug!(".env loaded from {}", path.display()),
        Err(e) => debug!(".env not loaded: {}", e),
    }
}
