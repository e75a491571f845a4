//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`url_utils`] - Redis 연결 URL 조립 및 로그용 마스킹
//!
//! # Examples
//!
//! ```rust,ignore
//! use redis_caching::utils::url_utils::{build_redis_url, mask_url};
//!
//! let url = build_redis_url("cache.internal:6380", Some("secret"), Some(1), true);
//! log::info!("connecting to {}", mask_url(&url));
//! ```

pub mod url_utils;
