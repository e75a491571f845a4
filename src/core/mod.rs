//! # Core Module
//!
//! 캐싱 계층 전반에서 공유하는 기반 기능을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`registry`] - 연결 레지스트리
//! - URL 단위로 백엔드 인스턴스를 프로세스 전역에서 공유
//! - `once_cell::sync::Lazy` + `RwLock` 기반의 지연 초기화
//!
//! ### [`errors`] - 에러 처리
//! - **CacheError**: 캐싱 계층 전역 에러 타입
//! - **CacheResult**: `Result<T, CacheError>` 별칭
//! - **ErrorContext**: 외부 에러에 문맥을 붙이는 확장 트레이트

pub mod errors;
pub mod registry;
