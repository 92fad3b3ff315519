//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 필수 설정 항목 (하나라도 없으면 서버가 시작되지 않습니다):
//! - `APPWRITE_ENDPOINT`: Appwrite(인증 백엔드) API 주소 (예: "https://cloud.appwrite.io/v1")
//! - `APPWRITE_PROJECT_ID`: Appwrite 프로젝트 ID. 세션 쿠키 이름에도 쓰입니다.
//! - `APPWRITE_API_KEY`: 세션 생성 권한(sessions.write)이 있는 서버용 API 키
//! - `GEMINI_API_KEY`: Gemini API 키
//!
//! 선택 설정 항목:
//! - `GEMINI_MODEL`: 사용할 모델 (기본값: "gemini-1.5-flash")
//! - `GEMINI_BASE_URL`: Gemini API 주소 (기본값: 구글 공식 엔드포인트)
//! - `APP_ENV`: "production"이면 쿠키에 `Secure` 속성을 붙입니다
//! - `PUBLIC_DIR`: 정적 파일 디렉토리 (기본값: "public")
//! - `HOST`, `PORT`: 서버 바인딩 주소

use std::env;
use thiserror::Error;

/// Gemini 공식 REST 엔드포인트
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// 영상 요약에 사용하는 기본 모델
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// 설정 로딩 실패
///
/// 설정이 불완전한 상태로 서버가 반쯤 동작하는 것을 막기 위해,
/// 시작 시점에 이 에러를 반환하고 프로세스를 종료합니다.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 필수 환경변수가 없거나 빈 문자열
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Appwrite(인증 백엔드) 접속 정보
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// API 주소. 끝의 `/`는 제거된 상태로 저장됩니다.
    pub endpoint: String,
    pub project_id: String,
    /// 서버 전용 비밀키: 절대 로그에 남기지 않습니다.
    pub api_key: String,
}

/// Gemini(생성 백엔드) 접속 정보
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 한 번 만들어 검증한 뒤,
/// 각 서비스(쿠키 어댑터, Appwrite 클라이언트, Gemini 클라이언트)에 명시적으로 전달됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    pub appwrite: AppwriteConfig,
    pub gemini: GeminiConfig,
    /// 운영 환경 여부. true이면 세션 쿠키에 `Secure`가 붙습니다.
    pub production: bool,
    /// 정적 파일 디렉토리 경로
    pub public_dir: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 프로세스 환경변수에서 설정을 읽습니다.
    ///
    /// # 에러
    /// 필수 환경변수 중 하나라도 없으면 `ConfigError::Missing`을 반환합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정을 만듭니다.
    ///
    /// `from_env()`는 이 함수에 `env::var`를 넘기는 얇은 래퍼입니다.
    /// 테스트에서는 전역 환경변수를 건드리지 않고 클로저로 값을 주입할 수 있습니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 값이 있어도 공백뿐이면 "없음"으로 취급합니다.
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let appwrite = AppwriteConfig {
            endpoint: required("APPWRITE_ENDPOINT")?.trim_end_matches('/').to_string(),
            project_id: required("APPWRITE_PROJECT_ID")?,
            api_key: required("APPWRITE_API_KEY")?,
        };

        let gemini = GeminiConfig {
            api_key: required("GEMINI_API_KEY")?,
            model: optional("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            base_url: optional("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        };

        Ok(Self {
            appwrite,
            gemini,
            production: optional("APP_ENV", "development").eq_ignore_ascii_case("production"),
            public_dir: optional("PUBLIC_DIR", "public"),
            host: optional("HOST", "0.0.0.0"),
            // 파싱 실패 시 기본값 3000
            port: optional("PORT", "3000").parse().unwrap_or(3000),
        })
    }
}
