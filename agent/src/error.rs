//! エラー型定義
//!
//! 登録処理の失敗はいずれもホストプロセスを停止させない。
//! ログ出力したうえで呼び出し側へ型付きで返す。

use thiserror::Error;

/// Registrar error type
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Missing or empty configuration value
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// Malformed health check URL
    #[error("URL parse error: {0}")]
    UrlParse(String),

    /// Registry client could not be constructed
    #[error("Client init error: {0}")]
    ClientInit(String),

    /// The registry rejected the registration or could not be reached
    #[error("Registration error: {0}")]
    Registration(String),
}

impl RegistrarError {
    /// URL起因のエラーかどうか（不正なポートも含む）
    pub fn is_url_error(&self) -> bool {
        matches!(self, Self::UrlParse(_))
    }
}

/// Registrar result type
pub type RegistrarResult<T> = Result<T, RegistrarError>;
