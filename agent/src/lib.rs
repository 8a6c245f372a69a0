//! Service Registrar Agent
//!
//! 起動時に一度だけ、このプロセスをHTTPヘルスチェック付きで
//! Consulエージェントへサービス登録する

#![warn(missing_docs)]

/// ヘルスチェックURLからのアドレス/ポート解決
pub mod address;

/// Consulエージェント通信クライアント
pub mod client;

/// エラー型
pub mod error;

/// ロギング初期化
pub mod logging;

/// サービス登録
pub mod registrar;

pub use address::{resolve_health_check_url, ResolvedAddress};
pub use client::{AgentApi, ConsulClient};
pub use error::{RegistrarError, RegistrarResult};
pub use registrar::{register_with_consul, Registrar, RegistrarBuilder};
pub use svc_registrar_common::{RegistrarOptions, ServiceRegistration};
