//! Service Registrar Common
//!
//! 登録設定とConsulエージェントAPIの共通型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// 通信プロトコル（サービス登録ペイロード）
pub mod protocol;

pub use config::RegistrarOptions;
pub use protocol::{AgentServiceCheck, ServiceRegistration};
