//! 設定管理
//!
//! RegistrarOptions（Consul登録設定）と環境変数ヘルパー

use serde::{Deserialize, Serialize};

/// Consulへのサービス登録設定
///
/// ホストプロセスの設定/CLI層から渡される。登録処理側では読み取り専用。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrarOptions {
    /// ConsulエージェントのURL (デフォルト: "http://127.0.0.1:8500")
    #[serde(default = "default_consul_url")]
    pub url: String,

    /// ACLトークン（空文字列はトークンなし）
    #[serde(default)]
    pub token: String,

    /// ヘルスチェックURL（Consulから到達可能な絶対URL）
    #[serde(default)]
    pub health_check_url: String,

    /// 登録の有効/無効 (デフォルト: false)
    #[serde(default)]
    pub enable: bool,
}

fn default_consul_url() -> String {
    "http://127.0.0.1:8500".to_string()
}

impl Default for RegistrarOptions {
    fn default() -> Self {
        Self {
            url: default_consul_url(),
            token: String::new(),
            health_check_url: String::new(),
            enable: false,
        }
    }
}

impl RegistrarOptions {
    /// Create options for the given health check URL with registration enabled.
    pub fn new(url: impl Into<String>, health_check_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            health_check_url: health_check_url.into(),
            enable: true,
            ..Self::default()
        }
    }

    /// トークンを設定
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// 登録が有効かどうか
    ///
    /// 無効時は呼び出し側が登録処理そのものをスキップする。
    pub fn is_enabled(&self) -> bool {
        self.enable
    }

    /// 空でない場合のみトークンを返す
    pub fn token(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }
}
