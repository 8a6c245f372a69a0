//! Consulエージェント通信クライアント
//!
//! `AgentApi` traitで登録呼び出しを抽象化し、テストではモックに差し替える。

use async_trait::async_trait;
use reqwest::Client;
use svc_registrar_common::protocol::ServiceRegistration;
use tracing::debug;
use url::Url;

use crate::error::{RegistrarError, RegistrarResult};

/// エンドポイント未指定時のConsulエージェントアドレス
pub const DEFAULT_CONSUL_ADDRESS: &str = "127.0.0.1:8500";

/// サービス登録APIのパス
pub const SERVICE_REGISTER_PATH: &str = "/v1/agent/service/register";

/// ACLトークンヘッダー
pub const TOKEN_HEADER: &str = "X-Consul-Token";

/// Registry agent operations used by the registrar
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// サービスを登録する（同じIDの再登録は上書き）
    async fn service_register(&self, registration: &ServiceRegistration) -> RegistrarResult<()>;
}

/// Consulエージェント HTTP API クライアント
///
/// 1回の登録呼び出しごとに生成する。タイムアウトはreqwestのデフォルトのまま。
#[derive(Debug, Clone)]
pub struct ConsulClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ConsulClient {
    /// エンドポイントURLとトークンからクライアントを作成
    ///
    /// トークンは [`RegistrarOptions::token`](svc_registrar_common::RegistrarOptions::token) で正規化済みの値を渡す。
    pub fn new(endpoint: &str, token: Option<&str>) -> RegistrarResult<Self> {
        let base_url = normalize_endpoint(endpoint)?;
        let http = Client::builder()
            .build()
            .map_err(|e| RegistrarError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.map(str::to_string),
        })
    }

    fn register_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            SERVICE_REGISTER_PATH
        )
    }
}

#[async_trait]
impl AgentApi for ConsulClient {
    async fn service_register(&self, registration: &ServiceRegistration) -> RegistrarResult<()> {
        let url = self.register_url();
        debug!(url = %url, id = %registration.id, "Sending service registration");

        let mut request = self.http.put(&url).json(registration);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RegistrarError::Registration(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistrarError::Registration(format!(
                "Unexpected response code: {} ({})",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(())
    }
}

/// エンドポイント文字列をエージェントのベースURLに正規化する
///
/// 空なら `127.0.0.1:8500`、スキームなしなら `http://` を補う。
/// http/https以外（unixソケットの `unix://` など）は未対応で `ClientInit` になる。
pub fn normalize_endpoint(endpoint: &str) -> RegistrarResult<Url> {
    let endpoint = endpoint.trim();
    let endpoint = if endpoint.is_empty() {
        DEFAULT_CONSUL_ADDRESS
    } else {
        endpoint
    };
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        RegistrarError::ClientInit(format!("invalid consul address {endpoint:?}: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RegistrarError::ClientInit(format!(
            "unsupported consul address scheme {:?}",
            url.scheme()
        )));
    }
    if url.host().is_none() {
        return Err(RegistrarError::ClientInit(format!(
            "invalid consul address {endpoint:?}: missing host"
        )));
    }
    Ok(url)
}
