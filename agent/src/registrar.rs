//! サービス登録
//!
//! ヘルスチェックURLの検証、Consulクライアントの生成、
//! `ServiceRegistration` の送信を起動時に一度だけ行う。
//! 失敗はログ出力して返すのみでリトライしない。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use svc_registrar_common::config::RegistrarOptions;
use svc_registrar_common::protocol::{AgentServiceCheck, ServiceRegistration};
use tracing::instrument::WithSubscriber;
use tracing::{error, info, Dispatch};

use crate::address::{resolve_health_check_url, ResolvedAddress};
use crate::client::{AgentApi, ConsulClient};
use crate::error::RegistrarResult;

/// デフォルトのサービス名
pub const DEFAULT_SERVICE_NAME: &str = "prometheus";

/// ヘルスチェック間隔
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// ヘルスチェックタイムアウト
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// critical継続後に自動登録解除されるまでの時間
pub const CHECK_DEREGISTER_AFTER: Duration = Duration::from_secs(30);

/// メタデータキー: ビルドバージョン
pub const META_VERSION: &str = "version";

/// メタデータキー: 起動時刻
pub const META_START_TIME: &str = "start_time";

/// `start_time` の書式
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `(エンドポイント, トークン)` からクライアントを生成する
pub type ClientFactory =
    Arc<dyn Fn(&str, Option<&str>) -> RegistrarResult<Box<dyn AgentApi>> + Send + Sync>;

/// このプロセスを一度だけ登録するレジストラー
#[derive(Clone)]
pub struct Registrar {
    service_name: String,
    version: String,
    logger: Option<Dispatch>,
    client_factory: ClientFactory,
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("service_name", &self.service_name)
            .field("version", &self.version)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Registrar {
    /// ビルダーを作成
    pub fn builder() -> RegistrarBuilder {
        RegistrarBuilder::default()
    }

    /// 登録するサービス名
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// メタデータに載せるバージョン
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `options` のConsulエージェントへこのプロセスを登録する
    ///
    /// 送信した登録内容を返す。失敗はログ出力したうえで返し、
    /// 扱いは呼び出し側に任せる。
    ///
    /// `enable` フラグはここでは見ない（[`RegistrarOptions::is_enabled`] を参照）。
    pub async fn register(
        &self,
        options: &RegistrarOptions,
    ) -> RegistrarResult<ServiceRegistration> {
        let dispatch = self.logger.clone().unwrap_or_else(Dispatch::none);
        self.register_inner(options).with_subscriber(dispatch).await
    }

    async fn register_inner(
        &self,
        options: &RegistrarOptions,
    ) -> RegistrarResult<ServiceRegistration> {
        let resolved = resolve_health_check_url(&options.health_check_url)
            .inspect_err(|e| error!(error = %e, "parse health check url"))?;

        let client = (self.client_factory)(options.url.as_str(), options.token())
            .inspect_err(|e| error!(error = %e, url = %options.url, "init Consul"))?;

        let registration = build_registration(
            &self.service_name,
            &self.version,
            &resolved,
            &options.health_check_url,
            Local::now(),
        );

        client
            .service_register(&registration)
            .await
            .inspect_err(|e| error!(error = %e, "register service to consul"))?;

        info!(
            service = %registration.name,
            id = %registration.id,
            address = %registration.address,
            port = registration.port,
            "register service to consul"
        );
        Ok(registration)
    }
}

/// `Registrar` のビルダー
#[derive(Default)]
pub struct RegistrarBuilder {
    service_name: Option<String>,
    version: Option<String>,
    logger: Option<Dispatch>,
    client_factory: Option<ClientFactory>,
}

impl RegistrarBuilder {
    /// サービス名を上書き（デフォルト: `prometheus`）
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// ホストのビルドバージョンを設定（デフォルト: このクレートのバージョン）
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// 登録処理のログ出力先を注入する
    ///
    /// 未設定の場合は何も出力しない。ホストのサブスクライバーへ流すには
    /// `tracing::dispatcher::get_default(Clone::clone)` を渡す。
    pub fn logger(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.logger = Some(dispatch.into());
        self
    }

    /// クライアント生成処理を差し替える
    pub fn client_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> RegistrarResult<Box<dyn AgentApi>> + Send + Sync + 'static,
    {
        self.client_factory = Some(Arc::new(factory));
        self
    }

    /// `Registrar` を構築
    pub fn build(self) -> Registrar {
        Registrar {
            service_name: self
                .service_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            version: self
                .version
                .filter(|version| !version.trim().is_empty())
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            logger: self.logger,
            client_factory: self.client_factory.unwrap_or_else(default_client_factory),
        }
    }
}

fn default_client_factory() -> ClientFactory {
    Arc::new(|endpoint: &str, token: Option<&str>| {
        ConsulClient::new(endpoint, token).map(|client| Box::new(client) as Box<dyn AgentApi>)
    })
}

/// 登録ペイロードを組み立てる
pub fn build_registration(
    service_name: &str,
    version: &str,
    resolved: &ResolvedAddress,
    health_check_url: &str,
    started_at: DateTime<Local>,
) -> ServiceRegistration {
    let meta = BTreeMap::from([
        (META_VERSION.to_string(), version.to_string()),
        (
            META_START_TIME.to_string(),
            started_at.format(START_TIME_FORMAT).to_string(),
        ),
    ]);

    ServiceRegistration {
        id: resolved.instance_id.clone(),
        name: service_name.to_string(),
        tags: vec![service_name.to_string()],
        address: resolved.address.clone(),
        port: resolved.port,
        meta,
        check: Some(AgentServiceCheck::http(
            health_check_url,
            CHECK_INTERVAL,
            CHECK_TIMEOUT,
            CHECK_DEREGISTER_AFTER,
        )),
    }
}

/// デフォルト設定でConsulへ登録する
pub async fn register_with_consul(
    options: &RegistrarOptions,
) -> RegistrarResult<ServiceRegistration> {
    Registrar::default().register(options).await
}
