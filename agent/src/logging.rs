//! ロギング初期化ユーティリティ
//!
//! ホストプロセス側で使う。登録処理自体はサブスクライバーを設定しない。

use tracing_subscriber::EnvFilter;

/// ログレベル指定の環境変数
pub const LOG_LEVEL_ENV: &str = "REGISTRAR_LOG_LEVEL";

const DEFAULT_FILTER: &str = "info";

/// 環境変数からログフィルタを組み立てる
///
/// `REGISTRAR_LOG_LEVEL` → `RUST_LOG` → `info` の順に参照する。
pub fn env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&level) {
            return filter;
        }
        eprintln!("Invalid log level '{level}', falling back to '{DEFAULT_FILTER}'");
        return EnvFilter::new(DEFAULT_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// グローバルサブスクライバーを初期化する
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init()
}
