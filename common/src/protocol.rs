//! 通信プロトコル定義
//!
//! Consulエージェント API (`PUT /v1/agent/service/register`) のペイロード。
//! フィールド名はConsulのワイヤーフォーマット（PascalCase）に合わせる。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// サービス登録リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    /// インスタンスID（同一サービス名内で一意）
    #[serde(rename = "ID")]
    pub id: String,
    /// サービス名
    pub name: String,
    /// タグ
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Consulから到達可能なアドレス
    pub address: String,
    /// ポート番号
    pub port: u16,
    /// メタデータ（version, start_time）
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
    /// ヘルスチェック
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<AgentServiceCheck>,
}

/// エージェントのHTTPヘルスチェック定義
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceCheck {
    /// プローブ先URL
    #[serde(rename = "HTTP")]
    pub http: String,
    /// ポーリング間隔 (例: "60s")
    pub interval: String,
    /// プローブタイムアウト (例: "10s")
    pub timeout: String,
    /// critical状態が続いた場合に自動登録解除するまでの時間
    pub deregister_critical_service_after: String,
}

impl AgentServiceCheck {
    /// HTTPチェックを作成
    pub fn http(
        url: impl Into<String>,
        interval: Duration,
        timeout: Duration,
        deregister_after: Duration,
    ) -> Self {
        Self {
            http: url.into(),
            interval: format_duration(interval),
            timeout: format_duration(timeout),
            deregister_critical_service_after: format_duration(deregister_after),
        }
    }
}

/// Format a duration the way the agent API expects it (`"60s"`, `"1500ms"`).
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ServiceRegistration {
        ServiceRegistration {
            id: "10.0.0.5:9100".to_string(),
            name: "prometheus".to_string(),
            tags: vec!["prometheus".to_string()],
            address: "10.0.0.5".to_string(),
            port: 9100,
            meta: BTreeMap::from([("version".to_string(), "0.1.0".to_string())]),
            check: Some(AgentServiceCheck::http(
                "http://10.0.0.5:9100/metrics",
                Duration::from_secs(60),
                Duration::from_secs(10),
                Duration::from_secs(30),
            )),
        }
    }

    #[test]
    fn test_registration_wire_format() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(
            value,
            json!({
                "ID": "10.0.0.5:9100",
                "Name": "prometheus",
                "Tags": ["prometheus"],
                "Address": "10.0.0.5",
                "Port": 9100,
                "Meta": {"version": "0.1.0"},
                "Check": {
                    "HTTP": "http://10.0.0.5:9100/metrics",
                    "Interval": "60s",
                    "Timeout": "10s",
                    "DeregisterCriticalServiceAfter": "30s"
                }
            })
        );
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let mut registration = sample();
        registration.tags.clear();
        registration.meta.clear();
        registration.check = None;

        let value = serde_json::to_value(registration).unwrap();
        assert!(value.get("Tags").is_none());
        assert!(value.get("Meta").is_none());
        assert!(value.get("Check").is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(60)), "60s");
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
    }
}
