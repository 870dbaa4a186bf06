//! # ヘルスチェック共通型
//!
//! content-service の `/health` エンドポイントが返すレスポンス型。

use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// `status` はサービスの稼働状態、`version` は Cargo.toml のバージョンを示す。
/// `notification_configured` は送信クライアントが構築済みかを示し、
/// 未構成でもサービス自体は `healthy` を返す。
///
/// ## 使用例
///
/// ```
/// use neurosite_shared::HealthResponse;
///
/// let response = HealthResponse::healthy("0.1.0", false);
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 稼働状態（`"healthy"` または `"unhealthy"`）
    pub status:                  String,
    /// アプリケーションバージョン
    pub version:                 String,
    /// メール送信クライアントが構成済みか
    pub notification_configured: bool,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>, notification_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            version: version.into(),
            notification_configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_responseのserializeで正しいjson形状にする() {
        let response = HealthResponse::healthy("0.1.0", true);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "version": "0.1.0",
                "notification_configured": true
            })
        );
    }
}
