//! # ヘルスチェックハンドラ
//!
//! Content Service の稼働状態を確認するためのエンドポイント。
//!
//! ## エンドポイント
//!
//! ```text
//! GET /health
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "notification_configured": false
//! }
//! ```
//!
//! メール送信クライアントが未構成でもサービスは `healthy` を返す。
//! 出典 API は送信設定に依存しないため。

use std::sync::Arc;

use axum::{Json, extract::State};
use neurosite_shared::HealthResponse;

use super::NotificationState;

/// ヘルスチェックエンドポイント
pub async fn health_check(State(state): State<Arc<NotificationState>>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        env!("CARGO_PKG_VERSION"),
        state.dispatcher.is_configured(),
    ))
}
