//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、送信ロジックはユースケース層に委譲

pub mod health;
pub mod notification;
pub mod sources;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use health::health_check;
pub use notification::{NotificationState, send_notification};
pub use sources::{SourcesState, get_blog_sources, get_sources};

/// 全エンドポイントのルーターを組み立てる
pub fn router(sources_state: Arc<SourcesState>, notification_state: Arc<NotificationState>) -> Router {
    Router::new()
        .route("/api/sources/{slug}", get(get_sources))
        .route("/api/blog-sources/{slug}", get(get_blog_sources))
        .with_state(sources_state)
        .route("/health", get(health_check))
        .route("/api/notifications", post(send_notification))
        .with_state(notification_state)
}
