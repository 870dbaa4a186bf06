//! 統合テスト共通ヘルパー

use std::sync::Arc;

use axum::{Router, body::Body};
use chrono::{DateTime, Utc};
use neurosite_content_service::{
    handler::{NotificationState, SourcesState, router},
    usecase::notification::{NotificationDispatcher, NotificationSettings, TemplateRenderer},
};
use neurosite_domain::{clock::FixedClock, source::SourceRegistry};
use neurosite_infra::{mock::MockNotificationSender, notification::NotificationSender};
use serde_json::Value as JsonValue;

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_936_400, 0).unwrap()
}

/// テスト用 Content Service アプリケーションを構築する
///
/// `sender` が `None` の場合は送信クライアント未構成として扱う。
pub fn create_test_app(sender: Option<MockNotificationSender>) -> Router {
    let registry = Arc::new(SourceRegistry::embedded().clone());
    let sender = sender.map(|s| Arc::new(s) as Arc<dyn NotificationSender>);
    let dispatcher = NotificationDispatcher::new(
        sender,
        TemplateRenderer::new().unwrap(),
        NotificationSettings::new(
            "Dr. Sayuj Krishnan <hellodr@drsayuj.info>",
            vec!["hellodr@drsayuj.info".to_string()],
            "https://www.drsayuj.info",
            "https://g.page/r/drsayuj-hyderabad/review",
        ),
        registry.clone(),
        Arc::new(FixedClock::new(fixed_now())),
    );

    router(
        Arc::new(SourcesState {
            registry,
            blog_registry: Arc::new(SourceRegistry::embedded_blog().clone()),
        }),
        Arc::new(NotificationState { dispatcher }),
    )
}

/// レスポンスボディを JSON として解析する
pub async fn parse_body(response: axum::http::Response<Body>) -> JsonValue {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
