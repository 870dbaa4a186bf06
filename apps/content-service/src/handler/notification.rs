//! # 通知ハンドラ
//!
//! 通知リクエストを受け取り、ディスパッチャに送信を委譲する。
//!
//! ## エンドポイント
//!
//! - `POST /api/notifications` - 通知を 1 件送信する
//!
//! リクエストボディは `kind` タグ付きの通知リクエスト。
//! レスポンスは常に `{ "data": NotificationResult }` で、ステータスコードのみ結果で変わる:
//!
//! | 結果 | ステータス |
//! |------|-----------|
//! | 送信成功 | 200 |
//! | テンプレートレンダリング失敗 | 422 |
//! | プロバイダの送信失敗 | 502 |
//! | 送信クライアント未構成 | 503 |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use neurosite_domain::notification::Notification;
use neurosite_shared::ApiResponse;

use crate::usecase::notification::{NotificationDispatcher, dispatcher::DispatchOutcome};

/// 通知 API の共有状態
pub struct NotificationState {
    pub dispatcher: NotificationDispatcher,
}

/// POST /api/notifications
pub async fn send_notification(
    State(state): State<Arc<NotificationState>>,
    Json(notification): Json<Notification>,
) -> impl IntoResponse {
    let outcome = state.dispatcher.deliver(&notification).await;
    let status = status_for(&outcome);

    (status, Json(ApiResponse::new(outcome.into_result())))
}

fn status_for(outcome: &DispatchOutcome) -> StatusCode {
    match outcome {
        DispatchOutcome::Sent(_) => StatusCode::OK,
        DispatchOutcome::TemplateFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DispatchOutcome::SendFailed(_) => StatusCode::BAD_GATEWAY,
        DispatchOutcome::ConfigurationMissing => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use neurosite_domain::notification::MessageId;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DispatchOutcome::Sent(MessageId::new("re_1")), StatusCode::OK)]
    #[case(
        DispatchOutcome::TemplateFailed("x".to_string()),
        StatusCode::UNPROCESSABLE_ENTITY
    )]
    #[case(DispatchOutcome::SendFailed("x".to_string()), StatusCode::BAD_GATEWAY)]
    #[case(DispatchOutcome::ConfigurationMissing, StatusCode::SERVICE_UNAVAILABLE)]
    fn 結果に応じたステータスコードを返す(
        #[case] outcome: DispatchOutcome,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(status_for(&outcome), expected);
    }
}
