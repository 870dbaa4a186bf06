//! # テスト用モック送信
//!
//! ディスパッチャのテストで使用するインメモリの `NotificationSender`。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! neurosite-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use neurosite_domain::notification::{EmailMessage, MessageId, NotificationError};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信内容を記録するモック
///
/// `failing` で生成すると、呼び出しを記録したうえで常に `SendFailed` を返す。
/// `unconfigured` で生成すると、資格情報が揃っていない送信クライアントとして振る舞う。
#[derive(Clone)]
pub struct MockNotificationSender {
    sent:       Arc<Mutex<Vec<EmailMessage>>>,
    calls:      Arc<AtomicUsize>,
    message_id: String,
    failure:    Option<String>,
    configured: bool,
}

impl MockNotificationSender {
    /// 常に成功し、`mock-message-id` を返すモック
    pub fn new() -> Self {
        Self::with_message_id("mock-message-id")
    }

    /// 指定したメッセージ ID を返すモック
    pub fn with_message_id(message_id: impl Into<String>) -> Self {
        Self {
            sent:       Arc::new(Mutex::new(Vec::new())),
            calls:      Arc::new(AtomicUsize::new(0)),
            message_id: message_id.into(),
            failure:    None,
            configured: true,
        }
    }

    /// 常に失敗するモック
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    /// 未構成として振る舞うモック（`is_configured` が `false`）
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// 送信に成功したメッセージ
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// `send_email` の呼び出し回数（失敗を含む）
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(NotificationError::SendFailed(reason.clone()));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(MessageId::new(self.message_id.clone()))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
