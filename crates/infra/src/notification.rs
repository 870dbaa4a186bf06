//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: Resend（本番用 HTTP API）、SMTP（Mailpit 開発用）、Noop（ログのみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **1 回の試行**: リトライ・キューイングは行わない。タイムアウトは HTTP / SMTP クライアントに委ねる

mod noop;
mod resend;
mod smtp;

use async_trait::async_trait;
use neurosite_domain::notification::{EmailMessage, MessageId, NotificationError};
pub use noop::NoopNotificationSender;
pub use resend::{ResendNotificationSender, is_usable_resend_api_key};
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// 送信に成功した場合はプロバイダが払い出したメッセージ ID を返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError>;

    /// 送信に必要な資格情報が揃っているか
    ///
    /// `false` の場合、ディスパッチャは `send_email` を呼ばずに `configuration_missing` を返す。
    fn is_configured(&self) -> bool {
        true
    }
}
