//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。
//!
//! SMTP にはプロバイダ側のメッセージ ID がないため、送信前に `Message-ID` ヘッダーを
//! 生成し、それを送信結果の ID として返す。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Attachment, Mailbox, Message, MultiPart, SinglePart, header::ContentType},
};
use neurosite_domain::notification::{EmailMessage, MessageId, NotificationError};
use uuid::Uuid;

use super::NotificationSender;

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// Mailpit（開発）や SMTP リレー（検証環境）で使用する。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    pub fn new(host: &str, port: u16) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self { transport }
    }
}

fn parse_mailbox(value: &str, role: &str) -> Result<Mailbox, NotificationError> {
    value
        .parse()
        .map_err(|e| NotificationError::SendFailed(format!("{role}アドレス不正 ({value}): {e}")))
}

/// `EmailMessage` から lettre のメッセージを構築する
///
/// 本文は text/plain と text/html の multipart/alternative。
/// 添付ファイルがある場合は multipart/mixed で包む。
fn build_message(email: &EmailMessage) -> Result<(Message, MessageId), NotificationError> {
    let from = parse_mailbox(&email.from, "送信元")?;
    let message_id = MessageId::new(format!("<{}@{}>", Uuid::new_v4(), from.email.domain()));

    let mut builder = Message::builder()
        .from(from)
        .subject(&email.subject)
        .message_id(Some(message_id.to_string()));
    for to in &email.to {
        builder = builder.to(parse_mailbox(to, "宛先")?);
    }
    for bcc in &email.bcc {
        builder = builder.bcc(parse_mailbox(bcc, "BCC ")?);
    }
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to, "返信先")?);
    }

    let alternative = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(email.text_body.clone()),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(email.html_body.clone()),
        );

    let body = if email.attachments.is_empty() {
        alternative
    } else {
        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attachment in &email.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                NotificationError::SendFailed(format!(
                    "添付ファイルの Content-Type 不正 ({}): {e}",
                    attachment.content_type
                ))
            })?;
            mixed = mixed.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }
        mixed
    };

    let message = builder
        .multipart(body)
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))?;

    Ok((message, message_id))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        let (message, message_id) = build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(message_id)
    }
}
