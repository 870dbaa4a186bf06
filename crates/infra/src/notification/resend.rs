//! Resend 通知送信実装
//!
//! Resend の HTTP API（`POST /emails`）でメールを送信する。本番環境で使用する。
//!
//! ## API キー
//!
//! `RESEND_API_KEY` が未設定、または開発用プレースホルダ（`re_development_key`）の場合は
//! 送信クライアントを構築しない。判定は [`is_usable_resend_api_key`] で行う。

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use neurosite_domain::notification::{EmailMessage, MessageId, NotificationError};
use serde::{Deserialize, Serialize};

use super::NotificationSender;
use crate::error::InfraError;

/// 開発用のプレースホルダ API キー（送信不可として扱う）
const PLACEHOLDER_API_KEY: &str = "re_development_key";

/// HTTP リクエストのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// API キーが送信に使える値かを判定する
pub fn is_usable_resend_api_key(api_key: Option<&str>) -> bool {
    match api_key.map(str::trim) {
        Some(key) => !key.is_empty() && key != PLACEHOLDER_API_KEY,
        None => false,
    }
}

/// Resend 通知送信
///
/// `reqwest::Client` をラップする。クライアントはプロセス内で 1 つだけ生成し、共有する。
pub struct ResendNotificationSender {
    client:   reqwest::Client,
    api_key:  String,
    endpoint: String,
}

impl ResendNotificationSender {
    /// 新しい Resend 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `api_key`: Resend API キー
    /// - `base_url`: API のベース URL（例: `https://api.resend.com`）
    pub fn new(api_key: String, base_url: &str) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/emails", base_url.trim_end_matches('/')),
        })
    }
}

/// `POST /emails` のリクエストボディ
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from:        &'a str,
    to:          &'a [String],
    subject:     &'a str,
    html:        &'a str,
    text:        &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to:    Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    bcc:         &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename:     &'a str,
    /// Base64 エンコード済みの内容
    content:      String,
    content_type: &'a str,
}

impl<'a> From<&'a EmailMessage> for SendEmailRequest<'a> {
    fn from(email: &'a EmailMessage) -> Self {
        Self {
            from:        &email.from,
            to:          &email.to,
            subject:     &email.subject,
            html:        &email.html_body,
            text:        &email.text_body,
            reply_to:    email.reply_to.as_deref(),
            bcc:         &email.bcc,
            attachments: email
                .attachments
                .iter()
                .map(|a| AttachmentPayload {
                    filename:     &a.filename,
                    content:      STANDARD.encode(&a.content),
                    content_type: &a.content_type,
                })
                .collect(),
        }
    }
}

/// 送信成功レスポンス
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// エラーレスポンス
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    name:    Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// エラーレスポンスから人が読めるメッセージを組み立てる
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            name,
            message: Some(message),
        }) => match name {
            Some(name) => format!("Resend 送信失敗 ({status}, {name}): {message}"),
            None => format!("Resend 送信失敗 ({status}): {message}"),
        },
        _ => format!("Resend 送信失敗 ({status})"),
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest::from(email))
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("Resend 接続失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(describe_error(status, &body)));
        }

        let body: SendEmailResponse = response.json().await.map_err(|e| {
            NotificationError::SendFailed(format!("Resend レスポンス解析失敗: {e}"))
        })?;

        Ok(MessageId::new(body.id))
    }

    fn is_configured(&self) -> bool {
        is_usable_resend_api_key(Some(&self.api_key))
    }
}
