//! # 通知
//!
//! 患者・管理者向けトランザクションメールのドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Notification`] | 通知リクエスト | 通知種別ごとの入力データ（14 種類） |
//! | [`NotificationKind`] | 通知種別 | ログ・API のタグに使う識別子 |
//! | [`EmailMessage`] | メールメッセージ | テンプレートレンダリングの出力。送信プロバイダに渡される |
//! | [`NotificationResult`] | 送信結果 | 呼び出し側に同期的に返す結果。永続化しない |
//!
//! ## 設計方針
//!
//! - **種別ごとの型**: 各通知は専用の構造体を持ち、必須項目はフィールドとして強制する
//! - **例外を返さない**: 送信処理の結果は常に [`NotificationResult`] として返る
//! - **テンプレート分離**: 通知リクエストとメール生成は分離（TemplateRenderer は content-service）

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 通知種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    /// 初回問い合わせへの歓迎メール → 患者
    Welcome,
    /// 予約確定 → 患者
    AppointmentConfirmation,
    /// 予約リマインダー → 患者
    AppointmentReminder,
    /// 診察後サマリー → 患者
    AppointmentSummary,
    /// 緊急アラート → 管理者
    EmergencyAlert,
    /// レビュー依頼 → 患者
    FeedbackRequest,
    /// コンバージョン通知 → 管理者
    AdminAlert,
    /// お問い合わせフォーム → 管理者
    ContactForm,
    /// 術前ブリーフィング → 患者（管理者に BCC）
    PreAppointmentBriefing,
    /// カレンダー招待（.ics 添付） → 患者
    CalendarInvite,
    /// 予約リクエスト → 管理者（返信先は患者）
    AppointmentRequest,
    /// 予約リクエストの受付確認 → 患者
    AppointmentRequestReceived,
    /// ニュースレター登録の確認 → 購読者
    NewsletterSubscription,
    /// ニュースレター登録の通知 → 管理者
    NewsletterSubscriptionNotice,
}

/// 送信プロバイダが払い出したメッセージ ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename:     String,
    pub content_type: String,
    pub content:      Vec<u8>,
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信元（表示名付きアドレス可）
    pub from:        String,
    /// 送信先メールアドレス
    pub to:          Vec<String>,
    /// 返信先
    pub reply_to:    Option<String>,
    /// BCC
    pub bcc:         Vec<String>,
    /// 件名
    pub subject:     String,
    /// HTML 本文
    pub html_body:   String,
    /// プレーンテキスト本文
    pub text_body:   String,
    /// 添付ファイル
    pub attachments: Vec<EmailAttachment>,
}

/// 緊急度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// リマインダーの送信タイミング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderWindow {
    /// 予約の 24 時間前
    #[serde(rename = "24h")]
    TwentyFourHours,
    /// 予約の 1 時間前
    #[serde(rename = "1h")]
    OneHour,
}

impl ReminderWindow {
    /// メール本文に表示するラベル
    pub fn label(self) -> &'static str {
        match self {
            Self::TwentyFourHours => "24 hours before",
            Self::OneHour => "1 hour before",
        }
    }
}

/// コンバージョン通知の優先度
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ConversionPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// 歓迎メール
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeEmail {
    pub recipient_email: String,
    pub recipient_name:  String,
    /// 流入元タグ（"organic" など）。本文には出さず、送信ログの `notification.source_tag` に残す
    pub source_tag:      String,
}

/// 予約確定メール
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub recipient_email:  String,
    pub recipient_name:   String,
    pub appointment_at:   DateTime<Utc>,
    pub appointment_type: String,
    /// 来院前の準備事項（掲載順）
    #[serde(default)]
    pub instructions:     Vec<String>,
}

/// 予約リマインダー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReminder {
    pub recipient_email: String,
    pub recipient_name:  String,
    pub appointment_at:  DateTime<Utc>,
    pub window:          ReminderWindow,
}

/// 診察後サマリー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub recipient_email:  String,
    pub recipient_name:   String,
    pub appointment_type: String,
    pub diagnosis:        String,
    #[serde(default)]
    pub next_steps:       Vec<String>,
    /// フォローアップまでの日数（不要なら None）
    #[serde(default)]
    pub follow_up_days:   Option<u32>,
}

/// 緊急アラート
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub emergency_type: String,
    #[serde(default)]
    pub patient_name:   Option<String>,
    pub severity:       Severity,
}

/// レビュー依頼
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub recipient_email: String,
    pub recipient_name:  String,
    pub procedure_type:  String,
}

/// コンバージョン通知（管理者向け）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAlert {
    pub conversion_type: String,
    pub score:           u32,
    pub page:            String,
    #[serde(default)]
    pub priority:        ConversionPriority,
    pub occurred_at:     DateTime<Utc>,
}

/// お問い合わせフォーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub name:    String,
    pub email:   String,
    #[serde(default)]
    pub phone:   Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// 術前ブリーフィングの各セクション
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingSections {
    #[serde(default)]
    pub preparation:      Option<String>,
    #[serde(default)]
    pub what_to_expect:   Option<String>,
    #[serde(default)]
    pub recovery:         Option<String>,
    #[serde(default)]
    pub questions_to_ask: Option<String>,
}

/// 術前ブリーフィング
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreAppointmentBriefing {
    pub recipient_email:  String,
    pub recipient_name:   String,
    pub condition:        String,
    pub procedure_type:   String,
    #[serde(default)]
    pub appointment_date: Option<String>,
    pub briefing_content: String,
    #[serde(default)]
    pub sections:         BriefingSections,
    /// 出典リストを引くサービスページのスラッグ
    #[serde(default)]
    pub source_slug:      Option<String>,
}

/// カレンダー招待
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarInvite {
    pub recipient_email:  String,
    pub recipient_name:   String,
    pub appointment_at:   DateTime<Utc>,
    pub appointment_type: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
}

fn default_duration_minutes() -> u32 {
    30
}

/// 予約リクエスト（管理者向け）
///
/// 予約フォームの入力をそのまま管理者に転送する。患者への受付確認は
/// [`AppointmentRequest::acknowledgement`] で組み立てる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub name:           String,
    pub email:          String,
    pub phone:          String,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub condition:      Option<String>,
    #[serde(default)]
    pub urgency:        Option<String>,
    #[serde(default)]
    pub message:        Option<String>,
}

impl AppointmentRequest {
    /// 患者に送る受付確認
    pub fn acknowledgement(&self) -> AppointmentRequestReceived {
        AppointmentRequestReceived {
            recipient_email:  self.email.clone(),
            recipient_name:   self.name.clone(),
            appointment_date: self.preferred_date.clone(),
        }
    }
}

/// 予約リクエストの受付確認（患者向け）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequestReceived {
    pub recipient_email:  String,
    pub recipient_name:   String,
    #[serde(default)]
    pub appointment_date: Option<String>,
}

/// ニュースレター登録
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub subscriber_email: String,
    #[serde(default)]
    pub subscriber_name:  Option<String>,
}

impl NewsletterSubscription {
    /// 管理者に送る登録通知
    pub fn notice(&self) -> NewsletterSubscriptionNotice {
        NewsletterSubscriptionNotice {
            subscriber_email: self.subscriber_email.clone(),
            subscriber_name:  self.subscriber_name.clone(),
        }
    }
}

/// ニュースレター登録の通知（管理者向け）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscriptionNotice {
    pub subscriber_email: String,
    #[serde(default)]
    pub subscriber_name:  Option<String>,
}

/// 通知リクエスト
///
/// 呼び出し側が構築し、ディスパッチャに一度だけ渡して破棄する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Welcome(WelcomeEmail),
    AppointmentConfirmation(AppointmentConfirmation),
    AppointmentReminder(AppointmentReminder),
    AppointmentSummary(AppointmentSummary),
    EmergencyAlert(EmergencyAlert),
    FeedbackRequest(FeedbackRequest),
    AdminAlert(AdminAlert),
    ContactForm(ContactForm),
    PreAppointmentBriefing(Box<PreAppointmentBriefing>),
    CalendarInvite(CalendarInvite),
    AppointmentRequest(AppointmentRequest),
    AppointmentRequestReceived(AppointmentRequestReceived),
    NewsletterSubscription(NewsletterSubscription),
    NewsletterSubscriptionNotice(NewsletterSubscriptionNotice),
}

impl Notification {
    /// 通知種別を返す
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Welcome(_) => NotificationKind::Welcome,
            Self::AppointmentConfirmation(_) => NotificationKind::AppointmentConfirmation,
            Self::AppointmentReminder(_) => NotificationKind::AppointmentReminder,
            Self::AppointmentSummary(_) => NotificationKind::AppointmentSummary,
            Self::EmergencyAlert(_) => NotificationKind::EmergencyAlert,
            Self::FeedbackRequest(_) => NotificationKind::FeedbackRequest,
            Self::AdminAlert(_) => NotificationKind::AdminAlert,
            Self::ContactForm(_) => NotificationKind::ContactForm,
            Self::PreAppointmentBriefing(_) => NotificationKind::PreAppointmentBriefing,
            Self::CalendarInvite(_) => NotificationKind::CalendarInvite,
            Self::AppointmentRequest(_) => NotificationKind::AppointmentRequest,
            Self::AppointmentRequestReceived(_) => NotificationKind::AppointmentRequestReceived,
            Self::NewsletterSubscription(_) => NotificationKind::NewsletterSubscription,
            Self::NewsletterSubscriptionNotice(_) => NotificationKind::NewsletterSubscriptionNotice,
        }
    }

    /// 患者宛ての通知であれば患者のメールアドレスを返す
    ///
    /// 管理者宛ての通知は None。
    pub fn patient_email(&self) -> Option<&str> {
        match self {
            Self::Welcome(n) => Some(&n.recipient_email),
            Self::AppointmentConfirmation(n) => Some(&n.recipient_email),
            Self::AppointmentReminder(n) => Some(&n.recipient_email),
            Self::AppointmentSummary(n) => Some(&n.recipient_email),
            Self::FeedbackRequest(n) => Some(&n.recipient_email),
            Self::PreAppointmentBriefing(n) => Some(&n.recipient_email),
            Self::CalendarInvite(n) => Some(&n.recipient_email),
            Self::AppointmentRequestReceived(n) => Some(&n.recipient_email),
            Self::NewsletterSubscription(n) => Some(&n.subscriber_email),
            Self::EmergencyAlert(_)
            | Self::AdminAlert(_)
            | Self::ContactForm(_)
            | Self::AppointmentRequest(_)
            | Self::NewsletterSubscriptionNotice(_) => None,
        }
    }

    /// 流入元タグ（歓迎メールのみ）
    pub fn source_tag(&self) -> Option<&str> {
        match self {
            Self::Welcome(n) => Some(&n.source_tag),
            _ => None,
        }
    }
}

/// 送信結果
///
/// 送信処理は例外を返さず、成功・失敗のいずれもこの型で表現する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success:               bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id:            Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:                 Option<String>,
    /// 送信クライアントが未構成のため送信を試行しなかった
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub configuration_missing: bool,
}

impl NotificationResult {
    /// 送信成功
    pub fn sent(message_id: MessageId) -> Self {
        Self {
            success:               true,
            message_id:            Some(message_id),
            error:                 None,
            configuration_missing: false,
        }
    }

    /// 送信失敗（プロバイダエラー、レンダリング失敗）
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success:               false,
            message_id:            None,
            error:                 Some(error.into()),
            configuration_missing: false,
        }
    }

    /// 送信クライアント未構成
    pub fn configuration_missing(description: impl Into<String>) -> Self {
        Self {
            success:               false,
            message_id:            None,
            error:                 Some(description.into()),
            configuration_missing: true,
        }
    }
}
