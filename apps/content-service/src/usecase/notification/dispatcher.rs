//! # 通知ディスパッチャ
//!
//! 構成ガード → テンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **構成ガード**: 送信クライアントが構築されていなければ送信を試行せず
//!   `configuration_missing` の結果を返す
//! - **エラーを返さない**: 送信失敗・レンダリング失敗も [`NotificationResult`] として返す
//! - **1 通知 1 送信**: リトライ・キューイングは行わない
//! - **依存性注入**: 送信クライアント、出典レジストリ、時刻は起動時に注入する

use std::sync::Arc;

use neurosite_domain::{
    clock::Clock,
    notification::{
        AdminAlert,
        AppointmentConfirmation,
        AppointmentReminder,
        AppointmentRequest,
        AppointmentRequestReceived,
        AppointmentSummary,
        CalendarInvite,
        ContactForm,
        EmergencyAlert,
        FeedbackRequest,
        MessageId,
        NewsletterSubscription,
        NewsletterSubscriptionNotice,
        Notification,
        NotificationResult,
        PreAppointmentBriefing,
        WelcomeEmail,
    },
    source::SourceRegistry,
};
use neurosite_infra::notification::NotificationSender;
use neurosite_shared::{event_log::event, log_business_event};

use super::{NotificationSettings, RenderEnvironment, TemplateRenderer};

/// 送信クライアント未構成時のエラーメッセージ
pub const CONFIGURATION_MISSING_MESSAGE: &str = "メール送信クライアントが構成されていません";

/// 1 回の送信処理の結果
///
/// [`NotificationResult`] より細かく失敗の段階を区別する。HTTP ハンドラが
/// ステータスコードの決定に使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 送信成功（プロバイダが採番したメッセージ ID）
    Sent(MessageId),
    /// 送信クライアント未構成のため試行しなかった
    ConfigurationMissing,
    /// テンプレートレンダリングに失敗（送信は試行していない）
    TemplateFailed(String),
    /// プロバイダが送信を拒否した、または通信に失敗した
    SendFailed(String),
}

impl DispatchOutcome {
    pub fn into_result(self) -> NotificationResult {
        match self {
            Self::Sent(message_id) => NotificationResult::sent(message_id),
            Self::ConfigurationMissing => {
                NotificationResult::configuration_missing(CONFIGURATION_MISSING_MESSAGE)
            }
            Self::TemplateFailed(error) | Self::SendFailed(error) => {
                NotificationResult::failed(error)
            }
        }
    }
}

/// 本人宛て・管理者宛ての 2 通を送る処理の結果
///
/// 2 通は独立に送信し、一方の失敗はもう一方の送信を妨げない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedNotificationResult {
    /// 患者・購読者宛て
    pub recipient: NotificationResult,
    /// 管理者宛て
    pub admin:     NotificationResult,
}

/// 通知ディスパッチャ
///
/// プロセス起動時に一度だけ構築し、リクエスト間で共有する。
/// 内部に可変状態を持たないため、並行して呼び出してよい。
pub struct NotificationDispatcher {
    sender:            Option<Arc<dyn NotificationSender>>,
    template_renderer: TemplateRenderer,
    settings:          NotificationSettings,
    sources:           Arc<SourceRegistry>,
    clock:             Arc<dyn Clock>,
}

impl NotificationDispatcher {
    /// `sender` が `None`、または資格情報の揃っていない送信クライアントの場合、
    /// すべての送信は `configuration_missing` になる
    pub fn new(
        sender: Option<Arc<dyn NotificationSender>>,
        template_renderer: TemplateRenderer,
        settings: NotificationSettings,
        sources: Arc<SourceRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sender,
            template_renderer,
            settings,
            sources,
            clock,
        }
    }

    /// 送信クライアントが構成済みか
    pub fn is_configured(&self) -> bool {
        self.configured_sender().is_some()
    }

    fn configured_sender(&self) -> Option<&dyn NotificationSender> {
        self.sender
            .as_deref()
            .filter(|sender| sender.is_configured())
    }

    /// 通知を送信し、結果を返す
    pub async fn dispatch(&self, notification: Notification) -> NotificationResult {
        self.deliver(&notification).await.into_result()
    }

    /// 通知を送信し、失敗の段階を区別した結果を返す
    ///
    /// 構成ガード → レンダリング → 送信の順に処理し、送信は高々 1 回。
    pub async fn deliver(&self, notification: &Notification) -> DispatchOutcome {
        let kind: &str = notification.kind().into();
        let source_tag = notification.source_tag();

        let Some(sender) = self.configured_sender() else {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.result = event::result::SKIPPED,
                notification.kind = kind,
                notification.source_tag = source_tag,
                "送信クライアント未構成のため通知をスキップ"
            );
            return DispatchOutcome::ConfigurationMissing;
        };

        let env = RenderEnvironment {
            settings: &self.settings,
            sources:  &self.sources,
            now:      self.clock.now(),
        };

        // テンプレートレンダリング
        let email = match self.template_renderer.render(notification, &env) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    notification.kind = kind,
                    "通知テンプレートのレンダリングに失敗"
                );
                return DispatchOutcome::TemplateFailed(e.to_string());
            }
        };

        // メール送信
        match sender.send_email(&email).await {
            Ok(message_id) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.kind = kind,
                    notification.source_tag = source_tag,
                    notification.recipients = email.to.len(),
                    notification.message_id = %message_id,
                    "通知メール送信成功"
                );
                DispatchOutcome::Sent(message_id)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    notification.kind = kind,
                    notification.recipients = email.to.len(),
                    error = %e,
                    "通知メール送信失敗"
                );
                DispatchOutcome::SendFailed(e.to_string())
            }
        }
    }

    /// 歓迎メール（初回問い合わせ）
    pub async fn send_welcome(&self, request: WelcomeEmail) -> NotificationResult {
        self.dispatch(Notification::Welcome(request)).await
    }

    /// 予約確定メール
    pub async fn send_appointment_confirmation(
        &self,
        request: AppointmentConfirmation,
    ) -> NotificationResult {
        self.dispatch(Notification::AppointmentConfirmation(request))
            .await
    }

    /// 予約リマインダー
    pub async fn send_appointment_reminder(
        &self,
        request: AppointmentReminder,
    ) -> NotificationResult {
        self.dispatch(Notification::AppointmentReminder(request))
            .await
    }

    /// 診察後サマリー
    pub async fn send_appointment_summary(
        &self,
        request: AppointmentSummary,
    ) -> NotificationResult {
        self.dispatch(Notification::AppointmentSummary(request))
            .await
    }

    /// 緊急アラート（管理者宛て）
    pub async fn send_emergency_alert(&self, request: EmergencyAlert) -> NotificationResult {
        self.dispatch(Notification::EmergencyAlert(request)).await
    }

    /// フィードバック依頼
    pub async fn send_feedback_request(&self, request: FeedbackRequest) -> NotificationResult {
        self.dispatch(Notification::FeedbackRequest(request)).await
    }

    /// コンバージョン通知（管理者宛て）
    pub async fn send_admin_alert(&self, request: AdminAlert) -> NotificationResult {
        self.dispatch(Notification::AdminAlert(request)).await
    }

    /// お問い合わせフォームの転送（管理者宛て、返信先は送信者）
    pub async fn send_contact_form(&self, request: ContactForm) -> NotificationResult {
        self.dispatch(Notification::ContactForm(request)).await
    }

    /// 事前説明メール（管理者に BCC）
    pub async fn send_pre_appointment_briefing(
        &self,
        request: PreAppointmentBriefing,
    ) -> NotificationResult {
        self.dispatch(Notification::PreAppointmentBriefing(Box::new(request)))
            .await
    }

    /// カレンダー招待（`.ics` 添付）
    pub async fn send_calendar_invite(&self, request: CalendarInvite) -> NotificationResult {
        self.dispatch(Notification::CalendarInvite(request)).await
    }

    /// 予約リクエストの転送（管理者宛て、返信先は患者）
    pub async fn send_appointment_request(
        &self,
        request: AppointmentRequest,
    ) -> NotificationResult {
        self.dispatch(Notification::AppointmentRequest(request))
            .await
    }

    /// 予約リクエストの受付確認（患者宛て）
    pub async fn send_appointment_request_received(
        &self,
        request: AppointmentRequestReceived,
    ) -> NotificationResult {
        self.dispatch(Notification::AppointmentRequestReceived(request))
            .await
    }

    /// ニュースレター登録の確認（購読者宛て）
    pub async fn send_newsletter_subscription(
        &self,
        request: NewsletterSubscription,
    ) -> NotificationResult {
        self.dispatch(Notification::NewsletterSubscription(request))
            .await
    }

    /// ニュースレター登録の通知（管理者宛て）
    pub async fn send_newsletter_subscription_notice(
        &self,
        request: NewsletterSubscriptionNotice,
    ) -> NotificationResult {
        self.dispatch(Notification::NewsletterSubscriptionNotice(request))
            .await
    }

    /// 予約リクエストを管理者に転送し、患者に受付確認を送る
    pub async fn request_appointment(
        &self,
        request: AppointmentRequest,
    ) -> PairedNotificationResult {
        let acknowledgement = request.acknowledgement();
        let admin = self.send_appointment_request(request).await;
        let recipient = self
            .send_appointment_request_received(acknowledgement)
            .await;

        PairedNotificationResult { recipient, admin }
    }

    /// 購読者に登録確認を送り、管理者に登録を通知する
    pub async fn subscribe_newsletter(
        &self,
        subscription: NewsletterSubscription,
    ) -> PairedNotificationResult {
        let notice = subscription.notice();
        let recipient = self.send_newsletter_subscription(subscription).await;
        let admin = self.send_newsletter_subscription_notice(notice).await;

        PairedNotificationResult { recipient, admin }
    }
}
