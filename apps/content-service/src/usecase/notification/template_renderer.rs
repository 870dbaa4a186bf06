//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **種別ごとに 1 組**: テンプレート名は通知種別（`welcome.html` / `welcome.txt` など）
//! - **自動エスケープ**: `.html` テンプレートは tera が変数をエスケープする。
//!   設定値の URL のみ `safe` フィルタで出力する
//! - **宛先の決定**: 患者宛ては本人、管理者宛ては [`NotificationSettings::admin_addresses`]

use chrono::{DateTime, Datelike, Utc};
use neurosite_domain::{
    clock::{format_ist, ist},
    notification::{
        ConversionPriority,
        EmailAttachment,
        EmailMessage,
        Notification,
        NotificationError,
    },
    source::SourceRegistry,
};
use tera::{Context, Tera};
use uuid::Uuid;

use super::{
    NotificationSettings,
    calendar::{build_ics, ics_attachment},
};

/// お問い合わせの件名が未入力の場合の表記
const DEFAULT_CONTACT_SUBJECT: &str = "General Inquiry";

/// 緊急アラートで患者名が未入力の場合の表記
const UNKNOWN_PATIENT: &str = "Unknown";

/// ニュースレター登録で名前が未入力の場合の宛名
const DEFAULT_SUBSCRIBER_NAME: &str = "Subscriber";

/// レンダリング時に参照する、リクエストに依存しない値
pub struct RenderEnvironment<'a> {
    pub settings: &'a NotificationSettings,
    /// 事前説明メールの出典リストの取得元
    pub sources:  &'a SourceRegistry,
    /// 発生時刻・DTSTAMP・著作権表記の年に使う現在時刻
    pub now:      DateTime<Utc>,
}

/// テンプレート名以外のレンダリング結果
struct TemplateParams {
    subject:     String,
    to:          Vec<String>,
    reply_to:    Option<String>,
    bcc:         Vec<String>,
    context:     Context,
    attachments: Vec<EmailAttachment>,
}

impl TemplateParams {
    fn new(subject: String, to: Vec<String>, context: Context) -> Self {
        Self {
            subject,
            to,
            reply_to: None,
            bcc: Vec::new(),
            context,
            attachments: Vec::new(),
        }
    }
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`Notification` から
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "base.html",
                    include_str!("../../../templates/notifications/base.html"),
                ),
                (
                    "base.txt",
                    include_str!("../../../templates/notifications/base.txt"),
                ),
                (
                    "welcome.html",
                    include_str!("../../../templates/notifications/welcome.html"),
                ),
                (
                    "welcome.txt",
                    include_str!("../../../templates/notifications/welcome.txt"),
                ),
                (
                    "appointment_confirmation.html",
                    include_str!("../../../templates/notifications/appointment_confirmation.html"),
                ),
                (
                    "appointment_confirmation.txt",
                    include_str!("../../../templates/notifications/appointment_confirmation.txt"),
                ),
                (
                    "appointment_reminder.html",
                    include_str!("../../../templates/notifications/appointment_reminder.html"),
                ),
                (
                    "appointment_reminder.txt",
                    include_str!("../../../templates/notifications/appointment_reminder.txt"),
                ),
                (
                    "appointment_summary.html",
                    include_str!("../../../templates/notifications/appointment_summary.html"),
                ),
                (
                    "appointment_summary.txt",
                    include_str!("../../../templates/notifications/appointment_summary.txt"),
                ),
                (
                    "emergency_alert.html",
                    include_str!("../../../templates/notifications/emergency_alert.html"),
                ),
                (
                    "emergency_alert.txt",
                    include_str!("../../../templates/notifications/emergency_alert.txt"),
                ),
                (
                    "feedback_request.html",
                    include_str!("../../../templates/notifications/feedback_request.html"),
                ),
                (
                    "feedback_request.txt",
                    include_str!("../../../templates/notifications/feedback_request.txt"),
                ),
                (
                    "admin_alert.html",
                    include_str!("../../../templates/notifications/admin_alert.html"),
                ),
                (
                    "admin_alert.txt",
                    include_str!("../../../templates/notifications/admin_alert.txt"),
                ),
                (
                    "contact_form.html",
                    include_str!("../../../templates/notifications/contact_form.html"),
                ),
                (
                    "contact_form.txt",
                    include_str!("../../../templates/notifications/contact_form.txt"),
                ),
                (
                    "pre_appointment_briefing.html",
                    include_str!("../../../templates/notifications/pre_appointment_briefing.html"),
                ),
                (
                    "pre_appointment_briefing.txt",
                    include_str!("../../../templates/notifications/pre_appointment_briefing.txt"),
                ),
                (
                    "calendar_invite.html",
                    include_str!("../../../templates/notifications/calendar_invite.html"),
                ),
                (
                    "calendar_invite.txt",
                    include_str!("../../../templates/notifications/calendar_invite.txt"),
                ),
                (
                    "appointment_request.html",
                    include_str!("../../../templates/notifications/appointment_request.html"),
                ),
                (
                    "appointment_request.txt",
                    include_str!("../../../templates/notifications/appointment_request.txt"),
                ),
                (
                    "appointment_request_received.html",
                    include_str!("../../../templates/notifications/appointment_request_received.html"),
                ),
                (
                    "appointment_request_received.txt",
                    include_str!("../../../templates/notifications/appointment_request_received.txt"),
                ),
                (
                    "newsletter_subscription.html",
                    include_str!("../../../templates/notifications/newsletter_subscription.html"),
                ),
                (
                    "newsletter_subscription.txt",
                    include_str!("../../../templates/notifications/newsletter_subscription.txt"),
                ),
                (
                    "newsletter_subscription_notice.html",
                    include_str!("../../../templates/notifications/newsletter_subscription_notice.html"),
                ),
                (
                    "newsletter_subscription_notice.txt",
                    include_str!("../../../templates/notifications/newsletter_subscription_notice.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 通知リクエストからメールメッセージを生成する
    pub fn render(
        &self,
        notification: &Notification,
        env: &RenderEnvironment<'_>,
    ) -> Result<EmailMessage, NotificationError> {
        let template_name: &str = notification.kind().into();
        let params = self.build_template_params(notification, env);

        // 管理者宛ての通知は宛先が設定に依存する
        if params.to.iter().all(|address| address.trim().is_empty()) {
            return Err(NotificationError::TemplateFailed(format!(
                "送信先がありません: {template_name}"
            )));
        }

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &params.context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &params.context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            from: env.settings.from_address.clone(),
            to: params.to,
            reply_to: params.reply_to,
            bcc: params.bcc,
            subject: params.subject,
            html_body,
            text_body,
            attachments: params.attachments,
        })
    }

    /// 件名、宛先、コンテキストを構築する
    fn build_template_params(
        &self,
        notification: &Notification,
        env: &RenderEnvironment<'_>,
    ) -> TemplateParams {
        let settings = env.settings;

        let mut context = Context::new();
        context.insert("site_url", &settings.site_url);
        context.insert("year", &env.now.with_timezone(&ist()).year());

        match notification {
            Notification::Welcome(n) => {
                context.insert("patient_name", &n.recipient_name);
                TemplateParams::new(
                    "Welcome to Dr. Sayuj Krishnan's Neurosurgery Practice".to_string(),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::AppointmentConfirmation(n) => {
                context.insert("patient_name", &n.recipient_name);
                context.insert("appointment_at", &format_ist(n.appointment_at));
                context.insert("appointment_type", &n.appointment_type);
                context.insert("instructions", &n.instructions);
                TemplateParams::new(
                    "Appointment Confirmed - Dr. Sayuj Krishnan".to_string(),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::AppointmentReminder(n) => {
                context.insert("patient_name", &n.recipient_name);
                context.insert("appointment_at", &format_ist(n.appointment_at));
                context.insert("reminder_label", n.window.label());
                TemplateParams::new(
                    "Appointment Reminder - Dr. Sayuj Krishnan".to_string(),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::AppointmentSummary(n) => {
                context.insert("patient_name", &n.recipient_name);
                context.insert("appointment_type", &n.appointment_type);
                context.insert("diagnosis", &n.diagnosis);
                context.insert("next_steps", &n.next_steps);
                context.insert("follow_up_days", &n.follow_up_days);
                TemplateParams::new(
                    "Your Appointment Summary - Dr. Sayuj Krishnan".to_string(),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::EmergencyAlert(n) => {
                let severity = n.severity.to_string();
                context.insert("emergency_type", &n.emergency_type);
                context.insert("severity", &severity);
                context.insert(
                    "patient_name",
                    n.patient_name.as_deref().unwrap_or(UNKNOWN_PATIENT),
                );
                context.insert("occurred_at", &format_ist(env.now));
                TemplateParams::new(
                    format!("🚨 EMERGENCY ALERT: {} - {severity}", n.emergency_type),
                    settings.admin_addresses.clone(),
                    context,
                )
            }
            Notification::FeedbackRequest(n) => {
                context.insert("patient_name", &n.recipient_name);
                context.insert("procedure_type", &n.procedure_type);
                context.insert("review_url", &settings.review_url);
                TemplateParams::new(
                    format!("How was your experience with Dr. Sayuj, {}?", n.recipient_name),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::AdminAlert(n) => {
                context.insert("conversion_type", &n.conversion_type);
                context.insert("score", &n.score);
                context.insert("page", &n.page);
                context.insert("priority", &n.priority.to_string());
                context.insert("is_high_priority", &(n.priority == ConversionPriority::High));
                context.insert("occurred_at", &format_ist(n.occurred_at));
                TemplateParams::new(
                    format!("New Conversion: {} (Score: {})", n.conversion_type, n.score),
                    settings.admin_addresses.clone(),
                    context,
                )
            }
            Notification::ContactForm(n) => {
                let subject = n
                    .subject
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_CONTACT_SUBJECT);
                context.insert("name", &n.name);
                context.insert("email", &n.email);
                context.insert("phone", &n.phone);
                context.insert("subject", subject);
                context.insert("message", &n.message);
                TemplateParams {
                    reply_to: Some(n.email.clone()),
                    ..TemplateParams::new(
                        format!("New Contact Form Submission - {subject}"),
                        settings.admin_addresses.clone(),
                        context,
                    )
                }
            }
            Notification::PreAppointmentBriefing(n) => {
                let sources = n
                    .source_slug
                    .as_deref()
                    .map(|slug| env.sources.lookup(slug))
                    .unwrap_or_default();
                context.insert("patient_name", &n.recipient_name);
                context.insert("condition", &n.condition);
                context.insert("procedure_type", &n.procedure_type);
                context.insert("procedure_type_lower", &n.procedure_type.to_lowercase());
                context.insert("appointment_date", &n.appointment_date);
                context.insert("briefing_content", &n.briefing_content);
                context.insert("sections", &n.sections);
                context.insert("sources", sources);
                TemplateParams {
                    bcc: settings.admin_addresses.clone(),
                    ..TemplateParams::new(
                        format!(
                            "Pre-Appointment Briefing - {} ({})",
                            n.procedure_type, n.condition
                        ),
                        vec![n.recipient_email.clone()],
                        context,
                    )
                }
            }
            Notification::CalendarInvite(n) => {
                let organizer = settings.from_mailbox();
                let domain = organizer.rsplit_once('@').map_or("localhost", |(_, d)| d);
                let uid = format!("{}@{domain}", Uuid::new_v4());
                let ics = build_ics(n, &uid, organizer, env.now);

                context.insert("patient_name", &n.recipient_name);
                context.insert("appointment_at", &format_ist(n.appointment_at));
                context.insert("appointment_type", &n.appointment_type);
                context.insert("duration_minutes", &n.duration_minutes);
                TemplateParams {
                    attachments: vec![ics_attachment(ics)],
                    ..TemplateParams::new(
                        format!(
                            "Calendar Invite: {} - Dr. Sayuj Krishnan",
                            n.appointment_type
                        ),
                        vec![n.recipient_email.clone()],
                        context,
                    )
                }
            }
            Notification::AppointmentRequest(n) => {
                context.insert("name", &n.name);
                context.insert("email", &n.email);
                context.insert("phone", &n.phone);
                context.insert("preferred_date", &n.preferred_date);
                context.insert("condition", &n.condition);
                context.insert("urgency", &n.urgency);
                context.insert("message", &n.message);
                TemplateParams {
                    reply_to: Some(n.email.clone()),
                    ..TemplateParams::new(
                        format!("New Appointment Request - {}", n.name),
                        settings.admin_addresses.clone(),
                        context,
                    )
                }
            }
            Notification::AppointmentRequestReceived(n) => {
                context.insert("patient_name", &n.recipient_name);
                context.insert("appointment_date", &n.appointment_date);
                TemplateParams::new(
                    "Appointment Request Received - Dr. Sayuj Krishnan".to_string(),
                    vec![n.recipient_email.clone()],
                    context,
                )
            }
            Notification::NewsletterSubscription(n) => {
                context.insert(
                    "subscriber_name",
                    n.subscriber_name
                        .as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .unwrap_or(DEFAULT_SUBSCRIBER_NAME),
                );
                TemplateParams::new(
                    "Welcome to Dr. Sayuj Krishnan's Health Insights".to_string(),
                    vec![n.subscriber_email.clone()],
                    context,
                )
            }
            Notification::NewsletterSubscriptionNotice(n) => {
                context.insert("subscriber_email", &n.subscriber_email);
                context.insert("subscriber_name", &n.subscriber_name);
                context.insert("subscribed_at", &format_ist(env.now));
                TemplateParams::new(
                    format!("New Newsletter Subscription - {}", n.subscriber_email),
                    settings.admin_addresses.clone(),
                    context,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;
    use neurosite_domain::{
        notification::{
            AdminAlert,
            AppointmentConfirmation,
            AppointmentReminder,
            AppointmentRequest,
            AppointmentSummary,
            BriefingSections,
            CalendarInvite,
            ContactForm,
            EmergencyAlert,
            FeedbackRequest,
            NewsletterSubscription,
            PreAppointmentBriefing,
            ReminderWindow,
            Severity,
            WelcomeEmail,
        },
        source::SourceRecord,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_settings() -> NotificationSettings {
        NotificationSettings::new(
            "Dr. Sayuj Krishnan <hellodr@drsayuj.info>",
            vec!["hellodr@drsayuj.info".to_string(), "desk@drsayuj.info".to_string()],
            "https://www.drsayuj.info",
            "https://g.page/r/drsayuj-hyderabad/review",
        )
    }

    fn make_registry() -> SourceRegistry {
        SourceRegistry::from_entries(HashMap::from([(
            "spinal-fusion".to_string(),
            vec![SourceRecord {
                label: "Cleveland Clinic – Spinal Fusion Surgery".to_string(),
                href:  "https://my.clevelandclinic.org/health/treatments/15872-spinal-fusion"
                    .to_string(),
            }],
        )]))
        .unwrap()
    }

    /// 2025-10-20 10:30 IST
    fn make_appointment_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 5, 0, 0).unwrap()
    }

    fn render(notification: &Notification) -> EmailMessage {
        let renderer = TemplateRenderer::new().unwrap();
        let settings = make_settings();
        let registry = make_registry();
        let env = RenderEnvironment {
            settings: &settings,
            sources:  &registry,
            now:      Utc.with_ymd_and_hms(2025, 10, 1, 8, 15, 0).unwrap(),
        };
        renderer.render(notification, &env).unwrap()
    }

    fn make_appointment_request() -> AppointmentRequest {
        AppointmentRequest {
            name:           "Asha Rao".to_string(),
            email:          "pat@example.com".to_string(),
            phone:          "+91 90000 00000".to_string(),
            preferred_date: Some("20 October 2025".to_string()),
            condition:      Some("Sciatica".to_string()),
            urgency:        None,
            message:        None,
        }
    }

    #[test]
    fn newが正常に初期化される() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.is_ok());
    }

    #[test]
    fn welcomeのレンダリングが正しい() {
        let email = render(&Notification::Welcome(WelcomeEmail {
            recipient_email: "pat@example.com".to_string(),
            recipient_name:  "Asha Rao".to_string(),
            source_tag:      "organic".to_string(),
        }));

        assert_eq!(email.from, "Dr. Sayuj Krishnan <hellodr@drsayuj.info>");
        assert_eq!(email.to, vec!["pat@example.com".to_string()]);
        assert_eq!(
            email.subject,
            "Welcome to Dr. Sayuj Krishnan's Neurosurgery Practice"
        );
        assert!(email.html_body.contains("Dear Asha Rao,"));
        assert!(
            email
                .html_body
                .contains("https://www.drsayuj.info/appointments")
        );
        assert!(email.text_body.contains("Dear Asha Rao,"));
        assert!(email.text_body.contains("© 2025 Dr. Sayuj Krishnan"));
        assert!(email.reply_to.is_none());
        assert!(email.bcc.is_empty());
    }

    #[test]
    fn appointment_confirmationは日時をistで表示する() {
        let email = render(&Notification::AppointmentConfirmation(
            AppointmentConfirmation {
                recipient_email:  "pat@example.com".to_string(),
                recipient_name:   "Asha Rao".to_string(),
                appointment_at:   make_appointment_at(),
                appointment_type: "Consultation".to_string(),
                instructions:     vec!["Bring your MRI films".to_string()],
            },
        ));

        assert_eq!(email.subject, "Appointment Confirmed - Dr. Sayuj Krishnan");
        assert!(
            email
                .html_body
                .contains("Monday, 20 October 2025, 10:30 AM IST")
        );
        assert!(email.html_body.contains("<li>Bring your MRI films</li>"));
        assert!(email.text_body.contains("- Bring your MRI films"));
    }

    #[test]
    fn appointment_confirmationで指示がない場合は指示欄を出さない() {
        let email = render(&Notification::AppointmentConfirmation(
            AppointmentConfirmation {
                recipient_email:  "pat@example.com".to_string(),
                recipient_name:   "Asha Rao".to_string(),
                appointment_at:   make_appointment_at(),
                appointment_type: "Consultation".to_string(),
                instructions:     vec![],
            },
        ));

        assert!(!email.html_body.contains("Preparation Instructions"));
        assert!(!email.text_body.contains("Preparation Instructions"));
    }

    #[test]
    fn appointment_reminderにタイミングのラベルが含まれる() {
        let email = render(&Notification::AppointmentReminder(AppointmentReminder {
            recipient_email: "pat@example.com".to_string(),
            recipient_name:  "Asha Rao".to_string(),
            appointment_at:  make_appointment_at(),
            window:          ReminderWindow::OneHour,
        }));

        assert_eq!(email.subject, "Appointment Reminder - Dr. Sayuj Krishnan");
        assert!(email.html_body.contains("1 hour before"));
        assert!(email.text_body.contains("Reminder Type: 1 hour before"));
    }

    #[test]
    fn appointment_summaryのレンダリングが正しい() {
        let email = render(&Notification::AppointmentSummary(AppointmentSummary {
            recipient_email:  "pat@example.com".to_string(),
            recipient_name:   "Asha Rao".to_string(),
            appointment_type: "Consultation".to_string(),
            diagnosis:        "L4-L5 disc herniation".to_string(),
            next_steps:       vec!["Physiotherapy".to_string(), "Repeat MRI".to_string()],
            follow_up_days:   Some(14),
        }));

        assert_eq!(
            email.subject,
            "Your Appointment Summary - Dr. Sayuj Krishnan"
        );
        assert!(email.html_body.contains("L4-L5 disc herniation"));
        assert!(email.html_body.contains("<li>Repeat MRI</li>"));
        assert!(email.text_body.contains("2. Repeat MRI"));
        assert!(email.text_body.contains("follow-up visit in 14 days"));
    }

    #[test]
    fn appointment_summaryでフォローアップなしの場合は案内を出さない() {
        let email = render(&Notification::AppointmentSummary(AppointmentSummary {
            recipient_email:  "pat@example.com".to_string(),
            recipient_name:   "Asha Rao".to_string(),
            appointment_type: "Consultation".to_string(),
            diagnosis:        "Tension headache".to_string(),
            next_steps:       vec![],
            follow_up_days:   None,
        }));

        assert!(!email.text_body.contains("Follow-up:"));
        assert!(!email.text_body.contains("Next Steps:"));
    }

    #[test]
    fn emergency_alertは管理者宛てで緊急度を大文字で表示する() {
        let email = render(&Notification::EmergencyAlert(EmergencyAlert {
            emergency_type: "Head Injury".to_string(),
            patient_name:   None,
            severity:       Severity::Critical,
        }));

        assert_eq!(
            email.to,
            vec![
                "hellodr@drsayuj.info".to_string(),
                "desk@drsayuj.info".to_string()
            ]
        );
        assert_eq!(email.subject, "🚨 EMERGENCY ALERT: Head Injury - CRITICAL");
        assert!(email.text_body.contains("Patient: Unknown"));
        // 発生時刻は注入した現在時刻（2025-10-01 08:15 UTC）
        assert!(
            email
                .text_body
                .contains("Wednesday, 1 October 2025, 01:45 PM IST")
        );
    }

    #[test]
    fn feedback_requestにレビューurlが含まれる() {
        let email = render(&Notification::FeedbackRequest(FeedbackRequest {
            recipient_email: "pat@example.com".to_string(),
            recipient_name:  "Asha".to_string(),
            procedure_type:  "Endoscopic Discectomy".to_string(),
        }));

        assert_eq!(
            email.subject,
            "How was your experience with Dr. Sayuj, Asha?"
        );
        assert!(
            email
                .html_body
                .contains("href=\"https://g.page/r/drsayuj-hyderabad/review\"")
        );
    }

    #[test]
    fn admin_alertで優先度が高い場合は強調する() {
        let email = render(&Notification::AdminAlert(AdminAlert {
            conversion_type: "appointment_booking".to_string(),
            score:           85,
            page:            "/services/spinal-fusion".to_string(),
            priority:        ConversionPriority::High,
            occurred_at:     make_appointment_at(),
        }));

        assert_eq!(
            email.subject,
            "New Conversion: appointment_booking (Score: 85)"
        );
        assert_eq!(email.to.len(), 2);
        assert!(email.html_body.contains("High Priority Lead"));
        assert!(email.text_body.contains("Priority: HIGH"));
    }

    #[test]
    fn admin_alertで通常優先度の場合は強調しない() {
        let email = render(&Notification::AdminAlert(AdminAlert {
            conversion_type: "phone_click".to_string(),
            score:           20,
            page:            "/".to_string(),
            priority:        ConversionPriority::Normal,
            occurred_at:     make_appointment_at(),
        }));

        assert!(!email.html_body.contains("High Priority Lead"));
        assert!(email.text_body.contains("Priority: NORMAL"));
    }

    #[test]
    fn contact_formは送信者をreply_toに設定する() {
        let email = render(&Notification::ContactForm(ContactForm {
            name:    "Ravi Kumar".to_string(),
            email:   "ravi@example.com".to_string(),
            phone:   Some("+91 90000 00000".to_string()),
            subject: None,
            message: "Do you treat trigeminal neuralgia?".to_string(),
        }));

        assert_eq!(
            email.subject,
            "New Contact Form Submission - General Inquiry"
        );
        assert_eq!(email.reply_to.as_deref(), Some("ravi@example.com"));
        assert_eq!(email.to.len(), 2);
        assert!(email.text_body.contains("Phone: +91 90000 00000"));
    }

    #[test]
    fn contact_formの本文はhtmlエスケープされる() {
        let email = render(&Notification::ContactForm(ContactForm {
            name:    "Ravi".to_string(),
            email:   "ravi@example.com".to_string(),
            phone:   None,
            subject: Some("Second opinion".to_string()),
            message: "<script>alert(1)</script>".to_string(),
        }));

        assert_eq!(
            email.subject,
            "New Contact Form Submission - Second opinion"
        );
        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
        // テキスト版はエスケープしない
        assert!(email.text_body.contains("<script>alert(1)</script>"));
        assert!(!email.text_body.contains("Phone:"));
    }

    #[test]
    fn pre_appointment_briefingは出典を埋め込み管理者をbccに入れる() {
        let email = render(&Notification::PreAppointmentBriefing(Box::new(
            PreAppointmentBriefing {
                recipient_email:  "pat@example.com".to_string(),
                recipient_name:   "Asha Rao".to_string(),
                condition:        "Spondylolisthesis".to_string(),
                procedure_type:   "Spinal Fusion".to_string(),
                appointment_date: Some("20 October 2025".to_string()),
                briefing_content: "Overview of spinal fusion.".to_string(),
                sections:         BriefingSections {
                    preparation: Some("Stop smoking two weeks before.".to_string()),
                    ..Default::default()
                },
                source_slug:      Some("spinal-fusion".to_string()),
            },
        )));

        assert_eq!(
            email.subject,
            "Pre-Appointment Briefing - Spinal Fusion (Spondylolisthesis)"
        );
        assert_eq!(email.to, vec!["pat@example.com".to_string()]);
        assert_eq!(email.bcc.len(), 2);
        assert!(email.html_body.contains("Trusted Sources"));
        assert!(
            email
                .text_body
                .contains("Cleveland Clinic – Spinal Fusion Surgery")
        );
        assert!(email.text_body.contains("Stop smoking two weeks before."));
        assert!(!email.text_body.contains("Recovery:"));
        assert!(email.text_body.contains("interest in spinal fusion"));
    }

    #[test]
    fn pre_appointment_briefingで未登録のスラッグなら出典欄を出さない() {
        let email = render(&Notification::PreAppointmentBriefing(Box::new(
            PreAppointmentBriefing {
                recipient_email:  "pat@example.com".to_string(),
                recipient_name:   "Asha Rao".to_string(),
                condition:        "Glioma".to_string(),
                procedure_type:   "Awake Craniotomy".to_string(),
                appointment_date: None,
                briefing_content: "Overview.".to_string(),
                sections:         BriefingSections::default(),
                source_slug:      Some("this-slug-does-not-exist".to_string()),
            },
        )));

        assert!(!email.html_body.contains("Trusted Sources"));
        assert!(!email.text_body.contains("Trusted Sources"));
        assert!(!email.text_body.contains("Appointment:"));
    }

    #[test]
    fn calendar_inviteはicsを添付する() {
        let email = render(&Notification::CalendarInvite(CalendarInvite {
            recipient_email:  "pat@example.com".to_string(),
            recipient_name:   "Asha Rao".to_string(),
            appointment_at:   make_appointment_at(),
            appointment_type: "Consultation".to_string(),
            duration_minutes: 30,
        }));

        assert_eq!(
            email.subject,
            "Calendar Invite: Consultation - Dr. Sayuj Krishnan"
        );
        assert_eq!(email.attachments.len(), 1);

        let attachment = &email.attachments[0];
        assert_eq!(attachment.filename, "appointment.ics");
        assert_eq!(attachment.content_type, "text/calendar");

        let ics = String::from_utf8(attachment.content.clone()).unwrap();
        assert!(ics.contains("DTSTAMP:20251001T081500Z"));
        assert!(ics.contains("DTEND:20251020T053000Z"));
        assert!(ics.contains("@drsayuj.info\r\n"));
        assert!(ics.contains("ORGANIZER;CN=\"Dr. Sayuj Krishnan\":mailto:hellodr@drsayuj.info"));
    }

    #[test]
    fn calendar_inviteのuidは呼び出しごとに異なる() {
        let invite = Notification::CalendarInvite(CalendarInvite {
            recipient_email:  "pat@example.com".to_string(),
            recipient_name:   "Asha Rao".to_string(),
            appointment_at:   make_appointment_at(),
            appointment_type: "Consultation".to_string(),
            duration_minutes: 30,
        });

        let uid_line = |email: &EmailMessage| {
            String::from_utf8(email.attachments[0].content.clone())
                .unwrap()
                .lines()
                .find(|line| line.starts_with("UID:"))
                .map(str::to_string)
        };

        assert_ne!(uid_line(&render(&invite)), uid_line(&render(&invite)));
    }

    #[test]
    fn appointment_requestは管理者宛てで患者をreply_toに設定する() {
        let email = render(&Notification::AppointmentRequest(make_appointment_request()));

        assert_eq!(email.subject, "New Appointment Request - Asha Rao");
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.reply_to.as_deref(), Some("pat@example.com"));
        assert!(email.text_body.contains("Preferred Date: 20 October 2025"));
        assert!(email.text_body.contains("Condition: Sciatica"));
        assert!(!email.text_body.contains("Urgency:"));
        assert!(!email.text_body.contains("Additional Information:"));
        assert!(email.html_body.contains("<strong>Phone:</strong> +91 90000 00000"));
    }

    #[test]
    fn appointment_request_receivedは患者宛てに希望日を表示する() {
        let request = make_appointment_request();

        let email = render(&Notification::AppointmentRequestReceived(
            request.acknowledgement(),
        ));

        assert_eq!(
            email.subject,
            "Appointment Request Received - Dr. Sayuj Krishnan"
        );
        assert_eq!(email.to, vec!["pat@example.com".to_string()]);
        assert!(email.reply_to.is_none());
        assert!(email.text_body.contains("Dear Asha Rao,"));
        assert!(email.text_body.contains("request for 20 October 2025"));
    }

    #[test]
    fn newsletter_subscriptionで名前がない場合はsubscriberと呼ぶ() {
        let email = render(&Notification::NewsletterSubscription(
            NewsletterSubscription {
                subscriber_email: "reader@example.com".to_string(),
                subscriber_name:  None,
            },
        ));

        assert_eq!(
            email.subject,
            "Welcome to Dr. Sayuj Krishnan's Health Insights"
        );
        assert_eq!(email.to, vec!["reader@example.com".to_string()]);
        assert!(email.html_body.contains("Dear Subscriber,"));
        assert!(email.text_body.contains("https://www.drsayuj.info/blog"));
    }

    #[test]
    fn newsletter_subscription_noticeは管理者宛てに登録日時を表示する() {
        let subscription = NewsletterSubscription {
            subscriber_email: "reader@example.com".to_string(),
            subscriber_name:  Some("Meera".to_string()),
        };

        let email = render(&Notification::NewsletterSubscriptionNotice(
            subscription.notice(),
        ));

        assert_eq!(
            email.subject,
            "New Newsletter Subscription - reader@example.com"
        );
        assert_eq!(email.to.len(), 2);
        assert!(email.text_body.contains("Name: Meera"));
        assert!(
            email
                .text_body
                .contains("Date: Wednesday, 1 October 2025, 01:45 PM IST")
        );
    }

    #[test]
    fn 管理者アドレスが空の場合はレンダリングに失敗する() {
        let renderer = TemplateRenderer::new().unwrap();
        let settings = NotificationSettings::new(
            "Dr. Sayuj Krishnan <hellodr@drsayuj.info>",
            Vec::new(),
            "https://www.drsayuj.info",
            "https://g.page/r/drsayuj-hyderabad/review",
        );
        let registry = make_registry();
        let env = RenderEnvironment {
            settings: &settings,
            sources:  &registry,
            now:      Utc.with_ymd_and_hms(2025, 10, 1, 8, 15, 0).unwrap(),
        };

        let result = renderer.render(
            &Notification::EmergencyAlert(EmergencyAlert {
                emergency_type: "Head Injury".to_string(),
                patient_name:   None,
                severity:       Severity::Critical,
            }),
            &env,
        );

        assert!(matches!(
            result,
            Err(NotificationError::TemplateFailed(message)) if message.contains("emergency_alert")
        ));
    }
}
