//! # 通知ユースケース
//!
//! 患者・管理者向けメールの生成と送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`settings`] - 送信元・管理者宛先・メール内リンクの設定
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`calendar`] - 予約のカレンダー招待（iCalendar）生成
//! - [`dispatcher`] - 構成ガード + レンダリング + 送信の統合サービス

pub mod calendar;
pub mod dispatcher;
pub mod settings;
pub mod template_renderer;

pub use dispatcher::{NotificationDispatcher, PairedNotificationResult};
pub use settings::NotificationSettings;
pub use template_renderer::{RenderEnvironment, TemplateRenderer};
