//! # Content Service 設定
//!
//! 環境変数から Content Service サーバーの設定を読み込む。
//! すべての変数にデフォルト値があり、未設定でも起動できる。

use std::{env, sync::Arc};

use neurosite_infra::{
    InfraError,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        ResendNotificationSender,
        SmtpNotificationSender,
        is_usable_resend_api_key,
    },
};
use thiserror::Error;

use crate::usecase::notification::NotificationSettings;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ポート番号として解釈できない
    #[error("{name} は有効なポート番号である必要があります: {value}")]
    InvalidPort { name: &'static str, value: String },

    /// 未知の送信バックエンド
    #[error("NOTIFICATION_BACKEND が不正です（resend / smtp / noop）: {0}")]
    UnknownBackend(String),

    /// 管理者宛ての送信先が 1 件もない
    #[error("ADMIN_EMAIL に有効なアドレスがありません: {0:?}")]
    NoAdminAddress(String),
}

/// Content Service サーバーの設定
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// バインドアドレス
    pub host:                 String,
    /// ポート番号
    pub port:                 u16,
    /// 出典データの JSON ファイル（未設定で埋め込みデータを使用）
    pub service_sources_path: Option<String>,
    /// ブログ記事の出典データの JSON ファイル（未設定で埋め込みデータを使用）
    pub blog_sources_path:    Option<String>,
    /// 通知設定
    pub notification:         NotificationConfig,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    /// Resend HTTP API（本番）
    Resend,
    /// SMTP サーバー経由（Mailpit 開発用）
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

impl NotificationBackend {
    /// 文字列からバックエンドをパースする（前後の空白と大文字小文字は無視）
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `resend`: Resend HTTP API 経由で送信。`RESEND_API_KEY` が未設定または
///   開発用プレースホルダの場合は送信クライアントを構築しない（未構成）
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:         NotificationBackend,
    /// Resend API キー（backend=resend の場合に使用）
    pub resend_api_key:  Option<String>,
    /// Resend API のベース URL
    pub resend_api_url:  String,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:       String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:       u16,
    /// 送信元メールアドレス
    pub from_address:    String,
    /// 管理者宛て通知の宛先
    pub admin_addresses: Vec<String>,
    /// サイトの URL（メール内リンク用）
    pub site_url:        String,
    /// レビュー投稿ページの URL
    pub review_url:      String,
}

impl ContentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 変数名から値を引く関数で設定を組み立てる
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("CONTENT_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_port("CONTENT_PORT", lookup("CONTENT_PORT"), 3100)?,
            service_sources_path: lookup("SERVICE_SOURCES_PATH").filter(|p| !p.trim().is_empty()),
            blog_sources_path: lookup("BLOG_SOURCES_PATH").filter(|p| !p.trim().is_empty()),
            notification: NotificationConfig::from_lookup(&lookup)?,
        })
    }
}

impl NotificationConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("NOTIFICATION_BACKEND") {
            Some(value) => NotificationBackend::parse(&value)?,
            None => NotificationBackend::Resend,
        };

        let admin_email =
            lookup("ADMIN_EMAIL").unwrap_or_else(|| "hellodr@drsayuj.info".to_string());
        let admin_addresses = parse_addresses(&admin_email);
        if admin_addresses.is_empty() {
            return Err(ConfigError::NoAdminAddress(admin_email));
        }

        Ok(Self {
            backend,
            resend_api_key: lookup("RESEND_API_KEY"),
            resend_api_url: lookup("RESEND_API_URL")
                .unwrap_or_else(|| "https://api.resend.com".to_string()),
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port: parse_port("SMTP_PORT", lookup("SMTP_PORT"), 1025)?,
            from_address: lookup("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| "Dr. Sayuj Krishnan <hellodr@drsayuj.info>".to_string()),
            admin_addresses,
            site_url: lookup("SITE_URL").unwrap_or_else(|| "https://www.drsayuj.info".to_string()),
            review_url: lookup("REVIEW_URL")
                .unwrap_or_else(|| "https://g.page/r/drsayuj-hyderabad/review".to_string()),
        })
    }

    /// メール本文の生成に使う設定
    pub fn settings(&self) -> NotificationSettings {
        NotificationSettings::new(
            self.from_address.clone(),
            self.admin_addresses.clone(),
            self.site_url.clone(),
            self.review_url.clone(),
        )
    }

    /// 送信クライアントを構築する
    ///
    /// `resend` で API キーが使えない場合は `None`（未構成）を返す。
    /// ディスパッチャは未構成のまま起動し、送信要求には `configuration_missing` を返す。
    pub fn build_sender(&self) -> Result<Option<Arc<dyn NotificationSender>>, InfraError> {
        let sender: Arc<dyn NotificationSender> = match self.backend {
            NotificationBackend::Resend => {
                if !is_usable_resend_api_key(self.resend_api_key.as_deref()) {
                    tracing::warn!("RESEND_API_KEY が未設定のため、メール送信は無効です");
                    return Ok(None);
                }
                let api_key = self.resend_api_key.clone().unwrap_or_default();
                Arc::new(ResendNotificationSender::new(api_key, &self.resend_api_url)?)
            }
            NotificationBackend::Smtp => {
                Arc::new(SmtpNotificationSender::new(&self.smtp_host, self.smtp_port))
            }
            NotificationBackend::Noop => Arc::new(NoopNotificationSender),
        };

        Ok(Some(sender))
    }
}

fn parse_port(name: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { name, value }),
        None => Ok(default),
    }
}

/// カンマ区切りのアドレス一覧（空要素は除く）
fn parse_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
