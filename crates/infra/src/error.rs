//! # インフラ層エラー定義
//!
//! ファイル読み込みや外部 HTTP 通信で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Io, SourceRegistry, Http 等）
//!
//! メール送信の失敗はこの型を使わず、ドメインの `NotificationError` で表現する。

use std::fmt;

use derive_more::Display;
use neurosite_domain::source::SourceRegistryError;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// `From` 実装や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ファイル I/O エラー
    #[error("I/O エラー: {0}")]
    Io(#[source] std::io::Error),

    /// 出典データが不正
    #[error("出典データエラー: {0}")]
    SourceRegistry(#[source] SourceRegistryError),

    /// HTTP 通信エラー（接続失敗、タイムアウト等）
    #[error("HTTP 通信エラー: {0}")]
    Http(#[source] reqwest::Error),

    /// 期待しない HTTP ステータス
    #[error("予期しない HTTP ステータス: {status} ({url})")]
    UnexpectedStatus {
        /// リクエスト先 URL
        url:    String,
        /// HTTP ステータスコード
        status: u16,
    },

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 期待しない HTTP ステータスのエラーを生成する
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Self {
            kind:       InfraErrorKind::UnexpectedStatus {
                url: url.into(),
                status,
            },
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<std::io::Error> for InfraError {
    fn from(source: std::io::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Io(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<SourceRegistryError> for InfraError {
    fn from(source: SourceRegistryError) -> Self {
        Self {
            kind:       InfraErrorKind::SourceRegistry(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(source: reqwest::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Http(source),
            span_trace: SpanTrace::capture(),
        }
    }
}
