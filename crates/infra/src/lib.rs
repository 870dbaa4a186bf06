//! # Neurosite インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **メール送信**: Resend HTTP API / SMTP / Noop による [`notification::NotificationSender`] 実装
//! - **出典データ読み込み**: JSON ファイルからの出典レジストリ構築
//! - **robots.txt チェック**: 公開サイトの robots.txt 取得と集計
//!
//! ## 依存関係
//!
//! ```text
//! apps → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと実装
//! - [`sources`] - 出典データのファイル読み込み
//! - [`robots`] - robots.txt の取得と集計
//! - [`error`] - インフラ層エラー定義

pub mod error;
pub mod notification;
pub mod robots;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
