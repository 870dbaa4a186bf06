//! # Neurosite ドメイン層
//!
//! 診療所サイトのコンテンツ組み立てと通知に関するドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **不変データ**: 出典レジストリはプロセス起動時に一度だけ構築し、以後変更しない
//! - **値としての通知**: 通知リクエスト・送信結果は呼び出しごとに生成して破棄する。
//!   共有可変状態を持たない
//! - **インフラ非依存**: 送信プロバイダや HTTP の詳細はインフラ層・アプリ層に置く
//!
//! ## 依存関係の方向
//!
//! ```text
//! apps → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`source`] - サービスページ・ブログ記事の出典レジストリ
//! - [`notification`] - 通知リクエスト、メールメッセージ、送信結果
//! - [`clock`] - 時刻プロバイダと IST 表記
//!
//! ## 使用例
//!
//! ```rust
//! use neurosite_domain::source::service_sources;
//!
//! let sources = service_sources("spinal-fusion");
//! assert_eq!(sources.len(), 2);
//!
//! assert!(service_sources("no-such-page").is_empty());
//! ```

pub mod clock;
pub mod notification;
pub mod source;
