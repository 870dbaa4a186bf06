//! # ユースケース層
//!
//! HTTP ハンドラから呼ばれるアプリケーションロジックを定義する。
//!
//! - [`notification`] - 通知メールの生成と送信

pub mod notification;
