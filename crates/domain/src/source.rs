//! # 参考文献（サービスページ・ブログ記事の出典）
//!
//! サービスページ（施術・疾患ごとのページ）とブログ記事に掲載する出典リストを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`SourceRecord`] | 出典 | 表示ラベルと URL の組 |
//! | [`SourceRegistry`] | 出典レジストリ | スラッグ → 出典リストの不変マップ |
//!
//! ## 設計方針
//!
//! - **全域関数としての検索**: [`SourceRegistry::lookup`] は未登録のスラッグに対して空スライスを返す。
//!   呼び出し側が「見つからない」を失敗として分岐する必要はない
//! - **検証はロード時のみ**: 不正なデータは [`SourceRegistry::from_json`] がエラーとして返す。
//!   検索時にエラーは発生しない
//! - **埋め込みデータ**: 既定のレジストリは `data/service_sources.json`（サービスページ）と
//!   `data/blog_sources.json`（ブログ記事）をバイナリに埋め込み、プロセス内で一度だけ構築する

use std::{collections::HashMap, sync::LazyLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// バイナリに埋め込まれた出典データ（サービスページ）
const EMBEDDED_SOURCES: &str = include_str!("../data/service_sources.json");

/// バイナリに埋め込まれた出典データ（ブログ記事）
const EMBEDDED_BLOG_SOURCES: &str = include_str!("../data/blog_sources.json");

static EMBEDDED_REGISTRY: LazyLock<SourceRegistry> = LazyLock::new(|| {
    SourceRegistry::from_json(EMBEDDED_SOURCES).expect("埋め込み出典データが不正です")
});

static EMBEDDED_BLOG_REGISTRY: LazyLock<SourceRegistry> = LazyLock::new(|| {
    SourceRegistry::from_json(EMBEDDED_BLOG_SOURCES).expect("埋め込みブログ出典データが不正です")
});

/// 出典レジストリのロードエラー
#[derive(Debug, Error)]
pub enum SourceRegistryError {
    /// JSON として解釈できない
    #[error("出典データの JSON が不正です: {0}")]
    Json(#[from] serde_json::Error),

    /// ラベルが空
    #[error("出典ラベルが空です: slug={slug}, index={index}")]
    EmptyLabel { slug: String, index: usize },

    /// URL が不正（絶対 URL かつ http/https であること）
    #[error("出典 URL が不正です: slug={slug}, href={href}")]
    InvalidHref { slug: String, href: String },
}

/// 出典
///
/// 人が読むためのラベルと参照先 URL の組。ビルド時に定義され、実行時に変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// 表示ラベル（例: "Mayo Clinic – Herniated Disc Treatment Costs"）
    pub label: String,
    /// 参照先 URL
    pub href:  String,
}

/// 出典レジストリ
///
/// スラッグをキーに、掲載順に並んだ出典リストを保持する。
/// 構築後は不変で、同期なしに並行して読み出してよい。
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    entries: HashMap<String, Vec<SourceRecord>>,
}

impl SourceRegistry {
    /// `{ "slug": [{ "label": ..., "href": ... }, ...] }` 形式の JSON から構築する
    pub fn from_json(json: &str) -> Result<Self, SourceRegistryError> {
        let entries: HashMap<String, Vec<SourceRecord>> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// マップから構築する（ラベルと URL を検証する）
    pub fn from_entries(
        entries: HashMap<String, Vec<SourceRecord>>,
    ) -> Result<Self, SourceRegistryError> {
        for (slug, records) in &entries {
            for (index, record) in records.iter().enumerate() {
                if record.label.trim().is_empty() {
                    return Err(SourceRegistryError::EmptyLabel {
                        slug: slug.clone(),
                        index,
                    });
                }
                if !is_web_url(&record.href) {
                    return Err(SourceRegistryError::InvalidHref {
                        slug: slug.clone(),
                        href: record.href.clone(),
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// 埋め込みデータから構築したプロセス共通のレジストリ（サービスページ）を返す
    pub fn embedded() -> &'static SourceRegistry {
        &EMBEDDED_REGISTRY
    }

    /// 埋め込みデータから構築したプロセス共通のレジストリ（ブログ記事）を返す
    pub fn embedded_blog() -> &'static SourceRegistry {
        &EMBEDDED_BLOG_REGISTRY
    }

    /// スラッグに対応する出典リストを返す
    ///
    /// 未登録のスラッグ（不正な文字列を含む）には空スライスを返す。
    pub fn lookup(&self, slug: &str) -> &[SourceRecord] {
        self.entries.get(slug).map(Vec::as_slice).unwrap_or_default()
    }

    /// スラッグが登録されているか
    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// 登録済みスラッグの一覧（昇順）
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 埋め込みレジストリからサービスページの出典リストを取得する
pub fn service_sources(slug: &str) -> &'static [SourceRecord] {
    SourceRegistry::embedded().lookup(slug)
}

/// 埋め込みレジストリからブログ記事の出典リストを取得する
pub fn blog_sources(slug: &str) -> &'static [SourceRecord] {
    SourceRegistry::embedded_blog().lookup(slug)
}

fn is_web_url(href: &str) -> bool {
    Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
