//! # robots.txt チェック
//!
//! 公開サイトの `/robots.txt` を取得し、クローラ向け設定の要点を集計する。
//!
//! - 解析（[`RobotsReport::analyze`]）は純粋関数で、ネットワークなしでテストできる
//! - 取得（[`RobotsChecker::check`]）は 2xx 以外をエラーとして返す

use std::time::Duration;

use url::Url;

use crate::error::InfraError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// robots.txt の集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsReport {
    /// `Sitemap:` で参照されている URL（記載順）
    pub sitemaps:       Vec<String>,
    /// `User-agent:` に現れたエージェント（重複なし、記載順）
    pub user_agents:    Vec<String>,
    /// `Disallow:`（空でないもの）の件数
    pub disallow_rules: usize,
    /// `User-agent: *` のグループが `Disallow: /` でサイト全体を拒否しているか
    pub blocks_all:     bool,
}

impl RobotsReport {
    /// robots.txt の本文を解析する
    ///
    /// フィールド名は大文字小文字を区別しない。`#` 以降はコメントとして無視する。
    pub fn analyze(body: &str) -> Self {
        let mut report = Self::default();
        // 現在のグループのエージェントと、グループ内でルール行が出現したか
        let mut group_agents: Vec<String> = Vec::new();
        let mut group_has_rules = false;

        for raw_line in body.lines() {
            let line = raw_line.split('#').next().unwrap_or_default().trim();
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match field.trim().to_ascii_lowercase().as_str() {
                "user-agent" => {
                    if group_has_rules {
                        group_agents.clear();
                        group_has_rules = false;
                    }
                    group_agents.push(value.to_string());
                    if !report.user_agents.iter().any(|a| a == value) {
                        report.user_agents.push(value.to_string());
                    }
                }
                "disallow" => {
                    group_has_rules = true;
                    if value.is_empty() {
                        continue;
                    }
                    report.disallow_rules += 1;
                    if value == "/" && group_agents.iter().any(|a| a == "*") {
                        report.blocks_all = true;
                    }
                }
                "allow" | "crawl-delay" => group_has_rules = true,
                "sitemap" => report.sitemaps.push(value.to_string()),
                _ => {}
            }
        }

        report
    }
}

/// robots.txt の取得結果
#[derive(Debug, Clone)]
pub struct RobotsCheck {
    /// 取得した URL
    pub url:    String,
    /// HTTP ステータスコード
    pub status: u16,
    /// 集計結果
    pub report: RobotsReport,
}

/// robots.txt を取得するクライアント
pub struct RobotsChecker {
    client: reqwest::Client,
}

impl RobotsChecker {
    pub fn new() -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("neurosite-robots-check/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// サイトの `/robots.txt` を取得して集計する
    pub async fn check(&self, site_url: &Url) -> Result<RobotsCheck, InfraError> {
        let url = robots_url(site_url)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfraError::unexpected_status(url, status.as_u16()));
        }

        let body = response.text().await?;

        Ok(RobotsCheck {
            url:    url.to_string(),
            status: status.as_u16(),
            report: RobotsReport::analyze(&body),
        })
    }
}

/// サイト URL から robots.txt の URL を組み立てる（パスは常にルート）
pub fn robots_url(site_url: &Url) -> Result<Url, InfraError> {
    site_url
        .join("/robots.txt")
        .map_err(|e| InfraError::unexpected(format!("robots.txt の URL を組み立てられません: {e}")))
}
