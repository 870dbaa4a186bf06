//! # robots.txt チェッカー
//!
//! 公開サイトの `/robots.txt` を取得し、クローラ向け設定の要点をログに出力する。
//! デプロイ後の確認やスケジュール実行を想定した単発のコマンド。
//!
//! ## 終了コード
//!
//! | コード | 条件 |
//! |--------|------|
//! | 0 | 取得でき、サイト全体はブロックされていない |
//! | 1 | 取得できない（通信失敗・2xx 以外）、または `User-agent: *` が `Disallow: /` |
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SITE_URL` | No | 対象サイト（デフォルト: `https://www.drsayuj.info`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |

use std::{env, process::ExitCode};

use neurosite_infra::robots::RobotsChecker;
use neurosite_shared::observability::{TracingConfig, init_tracing};
use url::Url;

const DEFAULT_SITE_URL: &str = "https://www.drsayuj.info";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("robots-check"));

    let site_url = env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
    let site_url = Url::parse(&site_url)?;

    let checker = RobotsChecker::new()?;
    let check = match checker.check(&site_url).await {
        Ok(check) => check,
        Err(e) => {
            tracing::error!(site = %site_url, error = %e, "robots.txt を取得できません");
            return Ok(ExitCode::FAILURE);
        }
    };

    let report = &check.report;
    tracing::info!(
        url = %check.url,
        status = check.status,
        sitemaps = report.sitemaps.len(),
        user_agents = ?report.user_agents,
        disallow_rules = report.disallow_rules,
        "robots.txt を取得しました"
    );
    for sitemap in &report.sitemaps {
        tracing::info!(sitemap = %sitemap, "サイトマップ");
    }
    if report.sitemaps.is_empty() {
        tracing::warn!("robots.txt にサイトマップの記載がありません");
    }

    if report.blocks_all {
        tracing::error!(url = %check.url, "User-agent: * がサイト全体を Disallow しています");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
