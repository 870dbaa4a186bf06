//! # Content Service サーバー
//!
//! 診療所サイトのコンテンツ API と通知メール送信を担当するサービス。
//!
//! ## 役割
//!
//! - **出典 API**: サービスページの出典リストを返す（`GET /api/sources/{slug}`）
//! - **ブログ出典 API**: ブログ記事の出典リストを返す（`GET /api/blog-sources/{slug}`）
//! - **通知 API**: 患者・管理者向けメールを送信する（`POST /api/notifications`）
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CONTENT_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CONTENT_PORT` | No | ポート番号（デフォルト: `3100`） |
//! | `SERVICE_SOURCES_PATH` | No | 出典データの JSON（未設定で埋め込みデータ） |
//! | `BLOG_SOURCES_PATH` | No | ブログ記事の出典データの JSON（未設定で埋め込みデータ） |
//! | `NOTIFICATION_BACKEND` | No | `resend` / `smtp` / `noop`（デフォルト: `resend`） |
//! | `RESEND_API_KEY` | No | 未設定の場合、通知 API は 503 を返す |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! 通知関連の変数の一覧は `config` モジュールを参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit）
//! NOTIFICATION_BACKEND=smtp cargo run -p neurosite-content-service
//!
//! # 本番環境
//! RESEND_API_KEY=re_... LOG_FORMAT=json cargo run -p neurosite-content-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use neurosite_content_service::{
    config::ContentConfig,
    handler::{NotificationState, SourcesState, router},
    usecase::notification::{NotificationDispatcher, TemplateRenderer},
};
use neurosite_domain::{clock::SystemClock, source::SourceRegistry};
use neurosite_infra::sources::load_source_registry;
use neurosite_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("content-service"));

    let config = ContentConfig::from_env()?;

    tracing::info!(
        "Content Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let registry = match &config.service_sources_path {
        Some(path) => load_source_registry(path).await?,
        None => SourceRegistry::embedded().clone(),
    };
    let registry = Arc::new(registry);
    tracing::info!(slugs = registry.len(), "出典レジストリを構築しました");

    let blog_registry = match &config.blog_sources_path {
        Some(path) => load_source_registry(path).await?,
        None => SourceRegistry::embedded_blog().clone(),
    };
    let blog_registry = Arc::new(blog_registry);
    tracing::info!(
        slugs = blog_registry.len(),
        "ブログ出典レジストリを構築しました"
    );

    let sender = config.notification.build_sender()?;
    let dispatcher = NotificationDispatcher::new(
        sender,
        TemplateRenderer::new()?,
        config.notification.settings(),
        registry.clone(),
        Arc::new(SystemClock),
    );
    tracing::info!(
        backend = ?config.notification.backend,
        configured = dispatcher.is_configured(),
        "通知ディスパッチャを構築しました"
    );

    let app = router(
        Arc::new(SourcesState {
            registry,
            blog_registry,
        }),
        Arc::new(NotificationState { dispatcher }),
    )
    .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Content Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
