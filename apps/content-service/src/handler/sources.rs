//! # 出典ハンドラ
//!
//! サービスページ・ブログ記事に掲載する出典リストを返す。
//!
//! ## エンドポイント
//!
//! - `GET /api/sources/{slug}` - サービスページのスラッグに対応する出典リスト
//! - `GET /api/blog-sources/{slug}` - ブログ記事のスラッグに対応する出典リスト
//!
//! 未登録のスラッグでも 404 にはせず、空のリストを 200 で返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use neurosite_domain::source::{SourceRecord, SourceRegistry};
use neurosite_shared::{ApiResponse, event_log::event, log_business_event};

/// 出典 API の共有状態
pub struct SourcesState {
    /// サービスページの出典
    pub registry:      Arc<SourceRegistry>,
    /// ブログ記事の出典
    pub blog_registry: Arc<SourceRegistry>,
}

/// GET /api/sources/{slug}
pub async fn get_sources(
    State(state): State<Arc<SourcesState>>,
    Path(slug): Path<String>,
) -> Json<ApiResponse<Vec<SourceRecord>>> {
    Json(ApiResponse::new(lookup_logged(&state.registry, "service", &slug)))
}

/// GET /api/blog-sources/{slug}
pub async fn get_blog_sources(
    State(state): State<Arc<SourcesState>>,
    Path(slug): Path<String>,
) -> Json<ApiResponse<Vec<SourceRecord>>> {
    Json(ApiResponse::new(lookup_logged(&state.blog_registry, "blog", &slug)))
}

fn lookup_logged(
    registry: &SourceRegistry,
    content_kind: &'static str,
    slug: &str,
) -> Vec<SourceRecord> {
    let sources = registry.lookup(slug).to_vec();

    log_business_event!(
        event.category = event::category::CONTENT,
        event.action = event::action::SOURCES_LOOKED_UP,
        event.result = event::result::SUCCESS,
        content.kind = content_kind,
        content.slug = %slug,
        content.source_count = sources.len(),
        "出典リストを取得"
    );

    sources
}
