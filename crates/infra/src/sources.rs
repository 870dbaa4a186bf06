//! # 出典データのファイル読み込み
//!
//! `SERVICE_SOURCES_PATH` で指定された JSON ファイルから出典レジストリを構築する。
//! 未指定の場合、アプリは埋め込みデータ（`SourceRegistry::embedded`）を使う。

use std::path::Path;

use neurosite_domain::source::SourceRegistry;

use crate::error::InfraError;

/// JSON ファイルから出典レジストリを読み込む
///
/// ファイルが読めない、または内容が不正な場合はエラーを返す。
/// 起動時に一度だけ呼ぶ想定で、検索時のエラーは発生しない。
pub async fn load_source_registry(path: impl AsRef<Path>) -> Result<SourceRegistry, InfraError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path).await?;
    let registry = SourceRegistry::from_json(&json)?;

    tracing::info!(
        path = %path.display(),
        slugs = registry.len(),
        "出典データを読み込みました"
    );

    Ok(registry)
}
