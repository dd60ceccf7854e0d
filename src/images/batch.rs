use futures::future::join_all;
use tracing::info;

use super::ImageResolver;
use crate::models::Illustrated;

/// Simultaneous lookups allowed against the image providers.
pub const CHUNK_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub chunks: usize,
    pub resolved: usize,
    pub missing: usize,
}

/// Fills every item's image in place, order preserved.
///
/// Chunks run one after another; lookups inside a chunk run concurrently, so
/// chunk N is finished (or timed out) before chunk N+1 starts.
pub async fn enrich_all<T: Illustrated>(resolver: &ImageResolver, items: &mut [T]) -> EnrichmentSummary {
    let mut summary = EnrichmentSummary::default();

    for chunk in items.chunks_mut(CHUNK_SIZE) {
        let urls = join_all(chunk.iter().map(|item| resolver.resolve(item.image_subject()))).await;
        for (item, url) in chunk.iter_mut().zip(urls) {
            if url.is_some() {
                summary.resolved += 1;
            } else {
                summary.missing += 1;
            }
            item.set_image_url(url);
        }
        summary.chunks += 1;
    }

    info!(
        chunks = summary.chunks,
        resolved = summary.resolved,
        missing = summary.missing,
        "image enrichment finished"
    );
    summary
}
