use crate::error::Result;
use crate::frontmatter::split_frontmatter;
use crate::identity::{CaseFold, Identity};
use crate::link_parser::{scan_wikilinks, LinkObserver, WikilinkOccurrence};
use crate::registry::{Backlink, DocId, DocumentRegistry};
use crate::store::DocumentSource;

// ---------------------------------------------------------------------------
// Collector: records every link as an inbound edge on its target
// ---------------------------------------------------------------------------

/// Link observer for one source document.
///
/// Each discovered link resolves its target (creating a stub if needed) and
/// appends a [`Backlink`] pointing back at `current`.
pub struct BacklinkCollector<'r> {
    registry: &'r mut DocumentRegistry,
    current: DocId,
}

impl<'r> BacklinkCollector<'r> {
    pub fn new(registry: &'r mut DocumentRegistry, current: DocId) -> Self {
        Self { registry, current }
    }
}

impl LinkObserver for BacklinkCollector<'_> {
    fn link_with_context(&mut self, link: &WikilinkOccurrence<'_>, target: Identity) {
        let dest = self.registry.resolve_or_insert(target, link.target);
        self.registry.push_backlink(
            dest,
            Backlink {
                source: self.current,
                context: link.context.to_string(),
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Core indexing function (testable without a store)
// ---------------------------------------------------------------------------

/// Record the links in `text` as backlinks from `current`.
///
/// Only the body is scanned; a leading metadata block is skipped. Returns the
/// number of links found.
pub fn index_document(registry: &mut DocumentRegistry, current: DocId, text: &str) -> usize {
    // An unterminated block is reported by the metadata pass; scan everything here.
    let body = match split_frontmatter(text) {
        Ok((_, body)) => body,
        Err(_) => text,
    };
    let mut collector = BacklinkCollector::new(registry, current);
    scan_wikilinks(body, &CaseFold, &mut collector)
}

/// Counts from a backlink collection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub links: usize,
    pub stubs: usize,
}

/// Read every on-disk document and build the complete backlink graph.
///
/// Stubs are never scanned. Each document's text is kept on the registry so
/// later passes don't read it again.
pub fn collect_backlinks<S>(registry: &mut DocumentRegistry, source: &S) -> Result<IndexStats>
where
    S: DocumentSource + ?Sized,
{
    let stubs_before = registry.stub_count();
    let mut stats = IndexStats::default();

    for id in registry.known_ids() {
        let name = registry.document(id).original_name().to_string();
        tracing::info!("Collecting backlinks from {}", name);
        let text = source.read(&name)?;
        let links = index_document(registry, id, &text);
        tracing::debug!("{}: {} wikilinks", name, links);
        registry.document_mut(id).set_source(text);
        stats.documents += 1;
        stats.links += links;
    }

    stats.stubs = registry.stub_count() - stubs_before;
    tracing::info!(
        "Backlink collection complete: {} documents scanned, {} links, {} new stubs",
        stats.documents,
        stats.links,
        stats.stubs
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
