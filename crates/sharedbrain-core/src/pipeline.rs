//! Runs the passes over a whole corpus, in order:
//!
//! 1. Collect backlinks from every on-disk document (creates stubs).
//! 2. Merge metadata: on-disk documents first, then stubs, which copy dates
//!    from the documents linking to them.
//! 3. Rewrite wikilinks in every body.
//! 4. Append backlinks sections, now that every title and date is final.
//! 5. Write each document once.
//!
//! Stubs first seen in passes 3 and 4 get metadata as soon as the pass that
//! found them ends. Nothing links to them in the graph, so they only carry a title.

use crate::backlinks::add_backlinks;
use crate::config::Config;
use crate::error::Result;
use crate::link_indexer::collect_backlinks;
use crate::metadata::merge_metadata;
use crate::registry::{DocId, DocumentRegistry};
use crate::rewriter::convert_links;
use crate::store::{DocumentSink, DocumentSource};

/// Counts reported after a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub stubs: usize,
    pub backlinks: usize,
}

impl RunSummary {
    fn of(registry: &DocumentRegistry) -> Self {
        Self {
            documents: registry.len(),
            stubs: registry.stub_count(),
            backlinks: registry.iter().map(|(_, doc)| doc.backlinks().len()).sum(),
        }
    }
}

/// Convert every document from `source` and write the results to `sink`.
///
/// All processing finishes before anything is written, so an error leaves the
/// sink untouched.
pub fn process_backlinks<S, W>(source: &S, sink: &mut W, config: &Config) -> Result<RunSummary>
where
    S: DocumentSource + ?Sized,
    W: DocumentSink + ?Sized,
{
    let registry = generate(source, config)?;
    write_documents(&registry, sink)?;
    let summary = RunSummary::of(&registry);
    tracing::info!(
        "Wrote {} documents ({} stubs, {} backlinks)",
        summary.documents,
        summary.stubs,
        summary.backlinks
    );
    Ok(summary)
}

/// Run every pass and return the registry with each document's output filled in.
pub fn generate<S>(source: &S, config: &Config) -> Result<DocumentRegistry>
where
    S: DocumentSource + ?Sized,
{
    let names = source.list()?;
    let mut registry = DocumentRegistry::from_names(&names)?;
    collect_backlinks(&mut registry, source)?;
    generate_file_data(&mut registry, config)?;
    Ok(registry)
}

fn generate_file_data(registry: &mut DocumentRegistry, config: &Config) -> Result<()> {
    let (stubs, known): (Vec<DocId>, Vec<DocId>) = registry
        .ids()
        .into_iter()
        .partition(|&id| registry.document(id).is_stub());

    let mut bodies = Vec::with_capacity(known.len() + stubs.len());
    for id in known.into_iter().chain(stubs) {
        let doc = registry.document(id);
        if doc.is_stub() {
            tracing::info!("{} is a new file", doc.original_name());
        } else {
            tracing::info!("Reading {}", doc.original_name());
        }
        let body = merge_metadata(registry, id, config)?;
        bodies.push((id, body));
    }
    let mut merged = bodies.len();

    for (id, body) in &bodies {
        let converted = convert_links(body, registry);
        registry.document_mut(*id).push_output(&converted);
    }
    merged = merge_late_stubs(registry, merged, config)?;

    // Backlinks go last so every entry sees its source's final title.
    for id in registry.ids() {
        add_backlinks(registry, id, &config.backlinks_heading);
    }
    merge_late_stubs(registry, merged, config)?;
    Ok(())
}

/// Merge metadata for stubs registered at or after index `from`. Returns the
/// new registry length.
fn merge_late_stubs(registry: &mut DocumentRegistry, from: usize, config: &Config) -> Result<usize> {
    let ids = registry.ids();
    for &id in ids.iter().skip(from) {
        tracing::info!("{} is a new file", registry.document(id).original_name());
        merge_metadata(registry, id, config)?;
    }
    Ok(ids.len())
}

fn write_documents<W>(registry: &DocumentRegistry, sink: &mut W) -> Result<()>
where
    W: DocumentSink + ?Sized,
{
    for (_, doc) in registry.iter() {
        tracing::debug!("Writing {}", doc.original_name());
        sink.write(doc.original_name(), doc.output())?;
    }
    Ok(())
}
