//! Metadata merging: explicit `+++` blocks combined with defaults derived from
//! the filename and from the documents that link here.

use crate::config::{Config, StubDatePolicy};
use crate::error::{BacklinkError, Result};
use crate::frontmatter::{date_at, split_frontmatter, Metadata, DATE_KEY, TITLE_KEY};
use crate::identity::remove_extension;
use crate::registry::{Backlink, DocId, DocumentRegistry};
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Pick a date for a stub from the documents linking to it.
///
/// Sources without a date are skipped. Returns `None` when no source is dated.
pub fn infer_stub_date(
    registry: &DocumentRegistry,
    backlinks: &[Backlink],
    policy: StubDatePolicy,
) -> Option<DateTime<FixedOffset>> {
    let mut dates = backlinks
        .iter()
        .filter_map(|bl| registry.document(bl.source).date());
    match policy {
        StubDatePolicy::FirstDiscovered => dates.next(),
        StubDatePolicy::Earliest => dates.min(),
        StubDatePolicy::Latest => dates.max(),
    }
}

fn malformed(registry: &DocumentRegistry, id: DocId, reason: impl Into<String>) -> BacklinkError {
    BacklinkError::MalformedMetadata {
        identity: registry.document(id).identity().to_string(),
        reason: reason.into(),
    }
}

/// Merge the metadata of one document and start its output with the block.
///
/// Documents that link to a stub must have been merged before the stub is,
/// since the stub's date is copied from theirs. Returns the body (everything
/// after the metadata block) for the rewrite pass.
pub fn merge_metadata(registry: &mut DocumentRegistry, id: DocId, config: &Config) -> Result<String> {
    let doc = registry.document(id);
    let text = doc.source().unwrap_or_default();

    let (block, body) = split_frontmatter(text)
        .map_err(|_| malformed(registry, id, "no end tag found in frontmatter"))?;
    let mut meta = match block {
        Some(block) => Metadata::parse(block).map_err(|e| malformed(registry, id, e.to_string()))?,
        None => Metadata::new(),
    };
    meta.normalize_date();

    if doc.is_date_file() {
        let plain_name = remove_extension(doc.original_name());
        if !meta.contains(TITLE_KEY) {
            meta.set_title(plain_name);
        }
        if !meta.contains(DATE_KEY) {
            let date = NaiveDate::parse_from_str(plain_name, "%Y-%m-%d").map_err(|_| {
                BacklinkError::DateParse {
                    identity: doc.identity().to_string(),
                    value: plain_name.to_string(),
                }
            })?;
            meta.set_date(date_at(date, config.default_time));
        }
    }

    let title = match meta.title() {
        Ok(Some(title)) => title.to_string(),
        Ok(None) => {
            let title = doc.title().to_string();
            meta.set_title(&title);
            title
        }
        Err(kind) => {
            return Err(malformed(registry, id, format!("title must be a string, found {kind}")));
        }
    };

    if doc.is_stub() && !meta.contains(DATE_KEY) {
        if let Some(date) = infer_stub_date(registry, doc.backlinks(), config.stub_date_policy) {
            tracing::debug!("{}: inferred date {} from backlinks", doc.original_name(), date);
            meta.set_date(date);
        }
    }

    let header = meta.render().map_err(|e| malformed(registry, id, e.to_string()))?;
    let body = body.to_string();

    let doc = registry.document_mut(id);
    doc.set_metadata(title, meta);
    doc.push_output(&header);
    Ok(body)
}
