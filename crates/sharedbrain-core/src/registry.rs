use crate::error::{BacklinkError, Result};
use crate::frontmatter::Metadata;
use crate::identity::{self, Identity};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static DATE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Index of a [`Document`] inside its [`DocumentRegistry`].
///
/// Ids are handed out in insertion order and never reused, so a backlink can
/// point at its source without holding a reference into the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(usize);

/// An inbound link: `source` contains a wiki-link to the document owning this edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backlink {
    pub source: DocId,
    /// The full source line containing the link, as it was before rewriting.
    pub context: String,
}

/// A single markdown document, either read from disk or materialized as a stub.
#[derive(Debug)]
pub struct Document {
    identity: Identity,
    /// Case-preserved filename, used for output paths and links.
    original_name: String,
    /// Defaults to `original_name` minus the extension; metadata may override it.
    title: String,
    is_date_file: bool,
    is_stub: bool,
    /// Raw on-disk text, loaded during backlink collection. Always `None` for stubs.
    source: Option<String>,
    /// Merged metadata, set once by the metadata pass.
    metadata: Option<Metadata>,
    backlinks: Vec<Backlink>,
    output: String,
}

impl Document {
    fn new(original_name: &str, is_stub: bool) -> Self {
        let stem = identity::remove_extension(original_name);
        Self {
            identity: identity::normalize(original_name),
            original_name: original_name.to_string(),
            title: stem.to_string(),
            is_date_file: DATE_NAME_RE.is_match(stem),
            is_stub,
            source: None,
            metadata: None,
            backlinks: Vec::new(),
            output: String::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_date_file(&self) -> bool {
        self.is_date_file
    }

    pub fn is_stub(&self) -> bool {
        self.is_stub
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Resolved date from merged metadata. `None` before the metadata pass has
    /// run for this document, or when it simply has no date.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.metadata.as_ref().and_then(Metadata::date)
    }

    /// Inbound edges in discovery order.
    pub fn backlinks(&self) -> &[Backlink] {
        &self.backlinks
    }

    /// Everything generated for this document so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub(crate) fn set_source(&mut self, text: String) {
        self.source = Some(text);
    }

    pub(crate) fn set_metadata(&mut self, title: String, metadata: Metadata) {
        self.title = title;
        self.metadata = Some(metadata);
    }

    pub(crate) fn push_output(&mut self, text: &str) {
        self.output.push_str(text);
    }
}

/// Owns every [`Document`] of a run, keyed by [`Identity`].
///
/// Iteration order is insertion order: on-disk documents first (in the order
/// they were registered), then stubs as they are discovered.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
    by_identity: HashMap<Identity, DocId>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from on-disk filenames.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register_known(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Register a document that exists on disk.
    ///
    /// Fails if another registered filename folds to the same identity.
    pub fn register_known(&mut self, original_name: &str) -> Result<DocId> {
        let document = Document::new(original_name, false);
        if let Some(&existing) = self.by_identity.get(document.identity()) {
            return Err(BacklinkError::DuplicateDocument {
                identity: document.identity().to_string(),
                first: self.document(existing).original_name().to_string(),
                second: original_name.to_string(),
            });
        }
        Ok(self.insert(document))
    }

    /// Look up the document a link points at, materializing a stub if nothing
    /// is registered under its identity yet. Repeated calls return the same id.
    pub fn resolve_or_create_stub(&mut self, reference: &str) -> DocId {
        self.resolve_or_insert(identity::normalize(reference), reference)
    }

    /// Like [`resolve_or_create_stub`](Self::resolve_or_create_stub), for callers
    /// that already hold the normalized identity.
    pub fn resolve_or_insert(&mut self, identity: Identity, reference: &str) -> DocId {
        if let Some(&id) = self.by_identity.get(&identity) {
            return id;
        }
        let mut document = Document::new(&identity::file_name_for(reference), true);
        // The parser's normalizer is authoritative for the lookup key.
        document.identity = identity;
        tracing::debug!("Creating stub {} for [[{}]]", document.original_name, reference);
        self.insert(document)
    }

    fn insert(&mut self, document: Document) -> DocId {
        let id = DocId(self.documents.len());
        self.by_identity.insert(document.identity.clone(), id);
        self.documents.push(document);
        id
    }

    /// Look a reference up by its folded identity without creating anything.
    pub fn lookup(&self, reference: &str) -> Option<DocId> {
        self.by_identity
            .get(identity::normalize(reference).as_str())
            .copied()
    }

    pub fn get(&self, reference: &str) -> Option<&Document> {
        self.lookup(reference).map(|id| self.document(id))
    }

    pub fn document(&self, id: DocId) -> &Document {
        &self.documents[id.0]
    }

    pub(crate) fn document_mut(&mut self, id: DocId) -> &mut Document {
        &mut self.documents[id.0]
    }

    /// Append an inbound edge to `target`. Only the backlink collection pass
    /// calls this.
    pub(crate) fn push_backlink(&mut self, target: DocId, backlink: Backlink) {
        self.documents[target.0].backlinks.push(backlink);
    }

    /// All ids in registry order. Collected up front so callers may insert
    /// stubs while walking it.
    pub fn ids(&self) -> Vec<DocId> {
        (0..self.documents.len()).map(DocId).collect()
    }

    /// Ids of documents that exist on disk.
    pub fn known_ids(&self) -> Vec<DocId> {
        self.iter()
            .filter(|(_, doc)| !doc.is_stub())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (DocId(idx), doc))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn stub_count(&self) -> usize {
        self.documents.iter().filter(|doc| doc.is_stub()).count()
    }
}
