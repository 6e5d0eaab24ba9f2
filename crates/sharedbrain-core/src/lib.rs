//! Wiki-link resolution and backlink injection for a folder of markdown notes.
//!
//! Every `[[Target]]` becomes a regular markdown link, every document gains a
//! "Backlinks" section quoting the lines that reference it, and link targets
//! that don't exist yet are written out as stub documents.

pub mod backlinks;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod identity;
pub mod link_indexer;
pub mod link_parser;
pub mod metadata;
pub mod pipeline;
pub mod registry;
pub mod rewriter;
pub mod store;

pub use config::{Config, StubDatePolicy};
pub use error::{BacklinkError, Result};
pub use pipeline::{process_backlinks, RunSummary};
pub use registry::{Backlink, DocId, Document, DocumentRegistry};
pub use store::{DirectorySink, DirectorySource, DocumentSink, DocumentSource, MemoryStore};
