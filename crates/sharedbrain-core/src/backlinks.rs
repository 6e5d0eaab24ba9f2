use crate::registry::{Backlink, DocId, DocumentRegistry};
use crate::rewriter::{convert_links_on_line, create_link};
use std::cmp::Reverse;

/// Backlinks in display order: newest source first, undated sources last.
///
/// The sort is stable, so equal dates and all undated entries stay in
/// discovery order.
pub fn order_backlinks(registry: &DocumentRegistry, backlinks: &[Backlink]) -> Vec<Backlink> {
    let mut ordered = backlinks.to_vec();
    ordered.sort_by_key(|bl| {
        let date = registry.document(bl.source).date();
        (date.is_none(), Reverse(date))
    });
    ordered
}

/// Markdown for the backlinks section of `id`, or an empty string when
/// nothing links to it.
///
/// Every source must have merged metadata already; the entry uses its title.
/// Links inside the quoted context are rewritten too.
pub fn render_backlinks(registry: &mut DocumentRegistry, id: DocId, heading: &str) -> String {
    let backlinks = registry.document(id).backlinks();
    if backlinks.is_empty() {
        return String::new();
    }
    let ordered = order_backlinks(registry, backlinks);

    let mut section = format!("\n## {}\n\n", heading);
    for backlink in ordered {
        let source = registry.document(backlink.source);
        let title = source.title().to_string();
        let link = create_link(source.original_name());
        let context = convert_links_on_line(&backlink.context, registry);
        section.push_str(&format!("* [{}]({})\n    * {}\n", title, link, context));
    }
    section
}

/// Append the backlinks section to the document's output.
pub fn add_backlinks(registry: &mut DocumentRegistry, id: DocId, heading: &str) {
    let section = render_backlinks(registry, id, heading);
    if !section.is_empty() {
        registry.document_mut(id).push_output(&section);
    }
}
