use crate::identity::remove_extension;
use crate::link_parser::{split_link_content, WIKILINK_RE};
use crate::registry::DocumentRegistry;
use regex::Captures;

/// Link path for a document: a sibling directory named after the lower-cased
/// filename, with each space turned into a hyphen.
///
/// `"Name With Spaces.md"` becomes `"../name-with-spaces/"`.
pub fn create_link(original_name: &str) -> String {
    let name = remove_extension(original_name).to_lowercase().replace(' ', "-");
    format!("../{}/", name)
}

/// Replace every `[[...]]` on `line` with a markdown link.
///
/// Targets that aren't registered yet are materialized as stubs, so the
/// produced link never dangles.
pub fn convert_links_on_line(line: &str, registry: &mut DocumentRegistry) -> String {
    WIKILINK_RE
        .replace_all(line, |cap: &Captures<'_>| {
            let Some((target, display)) = split_link_content(&cap[1]) else {
                return cap[0].to_string();
            };
            let known = registry.lookup(target).is_some();
            let id = registry.resolve_or_create_stub(target);
            if !known {
                tracing::debug!("Late stub {} discovered while rewriting", target);
            }
            format!("[{}]({})", display, create_link(registry.document(id).original_name()))
        })
        .into_owned()
}

/// Rewrite every line of `body`, terminating each with `\n`.
pub fn convert_links(body: &str, registry: &mut DocumentRegistry) -> String {
    let mut output = String::with_capacity(body.len());
    for line in body.lines() {
        output.push_str(&convert_links_on_line(line, registry));
        output.push('\n');
    }
    output
}
