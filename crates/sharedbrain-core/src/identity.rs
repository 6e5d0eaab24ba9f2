use std::borrow::Borrow;
use std::fmt;

/// Extension every document in the corpus carries on disk.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Canonical lookup key for a document: lower case, with exactly one `.md` suffix.
///
/// Two references are the same document if and only if their identities are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Turns the text of a link or a filename into an [`Identity`].
///
/// The link parser calls back into this instead of carrying its own folding rules.
pub trait IdentityNormalizer {
    fn normalize(&self, reference: &str) -> Identity;
}

/// Case- and extension-insensitive folding.
///
/// `"Second"`, `"second.md"` and `"SECOND.MD"` all fold to `second.md`.
/// Punctuation is kept as-is, so `"Foo?"` and `"Foo"` stay distinct.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaseFold;

impl IdentityNormalizer for CaseFold {
    fn normalize(&self, reference: &str) -> Identity {
        let lower = reference.trim().to_lowercase();
        let stem = lower.strip_suffix(MARKDOWN_EXTENSION).unwrap_or(&lower);
        Identity(format!("{}{}", stem, MARKDOWN_EXTENSION))
    }
}

/// Fold a reference with the default [`CaseFold`] rules.
pub fn normalize(reference: &str) -> Identity {
    CaseFold.normalize(reference)
}

/// Strip the trailing `.md` (any case) from a filename or reference.
pub fn remove_extension(name: &str) -> &str {
    let cut = name.len().saturating_sub(MARKDOWN_EXTENSION.len());
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION) => &name[..cut],
        _ => name,
    }
}

/// Filename a reference would have on disk: the reference plus `.md`, unless it
/// already ends with it.
///
/// Path separators become `-`, so the result is always a single file name in
/// the destination directory and `[[a/b]]` is written as `a-b.md`.
pub fn file_name_for(reference: &str) -> String {
    let stem = remove_extension(reference.trim()).replace(['/', '\\'], "-");
    format!("{}{}", stem, MARKDOWN_EXTENSION)
}
