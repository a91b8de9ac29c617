//! Link sets and vault-wide reference counts.
//!
//! Both are recomputed from the host's metadata on every call. The host may
//! re-index between calls, so nothing here is cached.

use std::collections::{BTreeSet, HashMap};

use crate::host::{FileNode, Vault};

pub struct LinkIndex<'a, V: Vault + ?Sized> {
    vault: &'a V,
}

impl<'a, V: Vault + ?Sized> LinkIndex<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Distinct decoded targets that `file` links to or embeds.
    ///
    /// Each raw target is resolved against the host's link index; targets the
    /// host cannot resolve are kept as written. No cached metadata means no links.
    pub fn links_of(&self, file: &FileNode) -> BTreeSet<String> {
        let Some(cache) = self.vault.file_cache(file) else {
            return BTreeSet::new();
        };

        cache
            .links
            .iter()
            .chain(cache.embeds.iter())
            .map(|raw| {
                let target = self
                    .vault
                    .resolve_link(raw, &file.path)
                    .map(|resolved| resolved.path)
                    .unwrap_or_else(|| raw.clone());
                decode_path(&target)
            })
            .collect()
    }

    /// Number of distinct markdown files referencing each target path.
    pub fn reference_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for file in self.vault.markdown_files() {
            for target in self.links_of(&file) {
                *counts.entry(target).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Percent-decode a vault path.
///
/// Malformed input (a stray `%`, a truncated escape, bytes that aren't UTF-8)
/// is returned unchanged.
pub fn decode_path(encoded: &str) -> String {
    if !has_valid_escapes(encoded) {
        tracing::info!("Failed to decode path {:?}, using it as written", encoded);
        return encoded.to_string();
    }
    match urlencoding::decode(encoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::info!("Failed to decode path {:?}, using it as written: {}", encoded, e);
            encoded.to_string()
        }
    }
}

/// Every `%` must start a two-digit hex escape.
fn has_valid_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
