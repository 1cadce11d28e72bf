//! Manifest parsing.
//!
//! Packaged artifacts carry a `META-INF/MANIFEST.MF` entry made of
//! `Name: value` headers. The first block of headers holds the main
//! attributes; later blocks, separated by blank lines and introduced by a
//! `Name:` header, describe individual entries. Long values are wrapped onto
//! continuation lines that start with a single space.

use std::collections::BTreeMap;

use crate::repository::{RepositoryError, RepositoryResult};

/// Path of the manifest entry inside a packaged artifact.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Attribute map keyed by header name.
pub type Attributes = BTreeMap<String, String>;

/// Parsed manifest.
///
/// An artifact without a manifest is represented by [`Manifest::default`],
/// which has no attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    sections: BTreeMap<String, Attributes>,
}

impl Manifest {
    /// Parse manifest bytes.
    ///
    /// Accepts `\n`, `\r\n` and `\r` line endings.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ManifestParse`] for a header line without a
    /// `:` separator or a continuation line with nothing to continue.
    ///
    /// # Example
    ///
    /// ```
    /// use update_center::manifest::Manifest;
    ///
    /// let manifest = Manifest::parse(b"Manifest-Version: 1.0\nShort-Name: foo\n").unwrap();
    /// assert_eq!(manifest.get("short-name"), Some("foo"));
    /// ```
    pub fn parse(bytes: &[u8]) -> RepositoryResult<Self> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_start_matches('\u{feff}');
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut manifest = Manifest::default();
        let mut current = Attributes::new();
        let mut in_main = true;
        let mut last_key: Option<String> = None;

        for (idx, line) in normalized.lines().enumerate() {
            let line_no = idx + 1;

            if line.is_empty() {
                manifest.finish_block(&mut current, &mut in_main);
                last_key = None;
                continue;
            }

            if let Some(rest) = line.strip_prefix(' ') {
                let key = last_key.as_ref().ok_or_else(|| RepositoryError::ManifestParse {
                    line: line_no,
                    reason: "continuation line without a header".to_string(),
                })?;
                if let Some(value) = current.get_mut(key) {
                    value.push_str(rest);
                }
                continue;
            }

            let (name, value) = line.split_once(':').ok_or_else(|| {
                RepositoryError::ManifestParse {
                    line: line_no,
                    reason: format!("missing ':' in '{}'", line),
                }
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(RepositoryError::ManifestParse {
                    line: line_no,
                    reason: "empty header name".to_string(),
                });
            }

            let value = value.strip_prefix(' ').unwrap_or(value);
            current.insert(name.to_string(), value.to_string());
            last_key = Some(name.to_string());
        }

        manifest.finish_block(&mut current, &mut in_main);
        Ok(manifest)
    }

    fn finish_block(&mut self, block: &mut Attributes, in_main: &mut bool) {
        if block.is_empty() {
            return;
        }
        let block = std::mem::take(block);
        if *in_main {
            self.main = block;
            *in_main = false;
            return;
        }
        match find_key(&block, "Name").map(str::to_string) {
            Some(name) => {
                self.sections.insert(name, block);
            }
            None => {
                tracing::debug!("Ignoring manifest section without a Name header");
            }
        }
    }

    /// Main attributes.
    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    /// Look up a main attribute; header names compare case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        find_key(&self.main, name)
    }

    /// Attributes of the named per-entry section.
    pub fn section(&self, name: &str) -> Option<&Attributes> {
        self.sections.get(name)
    }

    /// Names of the per-entry sections.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// True when the manifest carries no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.sections.is_empty()
    }
}

fn find_key<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
