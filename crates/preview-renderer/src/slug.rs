//! GitHub-style heading slugs.

use std::collections::HashMap;

/// Generates unique heading slugs within one document.
///
/// Repeated headings get `-1`, `-2`, ... suffixes in order of appearance.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Create an empty slugger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify heading text and make it unique.
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = String::with_capacity(text.len());
        for c in text.trim().chars() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                base.extend(c.to_lowercase());
            } else if c.is_whitespace() {
                base.push('-');
            }
        }
        if base.is_empty() {
            base.push_str("section");
        }
        self.claim(&base)
    }

    /// Register an explicit id, suffixing it if already taken.
    pub fn claim(&mut self, id: &str) -> String {
        match self.seen.get_mut(id) {
            None => {
                self.seen.insert(id.to_owned(), 0);
                id.to_owned()
            }
            Some(count) => {
                *count += 1;
                let candidate = format!("{id}-{count}");
                // "a-1" may itself have been used explicitly
                if self.seen.contains_key(&candidate) {
                    self.claim(&candidate)
                } else {
                    self.seen.insert(candidate.clone(), 0);
                    candidate
                }
            }
        }
    }
}
