//! Alias bookkeeping.
//!
//! Every `alias -> code` pair in `aliases` appears exactly once in
//! `inverted_aliases[code]` and nowhere else. Codes whose last alias is
//! removed leave no empty entry behind.
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Bidirectional alias ↔ code mapping, persisted as the `metadata` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    aliases: HashMap<SmolStr, SmolStr>,
    #[serde(default)]
    inverted_aliases: HashMap<SmolStr, Vec<SmolStr>>,
}

impl Metadata {
    /// Metadata without aliases.
    pub fn new() -> Metadata {
        Metadata::default()
    }

    /// Code `alias` points at.
    pub fn code(&self, alias: &str) -> Option<&SmolStr> {
        self.aliases.get(alias)
    }

    /// Aliases of `code` in the order they were set.
    pub fn aliases_of(&self, code: &str) -> &[SmolStr] {
        self.inverted_aliases
            .get(code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether there are no aliases.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Points `alias` at `code`, detaching it from its previous code.
    ///
    /// Returns `false` if the alias already pointed at `code`.
    pub fn set(&mut self, alias: &str, code: &str) -> bool {
        if let Some(existing) = self.aliases.get(alias) {
            if existing == code {
                return false;
            }

            let existing = existing.clone();
            self.detach(alias, &existing);
        }

        self.aliases.insert(SmolStr::new(alias), SmolStr::new(code));
        self.inverted_aliases
            .entry(SmolStr::new(code))
            .or_default()
            .push(SmolStr::new(alias));

        true
    }

    /// Removes `alias`, returning the code it pointed at.
    pub fn remove(&mut self, alias: &str) -> Option<SmolStr> {
        let code = self.aliases.remove(alias)?;
        self.detach(alias, &code);
        Some(code)
    }

    fn detach(&mut self, alias: &str, code: &str) {
        if let Some(list) = self.inverted_aliases.get_mut(code) {
            list.retain(|a| a != alias);
            if list.is_empty() {
                self.inverted_aliases.remove(code);
            }
        }
    }

    /// Encodes the metadata file.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decodes the metadata file.
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Metadata> {
        serde_json::from_slice(bytes)
    }
}
