use crate::headers::Headers;
use crate::plural_forms;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An entire PO document: free-standing comments, the header entry and the
/// ordered sequence of translatable entries. Parsing produces one of these,
/// serialization consumes one; in between it is a plain mutable record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
  /// Free-text `#` lines preceding the header entry.
  pub comments: Vec<String>,
  /// `#.` lines preceding the header entry.
  pub extracted_comments: Vec<String>,
  pub headers: Headers,
  pub items: Vec<Entry>,
}

impl Catalog {
  pub fn new() -> Self { Self::default() }
}

/// One translatable unit: a msgid/msgstr pair plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
  pub msgid: String,
  /// Disambiguation context for otherwise-identical msgids.
  pub msgctxt: Option<String>,
  /// Plural-form source text; activates the indexed `msgstr` slots.
  pub msgid_plural: Option<String>,
  /// Translations by plural slot. Length 1 when there is no plural; malformed
  /// catalogs may carry a length diverging from `nplurals` and it is kept
  /// as-is rather than auto-corrected.
  pub msgstr: Vec<String>,
  pub comments: Vec<String>,
  pub extracted_comments: Vec<String>,
  pub references: Vec<String>,
  /// Flag names, each independently on or off. A flag explicitly set to
  /// `false` is representable and omitted from output.
  pub flags: IndexMap<String, bool>,
  /// Whether the entry was fully commented out with `#~` in the source.
  pub obsolete: bool,
  #[serde(default = "default_nplurals")]
  nplurals: usize,
}

fn default_nplurals() -> usize { plural_forms::DEFAULT_NPLURALS }

impl Default for Entry {
  fn default() -> Self { Self::new(plural_forms::DEFAULT_NPLURALS) }
}

impl Entry {
  /// `nplurals` comes from the document's `Plural-Forms` header at creation
  /// time and only sizes the empty plural placeholder output.
  pub fn new(nplurals: usize) -> Self {
    Self {
      msgid: String::new(),
      msgctxt: None,
      msgid_plural: None,
      msgstr: Vec::new(),
      comments: Vec::new(),
      extracted_comments: Vec::new(),
      references: Vec::new(),
      flags: IndexMap::new(),
      obsolete: false,
      nplurals,
    }
  }

  #[inline(always)]
  pub fn nplurals(&self) -> usize { self.nplurals }

  pub fn set_flag(&mut self, name: &str, enabled: bool) {
    self.flags.insert(name.to_owned(), enabled);
  }

  pub fn has_flag(&self, name: &str) -> bool {
    self.flags.get(name).copied().unwrap_or(false)
  }

  /// Names of the flags that are currently on, in insertion order.
  pub fn active_flags(&self) -> impl Iterator<Item = &str> + '_ {
    self.flags.iter().filter(|(_, &enabled)| enabled).map(|(name, _)| name.as_str())
  }

  /// Writes `text` into plural slot `n`, filling any skipped slots in between
  /// with empty strings.
  pub fn set_msgstr_slot(&mut self, n: usize, text: String) {
    *self.msgstr_slot_mut(n) = text;
  }

  pub(crate) fn msgstr_slot_mut(&mut self, n: usize) -> &mut String {
    if self.msgstr.len() <= n {
      self.msgstr.resize(n + 1, String::new());
    }
    &mut self.msgstr[n]
  }

  /// Whether any plural slot carries non-empty text.
  pub fn has_translation(&self) -> bool { self.msgstr.iter().any(|text| !text.is_empty()) }
}
