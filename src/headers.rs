use crate::catalog::Catalog;
use crate::plural_forms::{self, PluralForms};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The well-known gettext header names, in the order gettext tools emit them.
pub const KNOWN_HEADER_NAMES: [&str; 10] = [
  "Project-Id-Version",
  "Report-Msgid-Bugs-To",
  "POT-Creation-Date",
  "PO-Revision-Date",
  "Last-Translator",
  "Language",
  "Language-Team",
  "Content-Type",
  "Content-Transfer-Encoding",
  "Plural-Forms",
];

/// The headers of the leading `msgid ""` entry. The ten well-known names are
/// explicit fields (always present, defaulting to the empty string), anything
/// non-standard lands in `extra` in insertion order. `order` remembers the
/// order in which names were first set and only controls output order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Headers {
  #[serde(rename = "Project-Id-Version")]
  pub project_id_version: String,
  #[serde(rename = "Report-Msgid-Bugs-To")]
  pub report_msgid_bugs_to: String,
  #[serde(rename = "POT-Creation-Date")]
  pub pot_creation_date: String,
  #[serde(rename = "PO-Revision-Date")]
  pub po_revision_date: String,
  #[serde(rename = "Last-Translator")]
  pub last_translator: String,
  #[serde(rename = "Language")]
  pub language: String,
  #[serde(rename = "Language-Team")]
  pub language_team: String,
  #[serde(rename = "Content-Type")]
  pub content_type: String,
  #[serde(rename = "Content-Transfer-Encoding")]
  pub content_transfer_encoding: String,
  #[serde(rename = "Plural-Forms")]
  pub plural_forms: String,
  #[serde(flatten)]
  pub extra: IndexMap<String, String>,
  #[serde(skip)]
  pub order: Vec<String>,
}

impl Headers {
  fn known_field(&self, name: &str) -> Option<&String> {
    Some(match name {
      "Project-Id-Version" => &self.project_id_version,
      "Report-Msgid-Bugs-To" => &self.report_msgid_bugs_to,
      "POT-Creation-Date" => &self.pot_creation_date,
      "PO-Revision-Date" => &self.po_revision_date,
      "Last-Translator" => &self.last_translator,
      "Language" => &self.language,
      "Language-Team" => &self.language_team,
      "Content-Type" => &self.content_type,
      "Content-Transfer-Encoding" => &self.content_transfer_encoding,
      "Plural-Forms" => &self.plural_forms,
      _ => return None,
    })
  }

  fn known_field_mut(&mut self, name: &str) -> Option<&mut String> {
    Some(match name {
      "Project-Id-Version" => &mut self.project_id_version,
      "Report-Msgid-Bugs-To" => &mut self.report_msgid_bugs_to,
      "POT-Creation-Date" => &mut self.pot_creation_date,
      "PO-Revision-Date" => &mut self.po_revision_date,
      "Last-Translator" => &mut self.last_translator,
      "Language" => &mut self.language,
      "Language-Team" => &mut self.language_team,
      "Content-Type" => &mut self.content_type,
      "Content-Transfer-Encoding" => &mut self.content_transfer_encoding,
      "Plural-Forms" => &mut self.plural_forms,
      _ => return None,
    })
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    match self.known_field(name) {
      Some(field) => Some(field.as_str()),
      None => self.extra.get(name).map(String::as_str),
    }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.known_field(name).is_some() || self.extra.contains_key(name)
  }

  /// Sets a header value, recording the name in the output order the first
  /// time it is seen.
  pub fn set(&mut self, name: &str, value: String) {
    match self.known_field_mut(name) {
      Some(field) => *field = value,
      None => {
        self.extra.insert(name.to_owned(), value);
      }
    }
    if !self.order.iter().any(|recorded| recorded == name) {
      self.order.push(name.to_owned());
    }
  }

  /// The names in the order they are written out: explicitly ordered names
  /// first, then the remaining well-known names, then leftover extras.
  pub fn output_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> =
      Vec::with_capacity(KNOWN_HEADER_NAMES.len() + self.extra.len());
    for name in &self.order {
      if self.contains(name) && !names.contains(&name.as_str()) {
        names.push(name);
      }
    }
    for &name in KNOWN_HEADER_NAMES.iter() {
      if !names.contains(&name) {
        names.push(name);
      }
    }
    for name in self.extra.keys() {
      if !names.contains(&name.as_str()) {
        names.push(name);
      }
    }
    names
  }

  pub fn plural_forms(&self) -> PluralForms {
    plural_forms::parse_plural_forms(&self.plural_forms)
  }
}

/// Splits the normalized source into the header block text and the entry body
/// text. The document is cut on blank lines; leading sections are captured
/// until one of them contains the literal `msgid ""` line. A document that
/// opens with a real entry right away gets a synthetic `msgid ""` marker
/// instead, so the implicit empty header block is still recognized.
pub(crate) fn split_header_from_body(src: &str) -> (String, String) {
  let sections: Vec<&str> = src.split("\n\n").collect();
  let mut header_chunks: Vec<&str> = Vec::new();
  let mut body_start = 0;

  while header_chunks.last().map_or(true, |last| !last.contains(r#"msgid """#)) {
    let section = match sections.get(body_start) {
      Some(&section) if !section.is_empty() => section,
      _ => break,
    };
    if contains_nonempty_msgid(section) {
      header_chunks.push(r#"msgid """#);
    } else {
      header_chunks.push(section);
      body_start += 1;
    }
  }

  (header_chunks.join("\n"), sections[body_start..].join("\n"))
}

/// Whether the section contains a `msgid` keyword followed by a string with
/// actual content, i.e. the start of a real entry rather than a header block.
fn contains_nonempty_msgid(section: &str) -> bool {
  let mut rest = section;
  while let Some(keyword_index) = rest.find("msgid") {
    let after_keyword = &rest[keyword_index + "msgid".len()..];
    let after_whitespace = after_keyword.trim_start();
    if after_whitespace.len() < after_keyword.len() {
      let mut chars = after_whitespace.chars();
      if chars.next() == Some('"') && matches!(chars.next(), Some(c) if c != '"') {
        return true;
      }
    }
    rest = after_keyword;
  }
  false
}

/// Fold state for reassembling header values that gettext wrapped across
/// physical lines: a fully quoted line that doesn't end in `\n"` is merged
/// with its successor.
#[derive(Debug)]
struct ContinuationFold {
  lines: Vec<String>,
  pending_merge: bool,
}

impl ContinuationFold {
  fn push(&mut self, line: &str) {
    let line = if self.pending_merge {
      self.pending_merge = false;
      let mut merged = self.lines.pop().unwrap_or_default();
      // Drop the closing quote of the wrapped line and the opening quote of
      // its continuation.
      merged.pop();
      let mut continuation = line.chars();
      continuation.next();
      merged.push_str(continuation.as_str());
      merged
    } else {
      line.to_owned()
    };
    if is_merge_candidate(&line) {
      self.pending_merge = true;
    }
    self.lines.push(line);
  }
}

fn is_merge_candidate(line: &str) -> bool {
  line.len() >= 2 && line.starts_with('"') && line.ends_with('"') && !line.ends_with("\\n\"")
}

/// Decodes the captured header block into the catalog: leading comments,
/// extracted comments and the `key: value` headers with their order.
pub(crate) fn parse_header_block(header_text: &str, catalog: &mut Catalog) {
  let mut fold = ContinuationFold { lines: Vec::new(), pending_merge: false };
  for line in header_text.split('\n') {
    fold.push(line);
  }

  for line in &fold.lines {
    if let Some(comment) = line.strip_prefix("#.") {
      catalog.extracted_comments.push(comment.trim_start().to_owned());
    } else if let Some(comment) = line.strip_prefix('#') {
      catalog.comments.push(comment.trim_start().to_owned());
    } else if line.starts_with('"') {
      let trimmed = line.trim();
      let inner = trimmed.strip_prefix('"').unwrap_or(trimmed);
      let inner =
        inner.strip_suffix("\\n\"").or_else(|| inner.strip_suffix('"')).unwrap_or(inner);
      let (name, value) = match inner.find(':') {
        Some(colon_index) => (inner[..colon_index].trim(), inner[colon_index + 1..].trim()),
        None => (inner.trim(), ""),
      };
      catalog.headers.set(name, value.to_owned());
    }
    // Anything else in here (the `msgid ""` marker and its `msgstr ""`)
    // carries no data.
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_known_names_always_resolve() {
    let headers = Headers::default();
    for &name in KNOWN_HEADER_NAMES.iter() {
      assert_eq!(headers.get(name), Some(""));
    }
    assert_eq!(headers.get("X-Generator"), None);
  }

  #[test]
  fn test_set_records_order_once() {
    let mut headers = Headers::default();
    headers.set("Language", "fr".to_owned());
    headers.set("X-Generator", "Poedit 1.6.2".to_owned());
    headers.set("Language", "de".to_owned());
    assert_eq!(headers.get("Language"), Some("de"));
    assert_eq!(headers.order, ["Language", "X-Generator"]);
  }

  #[test]
  fn test_output_names_fills_in_missing_known_names() {
    let mut headers = Headers::default();
    headers.set("Language", "fr".to_owned());
    headers.set("X-Generator", "Poedit 1.6.2".to_owned());
    let names = headers.output_names();
    assert_eq!(names[0], "Language");
    assert_eq!(names[1], "X-Generator");
    assert_eq!(names[2], "Project-Id-Version");
    assert_eq!(names.len(), KNOWN_HEADER_NAMES.len() + 1);
  }

  #[test]
  fn test_header_continuation_merge() {
    let mut catalog = Catalog::new();
    let block = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=3; plural=n==1 \"\n\"? 0 : 2;\\n\"";
    parse_header_block(block, &mut catalog);
    assert_eq!(catalog.headers.get("Plural-Forms"), Some("nplurals=3; plural=n==1 ? 0 : 2;"));
  }

  #[test]
  fn test_header_block_comments() {
    let mut catalog = Catalog::new();
    parse_header_block("# leading\n#\n#. extracted\nmsgid \"\"\nmsgstr \"\"", &mut catalog);
    assert_eq!(catalog.comments, ["leading", ""]);
    assert_eq!(catalog.extracted_comments, ["extracted"]);
  }

  #[test]
  fn test_split_header_inserts_synthetic_marker() {
    let (header, body) = split_header_from_body("msgid \"no header\"\nmsgstr \"\"");
    assert_eq!(header, "msgid \"\"");
    assert_eq!(body, "msgid \"no header\"\nmsgstr \"\"");
  }

  #[test]
  fn test_split_header_consumes_leading_sections() {
    let src = "# hello\n\nmsgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\nmsgid \"a\"\nmsgstr \"b\"\n";
    let (header, body) = split_header_from_body(src);
    assert!(header.starts_with("# hello\nmsgid \"\""));
    assert!(body.contains("msgid \"a\""));
    assert!(!body.contains("Language"));
  }
}
