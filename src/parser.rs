use crate::catalog::{Catalog, Entry};
use crate::headers;
use crate::syntax;

use log::debug;
use std::mem;

/// Parses PO text into a [`Catalog`]. The parser is total: malformed input
/// degrades to a best-effort structure instead of failing. Windows line
/// endings are normalized away first.
pub fn parse(src: &str) -> Catalog {
  let src = src.replace("\r\n", "\n");
  let mut catalog = Catalog::new();

  let (header_text, body_text) = headers::split_header_from_body(&src);
  headers::parse_header_block(&header_text, &mut catalog);

  let nplurals = catalog.headers.plural_forms().nplurals_or_default();
  let mut machine = EntryMachine::new(nplurals);
  for line in body_text.split('\n') {
    machine.feed(line);
  }
  machine.finish_entry();

  debug!("parsed catalog with {} entries", machine.items.len());
  catalog.items = machine.items;
  catalog
}

/// Which keyword is currently accepting continuation strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
  None,
  Msgid,
  MsgidPlural,
  Msgctxt,
  Msgstr(usize),
}

#[derive(Debug)]
struct EntryMachine {
  nplurals: usize,
  item: Entry,
  context: Context,
  content_line_count: usize,
  obsolete_line_count: usize,
  items: Vec<Entry>,
}

impl EntryMachine {
  fn new(nplurals: usize) -> Self {
    Self {
      nplurals,
      item: Entry::new(nplurals),
      context: Context::None,
      content_line_count: 0,
      obsolete_line_count: 0,
      items: Vec::new(),
    }
  }

  /// Closes the entry under construction if it accumulated a msgid. An entry
  /// is obsolete when at least as many of its content lines carried the `#~`
  /// marker as there were content lines: gettext comments out every keyword
  /// line of a removed entry, and the tie tolerates a trailing continuation
  /// that wasn't re-marked.
  fn finish_entry(&mut self) {
    if !self.item.msgid.is_empty() {
      if self.obsolete_line_count >= self.content_line_count {
        self.item.obsolete = true;
      }
      self.content_line_count = 0;
      self.obsolete_line_count = 0;
      self.items.push(mem::replace(&mut self.item, Entry::new(self.nplurals)));
    }
  }

  fn feed(&mut self, raw_line: &str) {
    let mut line = raw_line.trim();
    let mut line_obsolete = false;

    if let Some(stripped) = line.strip_prefix("#~") {
      // Only the marker is removed here; the stripped line may well start a
      // new entry, so it is tallied after normal processing.
      line = stripped.trim();
      line_obsolete = true;
    }

    if let Some(reference) = line.strip_prefix("#:") {
      self.finish_entry();
      self.item.references.push(reference.trim().to_owned());
    } else if let Some(flags) = line.strip_prefix("#,") {
      self.finish_entry();
      for flag in flags.trim().split(',') {
        self.item.flags.insert(flag.to_owned(), true);
      }
    } else if is_translator_comment(line) {
      self.finish_entry();
      self.item.comments.push(line[1..].trim().to_owned());
    } else if let Some(comment) = line.strip_prefix("#.") {
      self.finish_entry();
      self.item.extracted_comments.push(comment.trim().to_owned());
    } else if line.starts_with("msgid_plural") {
      self.item.msgid_plural = Some(extract_quoted(line));
      self.context = Context::MsgidPlural;
      self.content_line_count += 1;
    } else if line.starts_with("msgid") {
      self.finish_entry();
      self.item.msgid = extract_quoted(line);
      self.context = Context::Msgid;
      self.content_line_count += 1;
    } else if line.starts_with("msgstr") {
      let slot = msgstr_slot(line);
      self.item.set_msgstr_slot(slot, extract_quoted(line));
      self.context = Context::Msgstr(slot);
      self.content_line_count += 1;
    } else if line.starts_with("msgctxt") {
      self.finish_entry();
      self.item.msgctxt = Some(extract_quoted(line));
      self.context = Context::Msgctxt;
      self.content_line_count += 1;
    } else if !line.is_empty() {
      // A continuation of whichever field is open, or noise when none is.
      self.content_line_count += 1;
      let text = extract_quoted(line);
      match self.context {
        Context::Msgid => self.item.msgid.push_str(&text),
        Context::MsgidPlural => match &mut self.item.msgid_plural {
          Some(plural) => plural.push_str(&text),
          None => self.item.msgid_plural = Some(text),
        },
        Context::Msgctxt => match &mut self.item.msgctxt {
          Some(context) => context.push_str(&text),
          None => self.item.msgctxt = Some(text),
        },
        Context::Msgstr(slot) => self.item.msgstr_slot_mut(slot).push_str(&text),
        Context::None => {}
      }
    }

    if line_obsolete {
      self.obsolete_line_count += 1;
    }
  }
}

/// `#` alone or `#` followed by whitespace. `#.`/`#:`/`#,` are checked
/// beforehand, anything else `#`-prefixed falls through as a continuation.
fn is_translator_comment(line: &str) -> bool {
  match line.strip_prefix('#') {
    Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
    None => false,
  }
}

/// The slot index of a `msgstr[n]` line; a bare `msgstr` (or an unusable
/// index) is slot 0.
fn msgstr_slot(line: &str) -> usize {
  let rest = match line.strip_prefix("msgstr[") {
    Some(rest) => rest,
    None => return 0,
  };
  match rest.find(']') {
    Some(end) => rest[..end].parse().unwrap_or(0),
    None => 0,
  }
}

/// Pulls the decoded text out of a keyword line: everything up to and
/// including the first quote and a trailing quote are dropped, the rest is
/// unescaped.
fn extract_quoted(line: &str) -> String {
  let line = line.trim();
  let inner = match line.find('"') {
    Some(open_quote) => &line[open_quote + 1..],
    None => line,
  };
  let inner = inner.strip_suffix('"').unwrap_or(inner);
  syntax::unescape_str(inner).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::headers::KNOWN_HEADER_NAMES;

  fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
  }

  const BIG: &str = r##"# French translation of Link (6.x-2.9)
# Copyright (c) 2011 by the French translation team
#
msgid ""
msgstr ""
"Project-Id-Version: Link (6.x-2.9)\n"
"POT-Creation-Date: 2011-12-31 23:39+0000\n"
"PO-Revision-Date: 2013-12-17 14:21+0100\n"
"Language-Team: French\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"Plural-Forms: nplurals=2; plural=(n > 1);\n"
"Last-Translator: Ruben Vermeersch <ruben@rocketeer.be>\n"
"Language: fr\n"
"X-Generator: Poedit 1.6.2\n"

msgid "Title"
msgstr "Titre"

msgctxt "folder display"
msgid "Empty folder"
msgstr "Dossier vide"

msgctxt "folder action"
msgid "Empty folder"
msgstr "Vider le dossier"
"##;

  #[test]
  fn test_minimal_example() {
    init_logging();
    let catalog = parse("msgid \"minimal PO\"\nmsgstr \"\"");
    assert_eq!(catalog.items.len(), 1);
    assert_eq!(catalog.items[0].msgid, "minimal PO");
    assert_eq!(catalog.items[0].msgstr, [""]);
    for &name in KNOWN_HEADER_NAMES.iter() {
      assert_eq!(catalog.headers.get(name), Some(""));
    }
  }

  #[test]
  fn test_empty_input() {
    let catalog = parse("");
    assert_eq!(catalog.items.len(), 0);
    for &name in KNOWN_HEADER_NAMES.iter() {
      assert_eq!(catalog.headers.get(name), Some(""));
    }
  }

  #[test]
  fn test_headers_and_document_comments() {
    let catalog = parse(BIG);
    assert_eq!(
      catalog.comments,
      [
        "French translation of Link (6.x-2.9)",
        "Copyright (c) 2011 by the French translation team",
        "",
      ],
    );
    assert_eq!(catalog.headers.get("Project-Id-Version"), Some("Link (6.x-2.9)"));
    assert_eq!(catalog.headers.get("Plural-Forms"), Some("nplurals=2; plural=(n > 1);"));
    assert_eq!(catalog.headers.get("X-Generator"), Some("Poedit 1.6.2"));
    assert_eq!(catalog.headers.get("MIME-Version"), Some("1.0"));
    // Defaulted, was absent from the input.
    assert_eq!(catalog.headers.get("Report-Msgid-Bugs-To"), Some(""));
    assert_eq!(catalog.headers.order[0], "Project-Id-Version");
    assert_eq!(catalog.headers.order[4], "MIME-Version");
  }

  #[test]
  fn test_msgctxt_disambiguation() {
    let catalog = parse(BIG);
    let ambiguous: Vec<&Entry> =
      catalog.items.iter().filter(|item| item.msgid == "Empty folder").collect();
    assert_eq!(ambiguous.len(), 2);
    assert_eq!(ambiguous[0].msgctxt.as_deref(), Some("folder display"));
    assert_eq!(ambiguous[1].msgctxt.as_deref(), Some("folder action"));
  }

  #[test]
  fn test_multi_line_strings() {
    let src = r##"msgid ""
msgstr ""
"Language: fr\n"

msgid ""
"The following placeholder tokens can be used. "
"They will be replaced."
msgstr ""
"Les jetons suivants peuvent "
"être utilisés."
"##;
    let catalog = parse(src);
    assert_eq!(catalog.items.len(), 1);
    let item = &catalog.items[0];
    assert_eq!(item.msgid, "The following placeholder tokens can be used. They will be replaced.");
    assert_eq!(item.msgstr, ["Les jetons suivants peuvent être utilisés."]);
  }

  #[test]
  fn test_multi_line_header_value() {
    let src = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=3; plural=n==1 ? 0 : \"\n\"n%10>=2 ? 1 : 2;\\n\"\n";
    let catalog = parse(src);
    assert_eq!(
      catalog.headers.get("Plural-Forms"),
      Some("nplurals=3; plural=n==1 ? 0 : n%10>=2 ? 1 : 2;"),
    );
  }

  #[test]
  fn test_entry_comments_references_and_flags() {
    let src = r##"msgid ""
msgstr ""

# Translator comment
#. Extracted comment
#: .tmp/crm/controllers/map.js
#, fuzzy
msgid "Title, as plain text"
msgstr "Attribut title, en tant que texte brut"

#
#.
#:
msgid "Empty comment"
msgstr "Empty"
"##;
    let catalog = parse(src);
    assert_eq!(catalog.items.len(), 2);
    let first = &catalog.items[0];
    assert_eq!(first.comments, ["Translator comment"]);
    assert_eq!(first.extracted_comments, ["Extracted comment"]);
    assert_eq!(first.references, [".tmp/crm/controllers/map.js"]);
    assert!(first.has_flag("fuzzy"));
    let second = &catalog.items[1];
    assert_eq!(second.comments, [""]);
    assert_eq!(second.extracted_comments, [""]);
    assert_eq!(second.references, [""]);
  }

  #[test]
  fn test_references_stay_unsplit() {
    let src = r##"msgid ""
msgstr ""

#: a
#: b
msgid "X"
msgstr "Y"

#: standard input:12 standard input:17
msgid "Z"
msgstr "ZZ"
"##;
    let catalog = parse(src);
    assert_eq!(catalog.items[0].references, ["a", "b"]);
    assert_eq!(catalog.items[1].references, ["standard input:12 standard input:17"]);
  }

  #[test]
  fn test_flag_list_tokens_keep_their_spacing() {
    let catalog = parse("msgid \"\"\nmsgstr \"\"\n\n#, fuzzy, c-format\nmsgid \"a\"\nmsgstr \"b\"\n");
    let flags: Vec<&str> = catalog.items[0].flags.keys().map(String::as_str).collect();
    assert_eq!(flags, ["fuzzy", " c-format"]);
    assert!(catalog.items[0].has_flag(" c-format"));
  }

  #[test]
  fn test_plural_entry() {
    let src = r##"msgid ""
msgstr ""
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

msgid "one thing"
msgid_plural "{{count}} things"
msgstr[0] "une chose"
msgstr[1] "{{count}} choses"
"##;
    let catalog = parse(src);
    let item = &catalog.items[0];
    assert_eq!(item.msgid, "one thing");
    assert_eq!(item.msgid_plural.as_deref(), Some("{{count}} things"));
    assert_eq!(item.msgstr, ["une chose", "{{count}} choses"]);
    assert_eq!(item.nplurals(), 2);
  }

  #[test]
  fn test_obsolete_entries() {
    let src = r##"msgid ""
msgstr ""

msgid "{{dataLoader.data.length}} results"
msgstr "{{dataLoader.data.length}} resultaten"

#~ msgid "Add order"
#~ msgstr "Order toevoegen"

# commented obsolete item
#, fuzzy
#~ msgid "Commented item"
#~ msgstr "not sure"
"##;
    let catalog = parse(src);
    assert_eq!(catalog.items.len(), 3);
    assert!(!catalog.items[0].obsolete);
    assert!(catalog.items[1].obsolete);
    assert_eq!(catalog.items[1].msgid, "Add order");
    let commented = &catalog.items[2];
    assert!(commented.obsolete);
    assert_eq!(commented.comments, ["commented obsolete item"]);
    assert!(commented.has_flag("fuzzy"));
  }

  #[test]
  fn test_obsolete_tie_break() {
    // Both content lines are marked: a tie, which counts as obsolete.
    let tied = parse("msgid \"\"\nmsgstr \"\"\n\n#~ msgid \"tie\"\n#~ msgstr \"old\"\n");
    assert!(tied.items[0].obsolete);
    // Only one of two content lines is marked: kept alive.
    let kept = parse("msgid \"\"\nmsgstr \"\"\n\nmsgid \"fresh\"\n#~ msgstr \"old\"\n");
    assert!(!kept.items[0].obsolete);
  }

  #[test]
  fn test_c_string_escapes() {
    let src = r##"msgid ""
msgstr ""

msgid "The name field must not contain characters like \" or \\"
msgstr ""

msgid "%1$s\n%2$s %3$s\n%4$s\n%5$s"
msgstr ""
"##;
    let catalog = parse(src);
    assert_eq!(
      catalog.items[0].msgid,
      "The name field must not contain characters like \" or \\",
    );
    assert_eq!(catalog.items[1].msgid, "%1$s\n%2$s %3$s\n%4$s\n%5$s");
  }

  #[test]
  fn test_windows_line_endings() {
    let catalog = parse("msgid \"a\"\r\nmsgstr \"b\"\r\n");
    assert_eq!(catalog.items.len(), 1);
    assert_eq!(catalog.items[0].msgid, "a");
    assert_eq!(catalog.items[0].msgstr, ["b"]);
  }

  #[test]
  fn test_nplurals_reaches_entries() {
    let src = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=6; plural=0;\\n\"\n\nmsgid \"x\"\nmsgstr \"y\"\n";
    let catalog = parse(src);
    assert_eq!(catalog.items[0].nplurals(), 6);
    // The INTEGER placeholder falls back to 2 instead of erroring out.
    let src = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=INTEGER; plural=EXPRESSION;\\n\"\n\nmsgid \"x\"\nmsgstr \"y\"\n";
    let catalog = parse(src);
    assert_eq!(catalog.items[0].nplurals(), 2);
  }

  #[test]
  fn test_msgstr_slot_lines() {
    assert_eq!(msgstr_slot("msgstr \"x\""), 0);
    assert_eq!(msgstr_slot("msgstr[0] \"x\""), 0);
    assert_eq!(msgstr_slot("msgstr[12] \"x\""), 12);
    assert_eq!(msgstr_slot("msgstr[oops] \"x\""), 0);
  }
}
