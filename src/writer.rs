use crate::catalog::{Catalog, Entry};
use crate::syntax;

use std::fmt;

/// Renders a catalog back to canonical PO text. The output always uses `\n`
/// and ends each entry block with a blank separator line.
pub fn serialize(catalog: &Catalog) -> String { catalog.to_string() }

impl fmt::Display for Catalog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&catalog_lines(self).join("\n"))
  }
}

impl fmt::Display for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&entry_lines(self).join("\n"))
  }
}

fn catalog_lines(catalog: &Catalog) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();

  for comment in &catalog.comments {
    lines.push(comment_line("# ", comment));
  }
  for comment in &catalog.extracted_comments {
    lines.push(comment_line("#. ", comment));
  }

  lines.push(r#"msgid """#.to_owned());
  lines.push(r#"msgstr """#.to_owned());

  for name in catalog.headers.output_names() {
    let value = catalog.headers.get(name).unwrap_or("");
    lines.push(format!("\"{}: {}\\n\"", name, value));
  }

  lines.push(String::new());

  for item in &catalog.items {
    lines.extend(entry_lines(item));
    lines.push(String::new());
  }

  lines
}

/// A document-level comment line; an empty comment renders as the bare
/// prefix with trailing whitespace dropped.
fn comment_line(prefix: &str, text: &str) -> String {
  let mut line = String::with_capacity(prefix.len() + text.len());
  line.push_str(prefix);
  line.push_str(text);
  let trimmed_len = line.trim_end().len();
  line.truncate(trimmed_len);
  line
}

/// The lines of one entry block, in the fixed gettext order: translator
/// comments, extracted comments, references, flags, then the keyword fields.
fn entry_lines(entry: &Entry) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();

  for comment in &entry.comments {
    lines.push(format!("# {}", comment));
  }
  for comment in &entry.extracted_comments {
    lines.push(format!("#. {}", comment));
  }
  for reference in &entry.references {
    lines.push(format!("#: {}", reference));
  }
  let active_flags: Vec<&str> = entry.active_flags().collect();
  if !active_flags.is_empty() {
    lines.push(format!("#, {}", active_flags.join(",")));
  }

  // The keyword fields in their fixed emission order, regardless of how they
  // arrived. Obsolete markup applies to these lines only.
  if let Some(msgctxt) = &entry.msgctxt {
    push_keyword_block(&mut lines, entry, keyword_lines("msgctxt", msgctxt, None));
  }
  push_keyword_block(&mut lines, entry, keyword_lines("msgid", &entry.msgid, None));
  if let Some(msgid_plural) = &entry.msgid_plural {
    push_keyword_block(&mut lines, entry, keyword_lines("msgid_plural", msgid_plural, None));
  }
  if entry.msgstr.len() > 1 {
    for (slot, text) in entry.msgstr.iter().enumerate() {
      push_keyword_block(&mut lines, entry, keyword_lines("msgstr", text, Some(slot)));
    }
  } else if entry.msgid_plural.is_some() && !entry.has_translation() {
    for slot in 0..entry.nplurals() {
      push_keyword_block(&mut lines, entry, keyword_lines("msgstr", "", Some(slot)));
    }
  } else {
    let text = entry.msgstr.first().map_or("", String::as_str);
    let slot = if entry.msgid_plural.is_some() { Some(0) } else { None };
    push_keyword_block(&mut lines, entry, keyword_lines("msgstr", text, slot));
  }

  lines
}

fn push_keyword_block(lines: &mut Vec<String>, entry: &Entry, block: Vec<String>) {
  for line in block {
    if entry.obsolete {
      lines.push(format!("#~ {}", line));
    } else {
      lines.push(line);
    }
  }
}

/// Renders one keyword field. Text with embedded newlines becomes an
/// empty-quote header line followed by one quoted segment per line, with a
/// literal `\n` inside the quotes of every segment except the last.
fn keyword_lines(keyword: &str, text: &str, slot: Option<usize>) -> Vec<String> {
  let index = match slot {
    Some(i) => format!("[{}]", i),
    None => String::new(),
  };

  let parts: Vec<&str> = text.split('\n').collect();
  let mut lines: Vec<String> = Vec::with_capacity(parts.len() + 1);

  if parts.len() > 1 {
    lines.push(format!("{}{} \"\"", keyword, index));
    for part in parts {
      let mut quoted = String::with_capacity(part.len() + 2);
      quoted.push('"');
      syntax::escape_str(part, &mut quoted);
      quoted.push('"');
      lines.push(quoted);
    }
  } else {
    let mut escaped = String::new();
    syntax::escape_str(text, &mut escaped);
    lines.push(format!("{}{} \"{}\"", keyword, index, escaped));
  }

  for line in lines.iter_mut().skip(1).rev().skip(1) {
    line.pop();
    line.push_str("\\n\"");
  }

  lines
}
