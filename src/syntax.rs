use std::borrow::Cow;

/// Escapes the content of one PO string literal. Real newlines are passed
/// through untouched: callers split on `\n` first and the multi-line writer
/// appends the literal `\n` escapes itself.
pub fn escape_str(text: &str, out: &mut String) {
  out.reserve(text.len());
  let mut literal_text_start = 0;

  for (i, &b) in text.as_bytes().iter().enumerate() {
    let escape_type = ESCAPE_TYPE_TABLE[b as usize];
    if escape_type == 0 {
      continue;
    }

    let literal_text = &text[literal_text_start..i];
    out.push_str(literal_text);
    literal_text_start = i + 1;

    out.push('\\');
    out.push(escape_type as char);
  }

  let last_literal_text = &text[literal_text_start..];
  out.push_str(last_literal_text);

  const AA: u8 = b'a'; // \x07
  const BB: u8 = b'b'; // \x08
  const TT: u8 = b't'; // \x09
  const VV: u8 = b'v'; // \x0B
  const FF: u8 = b'f'; // \x0C
  const RR: u8 = b'r'; // \x0D
  const QU: u8 = b'"'; // \x22
  const BS: u8 = b'\\'; // \x5C
  const __: u8 = 0;

  // Note that \n (\x0A) is deliberately absent.
  static ESCAPE_TYPE_TABLE: [u8; 1 << 8] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    __, __, __, __, __, __, __, AA, BB, TT, __, VV, FF, RR, __, __, // 0
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 1
    __, __, QU, __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 7
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
  ];
}

/// Decodes backslash escapes in the content of one PO string literal.
///
/// `\NNN` (three octal digits) and `\xHH` (two hex digits) decode to the
/// corresponding code point; any other escaped character decodes to itself,
/// the backslash is simply dropped. Unrecognized escapes are never an error.
pub fn unescape_str(raw: &str) -> Cow<'_, str> {
  if !raw.contains('\\') {
    return Cow::Borrowed(raw);
  }

  let bytes = raw.as_bytes();
  let mut out = String::with_capacity(raw.len());
  let mut literal_text_start = 0;
  let mut i = 0;

  while i < bytes.len() {
    if bytes[i] != b'\\' {
      i += 1;
      continue;
    }

    let rest = &raw[i + 1..];
    let decoded = octal_escape(rest).or_else(|| hex_escape(rest)).or_else(|| {
      rest.chars().next().map(|c| {
        let unescaped = match c {
          'a' => '\x07',
          'b' => '\x08',
          't' => '\t',
          'n' => '\n',
          'v' => '\x0B',
          'f' => '\x0C',
          'r' => '\r',
          _ => c,
        };
        (unescaped, c.len_utf8())
      })
    });

    match decoded {
      // A backslash at the very end of the input stays as-is.
      None => i += 1,
      Some((unescaped_char, escape_len)) => {
        out.push_str(&raw[literal_text_start..i]);
        out.push(unescaped_char);
        i += 1 + escape_len;
        literal_text_start = i;
      }
    }
  }

  let last_literal_text = &raw[literal_text_start..];
  out.push_str(last_literal_text);
  Cow::Owned(out)
}

fn octal_escape(rest: &str) -> Option<(char, usize)> {
  let digits = rest.as_bytes().get(..3)?;
  let mut code: u32 = 0;
  for &b in digits {
    code = code * 8 + (b as char).to_digit(8)?;
  }
  std::char::from_u32(code).map(|c| (c, 3))
}

fn hex_escape(rest: &str) -> Option<(char, usize)> {
  let digits = rest.strip_prefix('x')?.as_bytes().get(..2)?;
  let mut code: u32 = 0;
  for &b in digits {
    code = code * 16 + (b as char).to_digit(16)?;
  }
  std::char::from_u32(code).map(|c| (c, 3))
}
