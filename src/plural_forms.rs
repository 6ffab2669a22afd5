use log::warn;
use serde::{Deserialize, Serialize};

/// Plural slot count used when the `Plural-Forms` header is missing or its
/// `nplurals` value is unusable.
pub const DEFAULT_NPLURALS: usize = 2;

/// The decomposed value of the `Plural-Forms` header. Both fields are kept as
/// the raw text of the header; the plural selection expression in particular
/// is opaque and never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluralForms {
  pub nplurals: Option<String>,
  pub plural: Option<String>,
}

impl PluralForms {
  /// The slot count as a number. Ungenerated templates ship the literal
  /// placeholder `INTEGER` here, which (like any other unusable value) falls
  /// back to [`DEFAULT_NPLURALS`] instead of being treated as an error.
  pub fn nplurals_or_default(&self) -> usize {
    match &self.nplurals {
      None => DEFAULT_NPLURALS,
      Some(raw) => match raw.parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
          warn!("unusable nplurals value {:?}, assuming {}", raw, DEFAULT_NPLURALS);
          DEFAULT_NPLURALS
        }
      },
    }
  }
}

/// Splits a `Plural-Forms` header value into its `nplurals` and `plural`
/// assignments. Whitespace around `=` is tolerated, unknown keys are skipped,
/// an empty value yields an empty result.
pub fn parse_plural_forms(header_value: &str) -> PluralForms {
  let mut forms = PluralForms::default();

  for segment in header_value.split(';') {
    let segment = segment.trim();
    if segment.is_empty() {
      continue;
    }
    let (key, value) = match segment.find('=') {
      Some(equals_index) => {
        (segment[..equals_index].trim_end(), segment[equals_index + 1..].trim_start())
      }
      None => continue,
    };
    match key {
      "nplurals" => forms.nplurals = Some(value.to_owned()),
      "plural" => forms.plural = Some(value.to_owned()),
      _ => {}
    }
  }

  forms
}
