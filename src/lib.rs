// See:
// <https://www.gnu.org/software/gettext/manual/gettext.html#PO-Files>
// <https://www.gnu.org/software/gettext/manual/gettext.html#Filling-in-the-Header-Entry>
// <https://www.gnu.org/software/gettext/manual/gettext.html#Plural-forms>
// <https://github.com/izimobil/polib/blob/0ab9af63d227d30fb261c2dd496ee74f91844a86/polib.py>
// <https://github.com/translate/translate/blob/88d13bea244b1894a4bedf67ba5b8b65cc29d3b0/translate/storage/pypo.py>

#![deny(missing_debug_implementations)]

pub mod catalog;
pub mod headers;
pub mod parser;
pub mod plural_forms;
pub mod syntax;
pub mod writer;

pub use crate::catalog::{Catalog, Entry};
pub use crate::headers::Headers;
pub use crate::parser::parse;
pub use crate::plural_forms::{parse_plural_forms, PluralForms};
pub use crate::writer::serialize;
