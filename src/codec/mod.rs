//! Reading and writing the generator's JavaScript search files.

pub(crate) mod lexer;
pub mod sections;
pub mod table;
pub(crate) mod value;

pub use sections::{SECTIONS_FILE, Section, SectionIndex, emit_sections, parse_sections};
pub use table::{emit_table, parse_table};
