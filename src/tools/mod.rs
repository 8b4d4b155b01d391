pub mod inspect_entry;
pub mod list_sections;
pub mod search;
pub mod validate;

pub use inspect_entry::*;
pub use list_sections::*;
pub use search::*;
pub use validate::*;
