//! Line reconstruction from positioned text fragments.

mod grouper;

pub use grouper::{group_page, group_pages, lines_from_text};
