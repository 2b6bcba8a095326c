//! YAML layout files describing a tree to materialize.

mod layout;

pub use layout::{DEFAULT_LAYOUT_FILE_NAME, Layout, LayoutEntry, LayoutError};
