mod use_editor;

pub use use_editor::*;
