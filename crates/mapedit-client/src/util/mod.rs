mod callback;

pub use callback::*;
