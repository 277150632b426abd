//! Text input and output formats.

pub mod reader;
pub mod writer;

pub use reader::{load_event_from_file, parse_event};
pub use writer::{save_tuplets_to_file, write_tuplets};
