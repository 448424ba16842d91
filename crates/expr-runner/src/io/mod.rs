mod read_context;

pub use read_context::{load_context_file, ContextFileError};
