// Document intake: format extraction and section-aware chunking.
// Neither module touches session state or the search index.

pub mod chunker;
pub mod parser;
