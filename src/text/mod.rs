//! Text module: from raw HTML to deduplicated plain-text records
//!
//! - `extract`: visible-text linearization and whitespace collapsing
//! - `readability`: main-content extraction before linearization
//! - `processor`: the single text-queue consumer (dedup, buffering, flushing)

mod extract;
mod processor;
mod readability;

pub use extract::{collapse_whitespace, extract_visible_text};
pub use processor::{Checkpoint, TextOutcome, TextProcessor, MIN_TEXT_CHARS};
pub use readability::{summarize, ReadabilityError};
