pub mod buffer;
pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod extract;
pub mod intent;
pub mod queue;
pub mod session;
pub mod text;
pub mod validate;

pub use buffer::{DocumentBuffer, RangeEdit, TextBuffer};
pub use config::Settings;
pub use edit::{Edit, EditId, EditKind, EditOp, EditStatus, LineSpan};
pub use engine::{AcceptOutcome, ResolvedRange};
pub use error::{BufferError, SuggestError, SuggestResult};
pub use extract::{ProposedHunk, extract_edits};
pub use intent::{Intent, IntentClassifier, IntentHints, KeywordClassifier, classify_intent};
pub use queue::{EditSet, QueueEvent, SuggestionQueue};
pub use session::{Proposal, ReviewSession};
pub use validate::{Validation, validate};
