pub mod draft;
pub mod normalize;

pub use draft::{TaskDraft, TaskPrompt};
pub use normalize::{
    extract, extract_json_object, extract_text, normalize_analysis, normalize_summary,
    unescape_newlines, Analysis, Extraction, Summary, FALLBACK_SUGGESTIONS, MAX_UNESCAPE_PASSES,
    NO_INSIGHTS, NO_SUGGESTIONS, NO_SUMMARY,
};
