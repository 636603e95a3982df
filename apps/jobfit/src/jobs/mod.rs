//! Job search: the external source, the debounced pipeline in front of it,
//! the visible window and card formatting.

pub mod display;
pub mod pipeline;
pub mod source;
pub mod window;

pub use pipeline::{JobSearch, SearchStatus, DEBOUNCE};
pub use source::{AdzunaClient, JobSource, JobSourceError};
pub use window::{INITIAL_VISIBLE, LOAD_MORE_STEP};
