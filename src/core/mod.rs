mod engine;
mod format;
mod types;

pub use engine::{project, summarize};
pub use format::{format_indian_grouped, format_inr, format_percent};
pub use types::{Projection, ProjectionInput, ProjectionSummary, YearlySnapshot};
