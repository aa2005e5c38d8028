//! Per-step state: content normalization, the truncation heuristic and
//! action-bar visibility. The widget that ties them together lives in
//! [`crate::step_container`].

pub mod content;
pub mod hover;
pub mod truncation;

pub use content::normalize_for_truncation;
pub use content::strip_images;
pub use hover::HoverState;
pub use hover::HoverVisibilityController;
pub use truncation::TruncationTracker;
pub use truncation::is_truncated;
