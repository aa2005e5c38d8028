pub mod models;
mod session_id;

pub use models::ChatTurn;
pub use models::ContentItem;
pub use models::MessageContent;
pub use models::PromptLogEntry;
pub use models::Role;
pub use session_id::SessionId;
