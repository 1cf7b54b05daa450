pub mod admin;
pub mod analysis;
pub mod conversation;
pub mod docs;
pub mod sheets;

pub use admin::AdminClient;
pub use analysis::AnalysisClient;
pub use conversation::{ChatReply, ConversationClient};
pub use docs::DocsClient;
pub use sheets::SheetsClient;
