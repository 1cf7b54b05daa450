pub mod api;
pub mod config;
pub mod format;
pub mod model;
pub mod state;

// Re-export main types for convenience
pub use api::{AdminClient, AnalysisClient, ChatReply, ConversationClient, DocsClient, SheetsClient};
pub use config::Config;
pub use format::{
    detect_category, format_message, Fragment, RenderBlock, RenderLine, RenderTree,
    ResponseCategory, ValueTone,
};
pub use model::Analysis;
pub use state::{ChatMessage, ChatRole, Conversation};
