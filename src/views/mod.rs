pub mod chat;
pub mod docs;
pub mod shared;

pub use chat::ChatView;
pub use docs::DocsView;
