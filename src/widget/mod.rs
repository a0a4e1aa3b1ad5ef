mod id;
mod message;
mod scroll;
mod window;

pub use id::MessageId;
pub use message::{ConversationMessage, MessageKind, Sender};
pub use scroll::ScrollSurface;
pub use window::{ChatWindow, SubmitOutcome, WidgetEvent};
