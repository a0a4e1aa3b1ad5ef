mod logging;
mod theme;
mod typing;
mod widget;

const DEFAULT_API_ENDPOINT: &str = "https://app.eng.quant.ai/api/chat-messages";
const DEFAULT_BOT_NAME: &str = "ChatBot";
const DEFAULT_USER_ID: &str = "chat-widget-user";
const DEFAULT_GREETING: &str = "Hi! Welcome to Telco. I'm Quant. How can I help you today?";
const DEFAULT_PLACEHOLDER_TEXT: &str = "Thinking ...";
const DEFAULT_TYPING_INTERVAL_MS: u64 = 50;
const DEFAULT_LOG_BASENAME: &str = "chat-widget";
const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

pub use logging::{LogTarget, LoggingConfig};
pub use theme::ThemeConfig;
pub use typing::TypingConfig;
pub use widget::WidgetConfig;
