use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{
    LoggingConfig, ThemeConfig, TypingConfig, DEFAULT_API_ENDPOINT, DEFAULT_BOT_NAME,
    DEFAULT_GREETING, DEFAULT_PLACEHOLDER_TEXT, DEFAULT_USER_ID,
};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub api_endpoint: String,
    pub api_token: Option<SecretString>,
    /// Environment variable consulted before `api_token`.
    pub api_token_env: Option<String>,
    pub bot_name: String,
    pub bot_image: Option<String>,
    pub user_id: String,
    pub greeting: Option<String>,
    pub placeholder_text: String,
    /// Shown in place of the placeholder when a reply arrives empty.
    pub empty_reply_text: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub theme: ThemeConfig,
    pub typing: TypingConfig,
    pub logging: LoggingConfig,
}

impl WidgetConfig {
    pub fn resolved_token(&self) -> SecretString {
        let from_env = self
            .api_token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|value| !value.is_empty());
        match (from_env, &self.api_token) {
            (Some(value), _) => SecretString::new(value),
            (None, Some(token)) => SecretString::new(token.expose_secret().clone()),
            (None, None) => SecretString::new(String::new()),
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_token: None,
            api_token_env: None,
            bot_name: DEFAULT_BOT_NAME.to_string(),
            bot_image: None,
            user_id: DEFAULT_USER_ID.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
            empty_reply_text: None,
            timeout_seconds: None,
            theme: ThemeConfig::default(),
            typing: TypingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
