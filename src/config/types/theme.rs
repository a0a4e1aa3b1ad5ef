use serde::{Deserialize, Serialize};

/// Colors and images handed to the UI layer untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub bot_bubble_color: String,
    pub user_bubble_color: String,
    pub avatar_image: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#007bff".to_string(),
            background_color: "#f4f4f4".to_string(),
            text_color: "#000000".to_string(),
            bot_bubble_color: "#e6e6e6".to_string(),
            user_bubble_color: "#007bff".to_string(),
            avatar_image: None,
        }
    }
}
