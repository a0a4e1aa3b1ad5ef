use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;

use chat_widget::WidgetConfig;

#[derive(Parser, Debug)]
#[command(
    name = "chat-widget",
    about = "Terminal front end for a streaming chat endpoint"
)]
pub struct CliArgs {
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    #[arg(long, short = 'e')]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
    #[arg(long)]
    pub no_typing: bool,
    /// Send one message, print the reply and exit.
    #[arg(long, short = 'p')]
    pub prompt: Option<String>,
}

impl CliArgs {
    pub fn apply(&self, config: &mut WidgetConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.api_endpoint = endpoint.clone();
        }
        if let Some(token) = &self.token {
            config.api_token = Some(SecretString::new(token.clone()));
        }
        if let Some(interval) = self.interval_ms {
            config.typing.interval_ms = interval;
        }
        if self.no_typing {
            config.typing.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_config_fields() {
        let args = CliArgs::parse_from([
            "chat-widget",
            "--endpoint",
            "http://localhost:9000/chat",
            "--interval-ms",
            "10",
            "--no-typing",
        ]);
        let mut config = WidgetConfig::default();
        args.apply(&mut config);
        assert_eq!(config.api_endpoint, "http://localhost:9000/chat");
        assert_eq!(config.typing.interval_ms, 10);
        assert!(!config.typing.enabled);
        assert!(config.api_token.is_none());
    }
}
