#[path = "chat-widget/app.rs"]
mod app;
#[path = "chat-widget/args.rs"]
mod args;
#[path = "chat-widget/logging.rs"]
mod logging;
#[path = "chat-widget/terminal.rs"]
mod terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
