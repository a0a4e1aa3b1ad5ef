use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use chat_widget::widget::{ConversationMessage, Sender};
use chat_widget::ScrollSurface;

/// Line-oriented chat view on stdout.
///
/// The terminal follows its own output, so scrolling to the bottom only has
/// to flush what was queued.
pub struct TerminalView<W: Write = Stdout> {
    out: W,
    bot_name: String,
    printed: usize,
    placeholder_open: bool,
}

impl TerminalView {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self::with_writer(io::stdout(), bot_name)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn with_writer(out: W, bot_name: impl Into<String>) -> Self {
        Self {
            out,
            bot_name: bot_name.into(),
            printed: 0,
            placeholder_open: false,
        }
    }

    pub fn print_message(&mut self, message: &ConversationMessage) -> io::Result<()> {
        self.label(message.sender)?;
        queue!(self.out, Print(&message.text), Print("\n"))?;
        self.out.flush()
    }

    pub fn print_placeholder(&mut self, text: &str) -> io::Result<()> {
        self.label(Sender::Bot)?;
        queue!(self.out, Print(text))?;
        self.placeholder_open = true;
        self.out.flush()
    }

    pub fn start_reply(&mut self) -> io::Result<()> {
        self.clear_placeholder()?;
        self.label(Sender::Bot)?;
        self.printed = 0;
        self.out.flush()
    }

    /// Prints the part of `revealed` not yet on screen.
    pub fn print_progress(&mut self, revealed: &str) -> io::Result<()> {
        if let Some(delta) = revealed.get(self.printed..) {
            queue!(self.out, Print(delta))?;
            self.printed = revealed.len();
        }
        self.out.flush()
    }

    pub fn finish_reply(&mut self, text: &str) -> io::Result<()> {
        self.print_progress(text)?;
        queue!(self.out, Print("\n"))?;
        self.printed = 0;
        self.out.flush()
    }

    pub fn print_notice(&mut self, notice: &str) -> io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::DarkGrey),
            Print(notice),
            ResetColor,
            Print("\n")
        )?;
        self.out.flush()
    }

    pub fn clear_placeholder(&mut self) -> io::Result<()> {
        if self.placeholder_open {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.placeholder_open = false;
        }
        Ok(())
    }

    fn label(&mut self, sender: Sender) -> io::Result<()> {
        let (name, color) = match sender {
            Sender::User => ("you", Color::Green),
            Sender::Bot => (self.bot_name.as_str(), Color::Cyan),
        };
        queue!(
            self.out,
            SetForegroundColor(color),
            Print(format!("{name}: ")),
            ResetColor
        )
    }
}

impl<W: Write> ScrollSurface for TerminalView<W> {
    fn scroll_to_bottom(&mut self) {
        if let Err(err) = self.out.flush() {
            log::debug!("terminal flush failed: {err}");
        }
    }
}
