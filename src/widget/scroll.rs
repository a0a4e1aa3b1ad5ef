/// Scrollable view holding the message list.
///
/// The window calls `scroll_to_bottom` whenever the list grows and on every
/// reveal step, so the newest text stays visible.
pub trait ScrollSurface {
    fn scroll_to_bottom(&mut self);
}
