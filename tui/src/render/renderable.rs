use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// A widget that knows how tall it wants to be at a given width.
pub(crate) trait Renderable {
    fn render(&self, area: Rect, buf: &mut Buffer);
    fn desired_height(&self, width: u16) -> u16;
}
