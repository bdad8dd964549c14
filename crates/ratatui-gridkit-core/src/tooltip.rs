use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::render;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TooltipPlacement {
    #[default]
    Above,
    Below,
}

#[derive(Clone, Debug)]
pub struct TooltipOptions {
    pub placement: TooltipPlacement,
    pub style: Style,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            placement: TooltipPlacement::default(),
            style: Style::default(),
        }
    }
}

/// One-line overlay anchored to another widget's rect.
///
/// Rendering is on demand: the host draws its normal content first, then
/// calls [`Tooltip::render`] with the anchor and the containing area; the
/// tooltip clamps itself inside the container and falls back to the other
/// side when its preferred placement does not fit.
pub struct Tooltip {
    text: String,
    visible: bool,
    options: TooltipOptions,
}

impl Tooltip {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
            options: TooltipOptions::default(),
        }
    }

    pub fn with_options(text: impl Into<String>, options: TooltipOptions) -> Self {
        let mut t = Self::new(text);
        t.options = options;
        t
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn render(&self, anchor: Rect, within: Rect, buf: &mut Buffer, theme: &Theme) {
        if !self.visible || within.width == 0 || within.height == 0 {
            return;
        }
        let style = if self.options.style == Style::default() {
            theme.accent
        } else {
            self.options.style
        };

        let text = format!(" {} ", self.text);
        let w = (UnicodeWidthStr::width(text.as_str()) as u16).min(within.width);

        let above_fits = anchor.y > within.y;
        let below_fits = anchor.y + anchor.height < within.y + within.height;
        let y = match (self.options.placement, above_fits, below_fits) {
            (TooltipPlacement::Above, true, _) => anchor.y - 1,
            (TooltipPlacement::Above, false, true) => anchor.y + anchor.height,
            (TooltipPlacement::Below, _, true) => anchor.y + anchor.height,
            (TooltipPlacement::Below, true, false) => anchor.y - 1,
            _ => return,
        };

        let max_x = (within.x + within.width).saturating_sub(w);
        let x = anchor.x.min(max_x).max(within.x);
        render::render_aligned(
            x,
            y,
            w,
            buf,
            &text,
            ratatui::layout::Alignment::Left,
            style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_tooltip_draws_nothing() {
        let t = Tooltip::new("hint");
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));
        t.render(
            Rect::new(2, 2, 4, 1),
            Rect::new(0, 0, 20, 5),
            &mut buf,
            &Theme::default(),
        );
        assert_eq!(buf.cell((2, 1)).map(|c| c.symbol()), Some(" "));
    }

    #[test]
    fn renders_above_by_default_and_flips_when_clamped() {
        let mut t = Tooltip::new("hi");
        t.show();
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));

        t.render(
            Rect::new(2, 2, 4, 1),
            Rect::new(0, 0, 20, 5),
            &mut buf,
            &Theme::default(),
        );
        assert_eq!(buf.cell((3, 1)).map(|c| c.symbol()), Some("h"));

        // Anchored to the top row: no room above, flips below.
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));
        t.render(
            Rect::new(2, 0, 4, 1),
            Rect::new(0, 0, 20, 5),
            &mut buf,
            &Theme::default(),
        );
        assert_eq!(buf.cell((3, 1)).map(|c| c.symbol()), Some("h"));
    }
}
