use ratatui::style::Style;

/// Style slots shared by every widget in the crate.
///
/// Hosts construct one `Theme` (or take the default) and pass it to each
/// widget's `render`. Per-widget option styles override individual slots;
/// an option left at `Style::default()` falls back to the theme slot, so
/// theming never requires reaching into a widget's internals.
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    pub success: Style,
    /// Grid/tab header row.
    pub header: Style,
    /// Alternate row background for striped grids.
    pub stripe: Style,
    pub border: Style,
    pub selection: Style,
    pub cursor: Style,
    pub disabled: Style,
    pub placeholder: Style,
    /// Inline validation messages.
    pub error_text: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Modifier;
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            success: Style::default().green(),
            header: Style::default().bold(),
            stripe: Style::default().on_dark_gray(),
            border: Style::default().dark_gray(),
            selection: Style::default().add_modifier(Modifier::BOLD).cyan(),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            disabled: Style::default().dark_gray().dim(),
            placeholder: Style::default().dark_gray().italic(),
            error_text: Style::default().red(),
        }
    }
}
