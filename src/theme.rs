use ratatui::style::{Color, Modifier, Style};

/// Colours of the terminal editor.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the editor
    pub background: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Foreground color for toolbar buttons
    pub toolbar_fg: Color,

    /// Background color for the toolbar row
    pub toolbar_bg: Color,

    /// Foreground color for buttons whose format is active at the caret
    pub toolbar_active_fg: Color,

    /// Background color for buttons whose format is active at the caret
    pub toolbar_active_bg: Color,

    /// Foreground color for buttons that cannot be used right now
    pub toolbar_disabled_fg: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Color for links
    pub link_color: Color,

    /// Color for image placeholders
    pub image_color: Color,

    /// Color for blockquote bars
    pub quote_color: Color,

    /// Color for the placeholder shown in an empty document
    pub placeholder_color: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menu
    pub menu_bg: Color,

    /// Foreground color for disabled menu items
    pub menu_disabled_fg: Color,

    /// Foreground color for selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for selected menu entry
    pub menu_selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            toolbar_fg: Color::Gray,
            toolbar_bg: Color::Black,
            toolbar_active_fg: Color::Black,
            toolbar_active_bg: Color::LightCyan,
            toolbar_disabled_fg: Color::DarkGray,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            link_color: Color::Blue,
            image_color: Color::Magenta,
            quote_color: Color::DarkGray,
            placeholder_color: Color::DarkGray,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_disabled_fg: Color::DarkGray,
            menu_selected_fg: Color::White,
            menu_selected_bg: Color::LightBlue,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    pub fn toolbar_style(&self) -> Style {
        Style::default().fg(self.toolbar_fg).bg(self.toolbar_bg)
    }

    pub fn toolbar_active_style(&self) -> Style {
        Style::default()
            .fg(self.toolbar_active_fg)
            .bg(self.toolbar_active_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn toolbar_disabled_style(&self) -> Style {
        Style::default()
            .fg(self.toolbar_disabled_fg)
            .bg(self.toolbar_bg)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// Get the style for links
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn image_style(&self) -> Style {
        Style::default()
            .fg(self.image_color)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn quote_style(&self) -> Style {
        Style::default().fg(self.quote_color)
    }

    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_color)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get the style for the menu/popup
    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    /// Get the style for a disabled menu item
    pub fn menu_disabled_style(&self) -> Style {
        Style::default().fg(self.menu_disabled_fg)
    }

    /// Get the style for a selected menu entry
    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }
}
