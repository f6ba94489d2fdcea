use lipgloss::{Color, Style, rounded_border};
use once_cell::sync::Lazy;

/// Accent color of a theme; unknown names fall back to bootstrap.
pub fn accent(theme: &str) -> Color {
    match theme {
        "select2" => Color::from_rgb(88, 151, 251),
        "selectize" => Color::from_rgb(31, 141, 214),
        _ => Color::from_rgb(66, 139, 202),
    }
}

pub fn style_active(theme: &str) -> Style {
    Style::new()
        .background(accent(theme))
        .foreground(Color::from_rgb(255, 255, 255))
        .bold(true)
}

pub fn style_token(theme: &str, active: bool) -> Style {
    if active {
        style_active(theme)
    } else {
        Style::new().foreground(accent(theme))
    }
}

pub static STYLE_MATCH: Lazy<Style> = Lazy::new(|| {
    Style::new()
        .foreground(Color::from_rgb(238, 0, 238))
        .bold(true)
});
pub static STYLE_LABEL: Lazy<Style> =
    Lazy::new(|| Style::new().foreground(Color::from_rgb(200, 200, 200)));
pub static STYLE_DISABLED: Lazy<Style> = Lazy::new(|| Style::new().faint(true));
pub static STYLE_HEADER: Lazy<Style> = Lazy::new(|| Style::new().bold(true).faint(true));
pub static STYLE_PLACEHOLDER: Lazy<Style> = Lazy::new(|| Style::new().faint(true));
pub static STYLE_CARET: Lazy<Style> = Lazy::new(|| {
    Style::new()
        .background(Color::from_rgb(200, 200, 200))
        .foreground(Color::from_rgb(0, 0, 0))
});
pub static STYLE_MODELINE: Lazy<Style> = Lazy::new(|| {
    Style::new()
        .background(Color::from_rgb(95, 95, 95))
        .foreground(Color::from_rgb(255, 255, 255))
        .padding(0, 1, 0, 1)
});
pub static STYLE_INPUT_BOX: Lazy<Style> =
    Lazy::new(|| Style::new().border(rounded_border()).padding(0, 1, 0, 1));
