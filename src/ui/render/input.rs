use crate::ui::model::{DEFAULT_WIDTH, Focus, INPUT_BLOCK_LINES, Model};
use crate::ui::render::styles::{
    STYLE_CARET, STYLE_DISABLED, STYLE_INPUT_BOX, STYLE_LABEL, STYLE_PLACEHOLDER, style_token,
};
use crate::ui::render::util::truncate_plain;

const TOKEN_CLOSE: &str = " ×";
const OPEN_MARK: &str = "▾";

fn token_text(m: &Model, item: &serde_json::Value) -> String {
    format!("{}{TOKEN_CLOSE}", truncate_plain(&m.label(item), 24))
}

/// Columns taken by the token strip in front of the search box, box padding
/// included.
pub fn token_strip_width(m: &Model) -> usize {
    let tokens: usize = m
        .select
        .selected()
        .as_slice()
        .iter()
        .map(|item| token_text(m, item).chars().count() + 1)
        .sum();
    2 + tokens
}

fn render_search(m: &Model) -> String {
    if m.focus != Focus::Search {
        return m.input.clone();
    }
    let chars: Vec<char> = m.input.chars().collect();
    let caret = m.caret.min(chars.len());
    let before: String = chars[..caret].iter().collect();
    let under = chars.get(caret).map_or(" ".to_string(), char::to_string);
    let after: String = chars.get(caret + 1..).map_or(String::new(), |s| s.iter().collect());
    format!("{before}{}{after}", STYLE_CARET.render(&under))
}

fn placeholder(m: &Model) -> String {
    STYLE_PLACEHOLDER.render(m.select.placeholder().unwrap_or(""))
}

fn multiple_content(m: &Model) -> String {
    let theme = m.select.config().theme.as_str();
    let mut parts: Vec<String> = m
        .select
        .selected()
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let active = m.select.active_token() == Some(i);
            style_token(theme, active).render(&token_text(m, item))
        })
        .collect();
    if m.input.is_empty() && m.select.selected().is_empty() && !m.select.is_open() {
        parts.push(placeholder(m));
    } else {
        let mut search = render_search(m);
        if let Some(width) = m.search_width {
            // the search box never grows past its computed width
            if m.input.chars().count() >= width as usize {
                search = truncate_plain(&m.input, width as usize);
            }
        }
        parts.push(search);
    }
    parts.join(" ")
}

fn single_content(m: &Model) -> String {
    if m.select.is_open() {
        return format!("> {}", render_search(m));
    }
    let shown = match m.select.selected().single() {
        Some(item) if !m.select.is_empty() => STYLE_LABEL.render(&m.label(item)),
        _ => placeholder(m),
    };
    format!("{shown} {OPEN_MARK}")
}

pub fn render_input_block(m: &Model) -> Vec<String> {
    let inner = if m.select.is_multiple() {
        multiple_content(m)
    } else {
        single_content(m)
    };
    let inner = if m.select.is_control_disabled() {
        STYLE_DISABLED.render(&inner)
    } else {
        inner
    };
    let box_width = if m.screen_width >= 2 {
        m.screen_width - 2
    } else {
        DEFAULT_WIDTH
    };
    let w_i32: i32 = box_width.try_into().unwrap_or(i32::MAX);
    let block = STYLE_INPUT_BOX.clone().width(w_i32).render(&inner);
    let mut out: Vec<String> = block.lines().map(str::to_string).collect();
    out.truncate(INPUT_BLOCK_LINES);
    while out.len() < INPUT_BLOCK_LINES {
        out.push(String::new());
    }
    out
}
