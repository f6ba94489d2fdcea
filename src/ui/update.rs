use crate::keys::{Key, KeyEvent};
use crate::select::{ChoicesViewport, Effect, Outcome};
use crate::ui::model::{Focus, Model, RESERVED_LINES};
use crate::ui::Msg;
use bubbletea_widgets::Viewport;

pub fn handle_update(m: &mut Model, msg: Msg) {
    match msg {
        Msg::WindowSize { width, height } => handle_window_size(m, width, height),
        Msg::Tick => {}
        key => {
            m.err.clear();
            match m.focus {
                Focus::Search => handle_search_key(m, &key),
                Focus::Proxy => handle_proxy_key(m, &key),
            }
        }
    }
    drain_effects(m);
    sync_input(m);
    sync_view(m);
}

fn key_event(msg: &Msg) -> Option<KeyEvent> {
    let key = match msg {
        Msg::KeyUp => Key::Up,
        Msg::KeyDown => Key::Down,
        Msg::KeyLeft => Key::Left,
        Msg::KeyRight => Key::Right,
        Msg::KeyEnter => Key::Enter,
        Msg::KeyTab => Key::Tab,
        Msg::KeyEsc => Key::Esc,
        Msg::KeyBackspace => Key::Backspace,
        Msg::KeyDelete => Key::Delete,
        Msg::KeySpace => Key::Space,
        Msg::KeyHome => Key::Home,
        Msg::KeyEnd => Key::End,
        Msg::Rune(ch) => Key::Char(*ch),
        Msg::WindowSize { .. } | Msg::Tick => return None,
    };
    Some(KeyEvent::new(key))
}

fn handle_window_size(m: &mut Model, width: usize, height: usize) {
    m.screen_width = width;
    m.per_page = height.saturating_sub(RESERVED_LINES);
    m.vp = Viewport::new(m.screen_width, m.per_page);
    if m.select.is_multiple() {
        size_search_input(m);
    }
}

fn handle_search_key(m: &mut Model, msg: &Msg) {
    let Some(event) = key_event(msg) else {
        return;
    };
    let outcome = match m.select.handle_key(event, m.caret, &mut m.layout) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "search key failed");
            m.err = e.to_string();
            return;
        }
    };
    let default_action = match outcome {
        Outcome::Pass => true,
        Outcome::Handled { prevent_default } => !prevent_default,
    };
    if default_action {
        edit_search(m, event.key);
    }
}

// What the search box does with a key the controller left alone.
fn edit_search(m: &mut Model, key: Key) {
    let len = m.input.chars().count();
    match key {
        Key::Char(ch) => insert_char(m, ch),
        Key::Space => insert_char(m, ' '),
        Key::Backspace if m.caret > 0 => {
            m.caret -= 1;
            remove_char(m, m.caret);
        }
        Key::Delete if m.caret < len => remove_char(m, m.caret),
        Key::Left => m.caret = m.caret.saturating_sub(1),
        Key::Right => m.caret = (m.caret + 1).min(len),
        Key::Home => m.caret = 0,
        Key::End => m.caret = len,
        Key::Tab => {
            // focus leaves the search box
            m.select.search_blurred();
            if !m.select.is_multiple() {
                m.select.close(true);
                m.focus = Focus::Proxy;
            }
        }
        Key::Esc => m.select.close(false),
        _ => {}
    }
}

fn insert_char(m: &mut Model, ch: char) {
    let at = byte_offset(&m.input, m.caret);
    m.input.insert(at, ch);
    m.caret += 1;
    m.select.set_search(&m.input);
}

fn remove_char(m: &mut Model, caret: usize) {
    let at = byte_offset(&m.input, caret);
    m.input.remove(at);
    m.select.set_search(&m.input);
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

fn handle_proxy_key(m: &mut Model, msg: &Msg) {
    let Some(event) = key_event(msg) else {
        return;
    };
    let text = match event.key {
        Key::Char(ch) => ch.to_string(),
        _ => String::new(),
    };
    let outcome = m.select.proxy_key(event, &text);
    tracing::trace!(key = ?event.key, ?outcome, "proxy key");
}

fn drain_effects(m: &mut Model) {
    for effect in m.select.run_due() {
        match effect {
            Effect::FocusSearchInput => {
                m.focus = Focus::Search;
                m.input = m.select.search().to_string();
                m.caret = m.input.chars().count();
            }
            Effect::FocusProxy => m.focus = Focus::Proxy,
            Effect::SizeSearchInput => size_search_input(m),
            Effect::Refresh { search } => match m.select.sync() {
                Ok(()) => {
                    let count = m.select.items().len();
                    tracing::info!(%search, count, "items refreshed");
                    m.notice = format!("{count} matching \"{search}\"");
                }
                Err(e) => {
                    tracing::warn!(error = %e, %search, "refresh failed");
                    m.err = e.to_string();
                }
            },
        }
    }
}

fn size_search_input(m: &mut Model) {
    let container = u32::try_from(m.screen_width).unwrap_or(u32::MAX);
    let offset = u32::try_from(crate::ui::render::token_strip_width(m)).unwrap_or(u32::MAX);
    m.search_width = m.select.search_input_width(container, offset);
}

// The controller may rewrite the search text (reset on open/close).
fn sync_input(m: &mut Model) {
    if m.input != m.select.search() {
        m.input = m.select.search().to_string();
        m.caret = m.input.chars().count();
    }
}

/// Rebuild row geometry from the current items and refresh the viewport content.
pub(crate) fn sync_view(m: &mut Model) {
    if m.last_search != m.select.search() {
        m.last_search = m.select.search().to_string();
        m.layout.set_scroll_top(0);
        m.vp.goto_top();
    }
    let scroll = m.layout.scroll_top();
    m.layout.clear_rows();
    m.layout
        .set_viewport_height(i32::try_from(m.per_page).unwrap_or(i32::MAX));
    match m.select.groups() {
        Some(groups) => {
            for group in groups {
                m.layout.push_header(1);
                for _ in &group.items {
                    m.layout.push_row(1);
                }
            }
        }
        None => {
            for _ in m.select.items() {
                m.layout.push_row(1);
            }
        }
    }
    let max_scroll = (m.layout.content_height() - m.layout.viewport_height()).max(0);
    m.layout.set_scroll_top(scroll.clamp(0, max_scroll));
    if m.select.is_open() && m.layout.row_count() > 0 {
        if let Err(e) = m.select.ensure_highlight_visible(&mut m.layout) {
            tracing::warn!(error = %e, "could not scroll to highlight");
        }
    }
    let content = crate::ui::render::dropdown_lines(m).join("\n");
    m.vp.set_content(&content);
}
