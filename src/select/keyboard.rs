//! Search box key handling and highlight scrolling.

use super::Select;
use crate::error::{Error, Result};
use crate::keys::{Key, KeyEvent};

/// Result of offering a key to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The key was consumed; `prevent_default` tells the host to swallow it.
    Handled { prevent_default: bool },
    Pass,
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        matches!(self, Outcome::Handled { .. })
    }
}

/// Vertical placement of one choice row, in the same units as the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    pub top: i32,
    pub height: i32,
}

/// The scrollable container holding the choice rows.
pub trait ChoicesViewport {
    fn row_count(&self) -> usize;
    fn row(&self, index: usize) -> Option<RowGeometry>;
    fn viewport_height(&self) -> i32;
    fn scroll_top(&self) -> i32;
    fn set_scroll_top(&mut self, top: i32);
}

/// Rows stacked top to bottom, with optional non-selectable lines (group
/// headers) between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    rows: Vec<RowGeometry>,
    bottom: i32,
    viewport_height: i32,
    scroll_top: i32,
}

impl RowLayout {
    pub fn new(viewport_height: i32) -> Self {
        RowLayout {
            viewport_height,
            ..RowLayout::default()
        }
    }

    /// `count` rows of equal `height` with no headers.
    pub fn uniform(count: usize, height: i32, viewport_height: i32) -> Self {
        let mut layout = RowLayout::new(viewport_height);
        for _ in 0..count {
            layout.push_row(height);
        }
        layout
    }

    pub fn push_row(&mut self, height: i32) {
        self.rows.push(RowGeometry {
            top: self.bottom,
            height,
        });
        self.bottom += height;
    }

    pub fn push_header(&mut self, height: i32) {
        self.bottom += height;
    }

    /// Total content height.
    pub fn content_height(&self) -> i32 {
        self.bottom
    }

    pub fn set_viewport_height(&mut self, height: i32) {
        self.viewport_height = height;
    }

    /// Drop all rows, keeping the viewport and its scroll offset.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
        self.bottom = 0;
    }
}

impl ChoicesViewport for RowLayout {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<RowGeometry> {
        self.rows.get(index).copied()
    }

    fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    fn scroll_top(&self) -> i32 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, top: i32) {
        self.scroll_top = top;
    }
}

type Handler = fn(&mut Select, KeyEvent, usize) -> bool;

// first handler that applies wins
const HANDLERS: &[Handler] = &[token_navigation, dropdown_navigation];

impl Select {
    /// Key pressed in the search box with the caret at `caret`.
    pub fn handle_key(
        &mut self,
        event: KeyEvent,
        caret: usize,
        viewport: &mut dyn ChoicesViewport,
    ) -> Result<Outcome> {
        if self.destroyed {
            return Ok(Outcome::Pass);
        }
        let handled = HANDLERS.iter().any(|handler| handler(self, event, caret));
        tracing::trace!(key = ?event.key, caret, handled, "search key");
        if event.key.is_vertical() && !self.state.items().is_empty() {
            self.ensure_highlight_visible(viewport)?;
        }
        if !handled {
            return Ok(Outcome::Pass);
        }
        Ok(Outcome::Handled {
            prevent_default: event.key != Key::Tab,
        })
    }

    /// Scroll `viewport` so the active row is fully visible.
    pub fn ensure_highlight_visible(&self, viewport: &mut dyn ChoicesViewport) -> Result<()> {
        let rows = viewport.row_count();
        if rows == 0 {
            return Err(Error::structural("at least one choice row", rows));
        }
        let Some(row) = viewport.row(self.state.active_index) else {
            return Ok(());
        };
        let scroll = viewport.scroll_top();
        let pos_y = row.top + row.height - scroll;
        let height = viewport.viewport_height();
        if pos_y > height {
            viewport.set_scroll_top(scroll + pos_y - height);
        } else if pos_y < row.height {
            if self.is_grouped() && self.state.active_index == 0 {
                // keep the first group header visible
                viewport.set_scroll_top(0);
            } else {
                viewport.set_scroll_top(scroll - (row.height - pos_y));
            }
        }
        Ok(())
    }
}

// Multiple mode: move between tokens with the caret at the start of the search box.
fn token_navigation(s: &mut Select, event: KeyEvent, caret: usize) -> bool {
    if !s.config.multiple || !event.key.is_horizontal() {
        return false;
    }
    if caret > 0 || (!s.state.search.is_empty() && event.key == Key::Right) {
        return false;
    }
    s.close(false);

    let last = s.state.selected.len() as isize - 1;
    let curr = s.state.active_token.map_or(-1, |i| i as isize);
    let next = match event.key {
        Key::Left if curr >= 0 => Some(curr - 1),
        Key::Left => Some(last),
        Key::Right if curr < 0 || curr == last => {
            s.activate(None, false);
            None
        }
        Key::Right => Some(curr + 1),
        Key::Backspace if curr >= 0 => {
            s.remove_token(curr as usize);
            Some(curr - 1)
        }
        Key::Backspace => Some(last),
        Key::Delete if curr >= 0 => {
            s.remove_token(curr as usize);
            Some(curr)
        }
        _ => None,
    };

    let len = s.state.selected.len();
    s.state.active_token = match next {
        Some(i) if len > 0 => Some(i.clamp(0, len as isize - 1) as usize),
        _ => None,
    };
    true
}

fn dropdown_navigation(s: &mut Select, event: KeyEvent, _caret: usize) -> bool {
    let len = s.state.items().len();
    if len == 0 {
        return false;
    }
    let closed_multiple = !s.state.open && s.config.multiple;
    match event.key {
        Key::Down if closed_multiple => s.activate(None, true),
        Key::Down => {
            if s.state.active_index + 1 < len {
                s.state.active_index += 1;
            }
        }
        Key::Up if closed_multiple => s.activate(None, true),
        Key::Up => {
            s.state.active_index = s.state.active_index.saturating_sub(1);
        }
        Key::Tab => {
            if !s.config.multiple || s.state.open {
                let item = s.state.active_item().cloned();
                s.select(item.as_ref(), true);
            }
        }
        Key::Enter => {
            if s.state.open {
                let item = s.state.active_item().cloned();
                s.select(item.as_ref(), false);
            } else {
                s.activate(None, true);
            }
        }
        Key::Esc => s.close(false),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::tests::select;
    use super::super::Selected;
    use super::*;
    use crate::config::Config;
    use crate::expr::RepeatExpr;
    use crate::registry::GroupBy;
    use serde_json::{json, Value};

    fn press(s: &mut Select, key: Key, caret: usize, vp: &mut RowLayout) -> Outcome {
        s.handle_key(KeyEvent::new(key), caret, vp).unwrap()
    }

    fn layout_for(s: &Select) -> RowLayout {
        RowLayout::uniform(s.items().len(), 1, 2)
    }

    fn with_tokens(n: usize) -> Select {
        let (_c, mut s) = select(true);
        for _ in 0..n {
            let item = s.items()[0].clone();
            s.select(Some(&item), false);
        }
        s
    }

    fn token_ids(s: &Select) -> Vec<i64> {
        s.selected().as_slice().iter().filter_map(|p| p["id"].as_i64()).collect()
    }

    #[test]
    fn up_down_sequences_stay_in_bounds() {
        let sequences: [&[Key]; 4] = [
            &[Key::Up, Key::Up, Key::Down],
            &[Key::Down; 9],
            &[Key::Down, Key::Down, Key::Up, Key::Up, Key::Up, Key::Down],
            &[Key::End, Key::Down, Key::Down, Key::Up, Key::Char('a'), Key::Down],
        ];
        for len in [1usize, 2, 4, 7] {
            for multiple in [false, true] {
                for keys in sequences {
                    let people: Vec<Value> = (0..len).map(|i| json!({"id": i})).collect();
                    let repeat = RepeatExpr::parse("p in people").unwrap();
                    let config = Config::default().with_multiple(multiple);
                    let mut s = Select::new(config, repeat, json!({"people": people})).unwrap();
                    let mut vp = layout_for(&s);
                    s.activate(None, false);
                    assert_eq!(s.active_index(), 0);
                    // stepwise reference: down stops at the last row, up at the first
                    let mut expected = 0usize;
                    for &key in keys {
                        press(&mut s, key, 0, &mut vp);
                        match key {
                            Key::Down => expected = (expected + 1).min(len - 1),
                            Key::Up => expected = expected.saturating_sub(1),
                            _ => {}
                        }
                        assert!(s.active_index() < len, "len {len}, keys {keys:?}");
                        assert_eq!(s.active_index(), expected, "len {len}, keys {keys:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn tab_selects_without_preventing_default() {
        let (_c, mut s) = select(false);
        let mut vp = layout_for(&s);
        s.activate(None, false);
        press(&mut s, Key::Down, 0, &mut vp);
        assert_eq!(press(&mut s, Key::Tab, 0, &mut vp), Outcome::Handled { prevent_default: false });
        assert_eq!(s.selected().single().map(|p| p["id"].clone()), Some(json!(2)));
        assert!(!s.is_open());
        // tab selected with skip-focus-return
        assert!(s.run_due().is_empty());
    }

    #[test]
    fn enter_opens_then_selects_and_escape_closes() {
        let (_c, mut s) = select(true);
        let mut vp = layout_for(&s);
        assert!(press(&mut s, Key::Enter, 0, &mut vp).is_handled());
        assert!(s.is_open());
        assert_eq!(press(&mut s, Key::Enter, 0, &mut vp), Outcome::Handled { prevent_default: true });
        assert_eq!(s.selected().len(), 1);
        assert!(!s.is_open());
        press(&mut s, Key::Down, 0, &mut vp);
        assert!(s.is_open());
        press(&mut s, Key::Esc, 0, &mut vp);
        assert!(!s.is_open());
    }

    #[test]
    fn keys_pass_without_items() {
        let repeat = RepeatExpr::parse("p in people").unwrap();
        let mut s = Select::new(Config::default(), repeat, json!({"people": []})).unwrap();
        let mut vp = RowLayout::new(5);
        assert_eq!(press(&mut s, Key::Down, 0, &mut vp), Outcome::Pass);
        assert_eq!(press(&mut s, Key::Char('x'), 0, &mut vp), Outcome::Pass);
    }

    #[test]
    fn backspace_removes_active_token_and_moves_left() {
        let mut s = with_tokens(2);
        let mut vp = layout_for(&s);
        let first = s.selected().as_slice()[0].clone();
        s.state.active_token = Some(1);
        assert!(press(&mut s, Key::Backspace, 0, &mut vp).is_handled());
        assert_eq!(s.selected(), &Selected::Multiple(vec![first]));
        assert_eq!(s.active_token(), Some(0));
    }

    #[test]
    fn backspace_without_active_token_highlights_last() {
        let mut s = with_tokens(3);
        let mut vp = layout_for(&s);
        press(&mut s, Key::Backspace, 0, &mut vp);
        assert_eq!(s.active_token(), Some(2));
        assert_eq!(s.selected().len(), 3);
    }

    #[test]
    fn token_navigation_needs_caret_at_start() {
        let mut s = with_tokens(2);
        let mut vp = layout_for(&s);
        s.activate(None, false);
        assert_eq!(press(&mut s, Key::Left, 3, &mut vp), Outcome::Pass);
        assert!(s.is_open());
        s.set_search("a");
        assert_eq!(press(&mut s, Key::Right, 0, &mut vp), Outcome::Pass);
        assert!(press(&mut s, Key::Left, 0, &mut vp).is_handled());
        assert!(!s.is_open());
        assert_eq!(s.active_token(), Some(1));
    }

    #[test]
    fn left_right_walk_tokens_and_right_past_last_opens() {
        let mut s = with_tokens(3);
        let mut vp = layout_for(&s);
        press(&mut s, Key::Left, 0, &mut vp);
        press(&mut s, Key::Left, 0, &mut vp);
        press(&mut s, Key::Left, 0, &mut vp);
        press(&mut s, Key::Left, 0, &mut vp);
        assert_eq!(s.active_token(), Some(0));
        press(&mut s, Key::Right, 0, &mut vp);
        assert_eq!(s.active_token(), Some(1));
        press(&mut s, Key::Right, 0, &mut vp);
        assert_eq!(s.active_token(), Some(2));
        press(&mut s, Key::Right, 0, &mut vp);
        assert_eq!(s.active_token(), None);
        assert!(s.is_open());
    }

    #[test]
    fn delete_removes_and_stays() {
        let mut s = with_tokens(3);
        let mut vp = layout_for(&s);
        assert_eq!(token_ids(&s), [1, 2, 3]);
        s.state.active_token = Some(1);
        press(&mut s, Key::Delete, 0, &mut vp);
        assert_eq!(token_ids(&s), [1, 3]);
        assert_eq!(s.active_token(), Some(1));
        press(&mut s, Key::Delete, 0, &mut vp);
        assert_eq!(token_ids(&s), [1]);
        assert_eq!(s.active_token(), Some(0));
        press(&mut s, Key::Delete, 0, &mut vp);
        assert!(s.selected().is_empty());
        assert_eq!(s.active_token(), None);
        // nothing active: delete does nothing but is still consumed
        assert!(press(&mut s, Key::Delete, 0, &mut vp).is_handled());
    }

    #[test]
    fn scrolls_active_row_into_view() {
        let (_c, mut s) = select(false);
        let mut vp = RowLayout::uniform(4, 1, 2);
        s.activate(None, false);
        press(&mut s, Key::Down, 0, &mut vp);
        assert_eq!(vp.scroll_top(), 0);
        press(&mut s, Key::Down, 0, &mut vp);
        assert_eq!(vp.scroll_top(), 1);
        press(&mut s, Key::Down, 0, &mut vp);
        assert_eq!(vp.scroll_top(), 2);
        press(&mut s, Key::Up, 0, &mut vp);
        press(&mut s, Key::Up, 0, &mut vp);
        assert_eq!(vp.scroll_top(), 1);
        press(&mut s, Key::Up, 0, &mut vp);
        assert_eq!(vp.scroll_top(), 0);
    }

    #[test]
    fn grouped_scroll_up_to_first_row_reveals_header() {
        let people: Vec<Value> = (0..6).map(|i| json!({"id": i, "team": "X"})).collect();
        let scope = json!({ "people": people });
        let repeat = RepeatExpr::parse("p in people").unwrap();
        let mut s = Select::new(Config::default(), repeat, scope)
            .unwrap()
            .with_group_by(GroupBy::Field("team".into()));
        assert_eq!(s.groups().map(|g| g.len()), Some(1));

        let mut vp = RowLayout::new(3);
        vp.push_header(1);
        for _ in 0..6 {
            vp.push_row(1);
        }
        s.activate(None, false);
        for _ in 0..5 {
            press(&mut s, Key::Down, 0, &mut vp);
        }
        assert!(vp.scroll_top() > 0);
        while s.active_index() > 0 {
            press(&mut s, Key::Up, 0, &mut vp);
        }
        assert_eq!(vp.scroll_top(), 0);
    }

    #[test]
    fn empty_viewport_is_a_structural_error() {
        let (_c, mut s) = select(false);
        let mut vp = RowLayout::new(3);
        s.activate(None, false);
        let err = s.handle_key(KeyEvent::new(Key::Down), 0, &mut vp).unwrap_err();
        assert!(matches!(err, Error::Structural { found: 0, .. }));
    }
}
