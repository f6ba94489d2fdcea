use crate::expr::Accessor;
use crate::select::{RowLayout, Select};
use bubbletea_widgets::Viewport;
use serde_json::Value;

// small constants reused by rendering code
pub const INPUT_BLOCK_LINES: usize = 3;
pub const MODELINE_LINES: usize = 1;
pub const RESERVED_LINES: usize = INPUT_BLOCK_LINES + MODELINE_LINES;
pub const DEFAULT_WIDTH: usize = 80;

/// Which part of the control receives typed keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    /// The search box of the open dropdown (always, in multiple mode).
    Search,
    /// The closed single-mode control.
    Proxy,
}

/// How the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Confirm,
    Cancel,
}

pub struct Model {
    pub select: Select,
    /// Label accessor; items are shown as their JSON text without one.
    pub display: Option<Accessor>,
    pub focus: Focus,
    pub input: String,
    /// Caret position in `input`, in chars.
    pub caret: usize,
    pub layout: RowLayout,
    pub per_page: usize,
    pub screen_width: usize,
    pub vp: Viewport,
    pub err: String,
    pub notice: String,
    pub search_width: Option<u32>,
    pub exit: Option<Exit>,
    pub(crate) last_search: String,
}

pub fn initial_model(select: Select, display: Option<Accessor>) -> Model {
    let focus = if select.is_multiple() {
        Focus::Search
    } else {
        Focus::Proxy
    };
    let mut m = Model {
        select,
        display,
        focus,
        input: String::new(),
        caret: 0,
        layout: RowLayout::new(0),
        per_page: 0,
        screen_width: 0,
        vp: Viewport::default(),
        err: String::new(),
        notice: String::new(),
        search_width: None,
        exit: None,
        last_search: String::new(),
    };
    crate::ui::update::sync_view(&mut m);
    m
}

impl Model {
    // wrapper update that delegates to the update module
    pub fn update(&mut self, msg: crate::ui::Msg) {
        crate::ui::update::handle_update(self, msg);
    }

    /// Text shown for one item.
    pub fn label(&self, item: &Value) -> String {
        let value = match &self.display {
            Some(display) => {
                let alias = self.select.repeat().item_alias.as_str();
                display.eval(self.select.scope(), &[(alias, item)])
            }
            None => item.clone(),
        };
        match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn mode(&self) -> String {
        if self.select.is_multiple() {
            format!("{} picked", self.select.selected().len())
        } else if self.select.is_open() {
            "search".to_string()
        } else {
            "pick".to_string()
        }
    }

    pub fn render_input_block(&self) -> Vec<String> {
        crate::ui::render::render_input_block(self)
    }

    pub fn render_dropdown(&self) -> String {
        crate::ui::render::render_dropdown(self)
    }

    pub fn render_full(&self) -> String {
        crate::ui::render::render_full(self)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::expr::RepeatExpr;
    use crate::registry::GroupBy;
    use crate::schedule::ManualClock;
    use crate::ui::Msg;
    use serde_json::json;
    use std::sync::Arc;

    pub(crate) fn fruit_scope() -> Value {
        json!({"fruits": [
            {"name": "Apple", "kind": "pome"},
            {"name": "Banana", "kind": "berry"},
            {"name": "Cherry", "kind": "drupe"},
            {"name": "Grape", "kind": "berry"},
            {"name": "Pear", "kind": "pome"},
        ]})
    }

    pub(crate) fn model(multiple: bool, grouped: bool) -> (ManualClock, Model) {
        model_with(multiple, grouped, false)
    }

    pub(crate) fn model_with(multiple: bool, grouped: bool, refresh: bool) -> (ManualClock, Model) {
        let clock = ManualClock::new();
        let repeat = RepeatExpr::parse("f in fruits | filter: $select.search").unwrap();
        let config = Config::default()
            .with_multiple(multiple)
            .with_refresh_delay(std::time::Duration::from_millis(200));
        let mut select = Select::new(config, repeat, fruit_scope())
            .unwrap()
            .with_clock(Arc::new(clock.clone()))
            .with_refresh(refresh);
        if grouped {
            select = select.with_group_by(GroupBy::Field("kind".to_string()));
        }
        let display = Accessor::compile("f.name").unwrap();
        let mut m = initial_model(select, Some(display));
        m.update(Msg::WindowSize {
            width: 60,
            height: 12,
        });
        (clock, m)
    }

    #[test]
    fn initial_focus_follows_mode() {
        let (_c, single) = model(false, false);
        assert_eq!(single.focus, Focus::Proxy);
        assert_eq!(single.mode(), "pick");
        let (_c, multiple) = model(true, false);
        assert_eq!(multiple.focus, Focus::Search);
        assert_eq!(multiple.mode(), "0 picked");
    }

    #[test]
    fn labels_use_display_accessor_or_json() {
        let (_c, m) = model(false, false);
        assert_eq!(m.label(&json!({"name": "Kiwi"})), "Kiwi");
        assert_eq!(m.label(&json!({"other": 1})), "");

        let plain = initial_model(Select::empty(Config::default()), None);
        assert_eq!(plain.label(&json!("raw")), "raw");
        assert_eq!(plain.label(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(plain.label(&json!(3)), "3");
    }

    #[test]
    fn window_size_sets_page_and_layout() {
        let (_c, m) = model(false, false);
        assert_eq!(m.screen_width, 60);
        assert_eq!(m.per_page, 12 - RESERVED_LINES);
        use crate::select::ChoicesViewport;
        assert_eq!(m.layout.row_count(), 5);
        assert_eq!(m.layout.viewport_height(), 8);
    }

    #[test]
    fn grouped_layout_counts_headers() {
        let (_c, m) = model(false, true);
        use crate::select::ChoicesViewport;
        assert_eq!(m.layout.row_count(), 5);
        // three groups, one header line each
        assert_eq!(m.layout.content_height(), 8);
        // first row sits under the first header
        assert_eq!(m.layout.row(0).map(|r| r.top), Some(1));
    }
}
