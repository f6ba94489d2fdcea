use crate::registry::{Group, Registry};
use serde_json::Value;
use std::slice;

/// What the user has picked so far.
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    Single(Option<Value>),
    Multiple(Vec<Value>),
}

impl Selected {
    pub fn empty(multiple: bool) -> Selected {
        if multiple {
            Selected::Multiple(Vec::new())
        } else {
            Selected::Single(None)
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Selected::Multiple(_))
    }

    /// Selected items in selection order; zero or one item in single mode.
    pub fn as_slice(&self) -> &[Value] {
        match self {
            Selected::Single(Some(item)) => slice::from_ref(item),
            Selected::Single(None) => &[],
            Selected::Multiple(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn single(&self) -> Option<&Value> {
        match self {
            Selected::Single(item) => item.as_ref(),
            Selected::Multiple(_) => None,
        }
    }
}

/// Everything a renderer needs to paint the control.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub open: bool,
    pub search: String,
    /// Highlighted candidate; meaningful only while `registry` is non-empty.
    pub active_index: usize,
    /// Highlighted token in multiple mode; `None` while the search box owns focus.
    pub active_token: Option<usize>,
    pub selected: Selected,
    pub registry: Registry,
    /// Parallel to `registry.items()`.
    pub disabled_items: Vec<bool>,
}

impl SelectionState {
    pub fn new(multiple: bool) -> Self {
        SelectionState {
            open: false,
            search: String::new(),
            active_index: 0,
            active_token: None,
            selected: Selected::empty(multiple),
            registry: Registry::default(),
            disabled_items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Value] {
        self.registry.items()
    }

    pub fn groups(&self) -> Option<&[Group]> {
        self.registry.groups()
    }

    pub fn active_item(&self) -> Option<&Value> {
        self.registry.items().get(self.active_index)
    }

    /// Keep `active_index` inside the candidate list and `active_token` inside
    /// the selection.
    pub(crate) fn clamp(&mut self) {
        let len = self.registry.len();
        if len == 0 {
            self.active_index = 0;
        } else if self.active_index >= len {
            self.active_index = len - 1;
        }
        let tokens = self.selected.len();
        self.active_token = match self.active_token {
            Some(i) if tokens > 0 => Some(i.min(tokens - 1)),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selected_views() {
        let s = Selected::Single(Some(json!("a")));
        assert_eq!(s.as_slice(), &[json!("a")]);
        assert_eq!(s.single(), Some(&json!("a")));
        assert!(Selected::empty(false).is_empty());
        let m = Selected::Multiple(vec![json!(1), json!(2)]);
        assert!(m.is_multiple());
        assert_eq!(m.len(), 2);
        assert!(m.single().is_none());
    }

    #[test]
    fn clamp_keeps_indices_in_bounds() {
        let mut st = SelectionState::new(true);
        st.registry = Registry::rebuild(&[json!(1), json!(2)], &[], |a, b| a == b, None);
        st.active_index = 9;
        st.active_token = Some(3);
        st.clamp();
        assert_eq!(st.active_index, 1);
        assert_eq!(st.active_token, None);

        st.selected = Selected::Multiple(vec![json!(5)]);
        st.active_token = Some(3);
        st.clamp();
        assert_eq!(st.active_token, Some(0));

        st.registry = Registry::default();
        st.clamp();
        assert_eq!(st.active_index, 0);
    }
}
