//! Open/close/select transitions.

use super::{Outcome, Select, Selected, Task};
use crate::keys::{Key, KeyEvent};
use serde_json::Value;
use std::time::Duration;

/// Narrowest useful multiple-mode search box; below this it takes the full row.
const MIN_SEARCH_WIDTH: i64 = 50;
const SEARCH_WIDTH_GUTTER: i64 = 10;

impl Select {
    /// Open the dropdown. `seed` becomes the search text once focus lands in
    /// the search box; `preserve_search` skips the search reset.
    pub fn activate(&mut self, seed: Option<&str>, preserve_search: bool) {
        if self.destroyed || self.disabled || self.state.open {
            return;
        }
        if !preserve_search {
            self.reset_search_input();
        }
        self.proxy_enabled = false;
        self.state.open = true;
        self.state.active_token = None;
        if self.state.active_index >= self.state.items().len() {
            self.state.active_index = 0;
        }
        self.replace_focus_task(Task::FocusSearch {
            seed: seed.map(str::to_string),
        });
        tracing::debug!(active = self.state.active_index, "opened");
    }

    /// Close the dropdown. In single mode focus goes back to the closed
    /// control unless `suppress_focus_return` is set.
    pub fn close(&mut self, suppress_focus_return: bool) {
        if self.destroyed || !self.state.open {
            return;
        }
        self.reset_search_input();
        self.state.open = false;
        if !self.config.multiple {
            self.replace_focus_task(Task::ReturnFocus {
                skip: suppress_focus_return,
            });
        }
        tracing::debug!("closed");
    }

    pub fn toggle(&mut self) {
        if self.state.open {
            self.close(false);
        } else {
            self.activate(None, false);
        }
    }

    /// Pick `item`, or clear the selection with `None` in single mode.
    /// Disabled candidates are ignored.
    pub fn select(&mut self, item: Option<&Value>, skip_focus_return: bool) {
        if self.destroyed {
            return;
        }
        if let Some(item) = item {
            let disabled = self
                .position_of(item)
                .is_some_and(|i| self.state.disabled_items.get(i).copied().unwrap_or(false));
            if disabled {
                tracing::debug!("ignored selection of disabled item");
                return;
            }
        }
        let item_value = item.cloned().unwrap_or(Value::Null);
        let mapped = self.map_item(&item_value);
        if let Some(callback) = self.on_select.as_mut() {
            callback(&item_value, &mapped);
        }
        match &mut self.state.selected {
            Selected::Multiple(list) => {
                if let Some(item) = item {
                    list.push(item.clone());
                }
                self.rebuild();
                self.scheduler.schedule(Duration::ZERO, Task::SizeSearchInput);
            }
            Selected::Single(current) => {
                *current = item.cloned();
                self.unmatched = None;
            }
        }
        tracing::debug!(model = %mapped, "selected");
        self.close(skip_focus_return);
    }

    /// Remove the token at `index` in multiple mode.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid token index.
    pub fn remove_token(&mut self, index: usize) {
        if self.destroyed {
            return;
        }
        let Selected::Multiple(list) = &mut self.state.selected else {
            return;
        };
        assert!(
            index < list.len(),
            "token index {index} out of range for {} tokens",
            list.len()
        );
        let removed = list.remove(index);
        self.state.active_token = None;
        self.scheduler.schedule(Duration::ZERO, Task::SizeSearchInput);
        self.rebuild();
        let mapped = self.map_item(&removed);
        if let Some(callback) = self.on_remove.as_mut() {
            callback(&removed, &mapped);
        }
        tracing::debug!(model = %mapped, "token removed");
    }

    /// User typed into the search box.
    pub fn set_search(&mut self, text: &str) {
        if self.destroyed || !self.config.search_enabled || self.state.search == text {
            return;
        }
        self.state.search = text.to_string();
        if !text.is_empty() && !self.state.open && self.config.multiple {
            self.activate(None, true);
        }
        self.refilter();
        self.state.active_index = 0;
        self.refresh();
    }

    /// Ask for fresh items. Only the last request in a burst within the
    /// refresh delay fires.
    pub fn refresh(&mut self) {
        if self.destroyed || !self.refresh_enabled {
            return;
        }
        if let Some(id) = self.refresh_timer.take() {
            self.scheduler.cancel(id);
        }
        let id = self.scheduler.schedule(self.config.refresh_delay(), Task::Refresh);
        self.refresh_timer = Some(id);
    }

    /// Hover.
    pub fn set_active_item(&mut self, item: &Value) {
        if let Some(i) = self.position_of(item) {
            self.state.active_index = i;
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.state.open && index == self.state.active_index
    }

    pub fn is_disabled(&self, index: usize) -> bool {
        self.state.open && self.state.disabled_items.get(index).copied().unwrap_or(false)
    }

    /// Placeholder text, hidden once a multiple selection has tokens.
    pub fn placeholder(&self) -> Option<&str> {
        if self.config.multiple && !self.state.selected.is_empty() {
            return None;
        }
        Some(&self.config.placeholder)
    }

    /// Nothing selected in single mode: absent, null or the empty string.
    pub fn is_empty(&self) -> bool {
        match &self.state.selected {
            Selected::Single(None) | Selected::Single(Some(Value::Null)) => true,
            Selected::Single(Some(Value::String(s))) => s.is_empty(),
            Selected::Single(Some(_)) | Selected::Multiple(_) => false,
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// The search box lost focus; the active token is cleared afterwards.
    pub fn search_blurred(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.schedule(Duration::ZERO, Task::ClearActiveToken);
    }

    /// A click landed outside the control.
    pub fn click_outside(&mut self, target_is_text_input: bool) {
        self.close(target_is_text_input);
    }

    /// Key pressed while the closed single-mode control has focus.
    /// `proxy_text` is whatever the user typed into it.
    pub fn proxy_key(&mut self, event: KeyEvent, proxy_text: &str) -> Outcome {
        if self.destroyed || !self.proxy_enabled {
            return Outcome::Pass;
        }
        match event.key {
            Key::Backspace => {
                self.select(None, false);
                Outcome::Handled {
                    prevent_default: true,
                }
            }
            Key::Tab | Key::Esc => Outcome::Pass,
            _ if event.is_control() || event.is_function_key() => Outcome::Pass,
            Key::Down | Key::Up | Key::Enter | Key::Space => {
                self.activate(None, false);
                Outcome::Handled {
                    prevent_default: true,
                }
            }
            _ => {
                self.activate(Some(proxy_text), false);
                Outcome::Handled {
                    prevent_default: false,
                }
            }
        }
    }

    /// Width for the multiple-mode search box given the container width and
    /// the box's left offset inside it. `None` until the container has a width.
    pub fn search_input_width(&self, container: u32, offset_left: u32) -> Option<u32> {
        if container == 0 {
            return None;
        }
        let width = i64::from(container) - i64::from(offset_left) - SEARCH_WIDTH_GUTTER;
        if width < MIN_SEARCH_WIDTH {
            Some(container)
        } else {
            u32::try_from(width).ok()
        }
    }

    fn replace_focus_task(&mut self, task: Task) {
        if let Some(id) = self.focus_timer.take() {
            self.scheduler.cancel(id);
        }
        self.focus_timer = Some(self.scheduler.schedule(Duration::ZERO, task));
    }

    fn reset_search_input(&mut self) {
        if !self.config.reset_search_input {
            return;
        }
        if !self.state.search.is_empty() {
            self.state.search.clear();
            self.refilter();
        }
        if let Selected::Single(Some(item)) = &self.state.selected {
            if !self.state.items().is_empty() {
                self.state.active_index = self.position_of(item).unwrap_or(0);
            }
        }
    }
}
