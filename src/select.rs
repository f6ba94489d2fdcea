//! The selection controller.
//!
//! [`Select`] owns one [`SelectionState`] and is the only thing that mutates
//! it. Hosts call operations on it (open, close, select, key presses), render
//! from [`Select::state`], and periodically call [`Select::run_due`] to run
//! deferred work and receive the resulting [`Effect`]s.

mod keyboard;
mod machine;
mod state;

pub use keyboard::{ChoicesViewport, Outcome, RowGeometry, RowLayout};
pub use state::{Selected, SelectionState};

use crate::binding;
use crate::config::Config;
use crate::error::Result;
use crate::expr::{truthy, Accessor, RepeatExpr};
use crate::registry::{resolve_source, GroupBy, Group, Registry};
use crate::schedule::{Clock, Scheduler, TimerId, WallClock};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Something the host has to do on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Move keyboard focus to the search box.
    FocusSearchInput,
    /// Move keyboard focus back to the closed control.
    FocusProxy,
    /// Recompute the search box width (see [`Select::search_input_width`]).
    SizeSearchInput,
    /// Fetch fresh items for `search`.
    Refresh { search: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Task {
    FocusSearch { seed: Option<String> },
    ReturnFocus { skip: bool },
    SizeSearchInput,
    ClearActiveToken,
    Refresh,
}

/// Notification receiving the item and its mapped model value.
pub type Callback = Box<dyn FnMut(&Value, &Value) + Send>;

pub struct Select {
    config: Config,
    repeat: RepeatExpr,
    group_by: Option<GroupBy>,
    disable_when: Option<Accessor>,
    scope: Value,
    source: Vec<Value>,
    state: SelectionState,
    // external value kept verbatim while the single selection is a pass-through
    unmatched: Option<Value>,
    disabled: bool,
    proxy_enabled: bool,
    refresh_enabled: bool,
    scheduler: Scheduler<Task>,
    focus_timer: Option<TimerId>,
    refresh_timer: Option<TimerId>,
    on_select: Option<Callback>,
    on_remove: Option<Callback>,
    destroyed: bool,
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("config", &self.config)
            .field("repeat", &self.repeat)
            .field("group_by", &self.group_by)
            .field("state", &self.state)
            .field("disabled", &self.disabled)
            .field("scheduler", &self.scheduler)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Select {
    /// Bind `repeat` against `scope`. Fails when the source is neither absent
    /// nor a list.
    pub fn new(config: Config, repeat: RepeatExpr, scope: Value) -> Result<Select> {
        let source = resolve_source(repeat.source_value(&scope, ""))?;
        let mut select = Select::unbound(config, repeat, scope);
        select.source = source;
        select.rebuild();
        tracing::debug!(
            repeat = %select.repeat.source.text(),
            items = select.state.items().len(),
            multiple = select.config.multiple,
            "select bound"
        );
        Ok(select)
    }

    /// A select over `items in items` with an empty scope.
    pub fn empty(config: Config) -> Select {
        Select::unbound(config, RepeatExpr::plain("item", "items"), Value::Null)
    }

    fn unbound(config: Config, repeat: RepeatExpr, scope: Value) -> Select {
        let multiple = config.multiple;
        Select {
            config,
            repeat,
            group_by: None,
            disable_when: None,
            scope,
            source: Vec::new(),
            state: SelectionState::new(multiple),
            unmatched: None,
            disabled: false,
            proxy_enabled: !multiple,
            refresh_enabled: false,
            scheduler: Scheduler::new(Arc::new(WallClock)),
            focus_timer: None,
            refresh_timer: None,
            on_select: None,
            on_remove: None,
            destroyed: false,
        }
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self.rebuild();
        self
    }

    /// Flag items for which `expression` is truthy as disabled. The item alias
    /// is bound while evaluating.
    pub fn with_disable_when(mut self, expression: &str) -> Result<Self> {
        self.disable_when = Some(Accessor::compile(expression)?);
        self.rebuild();
        Ok(self)
    }

    /// Replace the clock. Pending deferred work is dropped.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.scheduler = Scheduler::new(clock);
        self.focus_timer = None;
        self.refresh_timer = None;
        self
    }

    /// Emit [`Effect::Refresh`] after search changes.
    pub fn with_refresh(mut self, enabled: bool) -> Self {
        self.refresh_enabled = enabled;
        self
    }

    pub fn on_select(mut self, callback: impl FnMut(&Value, &Value) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn on_remove(mut self, callback: impl FnMut(&Value, &Value) + Send + 'static) -> Self {
        self.on_remove = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repeat(&self) -> &RepeatExpr {
        &self.repeat
    }

    pub fn scope(&self) -> &Value {
        &self.scope
    }

    pub fn items(&self) -> &[Value] {
        self.state.items()
    }

    pub fn groups(&self) -> Option<&[Group]> {
        self.state.groups()
    }

    pub fn selected(&self) -> &Selected {
        &self.state.selected
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn search(&self) -> &str {
        &self.state.search
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    pub fn active_token(&self) -> Option<usize> {
        self.state.active_token
    }

    pub fn is_multiple(&self) -> bool {
        self.config.multiple
    }

    pub fn is_grouped(&self) -> bool {
        self.state.registry.is_grouped()
    }

    pub fn is_control_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the closed control currently accepts focus.
    pub fn proxy_enabled(&self) -> bool {
        self.proxy_enabled
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_empty()
    }

    /// Model value of one item.
    pub fn map_item(&self, item: &Value) -> Value {
        self.repeat.map(&self.scope, item)
    }

    /// External value for the current selection.
    pub fn to_model(&self) -> Value {
        if let Some(raw) = &self.unmatched {
            return raw.clone();
        }
        binding::to_model(&self.repeat, &self.scope, &self.state.selected)
    }

    /// Replace the selection from an external value.
    pub fn set_model(&mut self, value: &Value) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        let selected = binding::from_model(&self.repeat, &self.scope, &self.state.selected, value)?;
        // a value no item maps to stays as given until the user picks something
        self.unmatched = match selected.single() {
            Some(item) if !binding::loose_eq(&self.map_item(item), value) => Some(value.clone()),
            _ => None,
        };
        self.state.selected = selected;
        if self.config.multiple {
            self.rebuild();
        }
        self.state.clamp();
        tracing::debug!(selected = self.state.selected.len(), "model hydrated");
        Ok(())
    }

    /// Swap the scope and re-evaluate the source.
    pub fn set_scope(&mut self, scope: Value) -> Result<()> {
        self.scope = scope;
        self.sync()
    }

    /// Re-evaluate the source; the registry is only rebuilt when the list
    /// changed.
    pub fn sync(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        let source = resolve_source(self.repeat.source_value(&self.scope, &self.state.search))?;
        if source != self.source {
            self.source = source;
            self.rebuild();
        } else {
            self.refresh_disabled_flags();
        }
        Ok(())
    }

    /// Run every due deferred task and return what the host has to do.
    pub fn run_due(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.destroyed {
            return effects;
        }
        loop {
            let due = self.scheduler.take_due();
            if due.is_empty() {
                break;
            }
            for task in due {
                self.run_task(task, &mut effects);
            }
        }
        effects
    }

    fn run_task(&mut self, task: Task, effects: &mut Vec<Effect>) {
        match task {
            Task::FocusSearch { seed } => {
                self.focus_timer = None;
                // the seed lands even when the search box is disabled
                if let Some(seed) = seed.filter(|s| !s.is_empty()) {
                    self.state.search = seed;
                    self.refilter();
                    self.state.active_index = 0;
                    self.refresh();
                }
                effects.push(Effect::FocusSearchInput);
            }
            Task::ReturnFocus { skip } => {
                self.focus_timer = None;
                self.proxy_enabled = true;
                if !skip {
                    effects.push(Effect::FocusProxy);
                }
            }
            Task::SizeSearchInput => effects.push(Effect::SizeSearchInput),
            Task::ClearActiveToken => self.state.active_token = None,
            Task::Refresh => {
                self.refresh_timer = None;
                tracing::debug!(search = %self.state.search, "refresh fired");
                effects.push(Effect::Refresh {
                    search: self.state.search.clone(),
                });
            }
        }
    }

    /// Cancel all deferred work and drop callbacks. Every later call is a no-op.
    pub fn destroy(&mut self) {
        self.scheduler.clear();
        self.focus_timer = None;
        self.refresh_timer = None;
        self.on_select = None;
        self.on_remove = None;
        self.destroyed = true;
        tracing::debug!("select destroyed");
    }

    // Re-filter the current source after the search text changed.
    fn refilter(&mut self) {
        let value = self.repeat.source_value(&self.scope, &self.state.search);
        self.source = match resolve_source(value) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "source no longer resolves to a list");
                Vec::new()
            }
        };
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let excluded: &[Value] = if self.config.multiple {
            self.state.selected.as_slice()
        } else {
            &[]
        };
        let (repeat, scope) = (&self.repeat, &self.scope);
        self.state.registry = Registry::rebuild(
            &self.source,
            excluded,
            |a, b| repeat.same_item(scope, a, b),
            self.group_by.as_ref(),
        );
        self.refresh_disabled_flags();
        self.state.clamp();
        tracing::trace!(
            items = self.state.registry.len(),
            grouped = self.state.registry.is_grouped(),
            "registry rebuilt"
        );
    }

    fn refresh_disabled_flags(&mut self) {
        let alias = self.repeat.item_alias.as_str();
        self.state.disabled_items = match &self.disable_when {
            Some(expr) => self
                .state
                .registry
                .items()
                .iter()
                .map(|item| truthy(&expr.eval(&self.scope, &[(alias, item)])))
                .collect(),
            None => vec![false; self.state.registry.len()],
        };
    }

    fn position_of(&self, item: &Value) -> Option<usize> {
        let (repeat, scope) = (&self.repeat, &self.scope);
        self.state
            .registry
            .position(item, |a, b| repeat.same_item(scope, a, b))
    }
}
