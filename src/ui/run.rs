use crate::config::Config;
use crate::error::{Error, Result};
use crate::select::Select;
use crate::ui::model::{Exit, Model, initial_model};
use crate::ui::Msg;
use bubbletea_rs::{
    Program, command::Cmd, event::KeyMsg, event::WindowSizeMsg, model::Model as TeaModel,
    window_size,
};
use crossterm::event::{KeyCode, KeyModifiers};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::time::Duration;

/// How often deferred controller work is drained.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

// bubbletea builds the model itself, so the prepared one is parked here
static PENDING: Lazy<Mutex<Option<Model>>> = Lazy::new(|| Mutex::new(None));

struct TickMsg;

fn next_tick() -> Cmd {
    bubbletea_rs::tick(TICK_INTERVAL, |_| Box::new(TickMsg) as bubbletea_rs::event::Msg)
}

/// Translate a terminal key into a front-end message. Keys the control has
/// no use for map to `None`.
pub fn key_msg(key: &KeyCode, modifiers: KeyModifiers) -> Option<Msg> {
    let msg = match key {
        KeyCode::Up => Msg::KeyUp,
        KeyCode::Down => Msg::KeyDown,
        KeyCode::Left => Msg::KeyLeft,
        KeyCode::Right => Msg::KeyRight,
        KeyCode::Enter => Msg::KeyEnter,
        KeyCode::Tab => Msg::KeyTab,
        KeyCode::Esc => Msg::KeyEsc,
        KeyCode::Backspace => Msg::KeyBackspace,
        KeyCode::Delete => Msg::KeyDelete,
        KeyCode::Home => Msg::KeyHome,
        KeyCode::End => Msg::KeyEnd,
        KeyCode::Char(ch) if modifiers.contains(KeyModifiers::CONTROL) => match ch {
            'n' | 'N' => Msg::KeyDown,
            'p' | 'P' => Msg::KeyUp,
            'a' | 'A' => Msg::KeyHome,
            'e' | 'E' => Msg::KeyEnd,
            _ => return None,
        },
        KeyCode::Char(' ') => Msg::KeySpace,
        KeyCode::Char(ch) => Msg::Rune(*ch),
        _ => return None,
    };
    Some(msg)
}

fn is_interrupt(key: &KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char('\u{03}') => true,
        KeyCode::Char(ch) => modifiers.contains(KeyModifiers::CONTROL) && (*ch == 'c' || *ch == 'C'),
        _ => false,
    }
}

struct TeaAdapter {
    inner: Model,
}

impl TeaModel for TeaAdapter {
    fn init() -> (Self, Option<Cmd>) {
        let parked = PENDING.lock().ok().and_then(|mut slot| slot.take());
        let mut inner = parked.unwrap_or_else(|| {
            tracing::warn!("no prepared model, starting empty");
            initial_model(Select::empty(Config::default()), None)
        });
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
        inner.update(Msg::WindowSize {
            width: width as usize,
            height: height as usize,
        });
        (
            TeaAdapter { inner },
            Some(bubbletea_rs::batch(vec![window_size(), next_tick()])),
        )
    }

    fn update(&mut self, msg: bubbletea_rs::event::Msg) -> Option<Cmd> {
        if msg.downcast_ref::<TickMsg>().is_some() {
            self.inner.update(Msg::Tick);
            return Some(next_tick());
        }
        if let Some(km) = msg.downcast_ref::<KeyMsg>() {
            if is_interrupt(&km.key, km.modifiers) {
                self.inner.exit = Some(Exit::Cancel);
                return Some(bubbletea_rs::quit());
            }
            // Esc on the closed control ends the session with the current value
            let closing = matches!(km.key, KeyCode::Esc) && !self.inner.select.is_open();
            if closing {
                self.inner.exit = Some(Exit::Confirm);
                return Some(bubbletea_rs::quit());
            }
            if let Some(ui_msg) = key_msg(&km.key, km.modifiers) {
                self.inner.update(ui_msg);
            }
            return None;
        }
        if let Some(ws) = msg.downcast_ref::<WindowSizeMsg>() {
            self.inner.update(Msg::WindowSize {
                width: ws.width as usize,
                height: ws.height as usize,
            });
            return None;
        }
        None
    }

    fn view(&self) -> String {
        self.inner.render_full()
    }
}

/// Run the interactive picker until the user confirms or cancels, returning
/// the final model.
pub async fn run(model: Model) -> Result<Model> {
    {
        let mut slot = PENDING
            .lock()
            .map_err(|_| Error::Terminal("model slot poisoned".to_string()))?;
        *slot = Some(model);
    }
    let program = Program::<TeaAdapter>::builder()
        .alt_screen(true)
        .signal_handler(true)
        .build()
        .map_err(|e| Error::Terminal(format!("failed to build program: {e:?}")))?;
    let adapter = program
        .run()
        .await
        .map_err(|e| Error::Terminal(format!("program error: {e:?}")))?;
    let mut inner = adapter.inner;
    if inner.exit.is_none() {
        // stopped by a signal
        inner.exit = Some(Exit::Cancel);
    }
    tracing::debug!(exit = ?inner.exit, "picker finished");
    Ok(inner)
}
