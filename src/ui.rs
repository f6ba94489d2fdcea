// Terminal front end: the host that renders a `Select` and feeds it keys.

pub mod model;
pub mod render;
pub mod run;
pub mod update;

pub use model::{Exit, Focus, Model, initial_model};
pub use render::{render_dropdown, render_full, render_input_block, render_modeline_padded};
pub use run::run;
pub use update::handle_update;

// Messages used by the update logic
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    WindowSize { width: usize, height: usize },
    KeyUp,
    KeyDown,
    KeyLeft,
    KeyRight,
    KeyEnter,
    KeyTab,
    KeyEsc,
    KeyBackspace,
    KeyDelete,
    KeySpace,
    KeyHome,
    KeyEnd,
    Rune(char),
    Tick,
}
