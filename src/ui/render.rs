// Render module: one submodule per screen region plus shared styles.

pub mod decorate;
pub mod full;
pub mod input;
pub mod list;
pub mod modeline;
pub mod styles;
pub mod util;

pub use decorate::highlight_match;
pub use full::render_full;
pub use input::{render_input_block, token_strip_width};
pub use list::{dropdown_lines, render_dropdown};
pub use modeline::{render_modeline, render_modeline_padded};
