use crate::ui::model::Model;

pub fn render_full(m: &Model) -> String {
    let mut lines = m.render_input_block();
    lines.extend(m.render_dropdown().lines().map(str::to_string));
    let modeline = crate::ui::render::modeline::render_modeline_padded(m)
        .lines()
        .next()
        .unwrap_or("")
        .to_string();
    lines.push(modeline);
    lines.join("\n")
}
