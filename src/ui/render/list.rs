use crate::ui::model::{DEFAULT_WIDTH, Model};
use crate::ui::render::decorate::highlight_match;
use crate::ui::render::styles::{STYLE_DISABLED, STYLE_HEADER, STYLE_LABEL, style_active};
use crate::ui::render::util::{fit_lines, truncate_plain};

const NO_MATCHES: &str = "No matches";

fn total_width(m: &Model) -> usize {
    if m.screen_width > 0 {
        m.screen_width
    } else {
        DEFAULT_WIDTH
    }
}

fn render_row(m: &Model, index: usize, max_label: usize) -> String {
    let label = m
        .select
        .items()
        .get(index)
        .map(|item| truncate_plain(&m.label(item), max_label))
        .unwrap_or_default();
    if m.select.is_active(index) {
        let theme = m.select.config().theme.as_str();
        return style_active(theme).render(&format!("❯ {label}"));
    }
    if m.select.is_disabled(index) {
        return STYLE_DISABLED.render(&format!("  {label}"));
    }
    format!(
        "  {}",
        STYLE_LABEL.render(&highlight_match(&label, m.select.search()))
    )
}

/// Every dropdown line, group headers included, in the same order as the
/// rows of `m.layout`.
pub fn dropdown_lines(m: &Model) -> Vec<String> {
    let max_label = total_width(m).saturating_sub(4);
    let mut lines = Vec::new();
    match m.select.groups() {
        Some(groups) => {
            let mut index = 0;
            for group in groups {
                let name = if group.name.is_empty() {
                    "(none)"
                } else {
                    group.name.as_str()
                };
                lines.push(STYLE_HEADER.render(&truncate_plain(name, max_label + 2)));
                for _ in &group.items {
                    lines.push(render_row(m, index, max_label));
                    index += 1;
                }
            }
        }
        None => {
            for index in 0..m.select.items().len() {
                lines.push(render_row(m, index, max_label));
            }
        }
    }
    lines
}

/// The visible slice of the dropdown, exactly `per_page` lines tall.
pub fn render_dropdown(m: &Model) -> String {
    use crate::select::ChoicesViewport;

    let width = total_width(m);
    if !m.select.is_open() {
        return fit_lines(Vec::new(), width, m.per_page);
    }
    if m.select.items().is_empty() {
        return fit_lines(vec![STYLE_DISABLED.render(NO_MATCHES)], width, m.per_page);
    }
    let skip = usize::try_from(m.layout.scroll_top()).unwrap_or(0);
    let lines: Vec<String> = dropdown_lines(m).into_iter().skip(skip).collect();
    fit_lines(lines, width, m.per_page)
}
