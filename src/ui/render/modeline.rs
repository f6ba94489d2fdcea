use crate::ui::model::{DEFAULT_WIDTH, Model};
use crate::ui::render::styles::{STYLE_MODELINE, accent};
use lipgloss::Color;

// key/description pairs for the current state, most important first
fn key_pairs(m: &Model) -> Vec<(&'static str, &'static str)> {
    if m.select.is_multiple() {
        if m.select.is_open() {
            vec![("⏎", "add"), ("↑↓", "move"), ("⎋", "close")]
        } else {
            vec![("⏎", "open"), ("⌫", "remove"), ("←→", "tokens"), ("⎋", "done")]
        }
    } else if m.select.is_open() {
        vec![("⏎", "select"), ("⇥", "pick"), ("↑↓", "move"), ("⎋", "close")]
    } else {
        vec![("⏎", "open"), ("⌫", "clear"), ("⎋", "done")]
    }
}

// right-aligned status: error first, then refresh notice, then position
fn status(m: &Model) -> String {
    if !m.err.is_empty() {
        return m.err.clone();
    }
    if !m.notice.is_empty() {
        return m.notice.clone();
    }
    let total = m.select.items().len();
    if m.select.is_open() && total > 0 {
        format!("{}/{}", m.select.active_index() + 1, total)
    } else {
        format!("{total} items")
    }
}

pub fn render_modeline(m: &Model, inner_max: usize, mode: &str) -> String {
    let inner_style = STYLE_MODELINE.clone().padding(0, 0, 0, 0);
    let key_style = STYLE_MODELINE
        .clone()
        .foreground(accent(&m.select.config().theme))
        .bold(true)
        .padding(0, 0, 0, 0);
    let status_style = if m.err.is_empty() {
        STYLE_MODELINE.clone().faint(true).padding(0, 0, 0, 0)
    } else {
        STYLE_MODELINE
            .clone()
            .foreground(Color::from_rgb(255, 95, 95))
            .padding(0, 0, 0, 0)
    };

    let pairs: Vec<(String, usize)> = key_pairs(m)
        .iter()
        .map(|(k, d)| {
            let plain_len = d.chars().count() + 1 + k.chars().count();
            let rendered = format!(
                "{}{}{}",
                inner_style.render(d),
                inner_style.render(":"),
                key_style.render(k)
            );
            (rendered, plain_len)
        })
        .collect();
    let pair_sep = inner_style.render("  ");
    let pair_sep_width = 2usize;

    let mode_w = mode.chars().count() + 2;
    let indicator_w = 3usize;
    let sep_w = " | ".chars().count();
    let avail = inner_max.saturating_sub(mode_w + indicator_w + sep_w);

    let mut status_plain = status(m);
    if status_plain.chars().count() > avail {
        status_plain = crate::ui::render::util::truncate_plain(&status_plain, avail);
    }
    let status_w = status_plain.chars().count();

    // drop rightmost pairs until everything fits
    let mut count = pairs.len();
    let width_of = |n: usize| -> usize {
        if n == 0 {
            0
        } else {
            pairs.iter().take(n).map(|(_, w)| *w).sum::<usize>() + pair_sep_width * (n - 1)
        }
    };
    while count > 0 && width_of(count) + status_w + 1 > avail {
        count -= 1;
    }
    let left_width = width_of(count);
    let left = pairs
        .iter()
        .take(count)
        .map(|(r, _)| r.clone())
        .collect::<Vec<_>>()
        .join(pair_sep.as_str());

    let pad = avail.saturating_sub(left_width + status_w);
    let filler = if pad > 0 {
        STYLE_MODELINE
            .clone()
            .padding(0, 0, 0, 0)
            .width(i32::try_from(pad).unwrap_or(i32::MAX))
            .render("")
    } else {
        String::new()
    };

    let mode_style = STYLE_MODELINE
        .clone()
        .background(Color::from_rgb(101, 101, 101))
        .padding(0, 1, 0, 1)
        .bold(true);
    // M for multiple selection, S for single
    let indicator = if m.select.is_multiple() { "M" } else { "S" };
    let indicator_style = STYLE_MODELINE.clone().faint(true).padding(0, 1, 0, 1);

    format!(
        "{}{}{}{left}{filler}{}",
        indicator_style.render(indicator),
        mode_style.render(mode),
        inner_style.render(" | "),
        status_style.render(&status_plain)
    )
}

pub fn render_modeline_padded(m: &Model) -> String {
    let total_width = if m.screen_width > 0 {
        m.screen_width
    } else {
        DEFAULT_WIDTH
    };
    let inner_max = total_width.saturating_sub(3);
    let modeline = render_modeline(m, inner_max, &m.mode()).replace('\n', " ");
    STYLE_MODELINE
        .clone()
        .width(i32::try_from(total_width).unwrap_or(i32::MAX))
        .render(&modeline)
}
