use lipgloss::Style;

/// Pad every line to `width` and the block to exactly `height` lines.
pub fn fit_lines(lines: Vec<String>, width: usize, height: usize) -> String {
    let line_style = Style::new().width(i32::try_from(width).unwrap_or(i32::MAX));
    let mut fitted: Vec<String> = lines
        .into_iter()
        .take(height)
        .map(|l| line_style.render(&l))
        .collect();
    while fitted.len() < height {
        fitted.push(line_style.render(""));
    }
    fitted.join("\n")
}

/// Cut plain text to at most `max` chars, marking the cut with an ellipsis.
pub fn truncate_plain(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_plain("Banana", 10), "Banana");
        assert_eq!(truncate_plain("Banana", 4), "Ban…");
        assert_eq!(truncate_plain("Banana", 0), "");
    }

    #[test]
    fn fit_lines_pads_and_cuts() {
        let out = fit_lines(vec!["a".into(), "b".into(), "c".into()], 5, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('a') && lines[1].contains('b'));
        assert_eq!(fit_lines(Vec::new(), 3, 3).lines().count(), 3);
    }
}
