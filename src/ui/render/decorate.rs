use crate::ui::render::styles::STYLE_MATCH;

fn same_char(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

// char ranges of every non-overlapping case-insensitive occurrence of `needle`
fn match_ranges(text: &[char], needle: &[char]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    if needle.is_empty() || needle.len() > text.len() {
        return ranges;
    }
    let mut i = 0;
    while i + needle.len() <= text.len() {
        if text[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|(a, b)| same_char(*a, *b))
        {
            ranges.push((i, i + needle.len()));
            i += needle.len();
        } else {
            i += 1;
        }
    }
    ranges
}

/// Emphasize every occurrence of `search` in `text`, ignoring case.
pub fn highlight_match(text: &str, search: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let needle: Vec<char> = search.chars().collect();
    let ranges = match_ranges(&chars, &needle);
    if ranges.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for (start, end) in ranges {
        out.extend(&chars[pos..start]);
        let hit: String = chars[start..end].iter().collect();
        out.push_str(&STYLE_MATCH.render(&hit));
        pos = end;
    }
    out.extend(&chars[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_every_occurrence_ignoring_case() {
        let out = highlight_match("Banana", "AN");
        let styled = STYLE_MATCH.render("an");
        assert_eq!(out.matches(&styled).count(), 2);
        assert!(out.starts_with('B'));
        assert!(out.ends_with('a'));
    }

    #[test]
    fn no_search_or_no_match_is_plain() {
        assert_eq!(highlight_match("Cherry", ""), "Cherry");
        assert_eq!(highlight_match("Cherry", "xyz"), "Cherry");
        assert_eq!(highlight_match("ab", "abc"), "ab");
    }

    #[test]
    fn ranges_do_not_overlap() {
        let text: Vec<char> = "aaaa".chars().collect();
        let needle: Vec<char> = "aa".chars().collect();
        assert_eq!(match_ranges(&text, &needle), vec![(0, 2), (2, 4)]);
    }
}
