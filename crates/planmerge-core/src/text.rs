use regex::Regex;
use std::sync::OnceLock;

/// `#` repeated 1-6 times, whitespace, then the title.
fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"))
}

/// Parse a single line as a heading, returning `(level, trimmed title)`.
pub fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let caps = heading_re().captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let title = caps.get(2)?.as_str().trim();
    Some((level, title))
}

/// The first `n` characters of `s` (not bytes).
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels() {
        assert_eq!(parse_heading_line("# Goals"), Some((1, "Goals")));
        assert_eq!(parse_heading_line("### 三、重点任务  "), Some((3, "三、重点任务")));
        assert_eq!(parse_heading_line("######\tDeep"), Some((6, "Deep")));
    }

    #[test]
    fn not_headings() {
        assert_eq!(parse_heading_line("#NoSpace"), None);
        assert_eq!(parse_heading_line("####### seven"), None);
        assert_eq!(parse_heading_line(" # indented"), None);
        assert_eq!(parse_heading_line("plain text"), None);
        assert_eq!(parse_heading_line("#"), None);
    }

    #[test]
    fn take_chars_respects_char_boundaries() {
        assert_eq!(take_chars("数字化转型", 2), "数字");
        assert_eq!(take_chars("abc", 10), "abc");
        assert_eq!(take_chars("abc", 0), "");
    }
}
