use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates in the middle with "..." so the result fits `max_width` columns.
pub fn truncate_middle(s: &str, max_width: usize) -> String {
    if s.width() <= max_width || max_width < 10 {
        return s.to_string();
    }
    let half = (max_width - 3) / 2;

    let mut head = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > half {
            break;
        }
        used += w;
        head.push(ch);
    }

    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for ch in s.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > half {
            break;
        }
        used += w;
        tail.push(ch);
    }
    tail.reverse();

    format!("{head}...{}", tail.into_iter().collect::<String>())
}

/// Display width in terminal columns.
pub fn display_width(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}
