use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Clip `text` to `max_width` terminal columns, ending with `ellipsis` when cut.
pub(crate) fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ellipsis_width = ellipsis.width();
    if max_width <= ellipsis_width {
        return ellipsis.chars().take(max_width).collect();
    }

    let budget = max_width - ellipsis_width;
    let mut used = 0;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// "1 user", "3 users".
pub(crate) fn user_count_label(count: usize) -> String {
    if count == 1 {
        "1 user".to_string()
    } else {
        format!("{count} users")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Ervin", 10, "…"), "Ervin");
        assert_eq!(truncate_to_width("Ervin", 5, "…"), "Ervin");
    }

    #[test]
    fn long_text_gets_ellipsis() {
        assert_eq!(truncate_to_width("Clementine Bauch", 8, "…"), "Clement…");
        assert_eq!(truncate_to_width("Clementine Bauch", 8, "..."), "Cleme...");
    }

    #[test]
    fn wide_chars_count_double() {
        assert_eq!(truncate_to_width("東京都庁", 5, "…"), "東京…");
    }

    #[test]
    fn tiny_width_keeps_part_of_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 2, "..."), "..");
        assert_eq!(truncate_to_width("abcdef", 0, "…"), "");
    }

    #[test]
    fn count_label_pluralizes() {
        assert_eq!(user_count_label(0), "0 users");
        assert_eq!(user_count_label(1), "1 user");
        assert_eq!(user_count_label(10), "10 users");
    }
}
