//! Word-boundary truncation for the card blurbs. Lengths count characters,
//! not bytes; most descriptions are Cyrillic.

const ELLIPSIS: char = '…';

/// Two-line blurb: the first line holds up to `first_line_max` characters
/// (broken at a space), the second takes the rest up to `total_max`
/// characters overall, marked with `…` when cut.
pub fn truncate_to_two_lines(text: &str, first_line_max: usize, total_max: usize) -> String {
    let t = text.trim();
    let chars: Vec<char> = t.chars().collect();
    if chars.len() <= first_line_max {
        return t.to_string();
    }

    let line1_end = chars[..first_line_max]
        .iter()
        .rposition(|c| *c == ' ')
        .unwrap_or(first_line_max);
    let line1: String = chars[..line1_end].iter().collect::<String>().trim_end().to_string();
    let rest: String = chars[line1_end..].iter().collect::<String>().trim().to_string();
    if rest.is_empty() {
        return line1;
    }

    let second_max = total_max.saturating_sub(line1.chars().count());
    let rest_chars: Vec<char> = rest.chars().collect();
    if rest_chars.len() <= second_max {
        return format!("{line1}\n{rest}");
    }

    // Always back to the last space, even when a word ends right at the limit.
    let head: String = rest_chars[..second_max].iter().collect();
    let line2 = match head.rfind(' ') {
        Some(idx) => format!("{}{ELLIPSIS}", head[..idx].trim_end()),
        None => format!("{head}{ELLIPSIS}"),
    };
    format!("{line1}\n{line2}")
}
