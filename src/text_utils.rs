use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Count user-visible grapheme clusters.
pub(crate) fn grapheme_count(content: &str) -> usize {
    UnicodeSegmentation::graphemes(content, true).count()
}

/// Convert a grapheme index to a byte index in a UTF-8 string.
pub(crate) fn grapheme_to_byte_idx(content: &str, grapheme_idx: usize) -> usize {
    if grapheme_idx == 0 {
        return 0;
    }
    match UnicodeSegmentation::grapheme_indices(content, true).nth(grapheme_idx) {
        Some((idx, _)) => idx,
        None => content.len(),
    }
}

/// Substring between two grapheme indices (order-independent).
pub(crate) fn grapheme_slice(content: &str, a: usize, b: usize) -> &str {
    let (lo, hi) = (a.min(b), a.max(b));
    let start = grapheme_to_byte_idx(content, lo);
    let end = grapheme_to_byte_idx(content, hi);
    &content[start..end]
}

/// Remove the graphemes between two indices (order-independent).
pub(crate) fn remove_graphemes(content: &mut String, a: usize, b: usize) {
    let (lo, hi) = (a.min(b), a.max(b));
    let start = grapheme_to_byte_idx(content, lo);
    let end = grapheme_to_byte_idx(content, hi);
    content.replace_range(start..end, "");
}

/// Insert `text` before the grapheme at `idx`.
pub(crate) fn insert_at_grapheme(content: &mut String, idx: usize, text: &str) {
    let at = grapheme_to_byte_idx(content, idx);
    content.insert_str(at, text);
}

/// Index of the first grapheme at or after `from` that is one of `stops`.
pub(crate) fn find_grapheme(content: &str, from: usize, stops: &[&str]) -> Option<usize> {
    content
        .graphemes(true)
        .enumerate()
        .skip(from)
        .find(|(_, g)| stops.contains(g))
        .map(|(i, _)| i)
}

/// Index of the last grapheme strictly before `end` that is one of `stops`.
pub(crate) fn rfind_grapheme(content: &str, end: usize, stops: &[&str]) -> Option<usize> {
    content
        .graphemes(true)
        .take(end)
        .enumerate()
        .filter(|(_, g)| stops.contains(g))
        .map(|(i, _)| i)
        .last()
}

/// Truncate to at most `max` display columns, ending in `...` when cut.
pub(crate) fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        if used + w > budget {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push_str(&"..."[..max.min(3)]);
    out
}
