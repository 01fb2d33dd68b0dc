/// Characters dropped from producer names before building a link slug.
const SLUG_STRIP: &[char] = &[
    '&', '\'', '"', '^', '%', '$', '#', '@', '!', '(', ')', '+', '=', '<', '>', ':', ';', ',',
    '.', '?', '/', '\\', '|', '{', '}', '[', ']', '`', '~', '*', '_',
];

/// Link slug for a producer page: punctuation removed, runs of spaces and
/// dashes collapsed into a single `-`. Case is preserved.
pub fn producer_slug(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !SLUG_STRIP.contains(c)).collect();

    let mut slug = String::with_capacity(cleaned.len());
    for ch in cleaned.chars() {
        let ch = if ch == ' ' { '-' } else { ch };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }
    slug
}

/// Heading for a category page, from the last segment of its label.
///
/// `"genre/slice-of-life"` becomes `"slice of life"`; an empty label falls back
/// to `"Category"`.
pub fn category_title(label: Option<&str>) -> String {
    let last = label
        .and_then(|l| l.rsplit('/').next())
        .map(|segment| segment.replace('-', " "))
        .unwrap_or_default();

    if last.is_empty() {
        "Category".to_string()
    } else {
        last
    }
}
