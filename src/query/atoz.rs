//! Letter navigation for the A-to-Z listing.
//!
//! The listing itself is an ordinary category query on the letter's path.

use super::descriptor::QueryDescriptor;

/// Root path of the A-to-Z listing ("All").
pub const AZ_LIST_PATH: &str = "az-list";

/// Letter buttons, in display order.
pub const LETTERS: [&str; 29] = [
    "All", "#", "0-9", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
    "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Category path for a letter button: `All` is the root, `#` is `other`.
pub fn letter_path(letter: &str) -> String {
    let letter = letter.trim();
    if letter.is_empty() || letter.eq_ignore_ascii_case("all") {
        AZ_LIST_PATH.to_string()
    } else if letter == "#" {
        format!("{}/other", AZ_LIST_PATH)
    } else {
        format!("{}/{}", AZ_LIST_PATH, letter.to_lowercase())
    }
}

/// Whether `letter` is the button for the listing at `path`.
pub fn is_active(letter: &str, path: &str) -> bool {
    let current = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    (current == AZ_LIST_PATH && letter.eq_ignore_ascii_case("all"))
        || (current == "other" && letter == "#")
        || current == letter.to_lowercase()
}

/// Listing query for a letter.
pub fn letter_query(letter: &str, page: u32) -> QueryDescriptor {
    QueryDescriptor::category(letter_path(letter), page)
}
