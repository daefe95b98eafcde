//! Substring matching for free-text search boxes.

use sea_orm::sea_query::LikeExpr;

/// Escape character used in generated `LIKE` patterns.
const LIKE_ESCAPE: char = '!';

/// `LIKE` expression matching `keyword` anywhere in a column.
///
/// `%` and `_` in the keyword match themselves, not any text.
pub fn contains_pattern(keyword: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// Trims a search keyword, treating blank input as no keyword.
pub fn normalize_keyword(keyword: Option<String>) -> Option<String> {
    keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
