//! Lexical helpers for the WKT grammar: SRID prefix, parenthesis groups and
//! top-level comma splitting.

use crate::error::{GeoWireError, Result};
use crate::geometry::normalize_srid;

/// Splits an optional `SRID=<int>;` prefix from the geometry body.
pub(crate) fn split_srid(text: &str) -> Result<(Option<i32>, &str)> {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("SRID=") else {
        return Ok((None, text));
    };
    let (number, body) = rest
        .split_once(';')
        .ok_or_else(|| GeoWireError::text("missing ';' after SRID", text))?;
    let srid = number
        .trim()
        .parse::<i32>()
        .map_err(|_| GeoWireError::text("invalid SRID", number))?;
    Ok((Some(normalize_srid(srid)), body.trim()))
}

/// Removes one pair of enclosing parentheses. The parenthesis opening the
/// text must close at its very end.
pub(crate) fn strip_parens(text: &str) -> Result<&str> {
    let text = text.trim();
    if !text.starts_with('(') {
        return Err(GeoWireError::text("expected '('", text));
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if i + 1 == text.len() {
                        Ok(&text[1..i])
                    } else {
                        Err(GeoWireError::text("unexpected text after ')'", &text[i + 1..]))
                    };
                }
            }
            _ => {}
        }
    }
    Err(GeoWireError::text("unbalanced parentheses", text))
}

/// Splits at commas outside any parenthesis group.
pub(crate) fn split_top_level(text: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| GeoWireError::text("unbalanced parentheses", text))?;
            }
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(GeoWireError::text("unbalanced parentheses", text));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// `EMPTY` or the legacy `(EMPTY)`.
pub(crate) fn is_empty_marker(text: &str) -> bool {
    let text = text.trim();
    text == "EMPTY"
        || text
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .is_some_and(|inner| inner.trim() == "EMPTY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn srid_prefix() {
        assert_eq!(
            split_srid("SRID=4326;POINT(1 2)").unwrap(),
            (Some(4326), "POINT(1 2)")
        );
        assert_eq!(split_srid("  POINT(1 2) ").unwrap(), (None, "POINT(1 2)"));
        assert_eq!(split_srid("SRID=-1;POINT(1 2)").unwrap().0, Some(0));
        assert_matches!(
            split_srid("SRID=abc;POINT(1 2)"),
            Err(GeoWireError::MalformedText { fragment, .. }) if fragment == "abc"
        );
        assert!(split_srid("SRID=4326 POINT(1 2)").unwrap_err().is_text());
    }

    #[test]
    fn strips_only_enclosing_group() {
        assert_eq!(strip_parens(" ((1 2),(3 4)) ").unwrap(), "(1 2),(3 4)");
        assert!(strip_parens("(1 2),(3 4)").is_err());
        assert!(strip_parens("((1 2)").is_err());
        assert!(strip_parens("1 2").is_err());
    }

    #[test]
    fn splits_outside_groups() {
        assert_eq!(
            split_top_level("(1 2,3 4),(5 6)").unwrap(),
            vec!["(1 2,3 4)", "(5 6)"]
        );
        assert_eq!(split_top_level("1 2, 3 4").unwrap(), vec!["1 2", " 3 4"]);
        assert!(split_top_level("(1 2").is_err());
        assert!(split_top_level("1 2)").is_err());
    }

    #[test]
    fn empty_markers() {
        assert!(is_empty_marker(" EMPTY"));
        assert!(is_empty_marker("(EMPTY)"));
        assert!(is_empty_marker("( EMPTY )"));
        assert!(!is_empty_marker("(1 2)"));
    }
}
