//! Reading-order sort for positioned tokens

use super::token::Token;

/// Sort tokens top-to-bottom, then left-to-right
///
/// The sort is stable, so tokens sharing a position keep pool order. If any
/// token lacks a position there is no usable geometry and the input order is
/// returned unchanged.
pub fn reading_order(mut tokens: Vec<Token>) -> Vec<Token> {
    if tokens.iter().any(|t| t.position.is_none()) {
        return tokens;
    }
    tokens.sort_by_key(|t| t.position.map(|p| (p.y, p.x)));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_sorts_by_row_then_column() {
        let tokens = vec![
            Token::word("B", 10, 20, 90),
            Token::word("A", 5, 20, 90),
            Token::word("C", 0, 5, 90),
        ];
        assert_eq!(texts(&reading_order(tokens)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let tokens = vec![
            Token::word("first", 4, 4, 90),
            Token::word("second", 4, 4, 70),
            Token::word("top", 9, 0, 90),
        ];
        assert_eq!(
            texts(&reading_order(tokens)),
            vec!["top", "first", "second"]
        );
    }

    #[test]
    fn test_positionless_pass_through() {
        let tokens = vec![
            Token::phrase("zeta"),
            Token::word("alpha", 0, 0, 90),
            Token::phrase("beta"),
        ];
        assert_eq!(
            texts(&reading_order(tokens)),
            vec!["zeta", "alpha", "beta"]
        );
    }
}
