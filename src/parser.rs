use crate::error::{Result, StocktakeError};

/// A successfully parsed submission line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub name: String,
    pub quantity: f64,
}

/// Parses one line of free text in the format `<name> <quantity>`.
///
/// The line is split on the *last* whitespace run only, so item names may
/// contain spaces ("Виски Джек Дэниелс 3.5"). The quantity token accepts
/// either `.` or `,` as the decimal separator. Sign and magnitude are
/// unconstrained: negative values are later corrections in the additive
/// model.
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let trimmed = line.trim();

    let (raw_name, token) = trimmed
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| StocktakeError::Format {
            line: trimmed.to_string(),
        })?;

    let name = raw_name.trim();
    if name.is_empty() {
        return Err(StocktakeError::Format {
            line: trimmed.to_string(),
        });
    }

    let quantity = token
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| StocktakeError::Quantity {
            line: trimmed.to_string(),
            token: token.to_string(),
        })?;

    Ok(ParsedLine {
        name: name.to_string(),
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let parsed = parse_line("Ром 5").unwrap();
        assert_eq!(parsed.name, "Ром");
        assert_eq!(parsed.quantity, 5.0);
    }

    #[test]
    fn test_parse_comma_decimal_separator() {
        let parsed = parse_line("Виски 3,5").unwrap();
        assert_eq!(parsed.name, "Виски");
        assert_eq!(parsed.quantity, 3.5);

        let parsed = parse_line("Джин 2.5").unwrap();
        assert_eq!(parsed.quantity, 2.5);
    }

    #[test]
    fn test_parse_multi_word_name() {
        let parsed = parse_line("Виски Джек Дэниелс 3.5").unwrap();
        assert_eq!(parsed.name, "Виски Джек Дэниелс");
        assert_eq!(parsed.quantity, 3.5);
    }

    #[test]
    fn test_parse_splits_on_last_whitespace_run() {
        let parsed = parse_line("Текила   7").unwrap();
        assert_eq!(parsed.name, "Текила");
        assert_eq!(parsed.quantity, 7.0);
    }

    #[test]
    fn test_parse_negative_quantity_accepted() {
        let parsed = parse_line("Портвейн -2").unwrap();
        assert_eq!(parsed.quantity, -2.0);
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let parsed = parse_line("  Вермут 1,0  ").unwrap();
        assert_eq!(parsed.name, "Вермут");
        assert_eq!(parsed.quantity, 1.0);
    }

    #[test]
    fn test_parse_no_whitespace_is_format_error() {
        let err = parse_line("ВодкаНет").unwrap_err();
        assert!(matches!(err, StocktakeError::Format { .. }));
    }

    #[test]
    fn test_parse_empty_name_is_format_error() {
        let err = parse_line(" 5").unwrap_err();
        assert!(matches!(err, StocktakeError::Format { .. }));
    }

    #[test]
    fn test_parse_non_numeric_token_is_quantity_error() {
        let err = parse_line("Текила абс").unwrap_err();
        match err {
            StocktakeError::Quantity { token, .. } => assert_eq!(token, "абс"),
            other => panic!("expected Quantity error, got {:?}", other),
        }
    }

}
