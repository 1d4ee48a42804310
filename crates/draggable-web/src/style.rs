//! Style names and computed-style parsing shared by the DOM bindings.

/// Id of the singleton `<style>` element injected by the selection hack.
pub const STYLE_ELEMENT_ID: &str = "draggable-style-el";

/// Class put on `<body>` while a drag disables text selection.
pub const TRANSPARENT_SELECTION_CLASS: &str = "draggable-transparent-selection";

/// Stylesheet that makes selections invisible under [`TRANSPARENT_SELECTION_CLASS`].
pub fn selection_stylesheet() -> String {
    format!(
        ".{TRANSPARENT_SELECTION_CLASS} *::-moz-selection {{all: inherit;}}\n\
         .{TRANSPARENT_SELECTION_CLASS} *::selection {{all: inherit;}}\n"
    )
}

/// Parse the leading integer of a computed CSS length (`"12.7px"` → 12).
///
/// Anything without a leading integer reads as zero.
pub fn parse_css_int(value: &str) -> f64 {
    let value = value.trim_start();
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => (-1.0, &value[1..]),
        Some(b'+') => (1.0, &value[1..]),
        _ => (1.0, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().map_or(0.0, |number| sign * number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_css_int() {
        assert!((parse_css_int("12px") - 12.0).abs() < f64::EPSILON);
        assert!((parse_css_int("12.7px") - 12.0).abs() < f64::EPSILON);
        assert!((parse_css_int(" -3px") + 3.0).abs() < f64::EPSILON);
        assert!((parse_css_int("0px")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_css_int_without_number() {
        assert_eq!(parse_css_int(""), 0.0);
        assert_eq!(parse_css_int("auto"), 0.0);
        assert_eq!(parse_css_int("-"), 0.0);
    }

    #[test]
    fn test_stylesheet_targets_selection_class() {
        let css = selection_stylesheet();
        assert!(css.contains(".draggable-transparent-selection *::selection {all: inherit;}"));
        assert!(css.contains("::-moz-selection"));
    }
}
