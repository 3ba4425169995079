/// Convert an identifier to PascalCase.
///
/// Splits on `_`, `-`, and whitespace and upper-cases the first letter of
/// each part; the rest of each part is kept as written, so camelCase input
/// keeps its inner capitals (`memberGroup` -> `MemberGroup`).
pub fn pascal_case(value: &str) -> String {
    value
        .split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Returns true if `value` is usable as a bare identifier in the target dialect.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

/// Rewrite `value` into a bare identifier.
///
/// Invalid characters become `_`; a leading non-letter gets a `v` prefix.
pub fn sanitize_identifier(value: &str) -> String {
    let mut out: String = value
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if !out.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        out.insert(0, 'v');
    }
    out
}

/// Bare member name emitted for an enum value.
pub fn member_name(value: &str) -> String {
    if is_identifier(value) {
        value.to_string()
    } else {
        sanitize_identifier(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_cases_snake_and_camel_identifiers() {
        assert_eq!(pascal_case("users"), "Users");
        assert_eq!(pascal_case("memberGroup"), "MemberGroup");
        assert_eq!(pascal_case("order_status"), "OrderStatus");
        assert_eq!(pascal_case("refund-reason"), "RefundReason");
        assert_eq!(pascal_case("__weird__name"), "WeirdName");
    }

    #[test]
    fn recognises_identifiers() {
        assert!(is_identifier("member"));
        assert!(is_identifier("_hidden"));
        assert!(!is_identifier("in-progress"));
        assert!(!is_identifier("3d"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn sanitizes_identifiers() {
        assert_eq!(sanitize_identifier("in-progress"), "in_progress");
        assert_eq!(sanitize_identifier("3d"), "v3d");
        assert_eq!(sanitize_identifier("a b"), "a_b");
    }

    #[test]
    fn member_names_keep_identifiers_and_sanitize_the_rest() {
        assert_eq!(member_name("in_progress"), "in_progress");
        assert_eq!(member_name("in-progress"), "in_progress");
        assert_eq!(member_name("2fa"), "v2fa");
    }
}
