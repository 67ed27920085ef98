use regex::Regex;

fn network_reference_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                Regex::new(r"(?i)^blob:").expect("invalid blob URI regex"),
            ]
        })
        .as_slice()
}

/// Determine whether an image reference already names its location through a scheme.
///
/// Such references resolve the same way from every page, so rewriting them would only break
/// them.
pub fn has_network_scheme(value: &str) -> bool {
    network_reference_patterns()
        .iter()
        .any(|pattern| pattern.is_match(value))
}
