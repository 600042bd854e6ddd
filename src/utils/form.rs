use std::str::FromStr;

/// Collect every value of a repeated field (`ids=1&ids=2`) from a urlencoded body.
///
/// `axum::Form` cannot deserialize repeated keys into a `Vec`, so bulk forms
/// post to handlers that take the raw body and go through here. Values that
/// do not parse are skipped.
pub fn repeated_values<T: FromStr>(body: &str, field: &str) -> Vec<T> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == field)
        .filter_map(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok()?.trim().parse().ok()
        })
        .collect()
}

/// Empty form inputs arrive as `Some("")`; treat them as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
