/// Make a category or channel name usable as a single path segment.
///
/// Each of `< > : " / \ | ? *` becomes `_`, then surrounding whitespace is
/// trimmed. Total: empty input gives an empty string.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    replaced.trim().to_string()
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}
