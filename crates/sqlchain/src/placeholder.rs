//! Scanning SQL text for `:name` placeholders.
//!
//! Quoted strings and identifiers are skipped, and `::type` casts are not
//! placeholders.

/// Replace every placeholder token. `f` receives the full token (`:name`)
/// and returns its replacement, or `None` to keep the token.
pub(crate) fn replace(sql: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;
    let mut last = 0;

    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == q {
                        // doubled quote is an escaped quote
                        if bytes.get(i + 1) == Some(&q) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') => {
                let start = i;
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let token = &sql[start..i];
                if let Some(replacement) = f(token) {
                    out.push_str(&sql[last..start]);
                    out.push_str(&replacement);
                    last = i;
                }
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[last.min(sql.len())..]);
    out
}

/// All placeholder tokens in order of appearance.
pub(crate) fn names(sql: &str) -> Vec<String> {
    let mut found = Vec::new();
    replace(sql, |token| {
        found.push(token.to_string());
        None
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_skip_strings_and_casts() {
        let sql = "SELECT ':nope', \"a:b\" FROM t WHERE x = :t_x_0 AND y::text = :t_y_10";
        assert_eq!(names(sql), vec![":t_x_0", ":t_y_10"]);
    }

    #[test]
    fn test_replace_whole_tokens() {
        let sql = "a = :p_1 AND b = :p_10";
        let out = replace(sql, |t| (t == ":p_1").then(|| "ONE".to_string()));
        assert_eq!(out, "a = ONE AND b = :p_10");
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(names("WHERE a = 'it''s :x' AND b = :y"), vec![":y"]);
    }
}
