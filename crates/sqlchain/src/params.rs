//! Named parameter storage.

use crate::value::Value;

/// An ordered map from placeholder name (`:users_id_0`) to bound value.
///
/// Placeholder generation goes through [`Parameters::bind`], which names the
/// placeholder after the current size of the store and registers the value in
/// the same step, so two binds can never produce the same name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a named parameter. Replacing keeps the original position.
    pub fn add(&mut self, placeholder: impl Into<String>, value: impl Into<Value>) {
        let placeholder = normalize_name(placeholder.into());
        let value = value.into();
        match self.position(&placeholder) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((placeholder, value)),
        }
    }

    /// Generate a placeholder for `column` and bind `value` to it.
    ///
    /// The name is `:{prefix}_{column}_{n}` where `n` is the store size, with
    /// every character outside `[A-Za-z0-9_]` replaced by `_`.
    pub fn bind(&mut self, prefix: &str, column: &str, value: impl Into<Value>) -> String {
        let mut n = self.entries.len();
        let mut name = placeholder_name(prefix, column, n);
        while self.contains(&name) {
            n += 1;
            name = placeholder_name(prefix, column, n);
        }
        self.entries.push((name.clone(), value.into()));
        name
    }

    /// Merge `other` into this store. Later keys win on collision.
    pub fn merge(&mut self, other: &Parameters) {
        for (name, value) in &other.entries {
            self.add(name.clone(), value.clone());
        }
    }

    /// Look up a value by placeholder name (with or without the leading `:`).
    pub fn get(&self, placeholder: &str) -> Option<&Value> {
        let key = normalize_name(placeholder.to_string());
        self.position(&key).map(|i| &self.entries[i].1)
    }

    pub fn contains(&self, placeholder: &str) -> bool {
        self.position(placeholder).is_some()
    }

    /// All parameters in registration order.
    pub fn all(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every parameter.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn position(&self, placeholder: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == placeholder)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn placeholder_name(prefix: &str, column: &str, n: usize) -> String {
    let mut name = String::with_capacity(prefix.len() + column.len() + 8);
    name.push(':');
    for c in prefix.chars().chain(std::iter::once('_')).chain(column.chars()) {
        name.push(if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' });
    }
    name.push('_');
    name.push_str(&n.to_string());
    name
}

fn normalize_name(name: String) -> String {
    if name.starts_with(':') {
        name
    } else {
        format!(":{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_names_follow_count() {
        let mut p = Parameters::new();
        assert_eq!(p.bind("users", "id", 1), ":users_id_0");
        assert_eq!(p.bind("users", "id", 2), ":users_id_1");
        assert_eq!(p.bind("users", "u.first name", "x"), ":users_u_first_name_2");
        assert_eq!(p.len(), 3);
        assert_eq!(p.get(":users_id_1"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_bind_skips_taken_names() {
        let mut p = Parameters::new();
        p.add(":t_a_1", 10);
        assert_eq!(p.bind("t", "a", 20), ":t_a_2");
    }

    #[test]
    fn test_merge_later_wins() {
        let mut a: Parameters = [(":x", 1), (":y", 2)].into_iter().collect();
        let b: Parameters = [(":y", 3), (":z", 4)].into_iter().collect();
        a.merge(&b);

        let names: Vec<_> = a.names().collect();
        assert_eq!(names, vec![":x", ":y", ":z"]);
        assert_eq!(a.get("y"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_reset() {
        let mut p = Parameters::new();
        p.bind("t", "c", 1);
        p.reset();
        assert!(p.is_empty());
        assert_eq!(p.bind("t", "c", 1), ":t_c_0");
    }
}
