use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;

/// Normalized registration name.
///
/// Every textual form of a name (`&str`, `String`, `Cow<str>`, ...) produces the
/// same key. Cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(Arc<str>);

impl Key {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<Cow<'_, str>> for Key {
    fn from(name: Cow<'_, str>) -> Self {
        Self::new(name)
    }
}

impl From<Arc<str>> for Key {
    fn from(name: Arc<str>) -> Self {
        Self(name)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0.to_string()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn textual_forms_normalize_to_one_key() {
        let owned = String::from("logger");
        assert_eq!(Key::from("logger"), Key::from(owned.clone()));
        assert_eq!(Key::from(&owned), Key::from(Cow::Borrowed("logger")));
        assert_eq!(Key::from(Arc::<str>::from("logger")), Key::new("logger"));
    }

    #[test]
    fn lookups_by_str_hit_key_maps() {
        let mut map = HashMap::new();
        map.insert(Key::from("db"), 1);
        assert_eq!(map.get("db"), Some(&1));
    }

    #[test]
    fn no_implicit_trimming_or_case_folding() {
        assert_ne!(Key::from("db"), Key::from(" db"));
        assert_ne!(Key::from("db"), Key::from("DB"));
    }

    #[test]
    fn display_and_debug() {
        let key = Key::from("db");
        assert_eq!(key.to_string(), "db");
        assert_eq!(format!("{key:?}"), ":db");
        assert!(key == "db");
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = Key::from("db");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"db\"");
        let back: Key = serde_json::from_str("\"db\"").unwrap();
        assert_eq!(back, key);
    }
}
