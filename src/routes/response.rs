use serde::ser::{Serialize, SerializeMap, Serializer};

/// Wraps a value in a single-entry object under a domain-specific key,
/// e.g. `{"race": ...}` or `{"sports": [...]}`.
pub struct Keyed<'a, T> {
    key: &'static str,
    value: &'a T,
}

impl<'a, T> Keyed<'a, T> {
    pub fn new(key: &'static str, value: &'a T) -> Self {
        Keyed { key, value }
    }
}

impl<'a, T: Serialize> Serialize for Keyed<'a, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.value)?;
        map.end()
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
}
