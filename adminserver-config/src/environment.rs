//! Environment variable sources

use std::collections::HashMap;

/// Where the manager reads environment variables from.
///
/// `Process` consults the live process environment on every lookup, so a
/// reset picks up variables changed since startup. `Snapshot` is a fixed map
/// for embedders and tests.
#[derive(Debug, Clone, Default)]
pub enum Environment {
    #[default]
    Process,
    Snapshot(HashMap<String, String>),
}

impl Environment {
    pub fn process() -> Self {
        Environment::Process
    }

    pub fn snapshot<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment::Snapshot(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// An empty snapshot
    pub fn empty() -> Self {
        Environment::Snapshot(HashMap::new())
    }

    /// Value of `key`, if set and valid unicode
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Environment::Process => std::env::var(key).ok(),
            Environment::Snapshot(vars) => vars.get(key).cloned(),
        }
    }

    /// Value of `key` read as a boolean flag (`true`, case-insensitive)
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
