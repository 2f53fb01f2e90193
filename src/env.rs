use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Variable overlay consulted before the real process environment.
///
/// Entries come from the rc file and from `export`. Lookups fall through to
/// `std::env::var` when the overlay has no value.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a variable.
    ///
    /// Looks up the key in the overlay first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override a variable in the overlay only.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Overlay entries, in no particular order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stores the variable and publishes it to the process environment.
    ///
    /// Returns `false` when the process environment cannot hold the pair
    /// (empty name, or `=`/NUL where the platform forbids them).
    pub fn export(&mut self, key: &str, val: &str) -> bool {
        if key.is_empty() || key.contains(['=', '\0']) || val.contains('\0') {
            return false;
        }
        self.set_var(key, val);
        // SAFETY: only the foreground shell thread touches the environment.
        unsafe { stdenv::set_var(key, val) };
        true
    }

    /// Home directory, `$HOME` (overlay first) winning over the platform lookup.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}
