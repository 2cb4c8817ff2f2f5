//! Routing keys for the dispatch tables.

use std::borrow::Cow;
use std::fmt;

/// Separator between the components of a composite key.
pub const KEY_SEPARATOR: char = ':';

/// A key derived from a frame to select a handler.
///
/// Keys are computed per frame and never stored beyond one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingKey {
    /// A bare numeric code (`t`, `notifType`).
    Code(i64),
    /// Two integer components, rendered `"major:minor"`.
    Pair(i64, i64),
    /// A string key (chat action, topic name).
    Name(Cow<'static, str>),
}

impl RoutingKey {
    /// Creates a name key.
    pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Name(name.into())
    }

    /// Creates a name key from a base and a suffix, e.g. `Typing` + `-start`.
    pub fn suffixed(base: &str, suffix: &str) -> Self {
        Self::Name(Cow::Owned(format!("{base}{suffix}")))
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Pair(major, minor) => write!(f, "{major}{KEY_SEPARATOR}{minor}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}
