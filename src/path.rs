//! Event paths and read selectors.
//!
//! An event path is a dot-delimited address such as `"a.b.c"`. Registration
//! and dispatch both walk a path from the leaf up to its first segment:
//! `"a.b.c"`, `"a.b"`, `"a"`.

/// Path that matches every mutation.
pub const WILDCARD: &str = "*";

/// Trailing segment selecting the action table at a level.
pub const ACTIONS_SUFFIX: &str = "_A";

/// Trailing segment selecting the data-only snapshot at a level.
pub const DATA_SUFFIX: &str = "_D";

/// Iterator over a path and each of its ancestors, leaf first.
pub struct Ancestors<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rest?;
        self.rest = current.rfind('.').map(|i| &current[..i]);
        Some(current)
    }
}

/// Walk `path` leaf-to-root. The empty path yields itself once.
pub fn ancestors(path: &str) -> Ancestors<'_> {
    Ancestors { rest: Some(path) }
}

/// Whether `path` can address a concrete location.
///
/// Rejects the empty path and paths with empty segments (`"a..b"`, `".a"`).
pub fn is_well_formed(path: &str) -> bool {
    path == WILDCARD || (!path.is_empty() && path.split('.').all(|s| !s.is_empty()))
}

/// Parsed form of a read path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// The whole store.
    All,
    /// Plain data under the given segments.
    Data(Vec<String>),
    /// The action table under the given segments.
    Actions(Vec<String>),
}

impl Selector {
    pub fn parse(path: &str) -> Self {
        if path.is_empty() || path == WILDCARD {
            return Selector::All;
        }
        let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
        match segments.last().map(String::as_str) {
            Some(ACTIONS_SUFFIX) => {
                segments.pop();
                Selector::Actions(segments)
            }
            Some(DATA_SUFFIX) => {
                segments.pop();
                Selector::Data(segments)
            }
            _ => Selector::Data(segments),
        }
    }

    /// Event path this selector listens on.
    pub fn event_path(&self) -> String {
        match self {
            Selector::All => WILDCARD.to_string(),
            Selector::Data(segments) | Selector::Actions(segments) => {
                if segments.is_empty() {
                    WILDCARD.to_string()
                } else {
                    segments.join(".")
                }
            }
        }
    }
}
