//! JSON Pointer (RFC 6901) addressing used for every emitted patch path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const SEPARATOR: char = '/';
const WILDCARD: &str = "*";

/// An immutable path of escaped reference tokens.
///
/// Segments are stored exactly as they are rendered: [`Pointer::append`] escapes
/// `~` and `/` when a segment is added, so rendering is a plain join. A pointer
/// built by `append` starting from [`Pointer::root`] always has an empty first
/// segment, which renders as the leading `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    /// The pointer to the whole document, rendered as `""`.
    pub fn root() -> Self {
        Self {
            segments: vec![String::new()],
        }
    }

    /// Split a rendered pointer on `/`. Any text is accepted, including text
    /// without a leading `/`.
    pub fn parse(ptr: &str) -> Self {
        Self {
            segments: ptr.split(SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Build a pointer from already escaped segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Return a new pointer with `segment` escaped and appended.
    pub fn append(&self, segment: &str) -> Self {
        let escaped = segment.replace('~', "~0").replace('/', "~1");
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(escaped);
        Self { segments }
    }

    /// Return a new pointer with every segment of `other` appended verbatim.
    pub fn join(&self, other: &Pointer) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Escaped segments, including the leading empty one for rooted pointers.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Unescaped reference tokens: `~1` -> `/`, `~0` -> `~`.
    ///
    /// The leading empty segment of a rooted pointer is not a token.
    pub fn tokens(&self) -> Vec<String> {
        let rest = match self.segments.split_first() {
            Some((first, rest)) if first.is_empty() => rest,
            _ => &self.segments[..],
        };
        rest.iter()
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
            .collect()
    }

    /// Whether this pointer addresses the whole document.
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].is_empty()
    }

    /// Match against a pattern where `*` stands for exactly one segment. A
    /// pattern whose last segment is `*` also accepts any number of trailing
    /// segments.
    pub fn matches(&self, pattern: &str) -> bool {
        let elements: Vec<&str> = pattern.split(SEPARATOR).collect();
        for (i, element) in elements.iter().enumerate() {
            if *element == WILDCARD {
                continue;
            }
            match self.segments.get(i) {
                Some(segment) if segment == element => {}
                _ => return false,
            }
        }

        elements.last() == Some(&WILDCARD) || self.segments.len() == elements.len()
    }

    /// Evaluate the pointer against a JSON document.
    pub fn resolve<'a>(&self, v: &'a Value) -> Option<&'a Value> {
        let mut cur = v;
        for tok in self.tokens() {
            match cur {
                Value::Object(map) => {
                    cur = map.get(&tok)?;
                }
                Value::Array(arr) => {
                    let idx: usize = tok.parse().ok()?;
                    cur = arr.get(idx)?;
                }
                _ => return None,
            }
        }
        Some(cur)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for Pointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Pointer {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Pointer {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Vec<String>> for Pointer {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<Pointer> for String {
    fn from(p: Pointer) -> Self {
        p.to_string()
    }
}
