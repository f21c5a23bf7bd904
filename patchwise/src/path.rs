//! Dotted field paths reported by merge errors.
//!
//! A [`FieldPath`] records where the engine is while it walks a partial
//! record: named fields join with `.`, collection positions render as `[i]`
//! and keyed collection matches render as `[key]`.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Segment {
    /// A named struct field.
    Field(String),
    /// A position inside a collection.
    Index(usize),
    /// An element of a collection matched by identity.
    Key(String),
}

/// Location of a field relative to the record being merged.
///
/// # Examples
///
/// ```rust
/// use patchwise::FieldPath;
///
/// let path = FieldPath::root().child("lines").index(2).child("sku");
/// assert_eq!(path.to_string(), "lines[2].sku");
/// assert_eq!(path.schema_key(), "lines.sku");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, naming the record itself.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a dotted path such as `address.street`.
    ///
    /// Only named fields are recognised; empty segments are skipped.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|part| !part.is_empty())
                .map(|part| Segment::Field(part.to_owned()))
                .collect(),
        }
    }

    /// Number of segments in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` when the path names the record itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the path segments from the root.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Return a new path extended with a named field.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        self.with(Segment::Field(name.to_owned()))
    }

    /// Return a new path extended with a collection position.
    #[must_use]
    pub fn index(&self, position: usize) -> Self {
        self.with(Segment::Index(position))
    }

    /// Return a new path extended with a collection identity.
    #[must_use]
    pub fn key(&self, identity: impl fmt::Display) -> Self {
        self.with(Segment::Key(identity.to_string()))
    }

    /// Dotted form with collection positions and keys removed.
    ///
    /// Validation rules and collection strategies are registered against
    /// this form so one entry covers every element of a collection.
    #[must_use]
    pub fn schema_key(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let Segment::Field(name) = segment {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
        }
        out
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if position == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}
