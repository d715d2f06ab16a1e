use crate::error::{RefreshError, Result};
use std::fmt;
use std::str::FromStr;

/// One step into the document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Path to a node in the configuration document, e.g. `careers[0].roles[2].baseSalary`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConfigPath {
    segments: Vec<Segment>,
}

impl ConfigPath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Builder method: descend into a mapping key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Builder method: descend into a sequence item
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into parent path and final segment
    pub fn split_last(&self) -> Option<(ConfigPath, &Segment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((ConfigPath { segments: parent.to_vec() }, last))
    }

    /// Parse a dotted path with bracketed indices
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || RefreshError::ConfigFieldMissing(format!("invalid path '{}'", input));
        let mut path = ConfigPath::root();

        if input.is_empty() {
            return Ok(path);
        }

        for part in input.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if name.is_empty() && (rest.is_empty() || path.is_root()) {
                return Err(invalid());
            }
            if !name.is_empty() {
                path = path.key(name);
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                let index = rest[1..close].parse::<usize>().map_err(|_| invalid())?;
                path = path.index(index);
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid());
                }
            }
        }

        Ok(path)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigPath {
    type Err = RefreshError;

    fn from_str(s: &str) -> Result<Self> {
        ConfigPath::parse(s)
    }
}
