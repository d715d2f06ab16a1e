use super::layout::{Layout, Node};
use super::path::{ConfigPath, Segment};
use crate::error::{RefreshError, Result};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Value written into the document
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Float(f64),
    Int(i64),
    Str(String),
}

impl Scalar {
    /// YAML text for this value
    fn render(&self) -> Option<String> {
        match self {
            Scalar::Float(v) if !v.is_finite() => None,
            Scalar::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{:.1}", v)),
            Scalar::Float(v) => Some(v.to_string()),
            Scalar::Int(v) => Some(v.to_string()),
            Scalar::Str(s) => Some(format!("'{}'", s.replace('\'', "''"))),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Scalar::Float(v) => Value::Number((*v).into()),
            Scalar::Int(v) => Value::Number((*v).into()),
            Scalar::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

/// The configuration document: parsed values plus the original text they came from
///
/// Reads go through the parsed `serde_yaml` tree. Writes splice the new scalar
/// into the original text, so comments, ordering and indentation survive.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    text: String,
    value: Value,
    layout: Layout,
    path: Option<PathBuf>,
    dirty: bool,
}

impl ConfigDocument {
    /// Load a document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut doc = Self::from_yaml_str(text)?;
        doc.path = Some(path.to_path_buf());
        log::debug!("Loaded config from {}", path.display());
        Ok(doc)
    }

    /// Parse a document held in memory
    pub fn from_yaml_str(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let value: Value = serde_yaml::from_str(&text).map_err(|e| RefreshError::ConfigParse(e.to_string()))?;
        let layout = Layout::build(&text);
        Ok(Self { text, value, layout, path: None, dirty: false })
    }

    /// Current document text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// File this document was loaded from
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether any field changed since load or the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, path: &ConfigPath) -> bool {
        lookup(&self.value, path).is_some()
    }

    /// Value at `path`
    pub fn get(&self, path: &ConfigPath) -> Result<&Value> {
        lookup(&self.value, path).ok_or_else(|| RefreshError::ConfigFieldMissing(path.to_string()))
    }

    pub fn get_f64(&self, path: &ConfigPath) -> Result<f64> {
        self.get(path)?.as_f64().ok_or_else(|| RefreshError::ConfigFieldType {
            path: path.to_string(),
            expected: "number",
        })
    }

    pub fn get_str(&self, path: &ConfigPath) -> Result<&str> {
        self.get(path)?.as_str().ok_or_else(|| RefreshError::ConfigFieldType {
            path: path.to_string(),
            expected: "string",
        })
    }

    /// First of `keys` present at the top level, as a number
    pub fn first_f64(&self, keys: &[&str]) -> Result<f64> {
        for key in keys {
            let path = ConfigPath::root().key(*key);
            if self.contains(&path) {
                return self.get_f64(&path);
            }
        }
        Err(RefreshError::ConfigFieldMissing(keys.join(" or ")))
    }

    /// Deserialize the subtree at `path`
    pub fn section<T: DeserializeOwned>(&self, path: &ConfigPath) -> Result<T> {
        serde_yaml::from_value(self.get(path)?.clone()).map_err(|e| RefreshError::ConfigSection {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Set the scalar at `path`
    ///
    /// Only the value's text changes. A missing final key is appended to its
    /// parent mapping at the sibling indentation. The edit is reverted unless
    /// the resulting text parses to the previous tree with only `path` changed.
    pub fn set(&mut self, path: &ConfigPath, value: impl Into<Scalar>) -> Result<()> {
        let value = value.into();
        let rendered = value.render().ok_or_else(|| RefreshError::ConfigWrite {
            path: path.to_string(),
            reason: format!("{} cannot be represented", value),
        })?;

        let (range, replacement) = match self.layout.resolve(path) {
            Some(Node::Scalar(span)) => (span.clone(), rendered),
            Some(Node::Empty(at)) => (*at..*at, format!(" {}", rendered)),
            Some(_) => return Err(RefreshError::ConfigFieldNotScalar(path.to_string())),
            None => self.insertion(path, &rendered)?,
        };

        let mut text = self.text.clone();
        text.replace_range(range, &replacement);

        let parsed: Value = serde_yaml::from_str(&text).map_err(|e| RefreshError::ConfigWrite {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        check_edit(&self.value, &parsed, path, &value)?;

        log::debug!("Set {} = {}", path, value);
        self.layout = Layout::build(&text);
        self.text = text;
        self.value = parsed;
        self.dirty = true;
        Ok(())
    }

    /// Where and what to insert for a key missing from an existing mapping
    fn insertion(&self, path: &ConfigPath, rendered: &str) -> Result<(std::ops::Range<usize>, String)> {
        let missing = || RefreshError::ConfigFieldMissing(path.to_string());
        let (parent, last) = path.split_last().ok_or_else(missing)?;

        let (Some(Node::Mapping(mapping)), Segment::Key(key)) = (self.layout.resolve(&parent), last) else {
            // Present in the parsed tree but not in the index: a layout we do not edit
            if self.contains(path) {
                return Err(RefreshError::ConfigFieldNotScalar(path.to_string()));
            }
            return Err(missing());
        };

        let needs_newline = mapping.end > 0 && !self.text[..mapping.end].ends_with('\n');
        let line = format!(
            "{}{}{}: {}\n",
            if needs_newline { "\n" } else { "" },
            " ".repeat(mapping.indent),
            key,
            rendered
        );
        Ok((mapping.end..mapping.end, line))
    }

    /// Write back to the file the document was loaded from
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| RefreshError::ConfigFieldMissing("document has no source path".to_string()))?;
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Atomically write the document text to `path`
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(self.text.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| RefreshError::Io(e.error))?;

        log::info!("Saved config to {}", path.display());
        Ok(())
    }
}

/// Fail unless `after` is `before` with `value` at `path`
fn check_edit(before: &Value, after: &Value, path: &ConfigPath, value: &Scalar) -> Result<()> {
    match with_scalar(before, path, value) {
        Some(expected) if expected == *after => Ok(()),
        _ => Err(RefreshError::ConfigWrite {
            path: path.to_string(),
            reason: format!("edit did not read back as {} with every other field unchanged", value),
        }),
    }
}

/// Copy of `value` with the scalar at `path` replaced, or added when the final key is missing
fn with_scalar(value: &Value, path: &ConfigPath, scalar: &Scalar) -> Option<Value> {
    let (parent, last) = path.split_last()?;
    let mut updated = value.clone();

    let mut current = &mut updated;
    for segment in parent.segments() {
        current = match (current, segment) {
            (Value::Mapping(map), Segment::Key(key)) => map.get_mut(key.as_str())?,
            (Value::Sequence(items), Segment::Index(index)) => items.get_mut(*index)?,
            _ => return None,
        };
    }

    match (current, last) {
        (Value::Mapping(map), Segment::Key(key)) => {
            map.insert(Value::String(key.clone()), scalar.to_value());
        }
        (Value::Sequence(items), Segment::Index(index)) => *items.get_mut(*index)? = scalar.to_value(),
        _ => return None,
    }
    Some(updated)
}

fn lookup<'a>(value: &'a Value, path: &ConfigPath) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Mapping(map), Segment::Key(key)) => map.get(key.as_str())?,
            (Value::Sequence(items), Segment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Values refreshed by refresh-config
eur_to_usd_10_year_avg: 1.1693  # yearly average
affordability: 0.53

countries:
-   name: Netherlands
    cost_of_living: 0.82
    compressed_cost_of_living: 0.62 # derived

careers:
-   name: Engineering
    roles:
    -   name: Junior
        salary_com_key: software-engineer-i
        baseSalary:
";

    fn path(p: &str) -> ConfigPath {
        ConfigPath::parse(p).unwrap()
    }

    #[test]
    fn test_typed_reads() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        assert_eq!(doc.get_f64(&path("affordability")).unwrap(), 0.53);
        assert_eq!(doc.get_str(&path("countries[0].name")).unwrap(), "Netherlands");
        assert!(matches!(
            doc.get(&path("countries[3]")),
            Err(RefreshError::ConfigFieldMissing(p)) if p == "countries[3]"
        ));
        assert!(matches!(
            doc.get_f64(&path("countries[0].name")),
            Err(RefreshError::ConfigFieldType { expected: "number", .. })
        ));
    }

    #[test]
    fn test_unmodified_text_is_unchanged() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        assert_eq!(doc.as_str(), DOC);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_set_changes_only_the_value() {
        let mut doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        doc.set(&path("countries[0].compressed_cost_of_living"), 0.49).unwrap();
        doc.set(&path("eur_to_usd_10_year_avg"), 1.123456).unwrap();

        let expected = DOC
            .replace("compressed_cost_of_living: 0.62 # derived", "compressed_cost_of_living: 0.49 # derived")
            .replace("eur_to_usd_10_year_avg: 1.1693  # yearly", "eur_to_usd_10_year_avg: 1.123456  # yearly");
        assert_eq!(doc.as_str(), expected);
        assert_eq!(doc.get_f64(&path("countries[0].compressed_cost_of_living")).unwrap(), 0.49);
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_set_fills_empty_value() {
        let mut doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        doc.set(&path("careers[0].roles[0].baseSalary"), 1000i64).unwrap();
        assert!(doc.as_str().ends_with("        baseSalary: 1000\n"));
    }

    #[test]
    fn test_set_appends_missing_key() {
        let mut doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        doc.set(&path("countries_updated"), "2024-03-01").unwrap();
        assert!(doc.as_str().ends_with("baseSalary:\ncountries_updated: '2024-03-01'\n"));
        assert_eq!(doc.get_str(&path("countries_updated")).unwrap(), "2024-03-01");

        doc.set(&path("countries[0].population"), 17i64).unwrap();
        assert!(doc.as_str().contains("compressed_cost_of_living: 0.62 # derived\n    population: 17\n\ncareers:"));
    }

    #[test]
    fn test_set_rejects_missing_parent_and_containers() {
        let mut doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        assert!(matches!(
            doc.set(&path("cities[0].locationFactor"), 1.0),
            Err(RefreshError::ConfigFieldMissing(_))
        ));
        assert!(matches!(
            doc.set(&path("countries"), 1.0),
            Err(RefreshError::ConfigFieldNotScalar(_))
        ));
        assert!(matches!(doc.set(&path("affordability"), f64::NAN), Err(RefreshError::ConfigWrite { .. })));
        assert_eq!(doc.as_str(), DOC);
    }

    #[test]
    fn test_whole_floats_keep_decimal_point() {
        let mut doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        doc.set(&path("countries[0].cost_of_living"), 1.0).unwrap();
        assert!(doc.as_str().contains("    cost_of_living: 1.0\n"));
        assert_eq!(doc.get_f64(&path("countries[0].cost_of_living")).unwrap(), 1.0);
    }

    #[test]
    fn test_edit_touching_another_field_is_rejected() {
        let before: Value = serde_yaml::from_str("a: 1\nb: 2\n").unwrap();
        let a = path("a");

        let clean: Value = serde_yaml::from_str("a: 5\nb: 2\n").unwrap();
        assert!(check_edit(&before, &clean, &a, &Scalar::Int(5)).is_ok());

        let spilled: Value = serde_yaml::from_str("a: 5\nb: 3\n").unwrap();
        assert!(matches!(
            check_edit(&before, &spilled, &a, &Scalar::Int(5)),
            Err(RefreshError::ConfigWrite { path, .. }) if path == "a"
        ));

        let appended: Value = serde_yaml::from_str("a: 1\nb: 2\nc: 'x'\n").unwrap();
        assert!(check_edit(&before, &appended, &path("c"), &Scalar::from("x")).is_ok());
    }

    #[test]
    fn test_section_error_names_path() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        let err = doc.section::<Vec<crate::config::City>>(&path("countries")).unwrap_err();
        assert!(matches!(
            err,
            RefreshError::ConfigSection { path, reason } if path == "countries" && reason.contains("country")
        ));
    }

    #[test]
    fn test_load_then_save_is_byte_identical() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("config.yml");
        let copy = dir.path().join("copy.yml");
        std::fs::write(&source, DOC).unwrap();

        let doc = ConfigDocument::load(&source).unwrap();
        doc.save_to(&copy).unwrap();

        assert_eq!(std::fs::read(&copy).unwrap(), std::fs::read(&source).unwrap());
        assert_eq!(doc.source_path(), Some(source.as_path()));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(matches!(
            ConfigDocument::from_yaml_str("a: [1, 2\nb: 3"),
            Err(RefreshError::ConfigParse(_))
        ));
    }
}
