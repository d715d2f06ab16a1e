use crate::error::{RefreshError, Result};
use std::fmt;

/// ARIA-style role used to find an element by what it is rather than how it is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Button,
    Cell,
    Checkbox,
    Img,
    Link,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Button => "button",
            Role::Cell => "cell",
            Role::Checkbox => "checkbox",
            Role::Img => "img",
            Role::Link => "link",
        }
    }

    /// XPath predicate matching elements that carry this role natively or via `role=`
    fn predicate(self) -> &'static str {
        match self {
            Role::Button => {
                r#"self::button or @role="button" or (self::input and (@type="button" or @type="submit"))"#
            }
            Role::Cell => r#"self::td or self::th or @role="cell" or @role="gridcell""#,
            Role::Checkbox => r#"(self::input and @type="checkbox") or @role="checkbox""#,
            Role::Img => r#"self::img or @role="img""#,
            Role::Link => r#"self::a or @role="link""#,
        }
    }

    /// XPath predicate matching the accessible name
    fn name_predicate(self, name: &str) -> String {
        let lit = xpath_literal(name);
        match self {
            Role::Img => format!("@alt={0} or @aria-label={0}", lit),
            Role::Checkbox => labelled_by(&lit),
            _ => format!("normalize-space(.)={0} or @value={0} or @aria-label={0}", lit),
        }
    }
}

/// Semantic description of an element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Raw CSS selector; only usable at the top level
    Css(String),
    Id(String),
    Role { role: Role, name: Option<String> },
    /// Element whose own text equals this, whitespace-normalized
    Text(String),
    /// Element whose own text contains this
    TextContaining(String),
    /// Form control associated with a label
    Label(String),
    Within { container: Box<Locator>, inner: Box<Locator> },
    /// First following sibling with the given tag
    NextSibling { anchor: Box<Locator>, tag: String },
    First(Box<Locator>),
}

/// Query handed to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Locator::Role { role, name: Some(name.into()) }
    }

    pub fn any_role(role: Role) -> Self {
        Locator::Role { role, name: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    pub fn text_containing(text: impl Into<String>) -> Self {
        Locator::TextContaining(text.into())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Locator::Label(label.into())
    }

    /// Builder method: search for `inner` below this element
    pub fn within(self, inner: Locator) -> Self {
        Locator::Within { container: Box::new(self), inner: Box::new(inner) }
    }

    /// Builder method: the first following sibling with `tag`
    pub fn next_sibling(self, tag: impl Into<String>) -> Self {
        Locator::NextSibling { anchor: Box::new(self), tag: tag.into() }
    }

    /// Builder method: only the first match
    pub fn first(self) -> Self {
        Locator::First(Box::new(self))
    }

    /// Lower to a single CSS or XPath query
    pub fn to_query(&self) -> Result<Query> {
        match self {
            Locator::Css(selector) => Ok(Query::Css(selector.clone())),
            other => Ok(Query::XPath(other.xpath_from("")?)),
        }
    }

    /// XPath for this locator evaluated below the node set `context` (document when empty)
    fn xpath_from(&self, context: &str) -> Result<String> {
        let xpath = match self {
            Locator::Css(_) => return Err(RefreshError::UnsupportedLocator(self.to_string())),
            Locator::Id(id) => format!("{}//*[@id={}]", context, xpath_literal(id)),
            Locator::Role { role, name } => {
                let base = format!("{}//*[{}]", context, role.predicate());
                match name {
                    Some(name) => format!("{}[{}]", base, role.name_predicate(name)),
                    None => base,
                }
            }
            Locator::Text(text) => format!("{}//*[normalize-space(text())={}]", context, xpath_literal(text)),
            Locator::TextContaining(text) => {
                format!("{}//*[contains(normalize-space(text()), {})]", context, xpath_literal(text))
            }
            Locator::Label(label) => format!(
                "{}//*[self::input or self::select or self::textarea][{}]",
                context,
                labelled_by(&xpath_literal(label))
            ),
            Locator::Within { container, inner } => inner.xpath_from(&container.xpath_from(context)?)?,
            Locator::NextSibling { anchor, tag } => {
                format!("{}/following-sibling::{}[1]", anchor.xpath_from(context)?, tag)
            }
            Locator::First(inner) => format!("({})[1]", inner.xpath_from(context)?),
        };
        Ok(xpath)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::Role { role, name: Some(name) } => write!(f, "{} \"{}\"", role.as_str(), name),
            Locator::Role { role, name: None } => write!(f, "{}", role.as_str()),
            Locator::Text(text) => write!(f, "text \"{}\"", text),
            Locator::TextContaining(text) => write!(f, "text ~\"{}\"", text),
            Locator::Label(label) => write!(f, "label \"{}\"", label),
            Locator::Within { container, inner } => write!(f, "{} >> {}", container, inner),
            Locator::NextSibling { anchor, tag } => write!(f, "{} + {}", anchor, tag),
            Locator::First(inner) => write!(f, "{} >> first", inner),
        }
    }
}

fn labelled_by(lit: &str) -> String {
    format!(
        "@id=//label[normalize-space(.)={0}]/@for or ancestor::label[normalize-space(.)={0}] or @aria-label={0}",
        lit
    )
}

/// Quote a string as an XPath literal
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value.split('"').map(|part| format!("\"{}\"", part)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_passes_through() {
        assert_eq!(
            Locator::css("#top_salary_value").to_query().unwrap(),
            Query::Css("#top_salary_value".into())
        );
    }

    #[test]
    fn test_button_by_name() {
        let Query::XPath(xpath) = Locator::role(Role::Button, "Retrieve data").to_query().unwrap() else {
            panic!("expected xpath");
        };
        assert!(xpath.starts_with("//*[self::button or @role=\"button\""));
        assert!(xpath.ends_with("[normalize-space(.)=\"Retrieve data\" or @value=\"Retrieve data\" or @aria-label=\"Retrieve data\"]"));
    }

    #[test]
    fn test_next_sibling_cell() {
        let locator = Locator::role(Role::Cell, "Average").next_sibling("td");
        let Query::XPath(xpath) = locator.to_query().unwrap() else {
            panic!("expected xpath");
        };
        assert!(xpath.ends_with("]/following-sibling::td[1]"));
        assert_eq!(locator.to_string(), "cell \"Average\" + td");
    }

    #[test]
    fn test_within_and_first() {
        let locator = Locator::id("popup").within(Locator::any_role(Role::Img)).first();
        assert_eq!(
            locator.to_query().unwrap(),
            Query::XPath("(//*[@id=\"popup\"]//*[self::img or @role=\"img\"])[1]".into())
        );
    }

    #[test]
    fn test_nested_css_is_unsupported() {
        let locator = Locator::css("div.popup").within(Locator::text("Close"));
        assert!(matches!(locator.to_query(), Err(RefreshError::UnsupportedLocator(_))));
    }

    #[test]
    fn test_xpath_literal_quotes() {
        assert_eq!(xpath_literal("plain"), "\"plain\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(xpath_literal("it's \"x\""), "concat(\"it's \", '\"', \"x\", '\"', \"\")");
    }
}
