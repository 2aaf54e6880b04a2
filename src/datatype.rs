// used for date-time properties
use chrono::{DateTime, Utc};

// used to print out readable forms of a data type
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::construct::Node;

lazy_static! {
    // BCP-47 shaped tags, or the wildcard
    static ref LANGUAGE_TAG: Regex =
        Regex::new(r"^(\*|[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*)$").expect("language tag pattern");
}

/// The tag given to text that arrives without one.
pub const DEFAULT_LANGUAGE: &str = "und";

pub fn is_language_tag(tag: &str) -> bool {
    LANGUAGE_TAG.is_match(tag)
}

/// A statically named family of documents, e.g. activities or geometries.
///
/// Implementors wrap a [`Node`] and are produced by
/// [`Engine::decode_as`](crate::engine::Engine::decode_as) once the top-level
/// discriminator has been checked against `FAMILY`.
pub trait DocumentKind: Sized {
    const FAMILY: &'static str;
    /// Field naming the concrete type, when the family does not use the document-level one.
    const DISCRIMINATOR_FIELD: Option<&'static str> = None;
    fn wrap(node: Node) -> Self;
    fn node(&self) -> &Node;
    // instance callable with pre-made implementation
    fn family(&self) -> &'static str {
        Self::FAMILY
    }
    fn into_node(self) -> Node;
}

// ------------- Property values --------------
/// A property value. Integers and floats compare by numeric value, so
/// `Integer(5) == Float(5.0)`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    LanguageMap(LanguageMap),
    Link(LinkValue),
    Links(LinkSet),
    Type(TypeValue),
    Sequence(Vec<Value>),
    Node(Node),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => *i as f64 == *f,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::LanguageMap(a), Value::LanguageMap(b)) => a == b,
            (Value::Link(a), Value::Link(b)) => a == b,
            (Value::Links(a), Value::Links(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "date-time",
            Value::LanguageMap(_) => "language-map",
            Value::Link(_) => "link",
            Value::Links(_) => "links",
            Value::Type(_) => "type",
            Value::Sequence(_) => "sequence",
            Value::Node(_) => "node",
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_date_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(d) => Some(d),
            _ => None,
        }
    }
    pub fn as_language_map(&self) -> Option<&LanguageMap> {
        match self {
            Value::LanguageMap(m) => Some(m),
            _ => None,
        }
    }
    pub fn as_link(&self) -> Option<&LinkValue> {
        match self {
            Value::Link(l) => Some(l),
            _ => None,
        }
    }
    pub fn as_links(&self) -> Option<&LinkSet> {
        match self {
            Value::Links(l) => Some(l),
            _ => None,
        }
    }
    pub fn as_type(&self) -> Option<&TypeValue> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_owned()) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Integer(i) }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self { Value::Integer(i64::from(i)) }
}
impl From<u32> for Value {
    fn from(i: u32) -> Self { Value::Integer(i64::from(i)) }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self { Value::Float(f) }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}
impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self { Value::DateTime(d) }
}
impl From<LanguageMap> for Value {
    fn from(m: LanguageMap) -> Self { Value::LanguageMap(m) }
}
impl From<LinkValue> for Value {
    fn from(l: LinkValue) -> Self { Value::Link(l) }
}
impl From<LinkSet> for Value {
    fn from(l: LinkSet) -> Self { Value::Links(l) }
}
impl From<TypeValue> for Value {
    fn from(t: TypeValue) -> Self { Value::Type(t) }
}
impl From<Node> for Value {
    fn from(n: Node) -> Self { Value::Node(n) }
}
impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self { Value::Sequence(v.into_iter().map(Into::into).collect()) }
}

// ------------- Language-tagged text --------------
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageMap {
    entries: Vec<(String, String)>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }
    pub fn single(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new().with(language, text)
    }
    /// Adds or replaces the text for a language, keeping the first position of the tag.
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        let language = language.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(l, _)| *l == language) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((language, text)),
        }
        self
    }
    pub fn get(&self, language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == language)
            .map(|(_, t)| t.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// True when the only entry is the given default language.
    pub fn is_default_only(&self, default_language: &str) -> bool {
        self.entries.len() == 1 && self.entries[0].0 == default_language
    }
}
impl fmt::Display for LanguageMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(l, t)| format!("{l}: {t:?}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

// ------------- Links --------------
#[derive(Debug, Clone, PartialEq)]
pub enum LinkValue {
    Simple(String),
    Resolved(Node),
}

impl LinkValue {
    pub fn simple(href: impl Into<String>) -> Self {
        LinkValue::Simple(href.into())
    }
    /// The target of the link; resolved links answer with their `href` or `url` property.
    pub fn href(&self) -> Option<&str> {
        match self {
            LinkValue::Simple(href) => Some(href),
            LinkValue::Resolved(node) => node
                .get("href")
                .or_else(|| node.get("url"))
                .and_then(Value::as_str),
        }
    }
}
impl fmt::Display for LinkValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.href() {
            Some(href) => write!(f, "<{href}>"),
            None => write!(f, "<?>"),
        }
    }
}

/// Relation name to an ordered run of links. Relations keep their first insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkSet {
    relations: Vec<(String, Vec<LinkValue>)>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self { relations: Vec::new() }
    }
    pub fn push(&mut self, relation: impl Into<String>, link: LinkValue) {
        let relation = relation.into();
        match self.relations.iter_mut().find(|(r, _)| *r == relation) {
            Some((_, links)) => links.push(link),
            None => self.relations.push((relation, vec![link])),
        }
    }
    pub fn with(mut self, relation: impl Into<String>, link: LinkValue) -> Self {
        self.push(relation, link);
        self
    }
    pub fn get(&self, relation: &str) -> &[LinkValue] {
        self.relations
            .iter()
            .find(|(r, _)| r == relation)
            .map(|(_, links)| links.as_slice())
            .unwrap_or(&[])
    }
    pub fn relations(&self) -> impl Iterator<Item = (&str, &[LinkValue])> {
        self.relations.iter().map(|(r, l)| (r.as_str(), l.as_slice()))
    }
    pub fn len(&self) -> usize {
        self.relations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

// ------------- Type values --------------
#[derive(Debug, Clone, PartialEq)]
pub enum TypeValue {
    Simple { id: String },
    Described { id: String, properties: Node },
}

impl TypeValue {
    pub fn simple(id: impl Into<String>) -> Self {
        TypeValue::Simple { id: id.into() }
    }
    pub fn described(id: impl Into<String>, properties: Node) -> Self {
        TypeValue::Described { id: id.into(), properties }
    }
    pub fn id(&self) -> &str {
        match self {
            TypeValue::Simple { id } | TypeValue::Described { id, .. } => id,
        }
    }
    pub fn properties(&self) -> Option<&Node> {
        match self {
            TypeValue::Simple { .. } => None,
            TypeValue::Described { properties, .. } => Some(properties),
        }
    }
    pub fn is_described(&self) -> bool {
        matches!(self, TypeValue::Described { .. })
    }
    pub fn display_name(&self, language: &str) -> Option<&str> {
        self.properties().and_then(|p| p.text("displayName", language))
    }
}
impl fmt::Display for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags() {
        assert!(is_language_tag("en"));
        assert!(is_language_tag("en-US"));
        assert!(is_language_tag("zh-Hant-TW"));
        assert!(is_language_tag("*"));
        assert!(is_language_tag(DEFAULT_LANGUAGE));
        assert!(!is_language_tag(""));
        assert!(!is_language_tag("en_US"));
        assert!(!is_language_tag("-en"));
    }

    #[test]
    fn language_map_last_write_wins_in_place() {
        let map = LanguageMap::new()
            .with("en", "Hello")
            .with("fr", "Bonjour")
            .with("en", "Hi");
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("en", "Hi"), ("fr", "Bonjour")]);
    }

    #[test]
    fn link_set_keeps_relation_and_link_order() {
        let links = LinkSet::new()
            .with("alternate", LinkValue::simple("http://a"))
            .with("self", LinkValue::simple("http://s"))
            .with("alternate", LinkValue::simple("http://b"));
        let rels: Vec<_> = links.relations().map(|(r, l)| (r, l.len())).collect();
        assert_eq!(rels, vec![("alternate", 2), ("self", 1)]);
        assert_eq!(links.get("alternate")[1].href(), Some("http://b"));
        assert!(links.get("missing").is_empty());
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(Value::Integer(5), Value::Float(5.0));
        assert_eq!(Value::Float(5.0), Value::Integer(5));
        assert_ne!(Value::Integer(5), Value::Float(5.5));
        assert_ne!(Value::Integer(1), Value::Bool(true));
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }
}
