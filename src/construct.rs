// used to print out readable forms of a construct
use std::fmt;

use crate::datatype::{LinkSet, LinkValue, Value};

// ------------- Node -------------
// A node owns its properties in insertion order. There are no setters, so a
// node that has been handed out by a builder stays as it was built.
#[derive(Debug, Clone, Default)]
pub struct Node {
    properties: Vec<(String, Value)>,
}

impl Node {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::new()
    }
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }
    pub fn len(&self) -> usize {
        self.properties.len()
    }
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
    /// The string held by the given discriminator field, if any.
    pub fn discriminator(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }
    /// Text for a language. Plain strings answer for any language; a language
    /// map without the requested tag answers with its first entry.
    pub fn text(&self, name: &str, language: &str) -> Option<&str> {
        self.text_in(name, language, None)
    }
    /// Like [`text`](Self::text), but tries `default_language` (usually the
    /// engine's configured one) before settling for the first entry.
    pub fn text_or(&self, name: &str, language: &str, default_language: &str) -> Option<&str> {
        self.text_in(name, language, Some(default_language))
    }
    fn text_in(&self, name: &str, language: &str, default_language: Option<&str>) -> Option<&str> {
        match self.get(name)? {
            Value::String(s) => Some(s),
            Value::LanguageMap(map) => map
                .get(language)
                .or_else(|| default_language.and_then(|d| map.get(d)))
                .or_else(|| map.iter().next().map(|(_, t)| t)),
            _ => None,
        }
    }
    pub fn links(&self, name: &str) -> Option<&LinkSet> {
        self.get(name).and_then(Value::as_links)
    }
    /// Starts a new builder seeded with this node's properties.
    pub fn to_builder(&self) -> NodeBuilder {
        NodeBuilder {
            properties: self.properties.clone(),
        }
    }
}
// Names are unique within a node, so equality compares the property maps
// without regard to the order they are written in.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.properties.len() == other.properties.len()
            && self.properties.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::adapter::untyped_json(self))
    }
}

// ------------- NodeBuilder -------------
#[derive(Debug, Default)]
pub struct NodeBuilder {
    properties: Vec<(String, Value)>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self { properties: Vec::new() }
    }
    /// Assigns a property. Setting the same name again replaces the value in place.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(name.into(), value.into());
        self
    }
    pub fn set_if(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }
    pub fn unset(mut self, name: &str) -> Self {
        self.properties.retain(|(n, _)| n != name);
        self
    }
    /// Appends a link under `relation` inside the link set held by `name`.
    pub fn link(mut self, name: impl Into<String>, relation: impl Into<String>, link: LinkValue) -> Self {
        let name = name.into();
        let mut links = match self.properties.iter().position(|(n, _)| *n == name) {
            Some(i) => match &self.properties[i].1 {
                Value::Links(existing) => existing.clone(),
                _ => LinkSet::new(),
            },
            None => LinkSet::new(),
        };
        links.push(relation, link);
        self.put(name, Value::Links(links));
        self
    }
    pub(crate) fn put(&mut self, name: String, value: Value) {
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((name, value)),
        }
    }
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.properties.iter().any(|(n, _)| n == name)
    }
    /// Finalizes the node.
    pub fn get(self) -> Node {
        Node {
            properties: self.properties,
        }
    }
}
