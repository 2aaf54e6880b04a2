//! Adapter dispatch between JSON trees and [`Node`]s.
//!
//! Adapters are kept in a registration-ordered list of `(Matcher, Adapter)`
//! pairs. Selection scans that list from the most recent registration
//! backwards, first for an exact discriminator match, then for a class or
//! family match, then for a catch-all. When nothing matches, the built-in
//! [`GenericAdapter`] produces an untyped node.
//!
//! The [`Dispatch`] context carries everything an adapter needs to recurse:
//! the schema, the adapter list, the discriminator field convention and the
//! optional type resolver. Adapters that only want to tweak the default
//! behavior call back into [`Dispatch::decode_properties`] and
//! [`Dispatch::encode_properties`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use serde_json::{Map, Number, Value as Json};
use tracing::{trace, warn};

use crate::construct::{Node, NodeBuilder};
use crate::datatype::{LanguageMap, LinkSet, LinkValue, TypeValue, Value, DEFAULT_LANGUAGE, is_language_tag};
use crate::error::{ActivityError, Result};
use crate::resolver::Resolver;
use crate::schema::{Coercion, Model, NestedRule, Schema};

/// Discriminator field used by top-level documents unless configured otherwise.
pub const DEFAULT_DISCRIMINATOR: &str = "objectType";
/// Class given to the descriptive part of a described type value.
pub const TYPE_CLASS: &str = "type";
/// Class given to resolved link targets.
pub const LINK_CLASS: &str = "link";

lazy_static! {
    static ref EMPTY_SCHEMA: Schema = Schema::default();
    static ref EMPTY_REGISTRY: AdapterRegistry = AdapterRegistry::default();
}

static GENERIC_ADAPTER: GenericAdapter = GenericAdapter;

// ------------- PropertyPath -------------
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Index(usize),
}

/// Location of a property inside a document, rendered as `$.object.tags[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}
impl PropertyPath {
    pub fn root() -> Self {
        Self::default()
    }
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Name(name.to_owned()));
        Self { segments }
    }
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }
}
impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Name(n) => write!(f, ".{n}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

// ------------- Adapter -------------
/// The object currently being decoded or encoded.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    /// Name of the discriminator field for this object.
    pub field: &'a str,
    /// Value of the discriminator field, when present.
    pub discriminator: Option<&'a str>,
    /// Structural class the parent property declared, when any.
    pub class: Option<&'a str>,
    /// Model chosen for the object; the generic model when nothing matched.
    pub model: &'a Model,
}

pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;
    fn decode(
        &self,
        dispatch: &Dispatch<'_>,
        slot: &Slot<'_>,
        object: &Map<String, Json>,
        path: &PropertyPath,
    ) -> Result<Node>;
    fn encode(
        &self,
        dispatch: &Dispatch<'_>,
        slot: &Slot<'_>,
        node: &Node,
        path: &PropertyPath,
    ) -> Result<Map<String, Json>>;
}

/// Applies the rules of the selected model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelAdapter;

impl Adapter for ModelAdapter {
    fn name(&self) -> &str {
        "model"
    }
    fn decode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, object: &Map<String, Json>, path: &PropertyPath) -> Result<Node> {
        dispatch.decode_properties(slot, object, path)
    }
    fn encode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> Result<Map<String, Json>> {
        dispatch.encode_properties(slot, node, path)
    }
}

/// Ignores any model and passes every property through untyped.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericAdapter;

impl Adapter for GenericAdapter {
    fn name(&self) -> &str {
        "generic"
    }
    fn decode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, object: &Map<String, Json>, path: &PropertyPath) -> Result<Node> {
        let untyped = Slot { model: Schema::generic(), ..*slot };
        dispatch.decode_properties(&untyped, object, path)
    }
    fn encode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> Result<Map<String, Json>> {
        let untyped = Slot { model: Schema::generic(), ..*slot };
        dispatch.encode_properties(&untyped, node, path)
    }
}

// ------------- Registry -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exactly this discriminator value.
    Discriminator(String),
    /// Any model that declares this family, or any slot of this class.
    Family(String),
    /// Slots whose parent property declares this structural class.
    Class(String),
    /// Everything.
    Any,
}

#[derive(Default)]
pub struct AdapterRegistry {
    entries: Vec<(Matcher, Arc<dyn Adapter>)>,
}

impl AdapterRegistry {
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::new()
    }
    /// Picks the adapter for an object; the last registration wins within each pass.
    pub fn select(&self, discriminator: Option<&str>, class: Option<&str>, model: &Model) -> &dyn Adapter {
        if let Some(d) = discriminator {
            for (matcher, adapter) in self.entries.iter().rev() {
                if matches!(matcher, Matcher::Discriminator(m) if m == d) {
                    return adapter.as_ref();
                }
            }
        }
        for (matcher, adapter) in self.entries.iter().rev() {
            let hit = match matcher {
                Matcher::Class(c) => class == Some(c.as_str()),
                Matcher::Family(f) => class == Some(f.as_str()) || (!model.is_generic() && model.belongs_to(f)),
                _ => false,
            };
            if hit {
                return adapter.as_ref();
            }
        }
        for (matcher, adapter) in self.entries.iter().rev() {
            if *matcher == Matcher::Any {
                return adapter.as_ref();
            }
        }
        &GENERIC_ADAPTER
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: Vec<String> = self
            .entries
            .iter()
            .map(|(m, a)| format!("{m:?} => {}", a.name()))
            .collect();
        f.debug_struct("AdapterRegistry").field("entries", &entries).finish()
    }
}

#[derive(Default)]
pub struct AdapterRegistryBuilder {
    entries: Vec<(Matcher, Arc<dyn Adapter>)>,
}
impl AdapterRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, matcher: Matcher, adapter: impl Adapter + 'static) -> &mut Self {
        self.register_shared(matcher, Arc::new(adapter))
    }
    pub fn register_shared(&mut self, matcher: Matcher, adapter: Arc<dyn Adapter>) -> &mut Self {
        trace!(?matcher, adapter = adapter.name(), "adapter registered");
        self.entries.push((matcher, adapter));
        self
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry { entries: self.entries }
    }
}

// ------------- Dispatch -------------
pub struct Dispatch<'e> {
    schema: &'e Schema,
    registry: &'e AdapterRegistry,
    field: &'e str,
    default_language: &'e str,
    resolver: Option<&'e Resolver>,
}

impl<'e> Dispatch<'e> {
    pub fn new(schema: &'e Schema, registry: &'e AdapterRegistry, field: &'e str, default_language: &'e str) -> Self {
        Self { schema, registry, field, default_language, resolver: None }
    }
    /// Lets bare type identifiers pick up already resolved descriptions.
    pub fn with_resolver(mut self, resolver: Option<&'e Resolver>) -> Self {
        self.resolver = resolver;
        self
    }
    /// A dispatch with no models and no adapters, everything untyped.
    pub fn untyped() -> Dispatch<'static> {
        Dispatch::new(&EMPTY_SCHEMA, &EMPTY_REGISTRY, DEFAULT_DISCRIMINATOR, DEFAULT_LANGUAGE)
    }
    pub fn schema(&self) -> &'e Schema {
        self.schema
    }
    pub fn discriminator_field(&self) -> &'e str {
        self.field
    }
    pub fn default_language(&self) -> &'e str {
        self.default_language
    }

    fn model_for(&self, discriminator: Option<&str>, class: Option<&str>) -> &'e Model {
        discriminator
            .and_then(|d| self.schema.lookup_discriminator(d))
            .or_else(|| class.and_then(|c| self.schema.lookup_class(c)))
            .unwrap_or_else(|| Schema::generic())
    }

    /// Decodes a JSON object, reading its discriminator from `field` (or the document-level field).
    pub fn decode_object(&self, json: &Json, class: Option<&str>, field: Option<&str>, path: &PropertyPath) -> Result<Node> {
        let object = match json {
            Json::Object(object) => object,
            other => {
                return Err(ActivityError::decode(path, format!("expected an object, found {}", json_kind(other))));
            }
        };
        let field = field.unwrap_or(self.field);
        let discriminator = match object.get(field) {
            None | Some(Json::Null) => None,
            Some(Json::String(d)) if !d.is_empty() => Some(d.as_str()),
            Some(other) => {
                return Err(ActivityError::decode(
                    path.child(field),
                    format!("malformed discriminator: expected a non-empty string, found {}", json_kind(other)),
                ));
            }
        };
        let model = self.model_for(discriminator, class);
        let adapter = self.registry.select(discriminator, class, model);
        trace!(%path, adapter = adapter.name(), model = %model.key(), "decoding object");
        let slot = Slot { field, discriminator, class, model };
        adapter.decode(self, &slot, object, path)
    }

    pub fn encode_node(&self, node: &Node, class: Option<&str>, field: Option<&str>, path: &PropertyPath) -> Result<Json> {
        let field = field.unwrap_or(self.field);
        let discriminator = node.discriminator(field).filter(|d| !d.is_empty());
        let model = self.model_for(discriminator, class);
        let adapter = self.registry.select(discriminator, class, model);
        trace!(%path, adapter = adapter.name(), model = %model.key(), "encoding node");
        let slot = Slot { field, discriminator, class, model };
        adapter.encode(self, &slot, node, path).map(Json::Object)
    }

    /// The schema-driven decode of one object: declared properties are coerced,
    /// undeclared ones pass through, required ones must be present.
    pub fn decode_properties(&self, slot: &Slot<'_>, object: &Map<String, Json>, path: &PropertyPath) -> Result<Node> {
        let mut builder = NodeBuilder::new();
        for (name, raw) in object {
            let child = path.child(name);
            let value = if name == slot.field {
                self.decode_open(raw, &child)?
            } else {
                match slot.model.rule(name) {
                    Some(rule) => self.decode_coerced(rule.coercion(), raw, &child)?,
                    None => self.decode_open(raw, &child)?,
                }
            };
            builder.put(name.clone(), value);
        }
        for (name, rule) in slot.model.rules() {
            if rule.is_required() && !builder.contains(name) {
                return Err(ActivityError::decode(path.child(name), "missing required property"));
            }
        }
        Ok(builder.get())
    }

    /// The inverse of [`decode_properties`](Self::decode_properties); the discriminator is always written first.
    pub fn encode_properties(&self, slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> Result<Map<String, Json>> {
        for (name, rule) in slot.model.rules() {
            if rule.is_required() && !node.contains(name) {
                return Err(ActivityError::encode(path.child(name), "missing required property"));
            }
        }
        let mut object = Map::new();
        if let Some(discriminator) = node.get(slot.field) {
            object.insert(slot.field.to_owned(), self.encode_open(discriminator, &path.child(slot.field))?);
        }
        for (name, value) in node.properties() {
            if name == slot.field {
                continue;
            }
            let child = path.child(name);
            let json = match slot.model.rule(name) {
                Some(rule) => self.encode_coerced(rule.coercion(), value, &child)?,
                None => self.encode_open(value, &child)?,
            };
            object.insert(name.to_owned(), json);
        }
        Ok(object)
    }

    // ------------- decoding -------------
    pub fn decode_coerced(&self, coercion: &Coercion, raw: &Json, path: &PropertyPath) -> Result<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        match coercion {
            Coercion::String => match raw {
                Json::String(s) => Ok(Value::String(s.clone())),
                other => Err(mismatch(path, "a string", other)),
            },
            Coercion::Number => match raw {
                Json::Number(n) => Ok(number_value(n)),
                other => Err(mismatch(path, "a number", other)),
            },
            Coercion::Float => match raw {
                Json::Number(n) => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| ActivityError::decode(path, "number out of float range")),
                other => Err(mismatch(path, "a number", other)),
            },
            Coercion::Boolean => match raw {
                Json::Bool(b) => Ok(Value::Bool(*b)),
                other => Err(mismatch(path, "a boolean", other)),
            },
            Coercion::DateTime => match raw {
                Json::String(s) => parse_date_time(s)
                    .map(Value::DateTime)
                    .ok_or_else(|| ActivityError::decode(path, format!("'{s}' is not an ISO-8601 date-time"))),
                other => Err(mismatch(path, "a date-time string", other)),
            },
            Coercion::EnumOf(allowed) => match raw {
                Json::String(s) if allowed.contains(s) => Ok(Value::String(s.clone())),
                Json::String(s) => Err(ActivityError::decode(path, format!("'{s}' is not one of {coercion}"))),
                other => Err(mismatch(path, "a string", other)),
            },
            Coercion::Nested(rule) => self.decode_nested(rule, raw, path).map(Value::Node),
            Coercion::LanguageMap => self.decode_language_map(raw, path).map(Value::LanguageMap),
            Coercion::Link => self.decode_link(raw, path).map(Value::Link),
            Coercion::Links => self.decode_links(raw, path).map(Value::Links),
            Coercion::Type => self.decode_type(raw, path).map(Value::Type),
            Coercion::SequenceOf(inner) => match raw {
                Json::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.decode_coerced(inner, item, &path.index(i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Sequence),
                single => Ok(Value::Sequence(vec![self.decode_coerced(inner, single, path)?])),
            },
        }
    }

    /// Untyped decode used for undeclared properties.
    pub fn decode_open(&self, raw: &Json, path: &PropertyPath) -> Result<Value> {
        Ok(match raw {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => number_value(n),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.decode_open(item, &path.index(i)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            object @ Json::Object(_) => Value::Node(self.decode_object(object, None, None, path)?),
        })
    }

    fn decode_nested(&self, rule: &NestedRule, raw: &Json, path: &PropertyPath) -> Result<Node> {
        self.decode_object(raw, rule.class.as_deref(), rule.discriminator.as_deref(), path)
    }

    fn decode_language_map(&self, raw: &Json, path: &PropertyPath) -> Result<LanguageMap> {
        match raw {
            Json::String(s) => Ok(LanguageMap::single(self.default_language, s.clone())),
            Json::Number(n) => Ok(LanguageMap::single(self.default_language, n.to_string())),
            Json::Object(entries) => {
                let mut map = LanguageMap::new();
                for (tag, text) in entries {
                    if !is_language_tag(tag) {
                        return Err(ActivityError::decode(path, format!("'{tag}' is not a language tag")));
                    }
                    match text {
                        Json::String(t) => map = map.with(tag.clone(), t.clone()),
                        other => return Err(mismatch(&path.child(tag), "a string", other)),
                    }
                }
                Ok(map)
            }
            other => Err(mismatch(path, "a string or a language map", other)),
        }
    }

    fn decode_link(&self, raw: &Json, path: &PropertyPath) -> Result<LinkValue> {
        match raw {
            Json::String(href) => Ok(LinkValue::Simple(href.clone())),
            object @ Json::Object(_) => Ok(LinkValue::Resolved(self.decode_object(object, Some(LINK_CLASS), None, path)?)),
            other => Err(mismatch(path, "a link", other)),
        }
    }

    fn decode_links(&self, raw: &Json, path: &PropertyPath) -> Result<LinkSet> {
        let relations = match raw {
            Json::Object(relations) => relations,
            other => return Err(mismatch(path, "an object of link relations", other)),
        };
        let mut links = LinkSet::new();
        for (relation, entry) in relations {
            let child = path.child(relation);
            match entry {
                Json::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        links.push(relation.clone(), self.decode_link(item, &child.index(i))?);
                    }
                }
                single => links.push(relation.clone(), self.decode_link(single, &child)?),
            }
        }
        Ok(links)
    }

    fn decode_type(&self, raw: &Json, path: &PropertyPath) -> Result<TypeValue> {
        match raw {
            Json::String(id) if !id.is_empty() => Ok(self.cached_type(id, path)),
            Json::Object(object) => {
                let id = match object.get("id") {
                    Some(Json::String(id)) if !id.is_empty() => id.clone(),
                    Some(other) => return Err(mismatch(&path.child("id"), "a type identifier", other)),
                    None => return Err(ActivityError::decode(path.child("id"), "missing type identifier")),
                };
                let mut rest = object.clone();
                rest.remove("id");
                let properties = self.decode_object(&Json::Object(rest), Some(TYPE_CLASS), None, path)?;
                Ok(TypeValue::described(id, properties))
            }
            other => Err(mismatch(path, "a type identifier", other)),
        }
    }

    // Descriptions come from the lookup untyped; they are passed through the
    // type class so decoded documents hold the same shapes a literal
    // `{"id": ..}` object would.
    fn cached_type(&self, id: &str, path: &PropertyPath) -> TypeValue {
        let Some(resolver) = self.resolver else {
            return TypeValue::simple(id);
        };
        match resolver.peek_or_prefetch(id) {
            TypeValue::Described { id, properties } => {
                match self.decode_object(&untyped_json(&properties), Some(TYPE_CLASS), None, path) {
                    Ok(typed) => TypeValue::described(id, typed),
                    Err(e) => {
                        warn!(id = %id, error = %e, "cached description does not fit the type class");
                        TypeValue::simple(id)
                    }
                }
            }
            simple => simple,
        }
    }

    // ------------- encoding -------------
    /// Writes a value under its declared rule. `null` is accepted everywhere and
    /// integers widen into float slots; any other shape mismatch is an error,
    /// since the written text would not decode back to the same value.
    pub fn encode_coerced(&self, coercion: &Coercion, value: &Value, path: &PropertyPath) -> Result<Json> {
        match (coercion, value) {
            (_, Value::Null) => Ok(Json::Null),
            (Coercion::EnumOf(allowed), Value::String(s)) => {
                if allowed.contains(s) {
                    Ok(Json::String(s.clone()))
                } else {
                    Err(ActivityError::encode(path, format!("'{s}' is not one of {coercion}")))
                }
            }
            (Coercion::Float, Value::Integer(i)) => self.encode_open(&Value::Float(*i as f64), path),
            (Coercion::Nested(rule), Value::Node(node)) => {
                self.encode_node(node, rule.class.as_deref(), rule.discriminator.as_deref(), path)
            }
            (Coercion::SequenceOf(inner), Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.encode_coerced(inner, item, &path.index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Json::Array),
            (Coercion::String, Value::String(_))
            | (Coercion::Number, Value::Integer(_) | Value::Float(_))
            | (Coercion::Float, Value::Float(_))
            | (Coercion::Boolean, Value::Bool(_))
            | (Coercion::DateTime, Value::DateTime(_))
            | (Coercion::LanguageMap, Value::LanguageMap(_))
            | (Coercion::Link, Value::Link(_))
            | (Coercion::Links, Value::Links(_))
            | (Coercion::Type, Value::Type(_)) => self.encode_open(value, path),
            (_, other) => Err(ActivityError::encode(
                path,
                format!("expected {coercion}, found {}", other.kind()),
            )),
        }
    }

    pub fn encode_open(&self, value: &Value, path: &PropertyPath) -> Result<Json> {
        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(i) => Json::Number(Number::from(*i)),
            Value::Float(f) => Json::Number(
                Number::from_f64(*f).ok_or_else(|| ActivityError::encode(path, format!("{f} cannot be written as JSON")))?,
            ),
            Value::String(s) => Json::String(s.clone()),
            Value::DateTime(d) => Json::String(format_date_time(d)),
            Value::LanguageMap(map) => {
                if map.is_default_only(self.default_language) {
                    Json::String(map.iter().map(|(_, t)| t.to_owned()).next().unwrap_or_default())
                } else {
                    Json::Object(map.iter().map(|(l, t)| (l.to_owned(), Json::String(t.to_owned()))).collect())
                }
            }
            Value::Link(link) => self.encode_link(link, path)?,
            Value::Links(links) => {
                let mut object = Map::new();
                for (relation, entries) in links.relations() {
                    let child = path.child(relation);
                    let json = match entries {
                        [single] => self.encode_link(single, &child)?,
                        many => Json::Array(
                            many.iter()
                                .enumerate()
                                .map(|(i, l)| self.encode_link(l, &child.index(i)))
                                .collect::<Result<Vec<_>>>()?,
                        ),
                    };
                    object.insert(relation.to_owned(), json);
                }
                Json::Object(object)
            }
            Value::Type(TypeValue::Simple { id }) => Json::String(id.clone()),
            Value::Type(TypeValue::Described { id, properties }) => {
                let mut object = Map::new();
                object.insert(String::from("id"), Json::String(id.clone()));
                if let Json::Object(rest) = self.encode_node(properties, Some(TYPE_CLASS), None, path)? {
                    object.extend(rest.into_iter().filter(|(k, _)| k != "id"));
                }
                Json::Object(object)
            }
            Value::Sequence(items) => Json::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode_open(item, &path.index(i)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Node(node) => self.encode_node(node, None, None, path)?,
        })
    }

    fn encode_link(&self, link: &LinkValue, path: &PropertyPath) -> Result<Json> {
        match link {
            LinkValue::Simple(href) => Ok(Json::String(href.clone())),
            LinkValue::Resolved(node) => self.encode_node(node, Some(LINK_CLASS), None, path),
        }
    }
}

/// Plain JSON for a node without any schema; used for display and diagnostics.
pub fn untyped_json(node: &Node) -> Json {
    Dispatch::untyped()
        .encode_node(node, None, None, &PropertyPath::root())
        .unwrap_or(Json::Null)
}

/// Builds a node from JSON without any schema.
pub fn untyped_node(json: &Json) -> Result<Node> {
    Dispatch::untyped().decode_object(json, None, None, &PropertyPath::root())
}

pub fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

pub fn format_date_time(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn number_value(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Integer(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn mismatch(path: &PropertyPath, expected: &str, found: &Json) -> ActivityError {
    ActivityError::decode(path, format!("expected {expected}, found {}", json_kind(found)))
}
