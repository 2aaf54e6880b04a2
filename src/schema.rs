//! Models and the schema that aggregates them.
//!
//! A [`Model`] lists the properties a document type recognizes together with
//! the [`Coercion`] that turns raw JSON into typed [`Value`](crate::datatype::Value)s.
//! Models are keyed either by a discriminator (the value of a document's type
//! field, e.g. `"note"`) or by a structural class that a parent property names
//! statically (e.g. the `address` of a place).
//!
//! Schemas are assembled through a [`SchemaBuilder`]. Registering the same
//! model twice merges the property sets; redeclaring a property with a
//! different coercion is a configuration error.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::BuildHasherDefault;

use lazy_static::lazy_static;
use seahash::SeaHasher;
use tracing::debug;

use crate::error::{ActivityError, Result};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    static ref GENERIC: Model = Model::new(ModelKey::Class(String::from("*")));
}

// ------------- Coercion -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    String,
    Number,
    Float,
    Boolean,
    DateTime,
    EnumOf(BTreeSet<String>),
    Nested(NestedRule),
    LanguageMap,
    Link,
    Links,
    Type,
    SequenceOf(Box<Coercion>),
}

/// How a nested, possibly polymorphic, slot finds its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedRule {
    /// Statically known class of the slot, used when no discriminator matches.
    pub class: Option<String>,
    /// Field naming the concrete type inside the slot. `None` means the
    /// document-level discriminator field.
    pub discriminator: Option<String>,
}

impl Coercion {
    pub fn enum_of<S: AsRef<str>>(values: &[S]) -> Self {
        Coercion::EnumOf(values.iter().map(|v| v.as_ref().to_owned()).collect())
    }
    /// A nested document whose type is read from the document-level discriminator.
    pub fn nested() -> Self {
        Coercion::Nested(NestedRule { class: None, discriminator: None })
    }
    pub fn nested_class(class: &str) -> Self {
        Coercion::Nested(NestedRule { class: Some(class.to_owned()), discriminator: None })
    }
    /// A nested slot with its own discriminator field, e.g. the `type` of a geometry.
    pub fn polymorphic(class: &str, discriminator: &str) -> Self {
        Coercion::Nested(NestedRule {
            class: Some(class.to_owned()),
            discriminator: Some(discriminator.to_owned()),
        })
    }
    pub fn sequence_of(inner: Coercion) -> Self {
        Coercion::SequenceOf(Box::new(inner))
    }
}
impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coercion::String => write!(f, "string"),
            Coercion::Number => write!(f, "number"),
            Coercion::Float => write!(f, "float"),
            Coercion::Boolean => write!(f, "boolean"),
            Coercion::DateTime => write!(f, "date-time"),
            Coercion::EnumOf(set) => {
                let values: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "enum-of({})", values.join("|"))
            }
            Coercion::Nested(rule) => match (&rule.class, &rule.discriminator) {
                (Some(c), Some(d)) => write!(f, "nested({c} by {d})"),
                (Some(c), None) => write!(f, "nested({c})"),
                (None, Some(d)) => write!(f, "nested(by {d})"),
                (None, None) => write!(f, "nested"),
            },
            Coercion::LanguageMap => write!(f, "language-map"),
            Coercion::Link => write!(f, "link"),
            Coercion::Links => write!(f, "links"),
            Coercion::Type => write!(f, "type"),
            Coercion::SequenceOf(inner) => write!(f, "sequence-of({inner})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRule {
    coercion: Coercion,
    required: bool,
}
impl PropertyRule {
    pub fn new(coercion: Coercion) -> Self {
        Self { coercion, required: false }
    }
    pub fn required(coercion: Coercion) -> Self {
        Self { coercion, required: true }
    }
    pub fn coercion(&self) -> &Coercion {
        &self.coercion
    }
    pub fn is_required(&self) -> bool {
        self.required
    }
}

// ------------- Model -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelKey {
    Discriminator(String),
    Class(String),
}
impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelKey::Discriminator(d) => write!(f, "{d}"),
            ModelKey::Class(c) => write!(f, "<{c}>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    key: ModelKey,
    families: Vec<String>,
    properties: Vec<(String, PropertyRule)>,
}

impl Model {
    fn new(key: ModelKey) -> Self {
        Self { key, families: Vec::new(), properties: Vec::new() }
    }
    pub fn key(&self) -> &ModelKey {
        &self.key
    }
    pub fn rule(&self, property: &str) -> Option<&PropertyRule> {
        self.properties
            .iter()
            .find(|(n, _)| n == property)
            .map(|(_, r)| r)
    }
    pub fn rules(&self) -> impl Iterator<Item = (&str, &PropertyRule)> {
        self.properties.iter().map(|(n, r)| (n.as_str(), r))
    }
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(String::as_str)
    }
    /// A model belongs to its own discriminator or class, and to every family it declares.
    pub fn belongs_to(&self, family: &str) -> bool {
        let own = match &self.key {
            ModelKey::Discriminator(d) | ModelKey::Class(d) => d == family,
        };
        own || self.families.iter().any(|f| f == family)
    }
    pub fn is_generic(&self) -> bool {
        self.properties.is_empty() && self.families.is_empty()
    }
}

/// Property rules and families contributed for one model.
#[derive(Debug, Clone, Default)]
pub struct ModelRules {
    families: Vec<String>,
    properties: Vec<(String, PropertyRule)>,
}
impl ModelRules {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn family(mut self, family: &str) -> Self {
        if !self.families.iter().any(|f| f == family) {
            self.families.push(family.to_owned());
        }
        self
    }
    pub fn property(self, name: &str, coercion: Coercion) -> Self {
        self.rule(name, PropertyRule::new(coercion))
    }
    pub fn required(self, name: &str, coercion: Coercion) -> Self {
        self.rule(name, PropertyRule::required(coercion))
    }
    pub fn rule(mut self, name: &str, rule: PropertyRule) -> Self {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = rule,
            None => self.properties.push((name.to_owned(), rule)),
        }
        self
    }
}

// ------------- Schema -------------
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: HashMap<ModelKey, Model, OtherHasher>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }
    pub fn lookup_model(&self, key: &ModelKey) -> Option<&Model> {
        self.models.get(key)
    }
    pub fn lookup_discriminator(&self, discriminator: &str) -> Option<&Model> {
        self.models.get(&ModelKey::Discriminator(discriminator.to_owned()))
    }
    pub fn lookup_class(&self, class: &str) -> Option<&Model> {
        self.models.get(&ModelKey::Class(class.to_owned()))
    }
    /// The untyped model used when nothing else applies: no rules, everything passes through.
    pub fn generic() -> &'static Model {
        &GENERIC
    }
    pub fn len(&self) -> usize {
        self.models.len()
    }
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
    pub fn keys(&self) -> impl Iterator<Item = &ModelKey> {
        self.models.keys()
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    models: HashMap<ModelKey, Model, OtherHasher>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Starts from the models of an existing schema.
    pub fn extend(schema: &Schema) -> Self {
        Self { models: schema.models.clone() }
    }
    pub fn define_model(&mut self, discriminator: &str, rules: ModelRules) -> Result<&mut Self> {
        self.define(ModelKey::Discriminator(discriminator.to_owned()), rules)
    }
    pub fn define_class(&mut self, class: &str, rules: ModelRules) -> Result<&mut Self> {
        self.define(ModelKey::Class(class.to_owned()), rules)
    }
    pub fn define(&mut self, key: ModelKey, rules: ModelRules) -> Result<&mut Self> {
        // check every property first so that a failed merge leaves the schema untouched
        if let Some(model) = self.models.get(&key) {
            for (name, rule) in &rules.properties {
                if let Some(existing) = model.rule(name) {
                    if existing.coercion != rule.coercion {
                        return Err(ActivityError::Configuration(format!(
                            "property '{}' of model {} is declared as {} and redeclared as {}",
                            name, key, existing.coercion, rule.coercion
                        )));
                    }
                }
            }
        }
        let model = self
            .models
            .entry(key.clone())
            .or_insert_with(|| Model::new(key.clone()));
        for family in rules.families {
            if !model.families.contains(&family) {
                model.families.push(family);
            }
        }
        for (name, rule) in rules.properties {
            match model.properties.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1.required |= rule.required,
                None => model.properties.push((name, rule)),
            }
        }
        debug!(model = %key, properties = model.properties.len(), "model defined");
        Ok(self)
    }
    pub fn lookup_model(&self, key: &ModelKey) -> Option<&Model> {
        self.models.get(key)
    }
    pub fn build(self) -> Schema {
        Schema { models: self.models }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_extends_and_unions() {
        let mut builder = SchemaBuilder::new();
        builder
            .define_model("note", ModelRules::new().family("object").property("title", Coercion::LanguageMap))
            .unwrap()
            .define_model("note", ModelRules::new().family("post").required("title", Coercion::LanguageMap))
            .unwrap();
        let schema = builder.build();
        let note = schema.lookup_discriminator("note").unwrap();
        assert!(note.belongs_to("object"));
        assert!(note.belongs_to("post"));
        assert!(note.belongs_to("note"));
        assert!(note.rule("title").unwrap().is_required());
    }

    #[test]
    fn failed_merge_leaves_model_untouched() {
        let mut builder = SchemaBuilder::new();
        builder
            .define_model("note", ModelRules::new().property("title", Coercion::String))
            .unwrap();
        let err = builder
            .define_model(
                "note",
                ModelRules::new()
                    .property("summary", Coercion::String)
                    .property("title", Coercion::DateTime),
            )
            .unwrap_err();
        assert!(matches!(err, ActivityError::Configuration(_)));
        let note = builder.lookup_model(&ModelKey::Discriminator("note".into())).unwrap();
        assert!(note.rule("summary").is_none());
    }

    #[test]
    fn coercions_render_readably() {
        assert_eq!(Coercion::enum_of(&["b", "a"]).to_string(), "enum-of(a|b)");
        assert_eq!(Coercion::polymorphic("geometry", "type").to_string(), "nested(geometry by type)");
        assert_eq!(Coercion::sequence_of(Coercion::Float).to_string(), "sequence-of(float)");
    }
}
