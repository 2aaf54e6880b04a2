use chrono::{DateTime, Utc};

use crate::construct::Node;
use crate::datatype::{DocumentKind, LinkValue, TypeValue, Value};
use crate::error::Result;
use crate::module::Module;
use crate::schema::{Coercion, ModelRules, SchemaBuilder};
use crate::vocab::geo::{GEOMETRY_CLASS, GEOMETRY_DISCRIMINATOR};

pub const OBJECT_FAMILY: &str = "object";
pub const ACTIVITY_FAMILY: &str = "activity";
pub const COLLECTION_FAMILY: &str = "collection";
pub const MEDIA_LINK_CLASS: &str = "media-link";
pub const PLACE_CLASS: &str = "place";
pub const ADDRESS_CLASS: &str = "address";

/// Object types that carry nothing beyond the common object properties.
pub const OBJECT_TYPES: &[&str] = &[
    "article", "audio", "badge", "bookmark", "comment", "device", "file", "game", "group",
    "image", "issue", "note", "offer", "organization", "page", "person", "product",
    "question", "review", "service", "task", "video",
];

// properties every object carries, the place ones included
fn common_rules() -> ModelRules {
    ModelRules::new()
        .family(OBJECT_FAMILY)
        .property("id", Coercion::String)
        .property("displayName", Coercion::LanguageMap)
        .property("title", Coercion::LanguageMap)
        .property("summary", Coercion::LanguageMap)
        .property("content", Coercion::LanguageMap)
        .property("url", Coercion::Link)
        .property("links", Coercion::Links)
        .property("published", Coercion::DateTime)
        .property("updated", Coercion::DateTime)
        .property("author", Coercion::nested_class(OBJECT_FAMILY))
        .property("image", Coercion::nested_class(MEDIA_LINK_CLASS))
        .property("attachments", Coercion::sequence_of(Coercion::nested_class(OBJECT_FAMILY)))
        .property("tags", Coercion::sequence_of(Coercion::nested_class(OBJECT_FAMILY)))
        .property("inReplyTo", Coercion::sequence_of(Coercion::nested_class(OBJECT_FAMILY)))
        .property("downstreamDuplicates", Coercion::sequence_of(Coercion::String))
        .property("upstreamDuplicates", Coercion::sequence_of(Coercion::String))
        .property("rating", Coercion::Float)
}

fn object_rules() -> ModelRules {
    common_rules().property("location", Coercion::nested_class(PLACE_CLASS))
}

fn activity_rules() -> ModelRules {
    object_rules()
        .family(ACTIVITY_FAMILY)
        .property("verb", Coercion::Type)
        .property("actor", Coercion::nested_class(OBJECT_FAMILY))
        .property("object", Coercion::nested_class(OBJECT_FAMILY))
        .property("target", Coercion::nested_class(OBJECT_FAMILY))
        .property("generator", Coercion::nested_class(OBJECT_FAMILY))
        .property("provider", Coercion::nested_class(OBJECT_FAMILY))
        .property("icon", Coercion::nested_class(MEDIA_LINK_CLASS))
}

fn collection_rules() -> ModelRules {
    object_rules()
        .family(COLLECTION_FAMILY)
        .property("totalItems", Coercion::Number)
        .property("items", Coercion::sequence_of(Coercion::nested_class(OBJECT_FAMILY)))
        .property("itemsAfter", Coercion::DateTime)
        .property("itemsBefore", Coercion::DateTime)
}

// the location of a place is its geometry, not another place
fn place_rules() -> ModelRules {
    common_rules()
        .property("position", Coercion::String)
        .property("address", Coercion::nested_class(ADDRESS_CLASS))
        .property("location", Coercion::polymorphic(GEOMETRY_CLASS, GEOMETRY_DISCRIMINATOR))
}

/// The core activity vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityModule;

impl Module for ActivityModule {
    fn name(&self) -> &str {
        "activity"
    }
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()> {
        for object_type in OBJECT_TYPES {
            schema.define_model(object_type, object_rules())?;
        }
        schema
            .define_model("event", object_rules()
                .property("startTime", Coercion::DateTime)
                .property("endTime", Coercion::DateTime))?
            .define_model(ACTIVITY_FAMILY, activity_rules())?
            .define_class(ACTIVITY_FAMILY, activity_rules())?
            .define_model(COLLECTION_FAMILY, collection_rules())?
            .define_class(COLLECTION_FAMILY, collection_rules())?
            .define_class(OBJECT_FAMILY, object_rules())?
            .define_model(PLACE_CLASS, place_rules())?
            .define_class(PLACE_CLASS, place_rules())?
            .define_class(MEDIA_LINK_CLASS, ModelRules::new()
                .property("url", Coercion::Link)
                .property("width", Coercion::Number)
                .property("height", Coercion::Number)
                .property("duration", Coercion::Number))?
            .define_class(ADDRESS_CLASS, ModelRules::new()
                .property("formatted", Coercion::String)
                .property("streetAddress", Coercion::String)
                .property("locality", Coercion::String)
                .property("region", Coercion::String)
                .property("postalCode", Coercion::String)
                .property("country", Coercion::String))?
            .define_class(crate::adapter::TYPE_CLASS, ModelRules::new()
                .property("displayName", Coercion::LanguageMap)
                .property("url", Coercion::Link))?;
        Ok(())
    }
}

// ------------- typed views -------------
/// Any document of the object family.
#[derive(Debug, Clone, PartialEq)]
pub struct ASObject {
    node: Node,
}
impl ASObject {
    pub fn object_type(&self) -> Option<&str> {
        self.node.discriminator("objectType")
    }
    pub fn id(&self) -> Option<&str> {
        self.node.get("id").and_then(Value::as_str)
    }
    pub fn display_name(&self, language: &str) -> Option<&str> {
        self.node.text("displayName", language)
    }
    pub fn title(&self, language: &str) -> Option<&str> {
        self.node.text("title", language)
    }
    pub fn content(&self, language: &str) -> Option<&str> {
        self.node.text("content", language)
    }
    pub fn url(&self) -> Option<&LinkValue> {
        self.node.get("url").and_then(Value::as_link)
    }
    pub fn published(&self) -> Option<&DateTime<Utc>> {
        self.node.get("published").and_then(Value::as_date_time)
    }
}
impl DocumentKind for ASObject {
    const FAMILY: &'static str = OBJECT_FAMILY;
    fn wrap(node: Node) -> Self {
        Self { node }
    }
    fn node(&self) -> &Node {
        &self.node
    }
    fn into_node(self) -> Node {
        self.node
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    node: Node,
}
impl Activity {
    pub fn verb(&self) -> Option<&TypeValue> {
        self.node.get("verb").and_then(Value::as_type)
    }
    pub fn actor(&self) -> Option<&Node> {
        self.node.get("actor").and_then(Value::as_node)
    }
    pub fn object(&self) -> Option<&Node> {
        self.node.get("object").and_then(Value::as_node)
    }
    pub fn target(&self) -> Option<&Node> {
        self.node.get("target").and_then(Value::as_node)
    }
    pub fn title(&self, language: &str) -> Option<&str> {
        self.node.text("title", language)
    }
    pub fn published(&self) -> Option<&DateTime<Utc>> {
        self.node.get("published").and_then(Value::as_date_time)
    }
}
impl DocumentKind for Activity {
    const FAMILY: &'static str = ACTIVITY_FAMILY;
    fn wrap(node: Node) -> Self {
        Self { node }
    }
    fn node(&self) -> &Node {
        &self.node
    }
    fn into_node(self) -> Node {
        self.node
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    node: Node,
}
impl Collection {
    pub fn total_items(&self) -> Option<i64> {
        self.node.get("totalItems").and_then(Value::as_i64)
    }
    pub fn items(&self) -> impl Iterator<Item = &Node> {
        self.node
            .get("items")
            .and_then(Value::as_sequence)
            .unwrap_or(&[])
            .iter()
            .filter_map(Value::as_node)
    }
}
impl DocumentKind for Collection {
    const FAMILY: &'static str = COLLECTION_FAMILY;
    fn wrap(node: Node) -> Self {
        Self { node }
    }
    fn node(&self) -> &Node {
        &self.node
    }
    fn into_node(self) -> Node {
        self.node
    }
}
