//! Engine assembly and the encode/decode surface.
//!
//! An [`Engine`] is built once from an ordered list of [`Module`]s and then
//! shared freely: its schema and adapter list never change afterwards, and
//! the only mutable part, the type resolver cache, synchronizes itself.

use std::sync::Arc;

use serde_json::Value as Json;
use tracing::{debug, info};

use crate::adapter::{AdapterRegistry, AdapterRegistryBuilder, Dispatch, Matcher, ModelAdapter, PropertyPath};
use crate::config::EngineConfig;
use crate::construct::Node;
use crate::datatype::DocumentKind;
use crate::error::{ActivityError, Result};
use crate::module::Module;
use crate::resolver::{Resolver, TypeLookup};
use crate::schema::{Schema, SchemaBuilder};

pub struct Engine {
    schema: Arc<Schema>,
    adapters: AdapterRegistry,
    resolver: Option<Arc<Resolver>>,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }
    pub fn resolver(&self) -> Option<&Arc<Resolver>> {
        self.resolver.as_ref()
    }
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    pub fn dispatch(&self) -> Dispatch<'_> {
        let resolver = if self.config.resolve_on_decode { self.resolver.as_deref() } else { None };
        Dispatch::new(
            &self.schema,
            &self.adapters,
            &self.config.discriminator_field,
            &self.config.default_language,
        )
        .with_resolver(resolver)
    }

    // ------------- encoding -------------
    /// Writes the node in the configured form (pretty or compact).
    pub fn encode(&self, node: &Node) -> Result<String> {
        if self.config.pretty { self.encode_pretty(node) } else { self.encode_compact(node) }
    }
    pub fn encode_pretty(&self, node: &Node) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.encode_value(node)?)?)
    }
    pub fn encode_compact(&self, node: &Node) -> Result<String> {
        Ok(serde_json::to_string(&self.encode_value(node)?)?)
    }
    /// Encodes a typed document, reading its type from the family's own discriminator field.
    pub fn encode_as<T: DocumentKind>(&self, document: &T) -> Result<String> {
        let field = T::DISCRIMINATOR_FIELD.unwrap_or(self.config.discriminator_field.as_str());
        let json = self
            .dispatch()
            .encode_node(document.node(), Some(T::FAMILY), Some(field), &PropertyPath::root())?;
        if self.config.pretty {
            Ok(serde_json::to_string_pretty(&json)?)
        } else {
            Ok(serde_json::to_string(&json)?)
        }
    }
    pub fn encode_bytes(&self, node: &Node) -> Result<Vec<u8>> {
        self.encode(node).map(String::into_bytes)
    }
    /// The generic JSON tree for a node.
    pub fn encode_value(&self, node: &Node) -> Result<Json> {
        self.dispatch().encode_node(node, None, None, &PropertyPath::root())
    }

    // ------------- decoding -------------
    pub fn decode(&self, text: &str) -> Result<Node> {
        let json: Json = serde_json::from_str(text)?;
        self.decode_value(&json)
    }
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Node> {
        let json: Json = serde_json::from_slice(bytes)?;
        self.decode_value(&json)
    }
    pub fn decode_value(&self, json: &Json) -> Result<Node> {
        self.dispatch().decode_object(json, None, None, &PropertyPath::root())
    }
    /// Decodes a document and checks that its top-level type belongs to `T::FAMILY`.
    pub fn decode_as<T: DocumentKind>(&self, text: &str) -> Result<T> {
        let json: Json = serde_json::from_str(text)?;
        self.decode_value_as(&json)
    }
    pub fn decode_value_as<T: DocumentKind>(&self, json: &Json) -> Result<T> {
        let field = T::DISCRIMINATOR_FIELD.unwrap_or(self.config.discriminator_field.as_str());
        let node = self
            .dispatch()
            .decode_object(json, Some(T::FAMILY), Some(field), &PropertyPath::root())?;
        let belongs = match node.discriminator(field) {
            Some(d) => match self.schema.lookup_discriminator(d) {
                Some(model) => model.belongs_to(T::FAMILY),
                None => d == T::FAMILY,
            },
            None => self.schema.lookup_class(T::FAMILY).is_some(),
        };
        if !belongs {
            return Err(ActivityError::decode(
                PropertyPath::root().child(field),
                format!(
                    "expected a document of the {} family, found {}",
                    T::FAMILY,
                    node.discriminator(field).unwrap_or("an untyped document")
                ),
            ));
        }
        Ok(T::wrap(node))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("models", &self.schema.len())
            .field("adapters", &self.adapters.len())
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish()
    }
}

// ------------- EngineBuilder -------------
#[derive(Default)]
pub struct EngineBuilder {
    modules: Vec<Arc<dyn Module>>,
    base: Option<Arc<Schema>>,
    config: EngineConfig,
    lookup: Option<Arc<dyn TypeLookup>>,
    resolver: Option<Arc<Resolver>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends a module; modules are applied in the order they were added.
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Arc::new(module));
        self
    }
    pub fn shared_module(mut self, module: Arc<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }
    /// Extends a previously built schema instead of starting empty.
    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.base = Some(schema);
        self
    }
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }
    pub fn silent(mut self, silent: bool) -> Self {
        self.config.silent_resolution = silent;
        self
    }
    /// The collaborator used to describe type identifiers.
    pub fn lookup(mut self, lookup: impl TypeLookup + 'static) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }
    /// Shares an existing resolver (and its cache) instead of creating one from `lookup`.
    pub fn resolver(mut self, resolver: Arc<Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;
        let mut schema_builder = match &self.base {
            Some(base) => SchemaBuilder::extend(base),
            None => SchemaBuilder::new(),
        };
        for module in &self.modules {
            debug!(module = module.name(), "defining models");
            module.define(&mut schema_builder).map_err(|e| match e {
                ActivityError::Configuration(message) => {
                    ActivityError::Configuration(format!("module '{}': {}", module.name(), message))
                }
                other => other,
            })?;
        }
        let schema = Arc::new(schema_builder.build());

        let mut adapters = AdapterRegistryBuilder::new();
        adapters.register(Matcher::Any, ModelAdapter);
        for module in &self.modules {
            debug!(module = module.name(), "registering adapters");
            module.register(&mut adapters, &schema)?;
        }
        let adapters = adapters.build();

        let resolver = match (self.resolver, self.lookup) {
            (Some(resolver), _) => Some(resolver),
            (None, Some(lookup)) => Some(Arc::new(Resolver::with_shared_lookup(lookup, self.config.silent_resolution))),
            (None, None) => None,
        };
        info!(
            modules = self.modules.len(),
            models = schema.len(),
            adapters = adapters.len(),
            resolver = resolver.is_some(),
            "engine assembled"
        );
        Ok(Engine { schema, adapters, resolver, config: self.config })
    }
}
