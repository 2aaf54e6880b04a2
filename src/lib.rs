//! Activity JSON – schema-driven, extensible encoding and decoding of activity documents.
//!
//! Documents are JSON objects whose concrete type is named by a discriminator
//! field (`objectType` for top-level documents, `type` inside GeoJSON slots).
//! Decoding turns such a tree into an immutable [`construct::Node`]: properties
//! the schema declares are coerced into typed [`datatype::Value`]s (instants,
//! language maps, links, type identifiers, nested documents), everything else
//! passes through untouched. Encoding is the inverse.
//!
//! ## Modules
//! * [`datatype`] – the value model: [`datatype::Value`], language maps, link sets, type values.
//! * [`construct`] – immutable nodes and their builder.
//! * [`schema`] – models, coercion rules and the schema that aggregates them.
//! * [`adapter`] – adapters, the ordered adapter registry and the [`adapter::Dispatch`] context.
//! * [`module`] – pluggable bundles of models and adapters.
//! * [`resolver`] – a single-flight, cached resolver for type identifiers.
//! * [`engine`] – assembly of modules into an [`engine::Engine`] and the encode/decode surface.
//! * [`config`] – engine settings loadable from a file and the environment.
//! * [`vocab`] – the built-in activity and GeoJSON vocabularies.
//!
//! ## Extending
//! A [`module::Module`] contributes models first and adapters second. Modules
//! are applied in order; merging a model that another module already defined
//! extends its property set, and an adapter registered later for the same
//! discriminator shadows an earlier one. Once built, an engine never changes.
//!
//! ## Quick Start
//! ```
//! use activity_json::engine::Engine;
//! use activity_json::vocab::ActivityModule;
//! let engine = Engine::builder().module(ActivityModule).build().unwrap();
//! let note = engine.decode(r#"{"objectType":"note","title":"This is the title"}"#).unwrap();
//! assert_eq!(note.text("title", "en"), Some("This is the title"));
//! assert_eq!(
//!     engine.encode(&note).unwrap(),
//!     r#"{"objectType":"note","title":"This is the title"}"#
//! );
//! ```

pub mod adapter;
pub mod config;
pub mod construct;
pub mod datatype;
pub mod engine;
pub mod error;
pub mod module;
pub mod resolver;
pub mod schema;
pub mod vocab;

pub use construct::{Node, NodeBuilder};
pub use datatype::{DocumentKind, LanguageMap, LinkSet, LinkValue, TypeValue, Value};
pub use engine::{Engine, EngineBuilder};
pub use error::{ActivityError, Result};
