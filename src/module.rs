//! Modules bundle schema contributions with adapter registrations.
//!
//! An engine applies its modules twice, in the order given: first every
//! module defines models, then, once the schema is frozen, every module
//! registers adapters. A module registered later can shadow the adapters of
//! an earlier one for the same discriminator.

use std::fmt;
use std::sync::Arc;

use crate::adapter::AdapterRegistryBuilder;
use crate::error::Result;
use crate::schema::{Schema, SchemaBuilder};

pub trait Module: Send + Sync {
    fn name(&self) -> &str;
    /// Contributes models. Conflicting property rules fail here.
    fn define(&self, _schema: &mut SchemaBuilder) -> Result<()> {
        Ok(())
    }
    /// Contributes adapters bound to the finished schema.
    fn register(&self, _adapters: &mut AdapterRegistryBuilder, _schema: &Arc<Schema>) -> Result<()> {
        Ok(())
    }
}

type DefineFn = Box<dyn Fn(&mut SchemaBuilder) -> Result<()> + Send + Sync>;
type RegisterFn = Box<dyn Fn(&mut AdapterRegistryBuilder, &Arc<Schema>) -> Result<()> + Send + Sync>;

/// A module assembled from closures, for vocabularies that need no type of their own.
pub struct FnModule {
    name: String,
    define: Option<DefineFn>,
    register: Option<RegisterFn>,
}

impl FnModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), define: None, register: None }
    }
    pub fn on_define<F>(mut self, define: F) -> Self
    where
        F: Fn(&mut SchemaBuilder) -> Result<()> + Send + Sync + 'static,
    {
        self.define = Some(Box::new(define));
        self
    }
    pub fn on_register<F>(mut self, register: F) -> Self
    where
        F: Fn(&mut AdapterRegistryBuilder, &Arc<Schema>) -> Result<()> + Send + Sync + 'static,
    {
        self.register = Some(Box::new(register));
        self
    }
}

impl Module for FnModule {
    fn name(&self) -> &str {
        &self.name
    }
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()> {
        match &self.define {
            Some(define) => define(schema),
            None => Ok(()),
        }
    }
    fn register(&self, adapters: &mut AdapterRegistryBuilder, schema: &Arc<Schema>) -> Result<()> {
        match &self.register {
            Some(register) => register(adapters, schema),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FnModule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .field("defines", &self.define.is_some())
            .field("registers", &self.register.is_some())
            .finish()
    }
}
