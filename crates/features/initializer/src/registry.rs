//! # Component Registry
//!
//! The name → implementation table the dispatcher resolves against. It is
//! assembled once through [`RegistryBuilder`] before the first scan, then
//! shared behind an `Arc` and never mutated.
//!
//! Four kinds of registrations mirror the shapes a component module can take:
//!
//! | Builder call | Shape | Invoked as |
//! |--------------|-------|------------|
//! | [`RegistryBuilder::object`] | module exporting named members | `member(doc, config, target)` |
//! | [`RegistryBuilder::module`] | module that is itself invocable | `entry(doc, config, target)` |
//! | [`RegistryBuilder::extension`] | member of the element-extension namespace | `extension(doc, element, config)` |
//! | [`RegistryBuilder::side_effect`] | module run for its side effects | `effect(doc)` |
//!
//! Aliases map short names to registered module names and may chain.

use crate::error::InitError;
use fxhash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use weld_dom::Document;
use weld_domain::NodeId;

/// Error a component reports back to the dispatcher.
pub type ComponentError = Box<dyn std::error::Error + Send + Sync>;
pub type ComponentResult = Result<(), ComponentError>;

type InvokeFn = dyn Fn(&mut Document, &Value, Option<NodeId>) -> ComponentResult + Send + Sync;
type ExtendFn = dyn Fn(&mut Document, NodeId, &Value) -> ComponentResult + Send + Sync;
type EffectFn = dyn Fn(&mut Document) -> ComponentResult + Send + Sync;

/// A callable taking `(document, config, target)`.
#[derive(Clone)]
pub struct Invocable(Arc<InvokeFn>);

impl Invocable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Document, &Value, Option<NodeId>) -> ComponentResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    /// Whatever the component reports.
    pub fn call(&self, doc: &mut Document, config: &Value, target: Option<NodeId>) -> ComponentResult {
        (self.0)(doc, config, target)
    }
}

/// A member of the element-extension namespace: `(document, element, config)`.
#[derive(Clone)]
pub struct Extension(Arc<ExtendFn>);

impl Extension {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &Value) -> ComponentResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    /// Whatever the component reports.
    pub fn call(&self, doc: &mut Document, element: NodeId, config: &Value) -> ComponentResult {
        (self.0)(doc, element, config)
    }
}

/// A module executed with no arguments.
#[derive(Clone)]
pub struct SideEffect(Arc<EffectFn>);

impl SideEffect {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Document) -> ComponentResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    /// Whatever the module reports.
    pub fn call(&self, doc: &mut Document) -> ComponentResult {
        (self.0)(doc)
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invocable(..)")
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extension(..)")
    }
}

impl fmt::Debug for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SideEffect(..)")
    }
}

/// A value exported by an object module.
#[derive(Debug, Clone)]
pub enum Export {
    Invocable(Invocable),
    /// Non-callable export (constants, defaults). Never invoked.
    Data(Value),
}

/// A registered module.
#[derive(Debug, Clone)]
pub enum Module {
    Object(ObjectModule),
    Direct(Invocable),
    SideEffect(SideEffect),
}

/// Module exporting named members.
#[derive(Debug, Clone, Default)]
pub struct ObjectModule {
    members: FxHashMap<String, Export>,
}

impl ObjectModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn member<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document, &Value, Option<NodeId>) -> ComponentResult + Send + Sync + 'static,
    {
        self.members.insert(name.into(), Export::Invocable(Invocable::new(f)));
        self
    }

    #[must_use]
    pub fn data(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.insert(name.into(), Export::Data(value));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.members.get(name)
    }

    /// The member `name`, if it exists and is callable.
    #[must_use]
    pub fn invocable(&self, name: &str) -> Option<&Invocable> {
        match self.members.get(name)? {
            Export::Invocable(invocable) => Some(invocable),
            Export::Data(_) => None,
        }
    }
}

/// Immutable component table. Build with [`ComponentRegistry::builder`].
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    modules: FxHashMap<String, Module>,
    extensions: FxHashMap<String, Extension>,
    aliases: FxHashMap<String, String>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The module registered as `name`, following aliases.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(self.canonical(name))
    }

    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.get(name)
    }

    /// Resolves alias chains; names that are not aliases map to themselves.
    #[must_use]
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        // Chains are acyclic after build().
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len() + self.extensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.extensions.is_empty()
    }
}

/// Collects registrations; [`RegistryBuilder::build`] validates aliases.
///
/// Registering a name twice keeps the last registration.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: ComponentRegistry,
}

impl RegistryBuilder {
    /// Registers a directly invocable module.
    #[must_use]
    pub fn module<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document, &Value, Option<NodeId>) -> ComponentResult + Send + Sync + 'static,
    {
        self.registry.modules.insert(name.into(), Module::Direct(Invocable::new(f)));
        self
    }

    /// Registers a module exporting named members.
    #[must_use]
    pub fn object(mut self, name: impl Into<String>, module: ObjectModule) -> Self {
        self.registry.modules.insert(name.into(), Module::Object(module));
        self
    }

    /// Registers a module executed only for its side effects.
    #[must_use]
    pub fn side_effect<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document) -> ComponentResult + Send + Sync + 'static,
    {
        self.registry.modules.insert(name.into(), Module::SideEffect(SideEffect::new(f)));
        self
    }

    /// Registers a member of the element-extension namespace.
    #[must_use]
    pub fn extension<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &Value) -> ComponentResult + Send + Sync + 'static,
    {
        self.registry.extensions.insert(name.into(), Extension::new(f));
        self
    }

    /// Maps a short name to a module name (or another alias).
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.registry.aliases.insert(alias.into(), target.into());
        self
    }

    /// # Errors
    /// [`InitError::Registry`] if an alias shadows a module, ends at an
    /// unregistered name, or loops.
    pub fn build(self) -> Result<ComponentRegistry, InitError> {
        let registry = self.registry;

        for (alias, target) in &registry.aliases {
            if registry.modules.contains_key(alias) {
                return Err(InitError::Registry {
                    message: format!("Alias '{alias}' shadows a registered module").into(),
                    context: None,
                });
            }

            let mut seen = vec![alias.as_str()];
            let mut current = target.as_str();
            while let Some(next) = registry.aliases.get(current) {
                if seen.contains(&current) {
                    return Err(InitError::Registry {
                        message: format!("Alias '{alias}' is part of a cycle").into(),
                        context: Some(seen.join(" -> ").into()),
                    });
                }
                seen.push(current);
                current = next;
            }
            if !registry.modules.contains_key(current) {
                return Err(InitError::Registry {
                    message: format!("Alias '{alias}' points to unregistered module '{current}'")
                        .into(),
                    context: None,
                });
            }
        }

        Ok(registry)
    }
}
