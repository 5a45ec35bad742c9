//! Controller registry
//!
//! A flat name-to-instance lookup populated once at startup. Controllers are
//! registered explicitly in ordinary code; the registry keeps one shared
//! instance per controller under a lower-camel-cased key derived from the
//! type's simple name. Dispatch never consults the registry, it only feeds
//! route table construction.

use crate::logger;
use crate::routing::table::RouteSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A type containing request-handling routes.
///
/// Implementing the trait is what marks a type as a controller: `base_path`
/// supplies the type-level path fragment and `routes` declares the
/// per-handler fragments together with their handler functions.
pub trait Controller: Send + Sync + 'static {
    /// The type's simple name, e.g. `"HelloController"`.
    fn name(&self) -> &'static str;

    /// Path fragment prefixed to every route of this controller.
    fn base_path(&self) -> &'static str {
        ""
    }

    /// Declare the controller's route fragments and handlers.
    fn routes(&self, set: &mut RouteSet);
}

/// Derive the default registry key from a type's simple name by
/// lower-casing the first character: `HelloController` → `helloController`.
///
/// Only an ASCII first character is folded; anything else is kept as-is.
pub fn registry_key(simple_name: &str) -> String {
    let mut chars = simple_name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            let mut key = String::with_capacity(simple_name.len());
            key.push(first.to_ascii_lowercase());
            key.push_str(chars.as_str());
            key
        }
        _ => simple_name.to_string(),
    }
}

/// Registry of controller singletons, keyed by [`registry_key`].
///
/// Populated once during startup and read-only afterwards. Insertion order
/// is preserved so route table construction is deterministic.
#[derive(Default)]
pub struct Registry {
    controllers: HashMap<String, Arc<dyn Controller>>,
    order: Vec<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller instance under its derived key.
    ///
    /// Registering a second controller with the same simple name replaces
    /// the first; the replacement is logged as a warning.
    pub fn register(&mut self, controller: Arc<dyn Controller>) {
        let key = registry_key(controller.name());
        if self.controllers.insert(key.clone(), controller).is_some() {
            logger::log_warning(&format!(
                "Controller '{key}' registered twice, keeping the later instance"
            ));
        } else {
            self.order.push(key);
        }
    }

    /// Look up a controller by registry key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(key)
    }

    /// Iterate controllers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Controller>> {
        self.order.iter().filter_map(|key| self.controllers.get(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
