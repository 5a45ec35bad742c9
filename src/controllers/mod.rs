//! Application controllers
//!
//! Controllers are registered here, in ordinary code, at startup. Adding an
//! endpoint means implementing `Controller` and listing the type in
//! `register_all`.

pub mod hello;

use crate::routing::Registry;
use std::sync::Arc;

/// Build the controller registry for this application.
#[must_use]
pub fn register_all() -> Registry {
    let mut registry = Registry::new();
    registry.register(Arc::new(hello::HelloController));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteTable;

    #[test]
    fn test_register_all_exposes_hello() {
        let registry = register_all();
        assert!(registry.get("helloController").is_some());

        let table = RouteTable::build(&registry);
        assert!(table.lookup("/hello").is_some());
    }
}
