//! Reflection-style JSON command dispatch for in-process objects.
//!
//! `rail-dispatch` lets a remote controller call methods on live objects by
//! sending JSON commands such as
//! `{"method": "OrderManager.CreateOrder", "args": ["acme", 3]}`. Hosted
//! types describe their callable surface once, at startup, in a
//! [`Catalog`]. Objects are placed in an [`InstanceRegistry`] under string
//! identifiers. The [`Dispatcher`] ties the two together: it resolves the
//! target instance and method, coerces the JSON arguments into the declared
//! parameter types, invokes the method and renders the outcome as
//! `{"result": ...}` or `{"error": ...}`.
//!
//! The [`Manifest`] generator walks the same catalog to publish what may be
//! called, so discovery and dispatch never drift apart.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rail_dispatch::{Catalog, Dispatcher, InstanceRegistry, Invocable, Signature, ValueType};
//!
//! struct Greeter;
//! impl Invocable for Greeter {}
//!
//! let mut builder = Catalog::builder();
//! builder.class::<Greeter>("Greeter").method(
//!     Signature::new("Greet")
//!         .param("name", ValueType::String)
//!         .returns(ValueType::String),
//!     |_this: &Greeter, args| Ok(format!("hello {}", args.string(0))),
//! );
//!
//! let registry = Arc::new(InstanceRegistry::new());
//! registry.register("greeter", Arc::new(Greeter));
//! let catalog = builder.build().expect("class names are unique");
//! let dispatcher = Dispatcher::new(registry, Arc::new(catalog));
//!
//! let response = dispatcher.dispatch(r#"{"method":"greeter.Greet","args":["ada"]}"#);
//! assert_eq!(response, r#"{"result":"hello ada"}"#);
//! ```

pub mod args;
pub mod catalog;
pub mod coerce;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod registry;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::args::Arguments;
pub use self::catalog::{
    Catalog, CatalogBuilder, CatalogError, ClassBuilder, ClassDescriptor, MethodDescriptor,
    ParameterDescriptor, ResolvedMethod, Signature,
};
pub use self::coerce::coerce;
pub use self::dispatch::{Command, Dispatcher, MAX_ARGUMENTS, Response, Target, bind_arguments};
pub use self::error::{DispatchError, DispatchStage, InvocationError};
pub use self::instance::{Instance, Invocable, TypeKey};
pub use self::manifest::{
    FunctionEntry, Manifest, ManifestDocument, ManifestError, ParameterEntry, write_manifest,
};
pub use self::registry::InstanceRegistry;
pub use self::value::{Value, ValueType};
