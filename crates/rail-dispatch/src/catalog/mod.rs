//! Method descriptor table and the resolver that consults it.
//!
//! Rust has no runtime reflection, so hosted types describe their callable
//! surface once at startup through [`CatalogBuilder`]. The resulting
//! [`Catalog`] is immutable and shared by the dispatcher (for resolution at
//! call time) and the manifest generator (for discovery). Both therefore
//! always agree on what can be called.
//!
//! # Example
//!
//! ```
//! use rail_dispatch::{Catalog, Invocable, Signature, ValueType};
//!
//! struct Thermostat;
//! impl Invocable for Thermostat {}
//!
//! let mut builder = Catalog::builder();
//! builder.class::<Thermostat>("Thermostat").method(
//!     Signature::new("SetTarget")
//!         .param("celsius", ValueType::Float)
//!         .returns(ValueType::Bool),
//!     |_this: &Thermostat, args| Ok(args.float(0) > 5.0),
//! );
//! let catalog = builder.build().expect("class names are unique");
//! assert_eq!(catalog.method_count(), 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::args::Arguments;
use crate::error::{DispatchError, InvocationError};
use crate::instance::{Invocable, TypeKey};
use crate::value::{Value, ValueType};

/// Type-erased call target for a single method.
pub type Invoker =
    Arc<dyn Fn(&dyn Invocable, &Arguments) -> Result<Value, InvocationError> + Send + Sync>;

/// A declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    value_type: ValueType,
    position: usize,
}

impl ParameterDescriptor {
    /// Parameter name, used as the key when arguments arrive as an object.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared type, which selects the coercion applied to the argument.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Zero-based index in the declared parameter order.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Declared shape of a method, assembled before its invoker is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    description: Option<String>,
    parameters: Vec<(String, ValueType)>,
    return_type: ValueType,
}

impl Signature {
    /// Starts a signature for a method returning nothing and taking nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            return_type: ValueType::Void,
        }
    }

    /// Attaches human-readable metadata published in the manifest.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.parameters.push((name.into(), value_type));
        self
    }

    /// Sets the return type.
    #[must_use]
    pub const fn returns(mut self, return_type: ValueType) -> Self {
        self.return_type = return_type;
        self
    }
}

/// Immutable description of one callable method.
#[derive(Clone)]
pub struct MethodDescriptor {
    owning_type: String,
    name: String,
    description: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    return_type: ValueType,
    invoker: Invoker,
}

impl MethodDescriptor {
    fn new(owning_type: &str, signature: Signature, invoker: Invoker) -> Self {
        let parameters = signature
            .parameters
            .into_iter()
            .enumerate()
            .map(|(position, (name, value_type))| ParameterDescriptor {
                name,
                value_type,
                position,
            })
            .collect();
        Self {
            owning_type: owning_type.to_owned(),
            name: signature.name,
            description: signature.description,
            parameters,
            return_type: signature.return_type,
            invoker,
        }
    }

    /// Catalog name of the type declaring the method.
    #[must_use]
    pub const fn owning_type(&self) -> &str {
        self.owning_type.as_str()
    }

    /// Unqualified method name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// `Type.Method`, as published in the manifest.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owning_type, self.name)
    }

    /// Optional description metadata.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameters in declaration order.
    #[must_use]
    pub const fn parameters(&self) -> &[ParameterDescriptor] {
        self.parameters.as_slice()
    }

    /// Declared return type.
    #[must_use]
    pub const fn return_type(&self) -> ValueType {
        self.return_type
    }

    /// Calls the method on `receiver`.
    ///
    /// # Errors
    ///
    /// Returns the hosted method's failure, or an [`InvocationError`] when
    /// `receiver` is not of the declaring type.
    pub fn invoke(
        &self,
        receiver: &dyn Invocable,
        arguments: &Arguments,
    ) -> Result<Value, InvocationError> {
        (self.invoker)(receiver, arguments)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("owning_type", &self.owning_type)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// All methods registered for one concrete type.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    type_key: TypeKey,
    methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Name the type is published under.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Runtime identity of the described type.
    #[must_use]
    pub const fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Methods in registration order.
    #[must_use]
    pub const fn methods(&self) -> &[MethodDescriptor] {
        self.methods.as_slice()
    }

    /// Finds a method by exact name. When a name was registered more than
    /// once the first registration wins.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// A method resolved against a live receiver, ready to invoke.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMethod<'a> {
    descriptor: &'a MethodDescriptor,
    receiver: &'a dyn Invocable,
}

impl<'a> ResolvedMethod<'a> {
    /// Descriptor of the resolved method.
    #[must_use]
    pub const fn descriptor(&self) -> &'a MethodDescriptor {
        self.descriptor
    }

    /// Invokes the method on the resolved receiver.
    ///
    /// # Errors
    ///
    /// Propagates the hosted method's failure.
    pub fn invoke(&self, arguments: &Arguments) -> Result<Value, InvocationError> {
        self.descriptor.invoke(self.receiver, arguments)
    }
}

/// Process-wide, immutable method descriptor table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: HashMap<TypeId, ClassDescriptor>,
}

impl Catalog {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Described classes. Iteration order is not part of the contract.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Finds a class by its published name.
    #[must_use]
    pub fn class_named(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.values().find(|class| class.name == name)
    }

    /// Finds the class describing the type identified by `key`.
    #[must_use]
    pub fn class_for(&self, key: TypeKey) -> Option<&ClassDescriptor> {
        self.classes.get(&key.id())
    }

    /// Total number of registered methods across every class.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.classes.values().map(|class| class.methods.len()).sum()
    }

    /// Resolves `method` on `instance`.
    ///
    /// Wrapper instances (such as `Box<T>` or `Arc<T>`) are unwrapped exactly
    /// one level before lookup. Names match exactly; there is no
    /// case folding, no inheritance search and no overloading by arity.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MethodNotFound`] naming the searched type
    /// when the type has no such method or is not in the catalog.
    pub fn resolve<'a>(
        &'a self,
        instance: &'a dyn Invocable,
        method: &str,
    ) -> Result<ResolvedMethod<'a>, DispatchError> {
        let receiver = instance.unwrap_once().unwrap_or(instance);
        let key = receiver.type_key();
        let Some(class) = self.class_for(key) else {
            return Err(DispatchError::method_not_found(method, key.name()));
        };
        class
            .method(method)
            .map(|descriptor| ResolvedMethod {
                descriptor,
                receiver,
            })
            .ok_or_else(|| DispatchError::method_not_found(method, class.name()))
    }
}

/// Errors raised when a catalog is finished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two distinct types were published under one class name, so commands
    /// and manifest entries naming it would be ambiguous.
    #[error("class name '{name}' is published by both {first} and {second}")]
    DuplicateClassName {
        /// The contested class name.
        name: String,
        /// Rust name of one claimant, in lexical order.
        first: &'static str,
        /// Rust name of the other claimant.
        second: &'static str,
    },
}

/// Collects class and method registrations into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins (or continues) describing type `T` under `name`.
    ///
    /// Describing the same type twice appends to the existing class; the
    /// first name given is kept. Published names must be unique across
    /// types, which [`CatalogBuilder::build`] enforces.
    pub fn class<T: Invocable>(&mut self, name: impl Into<String>) -> ClassBuilder<'_, T> {
        let key = TypeKey::of::<T>();
        let class = self
            .catalog
            .classes
            .entry(key.id())
            .or_insert_with(|| ClassDescriptor {
                name: name.into(),
                type_key: key,
                methods: Vec::new(),
            });
        ClassBuilder {
            class,
            _receiver: PhantomData,
        }
    }

    /// Finishes the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateClassName`] when two types share a
    /// published class name.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut owners: HashMap<&str, TypeKey> = HashMap::new();
        for class in self.catalog.classes.values() {
            if let Some(other) = owners.insert(class.name.as_str(), class.type_key) {
                let mut claimants = [other.name(), class.type_key.name()];
                claimants.sort_unstable();
                let [first, second] = claimants;
                return Err(CatalogError::DuplicateClassName {
                    name: class.name.clone(),
                    first,
                    second,
                });
            }
        }
        Ok(self.catalog)
    }
}

/// Registers methods for one type. Obtained from [`CatalogBuilder::class`].
pub struct ClassBuilder<'a, T> {
    class: &'a mut ClassDescriptor,
    _receiver: PhantomData<fn(&T)>,
}

impl<T: Invocable> ClassBuilder<'_, T> {
    /// Registers a method with its typed invoker.
    ///
    /// The invoker receives the concrete receiver and the bound arguments,
    /// and may return anything convertible into a [`Value`].
    pub fn method<F, R>(&mut self, signature: Signature, invoker: F) -> &mut Self
    where
        F: Fn(&T, &Arguments) -> Result<R, InvocationError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        let owning_type = self.class.name.clone();
        let expected = owning_type.clone();
        let erased: Invoker = Arc::new(move |receiver: &dyn Invocable, arguments: &Arguments| {
            let any: &dyn Any = receiver;
            let this = any.downcast_ref::<T>().ok_or_else(|| {
                InvocationError::new(format!("receiver is not an instance of {expected}"))
            })?;
            invoker(this, arguments).map(Into::into)
        });
        self.class
            .methods
            .push(MethodDescriptor::new(&owning_type, signature, erased));
        self
    }
}

impl<T> fmt::Debug for ClassBuilder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("class", &self.class.name)
            .finish_non_exhaustive()
    }
}
