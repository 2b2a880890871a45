//! Dependency injection infrastructure.
//!
//! Services are resolved from the application [`Context`](crate::context::Context)
//! through the `FromRef` trait: each context field implements
//! `FromRef<Context>` (see the `context_field!` macro in `context.rs`), and
//! each service implements it by resolving its own fields.
//!
//! # Example
//!
//! ```ignore
//! use catalog_guard::di::FromRef;
//! use catalog_guard::services::DeleteService;
//!
//! let ctx = Context::from_config(config)?;
//! let deletes = DeleteService::from_ref(&ctx);
//! // or
//! let deletes: DeleteService = ctx.resolve();
//! ```

/// Trait for extracting a value from a reference to another type.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}
