//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::FromRef;
use crate::error::AppError;
use crate::resources::{
    AppReader, AppWriter, HttpResourceClient, ResourceReader, ResourceWriter,
};
use crate::scanners::ScannerRegistry;
use crate::services::InFlight;

/// Root application context for dependency injection.
///
/// Holds every shared dependency. Each field type implements
/// `FromRef<Context>`, so services can resolve what they need without
/// knowing how the context was assembled.
#[derive(Clone)]
pub struct Context {
    /// Backend the scanners read from.
    pub reader: AppReader,
    /// Backend deletes are sent to.
    pub writer: AppWriter,
    /// Entity type -> scanners table, built once.
    pub registry: ScannerRegistry,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Entity keys with a delete flow in progress.
    pub flights: InFlight,
}

macro_rules! context_field {
    ($ty:ty, $field:ident) => {
        impl FromRef<Context> for $ty {
            fn from_ref(ctx: &Context) -> Self {
                ctx.$field.clone()
            }
        }
    };
}

context_field!(AppReader, reader);
context_field!(AppWriter, writer);
context_field!(ScannerRegistry, registry);
context_field!(Arc<Config>, config);
context_field!(InFlight, flights);

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(reader: AppReader, writer: AppWriter, registry: ScannerRegistry, config: Config) -> Self {
        Self {
            reader,
            writer,
            registry,
            config: Arc::new(config),
            flights: InFlight::default(),
        }
    }

    /// Context talking to the catalog REST API described by `config.api`.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let client = Arc::new(HttpResourceClient::new(&config.api)?);
        Self::with_resources(client, config)
    }

    /// Context using one backend for both reads and deletes.
    pub fn with_resources<R>(resources: Arc<R>, config: Config) -> Result<Self, AppError>
    where
        R: ResourceReader + ResourceWriter + 'static,
    {
        let registry = ScannerRegistry::with_overrides(&config.entity_types)?;
        let reader: AppReader = resources.clone();
        let writer: AppWriter = resources;
        Ok(Self::new(reader, writer, registry, config))
    }

    /// Resolve a dependency from the context.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(self)
    }
}
