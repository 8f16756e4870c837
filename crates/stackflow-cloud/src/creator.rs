//! The creator contract shared by every resource kind

use crate::error::Result;
use crate::handle::RemoteResource;
use async_trait::async_trait;
use stackflow_core::Descriptor;

/// Lifecycle of one platform resource described by a config.
///
/// A creator holds at most one handle. It is absent before
/// [`initialize`](Self::initialize) or [`create`](Self::create), present after
/// either succeeds, and absent again once [`clean`](Self::clean) returns.
#[async_trait]
pub trait ResourceCreator: Send + Sync {
    type Config;
    type Handle: RemoteResource;

    fn config(&self) -> &Self::Config;

    /// Adopts an existing resource matching the config. Never mutates
    /// remote state.
    async fn initialize(&mut self) -> Result<Option<Self::Handle>>;

    /// Adopts when possible, otherwise creates. Idempotent: a second call
    /// finds the first call's resource instead of creating another.
    async fn create(&mut self) -> Result<Self::Handle>;

    /// Deletes the held resource. Not-found counts as success and the
    /// handle is cleared whether or not the delete succeeded.
    async fn clean(&mut self) -> Result<()>;

    /// Last known handle; no remote call.
    fn get(&self) -> Option<&Self::Handle>;
}

/// Object-safe view of a creator, for driving heterogeneous lists.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// `"<kind> <name>"`, used in logs and reports
    fn label(&self) -> String;

    async fn provision(&mut self) -> Result<()>;

    async fn teardown(&mut self) -> Result<()>;

    fn is_held(&self) -> bool;
}

#[async_trait]
impl<T> Lifecycle for T
where
    T: ResourceCreator,
    T::Config: Descriptor + Sync,
{
    fn label(&self) -> String {
        format!(
            "{} {}",
            <T::Handle as RemoteResource>::KIND,
            self.config().name()
        )
    }

    async fn provision(&mut self) -> Result<()> {
        self.create().await.map(|_| ())
    }

    async fn teardown(&mut self) -> Result<()> {
        self.clean().await
    }

    fn is_held(&self) -> bool {
        self.get().is_some()
    }
}
