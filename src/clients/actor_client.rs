use crate::framework::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Shared read side of the store-backed clients.
///
/// Implementors only supply the wrapped [`ResourceClient`] and an error mapping;
/// lookups, listing and counting come for free.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    /// Translates a transport or entity failure into the client's own taxonomy.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Looks up one record. A missing record is `Ok(None)`.
    #[instrument(skip(self), fields(entity = std::any::type_name::<T>()))]
    async fn fetch(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        debug!("Fetching record");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Snapshot of every record currently held by the store.
    #[instrument(skip(self), fields(entity = std::any::type_name::<T>()))]
    async fn fetch_all(&self) -> Result<Vec<T>, Self::Error> {
        let records = self.inner().list().await.map_err(Self::map_error)?;
        debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    /// Number of records held. Doubles as a liveness probe for the store task.
    async fn count(&self) -> Result<usize, Self::Error> {
        self.inner().size().await.map_err(Self::map_error)
    }
}
