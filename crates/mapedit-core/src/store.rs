//! Fetch/mutate facade over the persistence service.
//!
//! One implementation per transport. Every call is a single request; callers
//! sequence their own calls.

pub mod memory;

use crate::error::StoreError;
use crate::model::{FeatureId, FeatureRecord};

// Implementations are single-threaded (browser or test executor), so the
// returned futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait FeatureStore {
    /// Every stored feature of kind `F`, in server order.
    async fn fetch_all<F: FeatureRecord>(&self) -> Result<Vec<F>, StoreError>;

    async fn fetch_one<F: FeatureRecord>(&self, id: &FeatureId) -> Result<F, StoreError>;

    /// Stores a new feature. The result carries the server-assigned id.
    async fn create<F: FeatureRecord>(&self, draft: &F) -> Result<F, StoreError>;

    /// Replaces feature `id`. Fails with `NotFound` if it no longer exists.
    async fn update<F: FeatureRecord>(&self, id: &FeatureId, draft: &F) -> Result<F, StoreError>;

    /// Removes feature `id`. Succeeds whether or not it existed.
    async fn delete<F: FeatureRecord>(&self, id: &FeatureId) -> Result<(), StoreError>;
}
