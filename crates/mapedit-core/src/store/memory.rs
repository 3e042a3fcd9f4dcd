//! In-process store for tests and offline runs.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::debug;

use super::FeatureStore;
use crate::error::StoreError;
use crate::model::{Feature, FeatureId, FeatureKind, FeatureRecord};

/// A request the store received, recorded before any injected failure applies.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FetchAll(FeatureKind),
    FetchOne(FeatureKind, FeatureId),
    Create(Feature),
    Update(FeatureId, Feature),
    Delete(FeatureKind, FeatureId),
}

#[derive(Debug, Default)]
struct Inner {
    features: Vec<Feature>,
    next_id: u64,
    failures: VecDeque<StoreError>,
    calls: Vec<StoreCall>,
}

impl Inner {
    fn record(&mut self, call: StoreCall) -> Result<(), StoreError> {
        debug!(?call, "memory store call");
        self.calls.push(call);
        self.failures.pop_front().map_or(Ok(()), Err)
    }

    fn position<F: FeatureRecord>(&self, id: &FeatureId) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.kind() == F::KIND && f.id() == Some(id))
    }
}

/// Insertion-ordered feature store with failure injection and a call log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `features`. Features without an id get one.
    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.borrow_mut();
            for feature in features {
                let feature = match feature {
                    Feature::Point(mut p) => {
                        if p.id.is_none() {
                            inner.next_id += 1;
                            p.id = Some(FeatureId::new(format!("object-{}", inner.next_id)));
                        }
                        Feature::Point(p)
                    }
                    Feature::Area(mut a) => {
                        if a.id.is_none() {
                            inner.next_id += 1;
                            a.id = Some(FeatureId::new(format!("polygon-{}", inner.next_id)));
                        }
                        a.normalize();
                        Feature::Area(a)
                    }
                };
                inner.features.push(feature);
            }
        }
        store
    }

    /// Makes the next call fail with `err`. Queued failures apply in order.
    pub fn fail_next(&self, err: StoreError) {
        self.inner.borrow_mut().failures.push_back(err);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Direct read, bypassing the log and failure queue.
    pub fn snapshot<F: FeatureRecord>(&self) -> Vec<F> {
        self.inner
            .borrow()
            .features
            .iter()
            .cloned()
            .filter_map(F::from_feature)
            .collect()
    }

    /// Removes a feature behind the editor's back, as another client would.
    pub fn remove_externally(&self, id: &FeatureId) {
        self.inner.borrow_mut().features.retain(|f| f.id() != Some(id));
    }
}

#[allow(clippy::unused_async)]
impl FeatureStore for MemoryStore {
    async fn fetch_all<F: FeatureRecord>(&self) -> Result<Vec<F>, StoreError> {
        self.inner.borrow_mut().record(StoreCall::FetchAll(F::KIND))?;
        Ok(self.snapshot())
    }

    async fn fetch_one<F: FeatureRecord>(&self, id: &FeatureId) -> Result<F, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.record(StoreCall::FetchOne(F::KIND, id.clone()))?;
        inner
            .position::<F>(id)
            .and_then(|pos| F::from_feature(inner.features[pos].clone()))
            .ok_or_else(|| StoreError::NotFound {
                kind: F::KIND,
                id: id.clone(),
            })
    }

    async fn create<F: FeatureRecord>(&self, draft: &F) -> Result<F, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.record(StoreCall::Create(draft.clone().into()))?;

        inner.next_id += 1;
        let mut stored = draft.clone();
        stored.set_id(Some(FeatureId::new(format!("{}-{}", F::KIND.label(), inner.next_id))));
        stored.normalize();
        inner.features.push(stored.clone().into());
        Ok(stored)
    }

    async fn update<F: FeatureRecord>(&self, id: &FeatureId, draft: &F) -> Result<F, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.record(StoreCall::Update(id.clone(), draft.clone().into()))?;

        let Some(pos) = inner.position::<F>(id) else {
            return Err(StoreError::NotFound {
                kind: F::KIND,
                id: id.clone(),
            });
        };
        let mut stored = draft.clone();
        stored.set_id(Some(id.clone()));
        stored.normalize();
        inner.features[pos] = stored.clone().into();
        Ok(stored)
    }

    async fn delete<F: FeatureRecord>(&self, id: &FeatureId) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.record(StoreCall::Delete(F::KIND, id.clone()))?;
        if let Some(pos) = inner.position::<F>(id) {
            inner.features.remove(pos);
        }
        Ok(())
    }
}
