//! In-memory `FindingStore` double for tests and demos.

use arclight_protocol::{Asset, Classification, Finding, FindingStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryInner {
    assets: Vec<Asset>,
    findings: HashMap<Uuid, Vec<Finding>>,
    classifications: HashMap<Uuid, Vec<Classification>>,
}

/// Thread-safe in-memory finding store with the same contract as
/// [`crate::ArclightDb`].
#[derive(Default)]
pub struct MemoryFindingStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryFindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_asset(&self, asset: Asset) {
        self.write().assets.push(asset);
    }

    pub fn add_finding(&self, finding: Finding) {
        self.write()
            .findings
            .entry(finding.asset_id)
            .or_default()
            .push(finding);
    }

    pub fn add_classification(&self, classification: Classification) {
        self.write()
            .classifications
            .entry(classification.finding_id)
            .or_default()
            .push(classification);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FindingStore for MemoryFindingStore {
    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        Ok(self.read().assets.clone())
    }

    async fn get_asset(&self, asset_id: Uuid) -> Result<Option<Asset>, StoreError> {
        Ok(self
            .read()
            .assets
            .iter()
            .find(|a| a.id == asset_id)
            .cloned())
    }

    async fn list_findings(&self, asset_id: Uuid) -> Result<Vec<Finding>, StoreError> {
        Ok(self
            .read()
            .findings
            .get(&asset_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_classifications(
        &self,
        finding_id: Uuid,
    ) -> Result<Vec<Classification>, StoreError> {
        Ok(self
            .read()
            .classifications
            .get(&finding_id)
            .cloned()
            .unwrap_or_default())
    }
}
