//! # Layout Store
//!
//! Saved layouts: `{id, name, category, layout, isDefault, createdAt, updatedAt}`.
//!
//! - `list` returns defaults first, then newest first.
//! - `set_default` clears every other default in the same category. At most
//!   one default per category exists afterwards.
//!
//! [`MemoryLayoutStore`] keeps everything behind one lock so each operation
//! is atomic with respect to other callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::CardLabelError;
use crate::layout::LabelLayout;

/// Category used when a record does not name one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRecord {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub layout: LabelLayout,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which records `list` returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFilter {
    pub category: Option<String>,
    #[serde(default)]
    pub default_only: bool,
}

impl LayoutFilter {
    fn matches(&self, record: &LayoutRecord) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| c == record.category)
            && (!self.default_only || record.is_default)
    }
}

/// Storage backend for saved layouts.
pub trait LayoutStore: Send + Sync {
    fn create(
        &self,
        name: &str,
        category: Option<&str>,
        layout: LabelLayout,
    ) -> Result<LayoutRecord, CardLabelError>;
    fn list(&self, filter: &LayoutFilter) -> Result<Vec<LayoutRecord>, CardLabelError>;
    fn get(&self, id: Uuid) -> Result<LayoutRecord, CardLabelError>;
    fn update(&self, id: Uuid, layout: LabelLayout) -> Result<LayoutRecord, CardLabelError>;
    fn rename(&self, id: Uuid, name: &str) -> Result<LayoutRecord, CardLabelError>;
    fn delete(&self, id: Uuid) -> Result<(), CardLabelError>;
    fn set_default(&self, id: Uuid) -> Result<LayoutRecord, CardLabelError>;
}

/// In-process [`LayoutStore`].
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    records: RwLock<HashMap<Uuid, LayoutRecord>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, LayoutRecord>>, CardLabelError> {
        self.records
            .read()
            .map_err(|_| CardLabelError::Io(std::io::Error::other("layout store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, LayoutRecord>>, CardLabelError> {
        self.records
            .write()
            .map_err(|_| CardLabelError::Io(std::io::Error::other("layout store lock poisoned")))
    }
}

fn not_found(id: Uuid) -> CardLabelError {
    CardLabelError::NotFound(format!("layout {}", id))
}

fn check_name(name: &str) -> Result<String, CardLabelError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CardLabelError::Validation("layout name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

impl LayoutStore for MemoryLayoutStore {
    fn create(
        &self,
        name: &str,
        category: Option<&str>,
        layout: LabelLayout,
    ) -> Result<LayoutRecord, CardLabelError> {
        let name = check_name(name)?;
        layout.validate()?;

        let now = Utc::now();
        let record = LayoutRecord {
            id: Uuid::new_v4(),
            name,
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            layout,
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        self.write()?.insert(record.id, record.clone());
        log::debug!("created layout {} ({})", record.id, record.name);
        Ok(record)
    }

    fn list(&self, filter: &LayoutFilter) -> Result<Vec<LayoutRecord>, CardLabelError> {
        let mut records: Vec<LayoutRecord> = self
            .read()?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(records)
    }

    fn get(&self, id: Uuid) -> Result<LayoutRecord, CardLabelError> {
        self.read()?.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    fn update(&self, id: Uuid, layout: LabelLayout) -> Result<LayoutRecord, CardLabelError> {
        layout.validate()?;
        let mut records = self.write()?;
        let record = records.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.layout = layout;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn rename(&self, id: Uuid, name: &str) -> Result<LayoutRecord, CardLabelError> {
        let name = check_name(name)?;
        let mut records = self.write()?;
        let record = records.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.name = name;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), CardLabelError> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    fn set_default(&self, id: Uuid) -> Result<LayoutRecord, CardLabelError> {
        let mut records = self.write()?;
        let category = records
            .get(&id)
            .map(|r| r.category.clone())
            .ok_or_else(|| not_found(id))?;

        let now = Utc::now();
        for record in records.values_mut().filter(|r| r.category == category) {
            let is_default = record.id == id;
            if record.is_default != is_default {
                record.is_default = is_default;
                record.updated_at = now;
            }
        }
        records.get(&id).cloned().ok_or_else(|| not_found(id))
    }
}
