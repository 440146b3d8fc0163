//! # MemoryTable
//!
//! `DashMap`-backed implementation of `Store<T>`.
//! Each row carries a sequence number so listing keeps insertion order:
//! prepended rows take ever-smaller numbers, appended rows ever-larger ones.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::errors::{DomainError, Result};
use domains::models::Record;
use domains::ports::{Filter, Mutation, Store};

struct Slot<T> {
    order: i64,
    value: T,
}

pub struct MemoryTable<T> {
    rows: DashMap<String, Slot<T>>,
    /// Next sequence number handed out by `insert` (decrements).
    front: AtomicI64,
    /// Next sequence number handed out by `append` (increments).
    back: AtomicI64,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            front: AtomicI64::new(-1),
            back: AtomicI64::new(0),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table holding `records` in the given order.
    pub fn seeded(records: impl IntoIterator<Item = T>) -> Self {
        let table = Self::default();
        for record in records {
            // Fixture ids are unique; a duplicate keeps the first row.
            let _ = table.put(record, table.back.fetch_add(1, Ordering::SeqCst));
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn put(&self, record: T, order: i64) -> Result<T> {
        match self.rows.entry(record.id().to_owned()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "{} {} already exists",
                T::ENTITY,
                record.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    order,
                    value: record.clone(),
                });
                Ok(record)
            }
        }
    }
}

#[async_trait]
impl<T: Record> Store<T> for MemoryTable<T> {
    async fn insert(&self, record: T) -> Result<T> {
        self.put(record, self.front.fetch_sub(1, Ordering::SeqCst))
    }

    async fn append(&self, record: T) -> Result<T> {
        self.put(record, self.back.fetch_add(1, Ordering::SeqCst))
    }

    async fn get(&self, id: &str) -> Result<T> {
        self.rows
            .get(id)
            .map(|slot| slot.value.clone())
            .ok_or_else(|| DomainError::not_found(T::ENTITY, id))
    }

    async fn list(&self) -> Result<Vec<T>> {
        let mut rows: Vec<(i64, T)> = self
            .rows
            .iter()
            .map(|slot| (slot.order, slot.value.clone()))
            .collect();
        rows.sort_by_key(|(order, _)| *order);
        Ok(rows.into_iter().map(|(_, value)| value).collect())
    }

    async fn update(&self, id: &str, mutation: Mutation<T>) -> Result<T> {
        let mut slot = self
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(T::ENTITY, id))?;
        // Work on a copy so a failed mutation leaves the row untouched.
        let mut draft = slot.value.clone();
        mutation(&mut draft)?;
        slot.value = draft.clone();
        Ok(draft)
    }

    async fn remove(&self, id: &str) -> Result<T> {
        self.rows
            .remove(id)
            .map(|(_, slot)| slot.value)
            .ok_or_else(|| DomainError::not_found(T::ENTITY, id))
    }

    async fn remove_where(&self, filter: Filter<T>) -> Result<usize> {
        let mut removed = 0;
        self.rows.retain(|_, slot| {
            let keep = !filter(&slot.value);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
