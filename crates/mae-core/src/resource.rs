//! Generic CRUD resource, one instance per category page.
//!
//! A resource keeps a transient copy of its backend collection. Every
//! successful mutation is followed by a full re-fetch; nothing is updated
//! optimistically. Failed operations leave the copy untouched.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use crate::backend::CollectionBackend;
use crate::catalog::{CategorySchema, Ordering};
use crate::entry::{Entry, EntryForm, EntryId};
use crate::error::{MaeError, Result};
use crate::session::Credential;

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; no request was sent.
    Cancelled,
}

pub struct Resource<B: ?Sized> {
    schema: &'static CategorySchema,
    backend: Arc<B>,
    entries: RwLock<Vec<Entry>>,
    /// Ticket of the most recently started `list()`.
    generation: AtomicU64,
    last_roll: RwLock<Option<Entry>>,
}

impl<B> Resource<B>
where
    B: CollectionBackend + ?Sized,
{
    pub fn new(schema: &'static CategorySchema, backend: Arc<B>) -> Self {
        Self {
            schema,
            backend,
            entries: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            last_roll: RwLock::new(None),
        }
    }

    pub fn schema(&self) -> &'static CategorySchema {
        self.schema
    }

    /// Snapshot of the in-memory collection.
    pub async fn entries(&self) -> Vec<Entry> {
        self.entries.read().await.clone()
    }

    /// Result of the last random pick, if it is still in the collection.
    pub async fn last_roll(&self) -> Option<Entry> {
        self.last_roll.read().await.clone()
    }

    /// Fetches the collection and replaces the in-memory copy.
    ///
    /// If another `list()` started while this one was in flight, this
    /// response is stale: it is dropped and the current copy is returned.
    pub async fn list(&self, credential: &Credential) -> Result<Vec<Entry>> {
        let ticket = self.generation.fetch_add(1, AtomicOrdering::SeqCst) + 1;

        let mut fetched = self
            .backend
            .fetch_all(self.schema.endpoint(), credential)
            .await
            .inspect_err(|e| {
                tracing::warn!("[Resource] Failed to list {}: {}", self.schema.key, e);
            })?;
        sort_entries(self.schema.ordering, &mut fetched);

        let mut entries = self.entries.write().await;
        if self.generation.load(AtomicOrdering::SeqCst) != ticket {
            tracing::debug!(
                "[Resource] Dropping stale {} response (ticket {})",
                self.schema.key,
                ticket
            );
            return Ok(entries.clone());
        }
        *entries = fetched.clone();
        drop(entries);

        self.forget_missing_roll(&fetched).await;
        tracing::debug!("[Resource] Listed {} {} entries", fetched.len(), self.schema.key);
        Ok(fetched)
    }

    /// Form pre-filled with the category defaults.
    pub async fn new_form(&self) -> EntryForm {
        EntryForm::with_defaults(self.schema, self.entries.read().await.len())
    }

    /// Form pre-filled with an entry of the current collection.
    pub async fn edit_form(&self, id: &EntryId) -> Result<EntryForm> {
        self.ensure_editable()?;
        let entries = self.entries.read().await;
        let entry = entries
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| MaeError::not_found("entry", id.as_str()))?;
        Ok(EntryForm::from_entry(self.schema, entry))
    }

    /// Validates and submits a new entry, then re-lists.
    ///
    /// The form is cleared as soon as the backend accepted the entry.
    pub async fn create(&self, credential: &Credential, form: &mut EntryForm) -> Result<Vec<Entry>> {
        let fields = form.to_fields(self.schema)?;
        let created = self
            .backend
            .insert(self.schema.endpoint(), credential, &fields)
            .await
            .inspect_err(|e| {
                tracing::warn!("[Resource] Failed to create {} entry: {}", self.schema.key, e);
            })?;
        tracing::info!("[Resource] Created {} entry {}", self.schema.key, created.id);
        form.clear();

        self.list(credential).await
    }

    /// Validates and submits changes to one entry, then re-lists.
    pub async fn update(
        &self,
        credential: &Credential,
        id: &EntryId,
        form: &mut EntryForm,
    ) -> Result<Vec<Entry>> {
        self.ensure_editable()?;
        let fields = form.to_fields(self.schema)?;
        self.backend
            .replace(self.schema.endpoint(), credential, id, &fields)
            .await
            .inspect_err(|e| {
                tracing::warn!("[Resource] Failed to update {} {}: {}", self.schema.key, id, e);
            })?;
        tracing::info!("[Resource] Updated {} entry {}", self.schema.key, id);
        form.clear();

        self.list(credential).await
    }

    /// Deletes one entry once the user confirmed, then re-lists.
    pub async fn delete(
        &self,
        credential: &Credential,
        id: &EntryId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome> {
        let prompt = format!("Supprimer l'entrée {} de « {} » ?", id, self.schema.title);
        if !confirm.confirm(&prompt) {
            tracing::debug!("[Resource] Deletion of {} {} cancelled", self.schema.key, id);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.backend
            .remove(self.schema.endpoint(), credential, id)
            .await
            .inspect_err(|e| {
                tracing::warn!("[Resource] Failed to delete {} {}: {}", self.schema.key, id, e);
            })?;
        tracing::info!("[Resource] Deleted {} entry {}", self.schema.key, id);

        self.list(credential).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Picks one entry of the in-memory collection uniformly at random.
    pub async fn pick_random(&self) -> Result<Entry> {
        let mut rng = StdRng::from_entropy();
        self.pick_random_with(&mut rng).await
    }

    pub async fn pick_random_with<R>(&self, rng: &mut R) -> Result<Entry>
    where
        R: Rng + Send + ?Sized,
    {
        if !self.schema.dice {
            return Err(MaeError::Unsupported {
                category: self.schema.key,
                operation: "random pick",
            });
        }

        let chosen = {
            let entries = self.entries.read().await;
            entries
                .choose(rng)
                .cloned()
                .ok_or(MaeError::NoOptions {
                    category: self.schema.key,
                })?
        };

        *self.last_roll.write().await = Some(chosen.clone());
        Ok(chosen)
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.schema.editable {
            Ok(())
        } else {
            Err(MaeError::Unsupported {
                category: self.schema.key,
                operation: "update",
            })
        }
    }

    async fn forget_missing_roll(&self, entries: &[Entry]) {
        let mut roll = self.last_roll.write().await;
        if let Some(current) = roll.as_ref()
            && !entries.iter().any(|e| e.id == current.id)
        {
            *roll = None;
        }
    }
}

fn sort_entries(ordering: Ordering, entries: &mut [Entry]) {
    match ordering {
        Ordering::Server => {}
        Ordering::AscendingNumber(field) => {
            entries.sort_by_key(|e| {
                let n = e.number(field);
                (n.is_none(), n)
            });
        }
    }
}
