//! Contact persistence collaborator
//!
//! The store is an opaque trait: services neither know nor care whether a
//! database sits behind it. Implementations classify their own failures; a
//! driver error must come back as a `DatabaseError` internal error with the
//! driver error as cause, never as a raw foreign type.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use relay_errors::{Exception, Result};
use relay_types::{ContactId, EmailAddress, WorkspaceId};
use serde::{Deserialize, Serialize};

/// A stored contact. `last_name` stays `Option` end to end so an absent
/// value renders as `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    pub workspace_id: WorkspaceId,
    pub email_address: EmailAddress,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Look up a contact by email within one workspace.
    ///
    /// # Errors
    ///
    /// Implementations classify driver failures as `DatabaseError`.
    async fn find_by_email(
        &self,
        workspace: WorkspaceId,
        email: &EmailAddress,
    ) -> Result<Option<ContactRecord>>;

    /// Persist a new contact.
    ///
    /// # Errors
    ///
    /// `ConflictException` for a duplicate email within the workspace;
    /// driver failures classify as `DatabaseError`.
    async fn insert(&self, contact: ContactRecord) -> Result<ContactRecord>;
}

/// Store used by tests and local tooling.
#[derive(Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<Mutex<Vec<ContactRecord>>>,
}

impl InMemoryContactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ContactRecord>> {
        match self.contacts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn find_by_email(
        &self,
        workspace: WorkspaceId,
        email: &EmailAddress,
    ) -> Result<Option<ContactRecord>> {
        let contacts = self.lock();
        Ok(contacts
            .iter()
            .find(|c| c.workspace_id == workspace && &c.email_address == email)
            .cloned())
    }

    async fn insert(&self, contact: ContactRecord) -> Result<ContactRecord> {
        let mut contacts = self.lock();
        let duplicate = contacts
            .iter()
            .any(|c| c.workspace_id == contact.workspace_id && c.email_address == contact.email_address);
        if duplicate {
            return Err(Exception::conflict("email address already registered").into());
        }
        contacts.push(contact.clone());
        Ok(contact)
    }
}
