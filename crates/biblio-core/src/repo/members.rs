//! Member repository

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};
use crate::models::Member;
use crate::normalize;
use crate::store::DocumentStore;

/// Payload for registering a member
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
}

/// Partial update for a member
///
/// `None` leaves a field unchanged; `Some(None)` clears a clearable field.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub note: Option<Option<String>>,
}

/// Typed CRUD over the `members` collection
pub struct MemberRepository {
    store: Arc<DocumentStore>,
}

impl MemberRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> LibraryResult<Vec<Member>> {
        Ok(self.store.read().await?.members)
    }

    pub async fn find_by_id(&self, id: Uuid) -> LibraryResult<Option<Member>> {
        Ok(self.store.read().await?.member(id).cloned())
    }

    /// Find a member by email, compared case-insensitively
    pub async fn find_by_email(&self, email: &str) -> LibraryResult<Option<Member>> {
        let folded = email.trim().to_lowercase();
        if folded.is_empty() {
            return Ok(None);
        }
        let doc = self.store.read().await?;
        Ok(doc
            .members
            .iter()
            .find(|member| {
                member
                    .email
                    .as_deref()
                    .is_some_and(|existing| existing.to_lowercase() == folded)
            })
            .cloned())
    }

    /// Register a member
    ///
    /// The email keeps its original casing but must be unique among all
    /// members when compared case-folded; the check runs in the same
    /// transaction as the insert.
    pub async fn create(&self, payload: NewMember) -> LibraryResult<Member> {
        let name = normalize::required_text(&payload.name, "name")?;

        let mut member = Member::new(name);
        member.email = normalize::clean_text(payload.email.as_deref());
        member.phone = normalize::clean_text(payload.phone.as_deref());
        member.note = normalize::clean_text(payload.note.as_deref());

        let record = member.clone();
        self.store
            .write(move |doc| {
                if let Some(email) = &record.email {
                    if doc.email_taken(email, None) {
                        return Err(LibraryError::DuplicateEmail(email.clone()));
                    }
                }
                doc.members.push(record);
                Ok(())
            })
            .await?;

        Ok(member)
    }

    /// Apply a partial update to a member
    pub async fn update(&self, id: Uuid, patch: MemberPatch) -> LibraryResult<Member> {
        let name = patch
            .name
            .map(|value| normalize::required_text(&value, "name"))
            .transpose()?;
        let email = patch
            .email
            .map(|value| normalize::clean_text(value.as_deref()));
        let phone = patch
            .phone
            .map(|value| normalize::clean_text(value.as_deref()));
        let note = patch.note.map(|value| normalize::clean_text(value.as_deref()));

        let committed = self
            .store
            .write(move |doc| {
                if doc.member(id).is_none() {
                    return Err(LibraryError::MemberNotFound(id));
                }
                if let Some(Some(new_email)) = &email {
                    if doc.email_taken(new_email, Some(id)) {
                        return Err(LibraryError::DuplicateEmail(new_email.clone()));
                    }
                }

                let member = doc
                    .member_mut(id)
                    .ok_or(LibraryError::MemberNotFound(id))?;
                if let Some(value) = name {
                    member.name = value;
                }
                if let Some(value) = email {
                    member.email = value;
                }
                if let Some(value) = phone {
                    member.phone = value;
                }
                if let Some(value) = note {
                    member.note = value;
                }
                member.touch();
                Ok(())
            })
            .await?;

        committed
            .member(id)
            .cloned()
            .ok_or(LibraryError::MemberNotFound(id))
    }
}
