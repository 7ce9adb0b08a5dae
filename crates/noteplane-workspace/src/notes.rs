//! Note board and note operations.

use noteplane_auth::Session;
use noteplane_core::error::{NoteplaneError, NoteplaneResult};
use noteplane_core::models::note::{DeleteOutcome, Note, NoteAck, NoteDraft, NoteId};
use noteplane_core::models::tenant::Plan;
use noteplane_core::models::user::UserId;
use noteplane_core::policy;
use noteplane_core::transport::NotesApi;
use tracing::{info, warn};

use crate::error::from_transport;

/// The tenant's notes as last fetched from the server.
#[derive(Debug, Default)]
pub struct NoteBoard {
    notes: Vec<Note>,
}

impl NoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The quota input: notes owned by `user_id`.
    pub fn count_owned_by(&self, user_id: UserId) -> usize {
        self.notes.iter().filter(|n| n.is_owned_by(user_id)).count()
    }

    /// Replace the board wholesale.
    pub fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

pub struct NoteService<A> {
    api: A,
}

impl<A: NotesApi> NoteService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, session: &Session, board: &mut NoteBoard) -> NoteplaneResult<()> {
        let notes = self
            .api
            .list_notes(&session.token, &session.actor.tenant_id)
            .await
            .map_err(from_transport)?;
        board.replace(notes);
        Ok(())
    }

    /// Create a note owned by the actor, subject to the free-plan quota.
    pub async fn create(
        &self,
        session: &Session,
        tenant_plan: Plan,
        board: &NoteBoard,
        title: &str,
        content: &str,
    ) -> NoteplaneResult<NoteAck> {
        let actor = &session.actor;
        let draft = NoteDraft {
            title: title.to_owned(),
            content: content.to_owned(),
            tenant_id: actor.tenant_id.clone(),
            owner: actor.id,
        };
        policy::validate_draft(actor, &draft)?;

        let owned = board.count_owned_by(actor.id);
        if let Err(e) = policy::can_create_note(actor, tenant_plan, owned) {
            warn!(user_id = %actor.id, tenant_id = %actor.tenant_id, owned, "Note quota reached");
            return Err(e.into());
        }

        let ack = self
            .api
            .create_note(&session.token, &draft)
            .await
            .map_err(from_transport)?;
        info!(user_id = %actor.id, note_id = %ack.id, "Note created");
        Ok(ack)
    }

    /// Overwrite a note's title and content. Last write wins.
    pub async fn update(
        &self,
        session: &Session,
        board: &NoteBoard,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> NoteplaneResult<NoteAck> {
        let actor = &session.actor;
        let note = board.get(id).ok_or_else(|| NoteplaneError::NotFound {
            entity: "note".into(),
            id: id.to_string(),
        })?;
        if let Err(e) = policy::can_modify_note(actor, note) {
            warn!(user_id = %actor.id, note_id = %id, error = %e, "Note update denied");
            return Err(e.into());
        }

        let draft = NoteDraft {
            title: title.to_owned(),
            content: content.to_owned(),
            tenant_id: actor.tenant_id.clone(),
            owner: note.owner.unwrap_or(actor.id),
        };
        policy::validate_draft(actor, &draft)?;

        let ack = self
            .api
            .update_note(&session.token, id, &draft)
            .await
            .map_err(from_transport)?;
        info!(user_id = %actor.id, note_id = %id, "Note updated");
        Ok(ack)
    }

    /// Delete a note. Unknown ids are left for the server to judge; an
    /// already-deleted note is not an error.
    pub async fn delete(
        &self,
        session: &Session,
        board: &NoteBoard,
        id: NoteId,
    ) -> NoteplaneResult<DeleteOutcome> {
        let actor = &session.actor;
        if let Some(note) = board.get(id) {
            if let Err(e) = policy::can_modify_note(actor, note) {
                warn!(user_id = %actor.id, note_id = %id, error = %e, "Note delete denied");
                return Err(e.into());
            }
        }

        let outcome = self
            .api
            .delete_note(&session.token, id)
            .await
            .map_err(from_transport)?;
        info!(user_id = %actor.id, note_id = %id, ?outcome, "Note deleted");
        Ok(outcome)
    }
}
