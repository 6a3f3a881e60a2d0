use crate::error::{EditorError, Result};
use crate::image::ImageRef;
use crate::service::EditService;
use super::EditRequest;

/// Proof that the single in-flight slot was taken.
///
/// Issued by [`VersionStore::begin_edit`] and consumed by
/// [`VersionStore::complete_edit`]. Not `Clone`, so at most one completion
/// can exist per submission.
#[derive(Debug)]
#[must_use = "an edit ticket must be handed back to complete_edit"]
pub struct EditTicket {
    generation: u64,
}

/// Linear list of image versions with a display cursor
///
/// Versions are only ever appended. Undo and redo move the cursor; a new
/// edit always lands at the tail, even when the cursor is in the middle of
/// the list, so versions past the cursor stay addressable by index.
#[derive(Debug, Default)]
pub struct VersionStore {
    versions: Vec<ImageRef>,
    cursor: usize,
    loading: bool,
    /// Bumped whenever the history is replaced
    generation: u64,
}

impl VersionStore {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole history with a single freshly loaded image
    pub fn set_base_image(&mut self, image: ImageRef) {
        log::info!(
            "New base image {} replaces {} version(s)",
            image.id(),
            self.versions.len()
        );
        self.versions = vec![image];
        self.cursor = 0;
        self.generation += 1;
    }

    /// The displayed image, `versions[cursor]`
    pub fn current(&self) -> Option<&ImageRef> {
        self.versions.get(self.cursor)
    }

    /// Moves back one version. Returns false when already at the first one.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 || self.versions.is_empty() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves forward one version. Returns false when already at the last one.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.versions.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Shows an arbitrary recorded version
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.versions.len() || index == self.cursor {
            return false;
        }
        self.cursor = index;
        true
    }

    /// Returns true if there are versions before the cursor
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are versions after the cursor
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.versions.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn versions(&self) -> &[ImageRef] {
        &self.versions
    }

    /// True exactly while one edit request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Claims the in-flight slot and raises the loading flag
    pub fn begin_edit(&mut self) -> Result<EditTicket> {
        if self.loading {
            log::warn!("Rejected edit: another request is in flight");
            return Err(EditorError::Concurrency);
        }
        if self.versions.is_empty() {
            return Err(EditorError::NoImage);
        }
        self.loading = true;
        Ok(EditTicket {
            generation: self.generation,
        })
    }

    /// Releases the in-flight slot and applies the outcome.
    ///
    /// Success appends at the tail and moves the cursor there. Failure leaves
    /// versions and cursor untouched and hands the error back.
    pub fn complete_edit(&mut self, ticket: EditTicket, outcome: Result<ImageRef>) -> Result<()> {
        self.loading = false;

        if ticket.generation != self.generation {
            log::warn!("Discarding edit result for a replaced history");
            return Err(EditorError::Superseded);
        }

        match outcome {
            Ok(image) => {
                self.versions.push(image);
                self.cursor = self.versions.len() - 1;
                log::info!(
                    "Edit appended as version {} of {}",
                    self.cursor + 1,
                    self.versions.len()
                );
                Ok(())
            }
            Err(err) => {
                log::error!("Edit failed: {}", err);
                Err(err)
            }
        }
    }

    /// Runs one edit end to end: claim the slot, call the service, apply the result
    pub async fn submit_edit<S>(&mut self, service: &S, request: EditRequest) -> Result<()>
    where
        S: EditService + ?Sized,
    {
        let ticket = self.begin_edit()?;
        log::info!(
            "Submitting {} edit to {}",
            request.kind.label(),
            service.name()
        );
        let outcome = service.submit(request.to_payload()).await;
        self.complete_edit(ticket, outcome)
    }
}
