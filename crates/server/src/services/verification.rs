//! Admin verification queue for teacher profiles.

use thiserror::Error;

use wishlisted_core::{TeacherId, UserId, validation};

use crate::db::{RepositoryError, TeacherRepository};
use crate::models::{Teacher, TeacherReview};
use crate::realtime::{EventKind, RealtimeEvent};
use crate::state::AppState;

/// Errors from the verification queue.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("teacher not found")]
    NotFound,

    #[error("{0}")]
    Validation(#[from] validation::ValidationError),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for VerificationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Admin verification service.
pub struct VerificationService<'a> {
    state: &'a AppState,
    teachers: TeacherRepository<'a>,
}

impl<'a> VerificationService<'a> {
    /// Create a new verification service.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            teachers: TeacherRepository::new(state.pool()),
        }
    }

    /// Teachers waiting for approval, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::Repository` if the query fails.
    pub async fn queue(&self) -> Result<Vec<Teacher>, VerificationError> {
        Ok(self.teachers.list_unverified().await?)
    }

    /// Approve a teacher with an optional comment.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::NotFound` if the teacher does not exist.
    pub async fn approve(
        &self,
        id: TeacherId,
        reviewer: UserId,
        comment: Option<&str>,
    ) -> Result<Teacher, VerificationError> {
        let comment = review_comment(comment)?;
        let teacher = self.teachers.approve(id, reviewer, comment.as_deref()).await?;

        tracing::info!(teacher_id = %id, reviewer = %reviewer, "Teacher approved");
        self.announce(id, true);
        self.state.recent().invalidate().await;

        Ok(teacher)
    }

    /// Reject a teacher: the comment is logged and the profile deleted,
    /// both or neither.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::NotFound` if the teacher does not exist.
    pub async fn reject(
        &self,
        id: TeacherId,
        reviewer: UserId,
        comment: Option<&str>,
    ) -> Result<TeacherReview, VerificationError> {
        let comment = review_comment(comment)?;
        let review = self.teachers.reject(id, reviewer, comment.as_deref()).await?;

        tracing::info!(teacher_id = %id, reviewer = %reviewer, "Teacher rejected");
        self.announce(id, false);
        self.state.recent().invalidate().await;

        Ok(review)
    }

    fn announce(&self, id: TeacherId, approved: bool) {
        self.state.realtime().publish(RealtimeEvent {
            kind: EventKind::ActivityUpdate,
            data: serde_json::json!({
                "action": if approved { "teacher_approved" } else { "teacher_rejected" },
                "teacherId": id,
            }),
        });
    }
}

fn review_comment(comment: Option<&str>) -> Result<Option<String>, validation::ValidationError> {
    validation::optional_text("comment", comment, validation::MAX_LONG_TEXT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_review_comment_trims_and_blanks_to_none() {
        assert_eq!(review_comment(None).unwrap(), None);
        assert_eq!(review_comment(Some("   ")).unwrap(), None);
        assert_eq!(
            review_comment(Some("  Documents check out ")).unwrap().as_deref(),
            Some("Documents check out")
        );
    }

    #[test]
    fn test_review_comment_length_limit() {
        let long = "x".repeat(validation::MAX_LONG_TEXT + 1);
        assert!(review_comment(Some(&long)).is_err());
    }

    #[test]
    fn test_missing_teacher_maps_to_not_found() {
        assert!(matches!(
            VerificationError::from(RepositoryError::NotFound),
            VerificationError::NotFound
        ));
        assert!(matches!(
            VerificationError::from(RepositoryError::StaleState),
            VerificationError::Repository(_)
        ));
    }
}
