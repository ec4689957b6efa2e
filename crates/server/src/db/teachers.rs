//! Teacher profile repository and the admin verification queue.

use sqlx::PgPool;

use wishlisted_core::{TeacherId, UserId};

use super::RepositoryError;
use crate::models::{Teacher, TeacherReview};

const TEACHER_COLUMNS: &str = "id, user_id, full_name, school, grade, location, bio, \
     is_verified, is_teacher_verified, verification_comment, \
     bank_name, account_holder, account_number, branch, amazon_wishlist_url, \
     created_at, updated_at";

/// Fields a teacher can edit on their own profile.
#[derive(Debug, Clone)]
pub struct TeacherProfileInput {
    pub full_name: String,
    pub school: String,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub branch: Option<String>,
    pub amazon_wishlist_url: Option<String>,
}

impl TeacherProfileInput {
    /// Profile has everything an admin needs to review it.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.bank_name.is_some() && self.account_holder.is_some() && self.account_number.is_some()
    }
}

/// Repository for teacher database operations.
pub struct TeacherRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeacherRepository<'a> {
    /// Create a new teacher repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a teacher by profile ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TeacherId) -> Result<Option<Teacher>, RepositoryError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(teacher)
    }

    /// Get the teacher profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Teacher>, RepositoryError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(teacher)
    }

    /// Create or update the single profile row for `user_id`.
    ///
    /// Editing a profile never clears an admin approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        input: &TeacherProfileInput,
    ) -> Result<Teacher, RepositoryError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            r"
            INSERT INTO teachers (
                user_id, full_name, school, grade, location, bio,
                bank_name, account_holder, account_number, branch,
                amazon_wishlist_url, is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                school = EXCLUDED.school,
                grade = EXCLUDED.grade,
                location = EXCLUDED.location,
                bio = EXCLUDED.bio,
                bank_name = EXCLUDED.bank_name,
                account_holder = EXCLUDED.account_holder,
                account_number = EXCLUDED.account_number,
                branch = EXCLUDED.branch,
                amazon_wishlist_url = EXCLUDED.amazon_wishlist_url,
                is_verified = EXCLUDED.is_verified,
                updated_at = NOW()
            RETURNING {TEACHER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&input.full_name)
        .bind(&input.school)
        .bind(&input.grade)
        .bind(&input.location)
        .bind(&input.bio)
        .bind(&input.bank_name)
        .bind(&input.account_holder)
        .bind(&input.account_number)
        .bind(&input.branch)
        .bind(&input.amazon_wishlist_url)
        .bind(input.is_complete())
        .fetch_one(self.pool)
        .await?;

        Ok(teacher)
    }

    /// A teacher whose banking details are complete enough to show a donor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn banking_for(&self, id: TeacherId) -> Result<Option<Teacher>, RepositoryError> {
        Ok(self.get(id).await?.filter(Teacher::has_banking))
    }

    /// Teachers awaiting admin approval, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unverified(&self) -> Result<Vec<Teacher>, RepositoryError> {
        let teachers = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE NOT is_teacher_verified ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(teachers)
    }

    /// Mark a teacher verified and log the decision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist.
    pub async fn approve(
        &self,
        id: TeacherId,
        reviewer: UserId,
        comment: Option<&str>,
    ) -> Result<Teacher, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            r"
            UPDATE teachers
            SET is_teacher_verified = TRUE, verification_comment = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TEACHER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(comment)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        insert_review(&mut *tx, teacher.user_id, reviewer, true, comment).await?;

        tx.commit().await?;

        Ok(teacher)
    }

    /// Record a rejection and delete the teacher profile, atomically.
    ///
    /// The user account survives so the teacher can submit a new profile.
    /// Wishlists and items cascade with the profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist;
    /// nothing is written in that case.
    pub async fn reject(
        &self,
        id: TeacherId,
        reviewer: UserId,
        comment: Option<&str>,
    ) -> Result<TeacherReview, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let teacher_user_id: UserId =
            sqlx::query_scalar("DELETE FROM teachers WHERE id = $1 RETURNING user_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let review = insert_review(&mut *tx, teacher_user_id, reviewer, false, comment).await?;

        tx.commit().await?;

        Ok(review)
    }
}

async fn insert_review(
    conn: &mut sqlx::PgConnection,
    teacher_user_id: UserId,
    reviewer: UserId,
    approved: bool,
    comment: Option<&str>,
) -> Result<TeacherReview, RepositoryError> {
    let review = sqlx::query_as::<_, TeacherReview>(
        r"
        INSERT INTO teacher_reviews (teacher_user_id, reviewer_id, approved, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, teacher_user_id, reviewer_id, approved, comment, created_at
        ",
    )
    .bind(teacher_user_id)
    .bind(reviewer)
    .bind(approved)
    .bind(comment)
    .fetch_one(conn)
    .await?;

    Ok(review)
}
