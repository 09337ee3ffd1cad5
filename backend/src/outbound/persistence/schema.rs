//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts.
    ///
    /// `email` carries the `users_email_key` unique constraint.
    users (id) {
        /// Primary key assigned from the `users_id_seq` sequence.
        id -> Int4,
        /// Unique email address (max 254 characters).
        email -> Varchar,
        /// Optional display name (max 100 characters).
        name -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp, written on every update.
        updated_at -> Timestamptz,
    }
}
