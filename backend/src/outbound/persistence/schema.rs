//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Lower-cased email, unique.
        email -> Varchar,
        /// bcrypt hash of the password.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Generation records; cascade-deleted with their owner.
    generations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Prompt text.
        prompt -> Text,
        /// Style name.
        style -> Varchar,
        /// Public URL of the stored source image.
        original_image_url -> Text,
        /// Public URL of the rendered image.
        generated_image_url -> Nullable<Text>,
        /// `pending`, `completed` or `failed`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(generations -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(generations, users);
