//! Diesel schema for task persistence.

diesel::table! {
    /// Task records scoped by owning account.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning account identifier.
        #[max_length = 64]
        owner_id -> Varchar,
        /// User-authored task text.
        text -> Text,
        /// Position among the owner's pending tasks.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Completion timestamp; null while pending.
        completed_at -> Nullable<Timestamptz>,
        /// Archive timestamp; null unless the task is in the bin.
        archived_at -> Nullable<Timestamptz>,
    }
}
