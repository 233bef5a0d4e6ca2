//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts with their login credential and balance.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login email, unique across the table.
        email -> Varchar,
        /// Salted credential hash in its stored form.
        password_hash -> Text,
        /// Current account balance.
        balance -> Numeric,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Generated images owned by users, listed or withdrawn.
    wallet_items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user; reassigned when a purchase settles.
        owner_id -> Uuid,
        /// Location of the generated image.
        image_url -> Text,
        /// Either `listed` or `withdrawn`.
        status -> Varchar,
        /// Asking price while listed; zero when withdrawn.
        price -> Numeric,
    }
}

diesel::table! {
    /// Append-only record of completed sales, one row per settlement.
    history_records (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Seller whose sale this is.
        seller_id -> Uuid,
        /// Image that changed hands.
        image_url -> Text,
        /// Price the sale settled at.
        price -> Numeric,
        /// Buyer label as recorded at sale time.
        buyer_name -> Varchar,
        /// Settlement timestamp.
        date_sold -> Timestamptz,
    }
}

diesel::joinable!(wallet_items -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(users, wallet_items, history_records);
