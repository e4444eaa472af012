//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly; `diesel print-schema` against a
//! migrated database regenerates them.

diesel::table! {
    /// Registered accounts. `username` and `email` are unique.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        is_active -> Bool,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listing categories, seeded by the initial migration.
    categories (id) {
        id -> Int4,
        name -> Varchar,
        parent_id -> Nullable<Int4>,
        display_order -> Int4,
        is_active -> Bool,
        is_skill_category -> Bool,
    }
}

diesel::table! {
    listings (id) {
        id -> Uuid,
        seller_id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Nullable<Float8>,
        category_id -> Int4,
        item_condition -> Varchar,
        is_skill_sharing -> Bool,
        rate -> Nullable<Float8>,
        rate_type -> Nullable<Varchar>,
        availability -> Nullable<Text>,
        search_keywords -> Nullable<Varchar>,
        /// Lifecycle state, snake_case.
        status -> Varchar,
        admin_notes -> Nullable<Text>,
        buyer_id -> Nullable<Uuid>,
        sold_at -> Nullable<Timestamptz>,
        views_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// At most one row per listing has `is_primary` set.
    listing_images (id) {
        id -> Uuid,
        listing_id -> Uuid,
        image_path -> Varchar,
        thumbnail_path -> Nullable<Varchar>,
        display_order -> Int4,
        is_primary -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Unique per `(listing_id, reviewer_id)`.
    reviews (id) {
        id -> Uuid,
        listing_id -> Uuid,
        reviewer_id -> Uuid,
        reviewee_id -> Uuid,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Uuid,
        user1_id -> Uuid,
        user2_id -> Uuid,
        listing_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> categories (category_id));
diesel::joinable!(listing_images -> listings (listing_id));
diesel::joinable!(reviews -> listings (listing_id));
diesel::joinable!(messages -> conversations (conversation_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    listings,
    listing_images,
    reviews,
    conversations,
    messages,
);
