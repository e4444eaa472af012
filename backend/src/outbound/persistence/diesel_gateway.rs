//! PostgreSQL-backed [`PersistenceGateway`].
//!
//! Each unit of work owns one pooled connection with an open transaction.
//! `commit` and `rollback` end it explicitly; a unit dropped without either
//! returns its connection mid-transaction, which the pool discards, so the
//! server rolls the work back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::domain::ports::{PersistenceError, PersistenceGateway, UnitOfWork};
use crate::domain::{
    Category, CategoryId, Conversation, ConversationId, EmailAddress, ImageId, Listing,
    ListingId, ListingImage, ListingPage, ListingQuery, Message, Review, ReviewId, User, UserId,
    UserSearch, Username,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CategoryRow, ConversationRow, ListingImageRow, ListingRow, MessageRow, ReviewRow, UserRow,
};
use super::pool::{DbPool, OwnedConnection};
use super::schema::{categories, conversations, listing_images, listings, messages, reviews, users};

/// Diesel implementation of the persistence gateway.
#[derive(Clone)]
pub struct DieselGateway {
    pool: DbPool,
}

impl DieselGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for DieselGateway {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselUnitOfWork { conn }))
    }
}

struct DieselUnitOfWork {
    conn: OwnedConnection,
}

impl DieselUnitOfWork {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

fn load_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// `WHERE` clause shared by the count and page queries.
fn filtered(query: &ListingQuery) -> listings::BoxedQuery<'static, Pg> {
    let mut statement = listings::table.into_boxed();
    if let Some(text) = &query.text {
        let pattern = format!("%{}%", text.as_str());
        statement = statement.filter(
            listings::title
                .ilike(pattern.clone())
                .or(listings::description.ilike(pattern.clone()))
                .or(listings::search_keywords.ilike(pattern)),
        );
    }
    if let Some(category) = query.category_id {
        statement = statement.filter(listings::category_id.eq(category.get()));
    }
    if let Some(min) = query.min_price {
        statement = statement.filter(listings::price.ge(min));
    }
    if let Some(max) = query.max_price {
        statement = statement.filter(listings::price.le(max));
    }
    if let Some(condition) = query.item_condition {
        statement = statement.filter(listings::item_condition.eq(condition.as_str()));
    }
    if let Some(skill) = query.is_skill_sharing {
        statement = statement.filter(listings::is_skill_sharing.eq(skill));
    }
    if let Some(status) = query.status {
        statement = statement.filter(listings::status.eq(status.as_str()));
    }
    if let Some(seller) = query.seller_id {
        statement = statement.filter(listings::seller_id.eq(*seller.as_uuid()));
    }
    statement
}

/// `%term%` with `LIKE` wildcards in the term matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl UnitOfWork for DieselUnitOfWork {
    async fn user(&mut self, id: UserId) -> Result<Option<User>, PersistenceError> {
        users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_email(
        &mut self,
        email: &EmailAddress,
    ) -> Result<Option<User>, PersistenceError> {
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<User>, PersistenceError> {
        users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), PersistenceError> {
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn search_users(
        &mut self,
        query: &UserSearch,
        limit: u32,
    ) -> Result<Vec<User>, PersistenceError> {
        let pattern = contains_pattern(query.as_str());
        let rows: Vec<UserRow> = users::table
            .filter(users::is_active.eq(true))
            .filter(
                users::username
                    .ilike(pattern.clone())
                    .or(users::email.ilike(pattern)),
            )
            .order(users::username.asc())
            .limit(i64::from(limit))
            .select(UserRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        load_all(rows)
    }

    async fn categories(&mut self) -> Result<Vec<Category>, PersistenceError> {
        let rows: Vec<CategoryRow> = categories::table
            .order((categories::display_order.asc(), categories::id.asc()))
            .select(CategoryRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn category(&mut self, id: CategoryId) -> Result<Option<Category>, PersistenceError> {
        let row: Option<CategoryRow> = categories::table
            .find(id.get())
            .select(CategoryRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Category::from))
    }

    async fn listing(&mut self, id: ListingId) -> Result<Option<Listing>, PersistenceError> {
        listings::table
            .find(*id.as_uuid())
            .select(ListingRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Listing::try_from)
            .transpose()
    }

    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError> {
        diesel::insert_into(listings::table)
            .values(ListingRow::from(listing))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError> {
        let updated = diesel::update(listings::table.find(*listing.id.as_uuid()))
            .set(ListingRow::from(listing))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PersistenceError::query("listing vanished during update"));
        }
        Ok(())
    }

    async fn increment_views(&mut self, id: ListingId) -> Result<(), PersistenceError> {
        let updated = diesel::update(listings::table.find(*id.as_uuid()))
            .set(listings::views_count.eq(listings::views_count + 1))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PersistenceError::query("listing vanished during view"));
        }
        Ok(())
    }

    async fn delete_listing(&mut self, id: ListingId) -> Result<(), PersistenceError> {
        diesel::delete(listings::table.find(*id.as_uuid()))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn search_listings(
        &mut self,
        query: &ListingQuery,
    ) -> Result<ListingPage, PersistenceError> {
        let total: i64 = filtered(query)
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;

        let mut page = filtered(query);
        if let Some(text) = &query.text {
            let pattern = format!("%{}%", text.as_str());
            page = page.order(listings::title.ilike(pattern).desc());
            page = page.then_order_by(listings::created_at.desc());
        } else {
            page = page.order(listings::created_at.desc());
        }
        let rows: Vec<ListingRow> = page
            .then_order_by(listings::id.asc())
            .offset(to_i64(query.window.offset))
            .limit(i64::from(query.window.limit))
            .select(ListingRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;

        Ok(ListingPage {
            total: u64::try_from(total).unwrap_or_default(),
            results: load_all(rows)?,
        })
    }

    async fn images(&mut self, listing: ListingId) -> Result<Vec<ListingImage>, PersistenceError> {
        let rows: Vec<ListingImageRow> = listing_images::table
            .filter(listing_images::listing_id.eq(*listing.as_uuid()))
            .order((
                listing_images::display_order.asc(),
                listing_images::created_at.asc(),
            ))
            .select(ListingImageRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        load_all(rows)
    }

    async fn insert_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError> {
        diesel::insert_into(listing_images::table)
            .values(ListingImageRow::from(image))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError> {
        let updated = diesel::update(listing_images::table.find(*image.id.as_uuid()))
            .set(ListingImageRow::from(image))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PersistenceError::query("image vanished during update"));
        }
        Ok(())
    }

    async fn delete_image(&mut self, id: ImageId) -> Result<(), PersistenceError> {
        diesel::delete(listing_images::table.find(*id.as_uuid()))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), PersistenceError> {
        diesel::insert_into(reviews::table)
            .values(ReviewRow::from(review))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn review(&mut self, id: ReviewId) -> Result<Option<Review>, PersistenceError> {
        reviews::table
            .find(*id.as_uuid())
            .select(ReviewRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Review::try_from)
            .transpose()
    }

    async fn review_by(
        &mut self,
        listing: ListingId,
        reviewer: UserId,
    ) -> Result<Option<Review>, PersistenceError> {
        reviews::table
            .filter(reviews::listing_id.eq(*listing.as_uuid()))
            .filter(reviews::reviewer_id.eq(*reviewer.as_uuid()))
            .select(ReviewRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Review::try_from)
            .transpose()
    }

    async fn reviews_for_listing(
        &mut self,
        listing: ListingId,
    ) -> Result<Vec<Review>, PersistenceError> {
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::listing_id.eq(*listing.as_uuid()))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        load_all(rows)
    }

    async fn reviews_about(&mut self, reviewee: UserId) -> Result<Vec<Review>, PersistenceError> {
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::reviewee_id.eq(*reviewee.as_uuid()))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        load_all(rows)
    }

    async fn conversation(
        &mut self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, PersistenceError> {
        let row: Option<ConversationRow> = conversations::table
            .find(*id.as_uuid())
            .select(ConversationRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Conversation::from))
    }

    async fn conversation_between(
        &mut self,
        a: UserId,
        b: UserId,
        listing: Option<ListingId>,
    ) -> Result<Option<Conversation>, PersistenceError> {
        let (a, b) = (*a.as_uuid(), *b.as_uuid());
        let mut statement = conversations::table
            .filter(
                conversations::user1_id
                    .eq(a)
                    .and(conversations::user2_id.eq(b))
                    .or(conversations::user1_id.eq(b).and(conversations::user2_id.eq(a))),
            )
            .into_boxed();
        statement = match listing {
            Some(id) => statement.filter(conversations::listing_id.eq(*id.as_uuid())),
            None => statement.filter(conversations::listing_id.is_null()),
        };
        let row: Option<ConversationRow> = statement
            .order(conversations::created_at.asc())
            .select(ConversationRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Conversation::from))
    }

    async fn insert_conversation(
        &mut self,
        conversation: &Conversation,
    ) -> Result<(), PersistenceError> {
        diesel::insert_into(conversations::table)
            .values(ConversationRow::from(conversation))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn touch_conversation(
        &mut self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        diesel::update(conversations::table.find(*id.as_uuid()))
            .set(conversations::updated_at.eq(at))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn conversations_for(
        &mut self,
        user: UserId,
    ) -> Result<Vec<Conversation>, PersistenceError> {
        let user = *user.as_uuid();
        let rows: Vec<ConversationRow> = conversations::table
            .filter(
                conversations::user1_id
                    .eq(user)
                    .or(conversations::user2_id.eq(user)),
            )
            .order((conversations::updated_at.desc(), conversations::id.asc()))
            .select(ConversationRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn insert_message(&mut self, message: &Message) -> Result<(), PersistenceError> {
        diesel::insert_into(messages::table)
            .values(MessageRow::from(message))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn messages(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(*conversation.as_uuid()))
            .order((messages::created_at.asc(), messages::id.asc()))
            .select(MessageRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        load_all(rows)
    }

    async fn last_message(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Option<Message>, PersistenceError> {
        messages::table
            .filter(messages::conversation_id.eq(*conversation.as_uuid()))
            .order((messages::created_at.desc(), messages::id.desc()))
            .select(MessageRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Message::try_from)
            .transpose()
    }

    async fn commit(self: Box<Self>) -> Result<(), PersistenceError> {
        let mut unit = self;
        AnsiTransactionManager::commit_transaction(unit.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), PersistenceError> {
        let mut unit = self;
        AnsiTransactionManager::rollback_transaction(unit.conn())
            .await
            .map_err(map_diesel_error)
    }
}
