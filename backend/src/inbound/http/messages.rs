//! Direct messaging handlers.
//!
//! ```text
//! POST /api/v1/messages/conversations {"recipientId":"...","listingId":"...","content":"Hi"}
//! GET  /api/v1/messages/conversations
//! GET  /api/v1/messages/conversations/{conversation_id}
//! GET  /api/v1/messages/conversations/{conversation_id}/messages
//! POST /api/v1/messages/conversations/{conversation_id}/messages {"content":"..."}
//! ```
//!
//! Only participants can see or extend a conversation.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{ConversationId, Error, ListingId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::dto::{
    ConversationResponse, ConversationSummaryResponse, InitiatedConversationResponse,
    MessageResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// First contact with another user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub recipient_id: String,
    /// Listing the conversation is about, if any.
    pub listing_id: Option<String>,
    #[schema(example = "Is this still available?")]
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ConversationPath {
    conversation_id: String,
}

impl ConversationPath {
    fn parse(&self) -> Result<ConversationId, Error> {
        parse_id(&self.conversation_id, FieldName::new("conversationId"))
    }
}

/// Contact a user, reusing an existing conversation about the same listing.
#[utoipa::path(
    post,
    path = "/api/v1/messages/conversations",
    request_body = StartConversationRequest,
    responses(
        (status = 201, description = "Message sent", body = InitiatedConversationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipient or listing not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "startConversation"
)]
#[post("/messages/conversations")]
pub async fn start_conversation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StartConversationRequest>,
) -> ApiResult<HttpResponse> {
    let StartConversationRequest {
        recipient_id,
        listing_id,
        content,
    } = payload.into_inner();
    let recipient: UserId = parse_id(&recipient_id, FieldName::new("recipientId"))?;
    let listing: Option<ListingId> =
        parse_optional_id(listing_id.as_deref(), FieldName::new("listingId"))?;
    let actor = current_actor(&state, &session).await?;
    let initiated = state
        .inbox
        .initiate(actor, recipient, listing, content)
        .await?;
    debug!(conversation_id = %initiated.conversation.id, "conversation initiated");
    Ok(HttpResponse::Created().json(InitiatedConversationResponse::from(initiated)))
}

/// The caller's conversations, most recently active first.
#[utoipa::path(
    get,
    path = "/api/v1/messages/conversations",
    responses(
        (status = 200, description = "Inbox", body = [ConversationSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listConversations"
)]
#[get("/messages/conversations")]
pub async fn list_conversations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ConversationSummaryResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let summaries = state.inbox.conversations(actor).await?;
    Ok(web::Json(summaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/messages/conversations/{conversation_id}",
    params(("conversation_id" = String, Path, description = "Conversation identifier")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "getConversation"
)]
#[get("/messages/conversations/{conversation_id}")]
pub async fn get_conversation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ConversationPath>,
) -> ApiResult<web::Json<ConversationResponse>> {
    let conversation_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let conversation = state.inbox.conversation(actor, conversation_id).await?;
    Ok(web::Json(conversation.into()))
}

/// Messages in a conversation, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/messages/conversations/{conversation_id}/messages",
    params(("conversation_id" = String, Path, description = "Conversation identifier")),
    responses(
        (status = 200, description = "Messages", body = [MessageResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/messages/conversations/{conversation_id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ConversationPath>,
) -> ApiResult<web::Json<Vec<MessageResponse>>> {
    let conversation_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let messages = state.inbox.messages(actor, conversation_id).await?;
    Ok(web::Json(messages.into_iter().map(Into::into).collect()))
}

/// Reply in a conversation.
#[utoipa::path(
    post,
    path = "/api/v1/messages/conversations/{conversation_id}/messages",
    params(("conversation_id" = String, Path, description = "Conversation identifier")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages/conversations/{conversation_id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ConversationPath>,
    payload: web::Json<SendMessageRequest>,
) -> ApiResult<HttpResponse> {
    let conversation_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let message = state
        .inbox
        .send(actor, conversation_id, payload.into_inner().content)
        .await?;
    Ok(HttpResponse::Created().json(MessageResponse::from(message)))
}
