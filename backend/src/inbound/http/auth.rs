//! Identity resolution for HTTP handlers.
//!
//! Turns the session cookie into a domain [`Actor`] so handlers pass an
//! explicit caller into every port call. Accounts that were deactivated
//! after signing in stop resolving immediately.

use tracing::debug;

use crate::domain::{Actor, Error, ErrorCode, User, UserId};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// The signed-in, active user.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let id = session.require_user_id()?;
    state.accounts.current_user(id).await
}

/// The signed-in user as an [`Actor`].
pub async fn current_actor(state: &HttpState, session: &SessionContext) -> ApiResult<Actor> {
    current_user(state, session).await.map(|user| user.actor())
}

/// The signed-in user, who must be an administrator.
pub async fn current_admin(state: &HttpState, session: &SessionContext) -> ApiResult<Actor> {
    let actor = current_actor(state, session).await?;
    if actor.is_admin {
        Ok(actor)
    } else {
        Err(Error::forbidden("administrator access required"))
    }
}

/// The viewer for public reads: anonymous when signed out or when the
/// session no longer names an active account.
pub async fn optional_viewer(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Option<UserId>> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };
    match state.accounts.current_user(id).await {
        Ok(user) => Ok(Some(user.id)),
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            debug!(user_id = %id, "stale session treated as anonymous");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
