//! Authorization Middleware

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::boundary::{self, AuthPrincipal};
use super::error::AuthError;
use crate::api::AppState;
use crate::permissions::Action;

/// The action a route performs, attached by [`with_action`].
#[derive(Clone)]
pub struct RouteAction(pub Arc<dyn Action>);

/// Middleware factory that tags requests with the route's action.
///
/// Layer it outside [`require_authorization`]:
/// ```ignore
/// get(handler)
///     .route_layer(from_fn_with_state(state, require_authorization))
///     .route_layer(from_fn(with_action(OrganizationAction::ViewRoles)))
/// ```
pub fn with_action<A: Action + Clone + 'static>(
    action: A,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    let action: Arc<dyn Action> = Arc::new(action);
    move |mut request: Request, next: Next| {
        request.extensions_mut().insert(RouteAction(Arc::clone(&action)));
        Box::pin(async move { next.run(request).await })
    }
}

/// Middleware to require a valid session.
///
/// Injects an `AuthPrincipal` without any role check. Use for routes that only
/// need to know who is calling.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let credential =
        boundary::extract_credential(request.headers(), &state.config.session_cookie_name);
    let session = boundary::authenticate(&state.validator, credential.as_ref()).await?;

    request.extensions_mut().insert(AuthPrincipal {
        session,
        organization_id: None,
    });

    Ok(next.run(request).await)
}

/// Middleware to require a session allowed to perform the route's action.
pub async fn require_authorization(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let action = request
        .extensions()
        .get::<RouteAction>()
        .cloned()
        .ok_or_else(|| AuthError::Internal("route has no action attached".into()))?;

    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path().to_string(), |uri| uri.path().to_string());

    let credential =
        boundary::extract_credential(request.headers(), &state.config.session_cookie_name);
    let organization_id = boundary::target_organization(request.headers(), &path)?;

    let principal = boundary::authorize(
        &state.validator,
        &state.evaluator,
        credential.as_ref(),
        organization_id,
        action.0.as_ref(),
    )
    .await?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extractor for the authorized caller in handlers.
impl<S> axum::extract::FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
