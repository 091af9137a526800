//! This module provides protection mechanisms for various resources in the web application.
//!
//! It includes submodules for authorizing access to resources. Each submodule contains the necessary logic to protect
//! the corresponding resources, ensuring that only authorized users can access or modify them.
//!
//! Rules that depend on the state of a record (an auction being open, an
//! offer still pending) live in `domain` instead, since they have to be
//! checked again inside the operation.

pub(crate) mod admin;
pub(crate) mod auctions;
pub(crate) mod quality_inspections;
pub(crate) mod users;

use crate::AppState;
use async_trait::async_trait;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::IntoResponse};
use domain::{auction as AuctionApi, roles::Role, Id};
use log::*;

/// Trait representing a single authorization rule.
///
/// Implementors answer **“is the authenticated user allowed to proceed?”**.
/// The rule receives:
/// * shared application state (`AppState`)
/// * the authenticated [`domain::users::Model`]
/// * any additional [`Id`] parameters supplied by the caller.
///
/// Example:
/// ```rust,ignore
/// #[async_trait]
/// impl Check for UserIsAdmin {
///     async fn eval(&self, _app: &AppState, user: &domain::users::Model, _args: Vec<Id>) -> bool {
///         user.role == Role::Admin
///     }
/// }
/// ```
#[async_trait]
pub trait Check: Send + Sync {
    async fn eval(&self, app: &AppState, user: &domain::users::Model, args: Vec<Id>) -> bool;
}

/// Pairs a [`Check`] implementation with the concrete arguments that the rule
/// should receive when evaluated.
///
/// ```rust,ignore
/// let checks = vec![Predicate::new(UserIsAuctionSeller, vec![auction_id])];
/// ```
/// The vector of predicates can then be passed to [`authorize`] middleware.
pub(crate) struct Predicate {
    predicate: Box<dyn Check>,
    args: Vec<Id>,
}

impl Predicate {
    pub(crate) fn new<C: Check + 'static>(predicate: C, args: Vec<Id>) -> Self {
        Self {
            predicate: Box::new(predicate),
            args,
        }
    }

    pub(crate) async fn check(&self, app_state: &AppState, user: &domain::users::Model) -> bool {
        self.predicate
            .eval(app_state, user, self.args.clone())
            .await
    }
}

/// Axum middleware that enforces one or more [`Predicate`]s.
///
/// Each predicate is evaluated in the order supplied; if any rule returns
/// `false` the request is aborted with **403 FORBIDDEN**.  When all rules
/// pass the wrapped handler (`next`) is executed.
pub(crate) async fn authorize(
    app_state: &AppState,
    authenticated_user: domain::users::Model,
    request: Request,
    next: Next,
    checks: Vec<Predicate>,
) -> impl IntoResponse {
    for check in checks {
        if !check.check(app_state, &authenticated_user).await {
            return (StatusCode::FORBIDDEN, "FORBIDDEN").into_response();
        }
    }
    next.run(request).await
}

pub struct UserIsAdmin;

#[async_trait]
impl Check for UserIsAdmin {
    async fn eval(
        &self,
        _app_state: &AppState,
        authenticated_user: &domain::users::Model,
        _args: Vec<Id>,
    ) -> bool {
        authenticated_user.role == Role::Admin
    }
}

/// Passes when `args[0]` is the caller's own id, or the caller is an admin.
pub struct UserIsSelfOrAdmin;

#[async_trait]
impl Check for UserIsSelfOrAdmin {
    async fn eval(
        &self,
        _app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> bool {
        domain::user::ensure_self_or_admin(authenticated_user, args[0]).is_ok()
    }
}

/// Passes when the caller holds one of the listed roles.
pub struct UserHasRole(pub &'static [Role]);

#[async_trait]
impl Check for UserHasRole {
    async fn eval(
        &self,
        _app_state: &AppState,
        authenticated_user: &domain::users::Model,
        _args: Vec<Id>,
    ) -> bool {
        self.0.contains(&authenticated_user.role)
    }
}

/// Passes when the caller sold the auction `args[0]`, or is an admin.
pub struct UserIsAuctionSeller;

#[async_trait]
impl Check for UserIsAuctionSeller {
    async fn eval(
        &self,
        app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> bool {
        let auction_id = args[0];
        match AuctionApi::find_by_id(app_state.db_conn_ref(), auction_id).await {
            Ok(auction) => {
                AuctionApi::ensure_seller_or_admin(&auction, authenticated_user).is_ok()
            }
            Err(_) => {
                error!("Auction not found with ID {auction_id:?}");
                false
            }
        }
    }
}
