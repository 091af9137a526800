use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::events::SubscribeParams;
use crate::{AppState, Error};
use ::sse::{CloseReason, ConnectionGuard, PresenceRole, PresenceSet, Subscription, Topic};
use async_stream::stream;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use domain::{auction as AuctionApi, Id};
use futures::Stream;
use log::*;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Open a live stream of one auction's events (bids, updates, closing).
/// `?role=subscriber` follows the lot, the default `visitor` only watches.
pub(crate) async fn auction_events(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(auction_id): Path<Id>,
    Query(params): Query<SubscribeParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    // Streams are only opened for auctions that exist.
    AuctionApi::find_by_id(app_state.db_conn_ref(), auction_id).await?;

    debug!(
        "Opening SSE stream on auction {auction_id} for user {} as {:?}",
        user.id, params.role
    );

    let subscription = app_state
        .sse_manager
        .subscribe(
            Topic::auction(auction_id),
            user.id.to_string(),
            params.role.into(),
        )
        .await
        .map_err(Error::Stream)?;

    Ok(into_sse(&app_state, subscription))
}

/// Open the caller's personal notification stream.
pub(crate) async fn notification_events(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    debug!("Opening SSE notification stream for user {}", user.id);

    let subscription = app_state
        .sse_manager
        .subscribe(
            Topic::user(user.id),
            user.id.to_string(),
            PresenceRole::Subscriber,
        )
        .await
        .map_err(Error::Stream)?;

    Ok(into_sse(&app_state, subscription))
}

/// Close every stream the caller holds on an auction.
pub(crate) async fn auction_unsubscribe(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(auction_id): Path<Id>,
) -> impl IntoResponse {
    let closed = app_state
        .sse_manager
        .disconnect(&Topic::auction(auction_id), &user.id.to_string())
        .await;

    debug!("User {} unsubscribed from auction {auction_id} ({closed} stream(s))", user.id);

    StatusCode::NO_CONTENT
}

/// Who is watching an auction right now, across every instance.
pub(crate) async fn auction_presence(
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(auction_id): Path<Id>,
) -> impl IntoResponse {
    let id = auction_id.to_string();
    let visitors = sorted(
        app_state
            .sse_manager
            .members(&PresenceSet::AuctionVisitors(id.clone()))
            .await,
    );
    let subscribers = sorted(
        app_state
            .sse_manager
            .members(&PresenceSet::AuctionSubscribers(id))
            .await,
    );

    Json(json!({ "visitors": visitors, "subscribers": subscribers }))
}

/// User keys that currently hold a notification stream.
pub(crate) async fn notification_presence(
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    let members = sorted(
        app_state
            .sse_manager
            .members(&PresenceSet::NotificationSubscribers)
            .await,
    );

    Json(members)
}

fn sorted(members: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut members: Vec<String> = members.into_iter().collect();
    members.sort();
    members
}

fn into_sse(
    app_state: &AppState,
    subscription: Subscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (_connection_id, receiver, guard) = subscription.into_parts();
    let stream = event_stream(receiver, guard, app_state.config.sse_idle_timeout());

    Sse::new(stream).keep_alive(KeepAlive::new().interval(app_state.config.sse_keep_alive()))
}

/// Forward events until the registry drops the connection or the stream sits
/// idle past `idle_timeout`. Keep-alive comments do not count as activity.
/// If the client goes away first, the stream and its guard are dropped.
fn event_stream(
    mut receiver: UnboundedReceiver<Result<Event, Infallible>>,
    guard: ConnectionGuard,
    idle_timeout: Option<Duration>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream! {
        let reason = loop {
            let next = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, receiver.recv()).await {
                    Ok(next) => next,
                    Err(_) => break CloseReason::IdleTimeout,
                },
                None => receiver.recv().await,
            };

            match next {
                Some(event) => yield event,
                None => break CloseReason::Completed,
            }
        };

        if let Some(removal) = guard.close(reason) {
            if let Err(e) = removal.await {
                warn!("Presence removal task failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::sse::Manager;
    use futures::StreamExt;

    #[tokio::test]
    async fn idle_stream_ends_and_releases_the_connection() {
        let manager = Manager::default();
        let topic = Topic::auction("7");
        let subscription = manager
            .subscribe(topic.clone(), "u1", PresenceRole::Visitor)
            .await
            .unwrap();
        let (_id, receiver, guard) = subscription.into_parts();

        let stream = event_stream(receiver, guard, Some(Duration::from_millis(20)));
        let frames: Vec<_> = stream.collect().await;

        assert!(frames.is_empty());
        assert_eq!(manager.connection_count(&topic), 0);
    }

    #[tokio::test]
    async fn stream_forwards_events_and_completes_on_disconnect() {
        let manager = Manager::default();
        let topic = Topic::auction("8");
        let subscription = manager
            .subscribe(topic.clone(), "u2", PresenceRole::Subscriber)
            .await
            .unwrap();
        let (_id, receiver, guard) = subscription.into_parts();
        let mut stream = Box::pin(event_stream(receiver, guard, None));

        manager.publish(
            &topic,
            &::sse::message::Envelope::new("bid_placed", json!({"amount": 2100})),
        );
        let frame = stream.next().await.unwrap().unwrap();
        assert!(format!("{frame:?}").contains("bid_placed"));

        assert_eq!(manager.disconnect(&topic, "u2").await, 1);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn presence_members_are_sorted() {
        assert_eq!(
            sorted(vec!["b".to_string(), "a".to_string()]),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
