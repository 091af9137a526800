use crate::contract_offers::{self, Model};
use crate::error::Error;
use crate::notification::{self, notify_quietly};
use crate::offer_status::OfferStatus;
use crate::{user, Id, QueryFilterMap};
use entity_api::query;
use events::EventPublisher;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::contract_offer::{find_by_id, find_by_participant};

/// Offers matching the plain column filters in `params` (`sender_id`,
/// `recipient_id`) and an optional status.
pub async fn find_by(
    db: &DatabaseConnection,
    status: Option<OfferStatus>,
    params: QueryFilterMap,
) -> Result<Vec<Model>, Error> {
    let offers = query::find_by::<contract_offers::Entity, contract_offers::Column>(db, params)
        .await?
        .into_iter()
        .filter(|offer| status.as_ref().map_or(true, |s| &offer.status == s))
        .collect();

    Ok(offers)
}

/// Offers the user sent or received, optionally in one status.
pub async fn find_for_participant(
    db: &DatabaseConnection,
    user_id: Id,
    status: Option<OfferStatus>,
) -> Result<Vec<Model>, Error> {
    Ok(match status {
        Some(status) => {
            entity_api::contract_offer::find_by_participant_and_status(db, user_id, status).await?
        }
        None => find_by_participant(db, user_id).await?,
    })
}

fn validate_terms(offer: &Model) -> Result<(), Error> {
    if offer.quantity_kg <= 0 {
        return Err(Error::invalid("quantity must be positive"));
    }
    if offer.price_per_kg <= 0 {
        return Err(Error::invalid("price per kg must be positive"));
    }
    Ok(())
}

/// Send an offer to another user. The recipient is notified.
pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    sender_id: Id,
    model: Model,
) -> Result<Model, Error> {
    if model.recipient_id == sender_id {
        return Err(Error::invalid("cannot send an offer to yourself"));
    }
    validate_terms(&model)?;
    // Unknown recipients surface as not found.
    user::find_by_id(db, model.recipient_id).await?;

    let offer = entity_api::contract_offer::create(db, sender_id, model).await?;
    debug!("Contract offer {} sent to {}", offer.id, offer.recipient_id);

    notify_quietly(
        db,
        event_publisher,
        offer.recipient_id,
        notification::OFFER_RECEIVED,
        format!("New contract offer for {}", offer.product),
        offer.message.clone(),
    )
    .await;

    Ok(offer)
}

/// Only the sender may edit the terms, and only while the offer is pending.
pub async fn update_terms(
    db: &DatabaseConnection,
    actor_id: Id,
    id: Id,
    model: Model,
) -> Result<Model, Error> {
    let offer = find_by_id(db, id).await?;
    if offer.sender_id != actor_id {
        return Err(Error::forbidden("only the sender may edit an offer"));
    }
    if offer.status.is_terminal() {
        return Err(Error::conflict(format!("offer {id} is {}", offer.status)));
    }
    validate_terms(&model)?;

    Ok(entity_api::contract_offer::update_terms(db, id, model).await?)
}

/// Checks that `actor_id` may move `offer` to `status`.
///
/// The recipient accepts or rejects, the sender cancels, and only a pending
/// offer can move at all.
pub fn ensure_transition(offer: &Model, actor_id: Id, status: &OfferStatus) -> Result<(), Error> {
    if offer.status.is_terminal() {
        return Err(Error::conflict(format!(
            "offer {} is already {}",
            offer.id, offer.status
        )));
    }

    let allowed_actor = match status {
        OfferStatus::Pending => return Err(Error::invalid("an offer cannot return to pending")),
        OfferStatus::Accepted | OfferStatus::Rejected => offer.recipient_id,
        OfferStatus::Cancelled => offer.sender_id,
    };

    if allowed_actor == actor_id {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "this party cannot mark the offer {status}"
        )))
    }
}

/// Answer or withdraw an offer. The other party is notified.
pub async fn update_status(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor_id: Id,
    id: Id,
    status: OfferStatus,
) -> Result<Model, Error> {
    let offer = find_by_id(db, id).await?;
    ensure_transition(&offer, actor_id, &status)?;

    let offer = entity_api::contract_offer::set_status(db, offer, status).await?;

    let counterparty = if actor_id == offer.sender_id {
        offer.recipient_id
    } else {
        offer.sender_id
    };
    notify_quietly(
        db,
        event_publisher,
        counterparty,
        notification::OFFER_STATUS_CHANGED,
        format!("Contract offer for {} was {}", offer.product, offer.status),
        None,
    )
    .await;

    Ok(offer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, RuleErrorKind};
    use chrono::Utc;

    fn offer(status: OfferStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            sender_id: Id::new_v4(),
            recipient_id: Id::new_v4(),
            product: "W320 kernels".to_owned(),
            quantity_kg: 10_000,
            price_per_kg: 4_000,
            delivery_date: None,
            message: None,
            status,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn rule_kind(result: Result<(), Error>) -> Option<RuleErrorKind> {
        match result {
            Err(Error {
                error_kind: DomainErrorKind::Rule(kind),
                ..
            }) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn recipient_accepts_and_sender_cancels() {
        let pending = offer(OfferStatus::Pending);

        assert!(ensure_transition(&pending, pending.recipient_id, &OfferStatus::Accepted).is_ok());
        assert!(ensure_transition(&pending, pending.recipient_id, &OfferStatus::Rejected).is_ok());
        assert!(ensure_transition(&pending, pending.sender_id, &OfferStatus::Cancelled).is_ok());
    }

    #[test]
    fn sender_cannot_accept_their_own_offer() {
        let pending = offer(OfferStatus::Pending);

        assert!(matches!(
            rule_kind(ensure_transition(
                &pending,
                pending.sender_id,
                &OfferStatus::Accepted
            )),
            Some(RuleErrorKind::Forbidden(_))
        ));
    }

    #[test]
    fn answered_offers_cannot_move_again() {
        let accepted = offer(OfferStatus::Accepted);

        assert!(matches!(
            rule_kind(ensure_transition(
                &accepted,
                accepted.sender_id,
                &OfferStatus::Cancelled
            )),
            Some(RuleErrorKind::Conflict(_))
        ));
    }

    #[test]
    fn terms_must_be_positive() {
        let mut bad = offer(OfferStatus::Pending);
        bad.price_per_kg = 0;

        assert!(validate_terms(&bad).is_err());
        assert!(validate_terms(&offer(OfferStatus::Pending)).is_ok());
    }
}
