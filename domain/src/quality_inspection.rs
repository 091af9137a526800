use crate::auction;
use crate::error::Error;
use crate::notification::{self, notify_quietly};
use crate::quality_inspections::Model;
use crate::{to_payload, Id};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::quality_inspection::{find_by_auction, find_by_id};

fn validate(inspection: &Model) -> Result<(), Error> {
    if inspection.grade.trim().is_empty() {
        return Err(Error::invalid("grade is required"));
    }
    if !(0..=1000).contains(&inspection.moisture_per_mille) {
        return Err(Error::invalid("moisture must be between 0 and 1000 per mille"));
    }
    if inspection.kor_lbs < 0 {
        return Err(Error::invalid("KOR cannot be negative"));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    inspector_id: Id,
    model: Model,
) -> Result<Model, Error> {
    validate(&model)?;
    // The inspected lot has to exist.
    auction::find_by_id(db, model.auction_id).await?;

    Ok(entity_api::quality_inspection::create(db, inspector_id, model).await?)
}

/// Certified inspections are final.
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let inspection = find_by_id(db, id).await?;
    if inspection.certified {
        return Err(Error::conflict(format!("inspection {id} is already certified")));
    }
    validate(&model)?;

    Ok(entity_api::quality_inspection::update(db, id, model).await?)
}

/// Certify an inspection, tell the auction's watchers and notify its seller.
pub async fn certify(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
) -> Result<Model, Error> {
    let inspection = find_by_id(db, id).await?;
    if inspection.certified {
        return Err(Error::conflict(format!("inspection {id} is already certified")));
    }
    let auction = auction::find_by_id(db, inspection.auction_id).await?;

    let inspection = entity_api::quality_inspection::certify(db, inspection).await?;
    info!(
        "Inspection {} certified grade {} for auction {}",
        inspection.id, inspection.grade, auction.id
    );

    event_publisher
        .publish(DomainEvent::InspectionCertified {
            auction_id: auction.id,
            inspection: to_payload(&inspection),
        })
        .await;

    notify_quietly(
        db,
        event_publisher,
        auction.seller_id,
        notification::INSPECTION_CERTIFIED,
        format!("Quality certified for {}", auction.title),
        Some(format!("Grade {}", inspection.grade)),
    )
    .await;

    Ok(inspection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn inspection(moisture_per_mille: i32) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            auction_id: Id::new_v4(),
            inspector_id: Id::new_v4(),
            grade: "W320".to_owned(),
            moisture_per_mille,
            kor_lbs: 47,
            notes: None,
            certified: false,
            certified_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn moisture_is_bounded() {
        assert!(validate(&inspection(85)).is_ok());
        assert!(validate(&inspection(1_200)).is_err());
        assert!(validate(&inspection(-1)).is_err());
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn certify_publishes_to_the_auction_and_notifies_the_seller() -> Result<(), Error> {
        use crate::auction_status::AuctionStatus;
        use crate::test_support::{auction_model, notification_model, Recorder};
        use sea_orm::{DatabaseBackend, MockDatabase};

        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let pending = Model {
            auction_id: auction.id,
            ..inspection(80)
        };
        let certified = Model {
            certified: true,
            certified_at: Some(Utc::now().into()),
            ..pending.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending.clone()]])
            .append_query_results([[auction.clone()]])
            .append_query_results([[certified]])
            .append_query_results([[notification_model(
                auction.seller_id,
                notification::INSPECTION_CERTIFIED,
            )]])
            .into_connection();
        let (publisher, recorder) = Recorder::publisher();

        let result = certify(&db, &publisher, pending.id).await?;

        assert!(result.certified);
        assert_eq!(
            recorder.names(),
            ["inspection_certified", "notification_created"]
        );

        Ok(())
    }
}
