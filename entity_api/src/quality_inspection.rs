use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{quality_inspections::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
    TryIntoModel,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    inspector_id: Id,
    inspection_model: Model,
) -> Result<Model, Error> {
    debug!(
        "New Quality Inspection Model to be inserted: {:?}",
        inspection_model
    );

    let now = Utc::now();

    let inspection_active_model: ActiveModel = ActiveModel {
        auction_id: Set(inspection_model.auction_id),
        inspector_id: Set(inspector_id),
        grade: Set(inspection_model.grade),
        moisture_per_mille: Set(inspection_model.moisture_per_mille),
        kor_lbs: Set(inspection_model.kor_lbs),
        notes: Set(inspection_model.notes),
        certified: Set(false),
        certified_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(inspection_active_model.insert(db).await?)
}

/// Updates the measured values. Certification state is left untouched.
pub async fn update(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let inspection = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(inspection.id),
        auction_id: Unchanged(inspection.auction_id),
        inspector_id: Unchanged(inspection.inspector_id),
        grade: Set(model.grade),
        moisture_per_mille: Set(model.moisture_per_mille),
        kor_lbs: Set(model.kor_lbs),
        notes: Set(model.notes),
        certified: Unchanged(inspection.certified),
        certified_at: Unchanged(inspection.certified_at),
        created_at: Unchanged(inspection.created_at),
        updated_at: Set(Utc::now().into()),
    };
    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn certify(db: &impl ConnectionTrait, inspection: Model) -> Result<Model, Error> {
    debug!("Certifying quality inspection {}", inspection.id);

    let now = Utc::now();
    let mut active_model: ActiveModel = inspection.into();
    active_model.certified = Set(true);
    active_model.certified_at = Set(Some(now.into()));
    active_model.updated_at = Set(now.into());
    Ok(active_model.update(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_auction(
    db: &impl ConnectionTrait,
    auction_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AuctionId.eq(auction_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn certify_marks_the_inspection_certified() -> Result<(), Error> {
        let now = Utc::now();
        let inspection = Model {
            id: Id::new_v4(),
            auction_id: Id::new_v4(),
            inspector_id: Id::new_v4(),
            grade: "W240".to_owned(),
            moisture_per_mille: 80,
            kor_lbs: 48,
            notes: None,
            certified: false,
            certified_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let certified = Model {
            certified: true,
            certified_at: Some(now.into()),
            ..inspection.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[certified.clone()]])
            .into_connection();

        let result = certify(&db, inspection).await?;

        assert!(result.certified);
        assert!(result.certified_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn find_by_auction_filters_on_auction_id() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let auction_id = Id::new_v4();
        let _ = find_by_auction(&db, auction_id).await?;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "quality_inspections"."id", "quality_inspections"."auction_id", "quality_inspections"."inspector_id", "quality_inspections"."grade", "quality_inspections"."moisture_per_mille", "quality_inspections"."kor_lbs", "quality_inspections"."notes", "quality_inspections"."certified", "quality_inspections"."certified_at", "quality_inspections"."created_at", "quality_inspections"."updated_at" FROM "cashew_market"."quality_inspections" WHERE "quality_inspections"."auction_id" = $1 ORDER BY "quality_inspections"."created_at" DESC"#,
                [auction_id.into()]
            )]
        );

        Ok(())
    }
}
