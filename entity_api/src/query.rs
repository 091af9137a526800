use crate::{error::Error, QueryFilterMap};
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// Find all records of an entity by the given query filter map.
pub async fn find_by<E, C>(
    db: &impl ConnectionTrait,
    query_filter_map: QueryFilterMap,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
{
    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    Ok(query.all(db).await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::{news, Id};
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction, Value};

    #[tokio::test]
    async fn find_by_filters_on_known_columns_and_ignores_others() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<news::Model>::new()])
            .into_connection();

        let author_id = Id::new_v4();
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "author_id".to_string(),
            Some(Value::Uuid(Some(Box::new(author_id)))),
        );
        query_filter_map.insert("not_a_column".to_string(), Some(Value::from("ignored")));

        let _ = find_by::<news::Entity, news::Column>(&db, query_filter_map).await?;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "news"."id", "news"."author_id", "news"."title", "news"."body", "news"."created_at", "news"."updated_at" FROM "cashew_market"."news" WHERE "news"."author_id" = $1"#,
                [author_id.into()]
            )]
        );

        Ok(())
    }
}
