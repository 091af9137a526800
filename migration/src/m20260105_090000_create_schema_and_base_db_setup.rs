use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the marketplace's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS cashew_market;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO cashew_market, public;")
            .await?;

        // Grant the application user everything it needs inside the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE cashew_market TO cashew;
                    GRANT ALL ON SCHEMA cashew_market TO cashew;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market GRANT ALL ON TABLES TO cashew;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market GRANT ALL ON SEQUENCES TO cashew;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market GRANT ALL ON FUNCTIONS TO cashew;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market REVOKE ALL ON FUNCTIONS FROM cashew;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market REVOKE ALL ON SEQUENCES FROM cashew;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA cashew_market REVOKE ALL ON TABLES FROM cashew;
                    REVOKE ALL ON SCHEMA cashew_market FROM cashew;
                    REVOKE ALL PRIVILEGES ON DATABASE cashew_market FROM cashew;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS cashew_market CASCADE;")
            .await?;

        Ok(())
    }
}
