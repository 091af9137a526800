use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
struct CashewMarket;

const ENUM_TYPES: [(&str, &[&str]); 4] = [
    (
        "role",
        &[
            "producer",
            "transformer",
            "exporter",
            "carrier",
            "quality_inspector",
            "admin",
        ],
    ),
    ("auction_status", &["open", "closed", "cancelled"]),
    ("bid_status", &["pending", "accepted", "rejected"]),
    ("offer_status", &["pending", "accepted", "rejected", "cancelled"]),
];

#[derive(DeriveIden)]
enum Cooperatives {
    Table,
    Id,
    Name,
    Region,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    DisplayName,
    Phone,
    Password,
    Role,
    CooperativeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Auctions {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    Origin,
    QuantityKg,
    StartingPrice,
    Status,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    Id,
    AuctionId,
    BidderId,
    Amount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContractOffers {
    Table,
    Id,
    SenderId,
    RecipientId,
    Product,
    QuantityKg,
    PricePerKg,
    DeliveryDate,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QualityInspections {
    Table,
    Id,
    AuctionId,
    InspectorId,
    Grade,
    MoisturePerMille,
    KorLbs,
    Notes,
    Certified,
    CertifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum News {
    Table,
    Id,
    AuthorId,
    Title,
    Body,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Body,
    Read,
    CreatedAt,
}

fn id<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .uuid()
        .not_null()
        .primary_key()
        .default(Expr::cust("gen_random_uuid()"))
        .to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn enum_column<T: IntoIden>(column: T, type_name: &str, default: &str) -> ColumnDef {
    ColumnDef::new(column)
        .custom(Alias::new(format!("cashew_market.{type_name}")))
        .not_null()
        .default(default)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, values) in ENUM_TYPES {
            let values = values
                .iter()
                .map(|value| format!("'{value}'"))
                .collect::<Vec<_>>()
                .join(", ");
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "CREATE TYPE cashew_market.{name} AS ENUM ({values});"
                ))
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, Cooperatives::Table))
                    .if_not_exists()
                    .col(id(Cooperatives::Id))
                    .col(ColumnDef::new(Cooperatives::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Cooperatives::Region).string().not_null())
                    .col(ColumnDef::new(Cooperatives::Description).text())
                    .col(timestamp(Cooperatives::CreatedAt))
                    .col(timestamp(Cooperatives::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, Users::Table))
                    .if_not_exists()
                    .col(id(Users::Id))
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(enum_column(Users::Role, "role", "producer"))
                    .col(ColumnDef::new(Users::CooperativeId).uuid())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_cooperative_id")
                            .from(Users::Table, Users::CooperativeId)
                            .to((CashewMarket, Cooperatives::Table), Cooperatives::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, Auctions::Table))
                    .if_not_exists()
                    .col(id(Auctions::Id))
                    .col(ColumnDef::new(Auctions::SellerId).uuid().not_null())
                    .col(ColumnDef::new(Auctions::Title).string().not_null())
                    .col(ColumnDef::new(Auctions::Description).text())
                    .col(ColumnDef::new(Auctions::Origin).string())
                    .col(ColumnDef::new(Auctions::QuantityKg).integer().not_null())
                    .col(ColumnDef::new(Auctions::StartingPrice).big_integer().not_null())
                    .col(enum_column(Auctions::Status, "auction_status", "open"))
                    .col(ColumnDef::new(Auctions::EndsAt).timestamp_with_time_zone())
                    .col(timestamp(Auctions::CreatedAt))
                    .col(timestamp(Auctions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auctions_seller_id")
                            .from(Auctions::Table, Auctions::SellerId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, Bids::Table))
                    .if_not_exists()
                    .col(id(Bids::Id))
                    .col(ColumnDef::new(Bids::AuctionId).uuid().not_null())
                    .col(ColumnDef::new(Bids::BidderId).uuid().not_null())
                    .col(ColumnDef::new(Bids::Amount).big_integer().not_null())
                    .col(enum_column(Bids::Status, "bid_status", "pending"))
                    .col(timestamp(Bids::CreatedAt))
                    .col(timestamp(Bids::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_auction_id")
                            .from(Bids::Table, Bids::AuctionId)
                            .to((CashewMarket, Auctions::Table), Auctions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_bidder_id")
                            .from(Bids::Table, Bids::BidderId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("bids_auction_id_status")
                    .table((CashewMarket, Bids::Table))
                    .col(Bids::AuctionId)
                    .col(Bids::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, ContractOffers::Table))
                    .if_not_exists()
                    .col(id(ContractOffers::Id))
                    .col(ColumnDef::new(ContractOffers::SenderId).uuid().not_null())
                    .col(ColumnDef::new(ContractOffers::RecipientId).uuid().not_null())
                    .col(ColumnDef::new(ContractOffers::Product).string().not_null())
                    .col(ColumnDef::new(ContractOffers::QuantityKg).integer().not_null())
                    .col(ColumnDef::new(ContractOffers::PricePerKg).big_integer().not_null())
                    .col(ColumnDef::new(ContractOffers::DeliveryDate).date())
                    .col(ColumnDef::new(ContractOffers::Message).text())
                    .col(enum_column(ContractOffers::Status, "offer_status", "pending"))
                    .col(timestamp(ContractOffers::CreatedAt))
                    .col(timestamp(ContractOffers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_offers_sender_id")
                            .from(ContractOffers::Table, ContractOffers::SenderId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_offers_recipient_id")
                            .from(ContractOffers::Table, ContractOffers::RecipientId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, QualityInspections::Table))
                    .if_not_exists()
                    .col(id(QualityInspections::Id))
                    .col(ColumnDef::new(QualityInspections::AuctionId).uuid().not_null())
                    .col(ColumnDef::new(QualityInspections::InspectorId).uuid().not_null())
                    .col(ColumnDef::new(QualityInspections::Grade).string().not_null())
                    .col(
                        ColumnDef::new(QualityInspections::MoisturePerMille)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QualityInspections::KorLbs).integer().not_null())
                    .col(ColumnDef::new(QualityInspections::Notes).text())
                    .col(
                        ColumnDef::new(QualityInspections::Certified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(QualityInspections::CertifiedAt).timestamp_with_time_zone())
                    .col(timestamp(QualityInspections::CreatedAt))
                    .col(timestamp(QualityInspections::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quality_inspections_auction_id")
                            .from(QualityInspections::Table, QualityInspections::AuctionId)
                            .to((CashewMarket, Auctions::Table), Auctions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quality_inspections_inspector_id")
                            .from(QualityInspections::Table, QualityInspections::InspectorId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, News::Table))
                    .if_not_exists()
                    .col(id(News::Id))
                    .col(ColumnDef::new(News::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(News::Title).string().not_null())
                    .col(ColumnDef::new(News::Body).text().not_null())
                    .col(timestamp(News::CreatedAt))
                    .col(timestamp(News::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_news_author_id")
                            .from(News::Table, News::AuthorId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((CashewMarket, Notifications::Table))
                    .if_not_exists()
                    .col(id(Notifications::Id))
                    .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Body).text())
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Notifications::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to((CashewMarket, Users::Table), Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("notifications_user_id_created_at")
                    .table((CashewMarket, Notifications::Table))
                    .col(Notifications::UserId)
                    .col(Notifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children before parents
        for table in [
            Notifications::Table.into_iden(),
            News::Table.into_iden(),
            QualityInspections::Table.into_iden(),
            ContractOffers::Table.into_iden(),
            Bids::Table.into_iden(),
            Auctions::Table.into_iden(),
            Users::Table.into_iden(),
            Cooperatives::Table.into_iden(),
        ] {
            manager
                .drop_table(
                    Table::drop()
                        .table((CashewMarket.into_iden(), table))
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        }

        for (name, _) in ENUM_TYPES.iter().rev() {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP TYPE IF EXISTS cashew_market.{name};"))
                .await?;
        }

        Ok(())
    }
}
