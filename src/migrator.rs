use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_medicines_table::Migration),
            Box::new(m20240101_000002_create_pharmacies_table::Migration),
            Box::new(m20240101_000003_create_pharmacy_inventory_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_medicines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_medicines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Medicines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Medicines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Medicines::Name).string().not_null())
                        .col(ColumnDef::new(Medicines::Dosage).string().null())
                        .col(ColumnDef::new(Medicines::Form).string().null())
                        .col(ColumnDef::new(Medicines::Description).string().null())
                        .col(ColumnDef::new(Medicines::Indications).json().not_null())
                        .col(
                            ColumnDef::new(Medicines::Contraindications)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Medicines::SideEffects).json().not_null())
                        .col(ColumnDef::new(Medicines::Manufacturer).string().null())
                        .col(
                            ColumnDef::new(Medicines::Availability)
                                .string_len(16)
                                .not_null()
                                .default("in_stock"),
                        )
                        .col(ColumnDef::new(Medicines::Price).decimal().null())
                        .col(
                            ColumnDef::new(Medicines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Medicines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_medicines_name")
                        .table(Medicines::Table)
                        .col(Medicines::Name)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Medicines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Medicines {
        Table,
        Id,
        Name,
        Dosage,
        Form,
        Description,
        Indications,
        Contraindications,
        SideEffects,
        Manufacturer,
        Availability,
        Price,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_pharmacies_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_pharmacies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pharmacies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Pharmacies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Pharmacies::Name).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Email).string().not_null())
                        .col(ColumnDef::new(Pharmacies::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Pharmacies::City).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Address).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Location).string().null())
                        .col(ColumnDef::new(Pharmacies::Phone).string().null())
                        .col(ColumnDef::new(Pharmacies::OpeningHours).string().null())
                        .col(ColumnDef::new(Pharmacies::Image).string().null())
                        .col(ColumnDef::new(Pharmacies::Description).string().null())
                        .col(ColumnDef::new(Pharmacies::Latitude).double().not_null())
                        .col(ColumnDef::new(Pharmacies::Longitude).double().not_null())
                        .col(
                            ColumnDef::new(Pharmacies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Pharmacies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pharmacies_email")
                        .table(Pharmacies::Table)
                        .col(Pharmacies::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pharmacies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Pharmacies {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        City,
        Address,
        Location,
        Phone,
        OpeningHours,
        Image,
        Description,
        Latitude,
        Longitude,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_pharmacy_inventory_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_pharmacy_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PharmacyInventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PharmacyInventory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::MedicineId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::PharmacyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PharmacyInventory::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(PharmacyInventory::Availability)
                                .string_len(16)
                                .not_null()
                                .default("in_stock"),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::LastRestocked)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PharmacyInventory::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Lookup paths: by medicine (public search) and by pharmacy (operator view)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pharmacy_inventory_medicine_id")
                        .table(PharmacyInventory::Table)
                        .col(PharmacyInventory::MedicineId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pharmacy_inventory_pharmacy_id")
                        .table(PharmacyInventory::Table)
                        .col(PharmacyInventory::PharmacyId)
                        .to_owned(),
                )
                .await?;

            // One stock line per (pharmacy, medicine) pair
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pharmacy_inventory_pharmacy_medicine")
                        .table(PharmacyInventory::Table)
                        .col(PharmacyInventory::PharmacyId)
                        .col(PharmacyInventory::MedicineId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PharmacyInventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum PharmacyInventory {
        Table,
        Id,
        MedicineId,
        PharmacyId,
        Stock,
        Price,
        Availability,
        LastRestocked,
        CreatedAt,
        UpdatedAt,
    }
}
