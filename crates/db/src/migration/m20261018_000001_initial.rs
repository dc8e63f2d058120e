//! Initial schema: users, purchase requests and everything a request owns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("staff"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::Title)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchaseRequests::Description).text().not_null())
                    .col(
                        ColumnDef::new(PurchaseRequests::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(PurchaseRequests::Department).string_len(100))
                    .col(ColumnDef::new(PurchaseRequests::VendorName).string_len(200))
                    .col(ColumnDef::new(PurchaseRequests::Category).string_len(100))
                    .col(ColumnDef::new(PurchaseRequests::Urgency).string_len(20))
                    .col(
                        ColumnDef::new(PurchaseRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending_l1"),
                    )
                    .col(ColumnDef::new(PurchaseRequests::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(PurchaseRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_requests_created_by")
                            .from(PurchaseRequests::Table, PurchaseRequests::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_requests_status")
                    .table(PurchaseRequests::Table)
                    .col(PurchaseRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_requests_created_by")
                    .table(PurchaseRequests::Table)
                    .col(PurchaseRequests::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RequestItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RequestItems::RequestId).uuid().not_null())
                    .col(ColumnDef::new(RequestItems::ItemName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(RequestItems::Price)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestItems::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_items_request")
                            .from(RequestItems::Table, RequestItems::RequestId)
                            .to(PurchaseRequests::Table, PurchaseRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Approvals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Approvals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Approvals::RequestId).uuid().not_null())
                    .col(ColumnDef::new(Approvals::ApproverId).uuid().not_null())
                    .col(ColumnDef::new(Approvals::Level).small_integer().not_null())
                    .col(ColumnDef::new(Approvals::Decision).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Approvals::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Approvals::DecidedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approvals_request")
                            .from(Approvals::Table, Approvals::RequestId)
                            .to(PurchaseRequests::Table, PurchaseRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approvals_approver")
                            .from(Approvals::Table, Approvals::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One decision per level per request. Concurrent deciders race on this.
        manager
            .create_index(
                Index::create()
                    .name("uq_approvals_request_level")
                    .table(Approvals::Table)
                    .col(Approvals::RequestId)
                    .col(Approvals::Level)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachments::RequestId).uuid().not_null())
                    .col(ColumnDef::new(Attachments::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::StorageKey).string_len(500).not_null())
                    .col(ColumnDef::new(Attachments::ContentType).string_len(100))
                    .col(ColumnDef::new(Attachments::UploadedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Attachments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_request")
                            .from(Attachments::Table, Attachments::RequestId)
                            .to(PurchaseRequests::Table, PurchaseRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_uploaded_by")
                            .from(Attachments::Table, Attachments::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReceiptValidations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReceiptValidations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReceiptValidations::RequestId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReceiptValidations::ValidatedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptValidations::ReceiptStatus)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptValidations::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ReceiptValidations::ValidatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receipt_validations_request")
                            .from(ReceiptValidations::Table, ReceiptValidations::RequestId)
                            .to(PurchaseRequests::Table, PurchaseRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receipt_validations_validated_by")
                            .from(ReceiptValidations::Table, ReceiptValidations::ValidatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReceiptValidations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attachments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Approvals::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RequestItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseRequests::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    FullName,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchaseRequests {
    Table,
    Id,
    Title,
    Description,
    Amount,
    Quantity,
    Department,
    VendorName,
    Category,
    Urgency,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RequestItems {
    Table,
    Id,
    RequestId,
    ItemName,
    Price,
    Quantity,
}

#[derive(DeriveIden)]
enum Approvals {
    Table,
    Id,
    RequestId,
    ApproverId,
    Level,
    Decision,
    Comment,
    DecidedAt,
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    RequestId,
    FileName,
    StorageKey,
    ContentType,
    UploadedBy,
    UploadedAt,
}

#[derive(DeriveIden)]
enum ReceiptValidations {
    Table,
    Id,
    RequestId,
    ValidatedBy,
    ReceiptStatus,
    Comment,
    ValidatedAt,
}
