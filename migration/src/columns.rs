//! Column builders shared by every table.

use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Audit {
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

pub fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

pub fn created_at() -> ColumnDef {
    ColumnDef::new(Audit::CreatedAt)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

pub fn updated_at() -> ColumnDef {
    ColumnDef::new(Audit::UpdatedAt)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// Soft-delete marker; rows with a value are hidden from every query.
pub fn deleted_at() -> ColumnDef {
    ColumnDef::new(Audit::DeletedAt)
        .timestamp_with_time_zone()
        .null()
        .to_owned()
}
