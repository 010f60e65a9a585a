use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the confirmation token table.
///
/// Only the columns touched by the expiration update are mapped.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "confirmation_token_detail")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub confirmation_token: String,
    pub expiration_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
