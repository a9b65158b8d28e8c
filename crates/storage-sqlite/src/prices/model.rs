//! Database models for currency prices.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use pricekeeper_core::prices::{CurrencyRecord, PriceChange};

/// Row of the current-price table.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::currency_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyInfoDB {
    pub id: i32,
    pub currency_type: String,
    pub currency_price: String,
    pub create_datetime: NaiveDateTime,
    pub update_datetime: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::currency_info)]
pub struct NewCurrencyInfoDB {
    pub currency_type: String,
    pub currency_price: String,
    pub create_datetime: NaiveDateTime,
    pub update_datetime: NaiveDateTime,
}

/// Row of the append-only price-change log.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::currency_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyLogDB {
    pub id: i32,
    pub currency_type: String,
    pub original_price: String,
    pub new_price: String,
    pub create_datetime: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::currency_log)]
pub struct NewCurrencyLogDB {
    pub currency_type: String,
    pub original_price: String,
    pub new_price: String,
    pub create_datetime: NaiveDateTime,
}

impl NewCurrencyInfoDB {
    pub fn from_record(record: CurrencyRecord, now: NaiveDateTime) -> Self {
        Self {
            currency_type: record.currency_type,
            currency_price: record.currency_price,
            create_datetime: now,
            update_datetime: now,
        }
    }
}

// Conversion to domain models
impl From<CurrencyInfoDB> for CurrencyRecord {
    fn from(db: CurrencyInfoDB) -> Self {
        CurrencyRecord::from_store(db.currency_type, db.currency_price)
    }
}

impl From<CurrencyLogDB> for PriceChange {
    fn from(db: CurrencyLogDB) -> Self {
        Self {
            id: db.id,
            currency_type: db.currency_type,
            original_price: db.original_price,
            new_price: db.new_price,
            created_at: db.create_datetime,
        }
    }
}
