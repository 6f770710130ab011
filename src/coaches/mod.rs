use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{schema::coaches, util_resp::FailureResponse};

pub mod manage;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Coach {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Coach {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        coach_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Coach, FailureResponse> {
        coaches::table
            .filter(coaches::id.eq(coach_id))
            .first::<Coach>(&mut *conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Coach>> {
        coaches::table
            .order_by(coaches::name.asc())
            .load::<Coach>(&mut *conn)
    }

    pub fn insert(
        name: &str,
        photo_url: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<String> {
        let id = Uuid::now_v7().to_string();

        diesel::insert_into(coaches::table)
            .values((
                coaches::id.eq(&id),
                coaches::name.eq(name),
                coaches::photo_url.eq(photo_url),
                coaches::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut *conn)?;

        Ok(id)
    }
}
