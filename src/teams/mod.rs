use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{schema::teams, util_resp::FailureResponse};

pub mod form;
pub mod manage;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub category: String,
    pub logo_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Team {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Team, FailureResponse> {
        let ret = teams::table
            .filter(teams::id.eq(team_id))
            .first::<Team>(&mut *conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()));

        tracing::trace!("ok? {}", ret.is_ok());

        ret
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Team>> {
        teams::table
            .order_by(teams::name.asc())
            .load::<Team>(&mut *conn)
    }

    /// Creates a team, returning its id.
    pub fn insert(
        name: &str,
        category: &str,
        logo_url: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<String> {
        let id = Uuid::now_v7().to_string();

        diesel::insert_into(teams::table)
            .values((
                teams::id.eq(&id),
                teams::name.eq(name),
                teams::category.eq(category),
                teams::logo_url.eq(logo_url),
                teams::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut *conn)?;

        Ok(id)
    }
}

/// Whether `e` is the store refusing a second team with the same name.
pub fn is_duplicate_name(e: &diesel::result::Error) -> bool {
    matches!(
        e,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::test_pool;

    #[test]
    fn team_names_are_unique_ignoring_case() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        Team::insert("BCUS A", "U11F", None, &mut *conn).unwrap();
        let err = Team::insert("bcus a", "U13F", None, &mut *conn).unwrap_err();

        assert!(is_duplicate_name(&err));
        assert_eq!(Team::all(&mut *conn).unwrap().len(), 1);
    }

    #[test]
    fn fetch_missing_team_is_not_found() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        assert!(matches!(
            Team::fetch("nope", &mut *conn),
            Err(FailureResponse::NotFound(()))
        ));
    }
}
