use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    schema::matches,
    teams::Team,
    util_resp::FailureResponse,
};

pub mod export;
pub mod form;
pub mod import;
pub mod manage;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Match {
    pub id: String,
    pub date: NaiveDateTime,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub location: Option<String>,
    pub division: Option<String>,
    pub match_number: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Match {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        match_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Match, FailureResponse> {
        matches::table
            .filter(matches::id.eq(match_id))
            .first::<Match>(&mut *conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    /// Most recent first.
    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Match>> {
        matches::table
            .order_by((matches::date.desc(), matches::match_number.asc()))
            .load::<Match>(&mut *conn)
    }

    pub fn score(&self) -> Option<String> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some(format!("{home} - {away}")),
            _ => None,
        }
    }
}

/// Teams indexed by id, used to show team names next to matches.
pub struct TeamIndex(HashMap<String, Team>);

impl TeamIndex {
    pub fn load(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Self> {
        Ok(TeamIndex(
            Team::all(&mut *conn)?
                .into_iter()
                .map(|team| (team.id.clone(), team))
                .collect(),
        ))
    }

    pub fn get(&self, id: Option<&str>) -> Option<&Team> {
        id.and_then(|id| self.0.get(id))
    }

    pub fn name(&self, id: Option<&str>) -> &str {
        self.get(id).map(|team| team.name.as_str()).unwrap_or("TBD")
    }
}
