use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::match_summaries;

pub mod card;
pub mod manage;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct MatchSummary {
    pub id: String,
    pub match_id: Option<String>,
    pub coach_id: Option<String>,
    pub summary: Option<String>,
    pub visual_url: Option<String>,
    pub created_at: NaiveDateTime,
}

/// The editable part of a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryInput {
    pub coach_id: Option<String>,
    pub summary: Option<String>,
    /// Only replaces the stored visual when set.
    pub visual_url: Option<String>,
}

impl MatchSummary {
    #[tracing::instrument(skip(conn))]
    pub fn for_match(
        match_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<MatchSummary>> {
        match_summaries::table
            .filter(match_summaries::match_id.eq(match_id))
            .first::<MatchSummary>(&mut *conn)
            .optional()
    }

    pub fn count(conn: &mut impl LoadConnection<Backend = Sqlite>) -> QueryResult<i64> {
        match_summaries::table.count().get_result(&mut *conn)
    }

    /// Writes the summary of `match_id`, creating it on first save.
    pub fn save(
        match_id: &str,
        input: SummaryInput,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<String> {
        match MatchSummary::for_match(match_id, &mut *conn)? {
            Some(existing) => {
                diesel::update(
                    match_summaries::table.filter(match_summaries::id.eq(&existing.id)),
                )
                .set((
                    match_summaries::coach_id.eq(input.coach_id),
                    match_summaries::summary.eq(input.summary),
                    match_summaries::visual_url.eq(input.visual_url.or(existing.visual_url)),
                ))
                .execute(&mut *conn)?;

                Ok(existing.id)
            }
            None => {
                let id = Uuid::now_v7().to_string();

                diesel::insert_into(match_summaries::table)
                    .values((
                        match_summaries::id.eq(&id),
                        match_summaries::match_id.eq(match_id),
                        match_summaries::coach_id.eq(input.coach_id),
                        match_summaries::summary.eq(input.summary),
                        match_summaries::visual_url.eq(input.visual_url),
                        match_summaries::created_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(&mut *conn)?;

                Ok(id)
            }
        }
    }

    /// The narrative split into paragraphs, without blank lines.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.summary
            .as_deref()
            .unwrap_or("")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coaches::Coach,
        matches::import::reconcile::import_matches,
        matches::Match,
        test::test_pool,
    };

    #[test]
    fn second_save_updates_and_keeps_visual() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        import_matches(
            "Division,Match,Home,Away,Date,Time,Location\n\
             U11F,53,BCUS A,BCUS B,12/10/2024,18:00,Gym",
            &mut *conn,
        )
        .unwrap();
        let m = Match::all(&mut *conn).unwrap().remove(0);
        let coach = Coach::insert("Sam", None, &mut *conn).unwrap();

        let first = MatchSummary::save(
            &m.id,
            SummaryInput {
                coach_id: Some(coach.clone()),
                summary: Some("Great game.".to_string()),
                visual_url: Some("/assets/summary-visuals/a.png".to_string()),
            },
            &mut *conn,
        )
        .unwrap();

        let second = MatchSummary::save(
            &m.id,
            SummaryInput {
                coach_id: None,
                summary: Some("Great game.\n\n  Well defended.  \n".to_string()),
                visual_url: None,
            },
            &mut *conn,
        )
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(MatchSummary::count(&mut *conn).unwrap(), 1);

        let saved = MatchSummary::for_match(&m.id, &mut *conn).unwrap().unwrap();
        assert_eq!(saved.coach_id, None);
        assert_eq!(
            saved.visual_url.as_deref(),
            Some("/assets/summary-visuals/a.png")
        );
        assert_eq!(saved.paragraphs(), vec!["Great game.", "Well defended."]);
    }
}
