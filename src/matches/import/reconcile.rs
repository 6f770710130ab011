//! Maps parsed import rows onto team and match records.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    matches::import::parse::{ImportRow, RowError, parse_rows},
    schema::{matches, teams},
    teams::Team,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("The file could not be read. Check that it is a CSV text file.")]
    Unreadable,

    #[error("No valid matches to import")]
    NothingToImport,

    #[error("{0}")]
    Store(#[from] diesel::result::Error),
}

/// Decodes an uploaded file.
pub fn read_upload(bytes: &[u8]) -> Result<&str, ImportError> {
    let text =
        std::str::from_utf8(bytes).map_err(|_| ImportError::Unreadable)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = matches)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewMatch {
    pub id: String,
    pub date: NaiveDateTime,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub location: Option<String>,
    pub division: Option<String>,
    pub match_number: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Resolves team names to team ids for the duration of one import.
///
/// Names are compared case-insensitively. A name that is not yet known is
/// created as a new team, and remembered, so that the rest of the batch
/// reuses it.
pub struct TeamResolver {
    by_name: HashMap<String, String>,
    created: usize,
}

impl TeamResolver {
    #[tracing::instrument(skip_all)]
    pub fn load(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Self> {
        let existing = teams::table
            .select((teams::id, teams::name))
            .load::<(String, String)>(&mut *conn)?;

        tracing::trace!("seeding resolver with {} teams", existing.len());

        Ok(TeamResolver {
            by_name: existing
                .into_iter()
                .map(|(id, name)| (name.to_lowercase(), id))
                .collect(),
            created: 0,
        })
    }

    /// Returns the id of the team called `name`, creating it (in `category`)
    /// if there is none. An empty name resolves to no team.
    pub fn resolve(
        &mut self,
        name: &str,
        category: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }

        let key = name.to_lowercase();
        if let Some(id) = self.by_name.get(&key) {
            return Ok(Some(id.clone()));
        }

        let id = Team::insert(name, category, None, &mut *conn)?;
        tracing::debug!("created team {name:?} ({category})");

        self.by_name.insert(key, id.clone());
        self.created += 1;

        Ok(Some(id))
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported(ImportRow),
    Skipped(RowError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub line: usize,
    pub outcome: RowOutcome,
}

#[derive(Debug)]
pub struct ImportReport {
    pub rows: Vec<RowReport>,
    pub imported: usize,
    pub teams_created: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.outcome, RowOutcome::Skipped(_)))
            .count()
    }
}

/// Imports every well-formed row of `text` as a match, creating teams as
/// required, and writes all the matches with a single insert.
///
/// Malformed rows are skipped and reported in the returned [`ImportReport`].
/// Teams are resolved only for rows that parsed, so a row with a bad date
/// never creates its home or away team. This should run inside a transaction: teams created before a failing
/// match insert are otherwise left behind.
#[tracing::instrument(skip_all)]
pub fn import_matches(
    text: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<ImportReport, ImportError> {
    let parsed = parse_rows(text);
    let mut resolver = TeamResolver::load(&mut *conn)?;

    let now = Utc::now().naive_utc();
    let mut records = Vec::new();
    let mut rows = Vec::with_capacity(parsed.len());

    for row in parsed {
        let outcome = match row.outcome {
            Ok(data) => {
                let home_team_id = resolver.resolve(
                    &data.home_team,
                    &data.division,
                    &mut *conn,
                )?;
                let away_team_id = resolver.resolve(
                    &data.away_team,
                    &data.division,
                    &mut *conn,
                )?;

                records.push(NewMatch {
                    id: Uuid::now_v7().to_string(),
                    date: data.date,
                    home_team_id,
                    away_team_id,
                    location: Some(data.location.clone()),
                    division: Some(data.division.clone()),
                    match_number: Some(data.match_number.clone()),
                    created_at: now,
                });

                RowOutcome::Imported(data)
            }
            Err(e) => {
                tracing::trace!("skipping line {}: {e}", row.line);
                RowOutcome::Skipped(e)
            }
        };

        rows.push(RowReport {
            line: row.line,
            outcome,
        });
    }

    if records.is_empty() {
        return Err(ImportError::NothingToImport);
    }

    let imported = diesel::insert_into(matches::table)
        .values(&records)
        .execute(&mut *conn)?;

    tracing::info!(
        imported,
        teams_created = resolver.created(),
        skipped = rows.len() - records.len(),
        "imported matches"
    );

    Ok(ImportReport {
        rows,
        imported,
        teams_created: resolver.created(),
    })
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::*;
    use crate::{matches::Match, test::test_pool};

    const HEADER: &str = "Division,Match,Home,Away,Date,Time,Location";

    fn team_names(conn: &mut SqliteConnection) -> Vec<String> {
        teams::table
            .order_by(teams::name.asc())
            .select(teams::name)
            .load(conn)
            .unwrap()
    }

    #[test]
    fn example_file_creates_match_and_both_teams() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        let report = import_matches(
            &format!("{HEADER}\nU11F,53,BCUS A,BCUS B,12/10/2024,18:00,Gym"),
            &mut *conn,
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.teams_created, 2);
        assert_eq!(team_names(&mut conn), vec!["BCUS A", "BCUS B"]);

        let imported = matches::table.load::<Match>(&mut *conn).unwrap();
        assert_eq!(imported.len(), 1);
        let m = &imported[0];
        assert_eq!(m.division.as_deref(), Some("U11F"));
        assert_eq!(m.match_number.as_deref(), Some("53"));
        assert_eq!(m.location.as_deref(), Some("Gym"));
        assert_eq!(
            m.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-10-12T18:00:00"
        );

        let home: String = teams::table
            .filter(teams::id.eq(m.home_team_id.as_ref().unwrap()))
            .select(teams::name)
            .first(&mut *conn)
            .unwrap();
        assert_eq!(home, "BCUS A");
        let away: Team = Team::fetch(m.away_team_id.as_ref().unwrap(), &mut *conn).unwrap();
        assert_eq!(away.name, "BCUS B");
        assert_eq!(away.category, "U11F");
    }

    #[test]
    fn names_resolve_case_insensitively_within_and_across_batches() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        let existing = Team::insert("Les Lions", "U13M", None, &mut *conn).unwrap();

        let report = import_matches(
            &format!(
                "{HEADER}\n\
                 U13M,1,les lions,Aigles,01/02/2025,10:00,Gym\n\
                 U13M,2,AIGLES,LES LIONS,08/02/2025,10:00,Gym\n\
                 U13M,3,aigles,Ours,15/02/2025,10:00,Gym"
            ),
            &mut *conn,
        )
        .unwrap();

        assert_eq!(report.imported, 3);
        assert_eq!(report.teams_created, 2);
        assert_eq!(team_names(&mut conn), vec!["Aigles", "Les Lions", "Ours"]);

        let rows = matches::table
            .order_by(matches::match_number.asc())
            .load::<Match>(&mut *conn)
            .unwrap();
        assert_eq!(rows[0].home_team_id.as_ref(), Some(&existing));
        assert_eq!(rows[1].away_team_id.as_ref(), Some(&existing));
        assert_eq!(rows[0].away_team_id, rows[1].home_team_id);
        assert_eq!(rows[1].home_team_id, rows[2].home_team_id);

        // importing again reuses every team
        let report = import_matches(
            &format!("{HEADER}\nU13M,4,OURS,aigles,22/02/2025,10:00,Gym"),
            &mut *conn,
        )
        .unwrap();
        assert_eq!(report.teams_created, 0);
        assert_eq!(team_names(&mut conn).len(), 3);
    }

    #[test]
    fn malformed_rows_are_reported_and_not_counted() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        let report = import_matches(
            &format!(
                "{HEADER}\n\
                 U11F,53,BCUS A,BCUS B\n\
                 U11F,54,BCUS C,BCUS D,2024-10-12,18:00,Gym\n\
                 U11F,55,BCUS A,BCUS E,19/10/2024,,Gym"
            ),
            &mut *conn,
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(
            report.rows[0],
            RowReport {
                line: 2,
                outcome: RowOutcome::Skipped(RowError::TooFewFields {
                    found: 4
                }),
            }
        );
        assert!(matches!(
            report.rows[1].outcome,
            RowOutcome::Skipped(RowError::InvalidDate { .. })
        ));
        assert!(matches!(report.rows[2].outcome, RowOutcome::Imported(_)));

        // teams only come from imported rows
        assert_eq!(team_names(&mut conn), vec!["BCUS A", "BCUS E"]);
        assert_eq!(matches::table.count().get_result::<i64>(&mut *conn).unwrap(), 1);
    }

    #[test]
    fn empty_team_names_resolve_to_no_team() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        import_matches(
            &format!("{HEADER}\nU9,1,,Visitors,01/03/2025,14:00"),
            &mut *conn,
        )
        .unwrap();

        let m = matches::table.first::<Match>(&mut *conn).unwrap();
        assert_eq!(m.home_team_id, None);
        assert!(m.away_team_id.is_some());
        assert_eq!(m.location.as_deref(), Some(""));
    }

    #[test]
    fn nothing_to_import_writes_nothing() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        for text in [
            HEADER.to_string(),
            String::new(),
            format!("{HEADER}\nU11F,53,A,B\nU11F,54,C,D,not a date"),
        ] {
            assert!(matches!(
                import_matches(&text, &mut *conn),
                Err(ImportError::NothingToImport)
            ));
        }

        assert!(team_names(&mut conn).is_empty());
        assert_eq!(matches::table.count().get_result::<i64>(&mut *conn).unwrap(), 0);
    }

    #[test]
    fn rejects_non_utf8_uploads() {
        assert!(matches!(
            read_upload(&[0xff, 0xfe, 0x00, b'a']),
            Err(ImportError::Unreadable)
        ));
        assert_eq!(read_upload("\u{feff}a,b".as_bytes()).unwrap(), "a,b");
    }

    #[test]
    fn resolver_creates_each_name_once() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        let mut resolver = TeamResolver::load(&mut *conn).unwrap();
        let a = resolver.resolve("Falcons", "U15F", &mut *conn).unwrap();
        let b = resolver.resolve("FALCONS", "U17F", &mut *conn).unwrap();
        let c = resolver.resolve("", "U15F", &mut *conn).unwrap();

        assert_eq!(a, b);
        assert_eq!(c, None);
        assert_eq!(resolver.created(), 1);
        assert_eq!(team_names(&mut conn), vec!["Falcons"]);
    }
}
