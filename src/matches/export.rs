//! Downloads the fixture list in the same column layout that the importer
//! accepts, so an export can be edited and imported again.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    auth::User,
    matches::{Match, TeamIndex, import::parse::DELIMITER},
    state::Conn,
    util_resp::FailureResponse,
};

const HEADER: [&str; 7] = ["Division", "Match", "Home", "Away", "Date", "Time", "Location"];

/// The importer splits on the delimiter and never unquotes, so a cell may
/// not contain one. Forms refuse such values; older rows are flattened here.
fn cell(value: &str) -> String {
    if !value.contains(DELIMITER) {
        return value.to_string();
    }
    tracing::warn!("exporting {value:?} without its delimiters");
    value
        .split(DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_csv(all: &[Match], teams: &TeamIndex) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for m in all {
        writer.write_record([
            cell(m.division.as_deref().unwrap_or("")),
            cell(m.match_number.as_deref().unwrap_or("")),
            cell(teams.name(m.home_team_id.as_deref())),
            cell(teams.name(m.away_team_id.as_deref())),
            m.date.format("%d/%m/%Y").to_string(),
            m.date.format("%H:%M").to_string(),
            cell(m.location.as_deref().unwrap_or("")),
        ])?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

pub async fn export_matches(
    _user: User<true>,
    mut conn: Conn<true>,
) -> Result<Response, FailureResponse> {
    let all = Match::all(&mut *conn)?;
    let teams = TeamIndex::load(&mut *conn)?;

    let body = write_csv(&all, &teams).map_err(|e| {
        tracing::error!("could not write match export: {e}");
        FailureResponse::ServerError(())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"matches.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
