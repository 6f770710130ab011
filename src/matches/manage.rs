use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::User,
    matches::{
        Match, TeamIndex,
        form::{MatchFields, MatchForm, MatchInput},
    },
    schema::{match_summaries, matches},
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    widgets::{actions::Actions, alert::ErrorAlert},
};

pub async fn matches_page(user: User<true>, mut conn: Conn<true>) -> StandardResponse {
    let all = Match::all(&mut *conn)?;
    let teams = TeamIndex::load(&mut *conn)?;
    let summarised: Vec<String> = match_summaries::table
        .select(match_summaries::match_id)
        .load::<Option<String>>(&mut *conn)?
        .into_iter()
        .flatten()
        .collect();

    success(
        Page::new()
            .user(user)
            .active_nav("matches")
            .body(maud! {
                h1 { "Matches" }
                Actions options=(&[
                    ("/dashboard/matches/new", "New match"),
                    ("/dashboard/matches/import", "Import"),
                    ("/dashboard/matches/export.csv", "Export CSV"),
                ]);
                @if all.is_empty() {
                    p class="text-muted" { "No matches yet. Import a fixture file to get started." }
                } @else {
                    table class="table table-hover align-middle" {
                        thead {
                            tr {
                                th scope="col" { "Date" }
                                th scope="col" { "Division" }
                                th scope="col" { "#" }
                                th scope="col" { "Home" }
                                th scope="col" { "Away" }
                                th scope="col" { "Score" }
                                th scope="col" { "Location" }
                                th scope="col" { "" }
                            }
                        }
                        tbody {
                            @for m in &all {
                                tr {
                                    td { (m.date.format("%d/%m/%Y %H:%M").to_string()) }
                                    td { (m.division.as_deref().unwrap_or("")) }
                                    td { (m.match_number.as_deref().unwrap_or("")) }
                                    td { (teams.name(m.home_team_id.as_deref())) }
                                    td { (teams.name(m.away_team_id.as_deref())) }
                                    td { (m.score().unwrap_or_default()) }
                                    td { (m.location.as_deref().unwrap_or("")) }
                                    td class="text-end text-nowrap" {
                                        a class="me-3" href=(format!("/dashboard/matches/{}/edit", m.id)) { "Edit" }
                                        @if summarised.contains(&m.id) {
                                            a href=(format!("/dashboard/matches/{}/summary", m.id)) { "View summary" }
                                        } @else {
                                            a href=(format!("/dashboard/matches/{}/summary", m.id)) { "Write summary" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

fn match_form_page(
    user: User<true>,
    title: &str,
    error: Option<String>,
    form: &MatchForm,
    teams: &[Team],
) -> hypertext::Rendered<String> {
    Page::new()
        .user(user)
        .active_nav("matches")
        .body(maud! {
            div class="card" {
                div class="card-body" {
                    h1 class="card-title" { (title) }
                    @if let Some(error) = &error {
                        ErrorAlert msg=(error);
                    }
                    form method="post" {
                        (MatchFields { form, teams })
                        button type="submit" class="btn btn-primary" { "Save" }
                    }
                }
            }
        })
        .render()
}

pub async fn create_match_page(user: User<true>, mut conn: Conn<true>) -> StandardResponse {
    let teams = Team::all(&mut *conn)?;
    success(match_form_page(
        user,
        "New match",
        None,
        &MatchForm::default(),
        &teams,
    ))
}

pub async fn do_create_match(
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<MatchForm>,
) -> StandardResponse {
    let index = TeamIndex::load(&mut *conn)?;

    let input = match form.validate(&index) {
        Ok(input) => input,
        Err(e) => {
            let teams = Team::all(&mut *conn)?;
            return bad_request(match_form_page(user, "New match", Some(e), &form, &teams));
        }
    };

    let id = Uuid::now_v7().to_string();
    let MatchInput {
        date,
        division,
        match_number,
        home_team_id,
        away_team_id,
        home_score,
        away_score,
        location,
    } = input;

    diesel::insert_into(matches::table)
        .values((
            matches::id.eq(&id),
            matches::date.eq(date),
            matches::home_team_id.eq(home_team_id),
            matches::away_team_id.eq(away_team_id),
            matches::home_score.eq(home_score),
            matches::away_score.eq(away_score),
            matches::location.eq(location),
            matches::division.eq(division),
            matches::match_number.eq(match_number),
            matches::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;
    tracing::debug!("created match {id}");

    see_other_ok(Redirect::to("/dashboard/matches"))
}

pub async fn edit_match_page(
    Path(match_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let m = Match::fetch(&match_id, &mut *conn)?;
    let teams = Team::all(&mut *conn)?;

    success(match_form_page(
        user,
        "Edit match",
        None,
        &MatchForm::from_match(&m),
        &teams,
    ))
}

pub async fn do_edit_match(
    Path(match_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<MatchForm>,
) -> StandardResponse {
    let m = Match::fetch(&match_id, &mut *conn)?;
    let index = TeamIndex::load(&mut *conn)?;

    let input = match form.validate(&index) {
        Ok(input) => input,
        Err(e) => {
            let teams = Team::all(&mut *conn)?;
            return bad_request(match_form_page(user, "Edit match", Some(e), &form, &teams));
        }
    };

    diesel::update(matches::table.filter(matches::id.eq(&m.id)))
        .set((
            matches::date.eq(input.date),
            matches::home_team_id.eq(input.home_team_id),
            matches::away_team_id.eq(input.away_team_id),
            matches::home_score.eq(input.home_score),
            matches::away_score.eq(input.away_score),
            matches::location.eq(input.location),
            matches::division.eq(input.division),
            matches::match_number.eq(input.match_number),
        ))
        .execute(&mut *conn)?;

    see_other_ok(Redirect::to("/dashboard/matches"))
}
