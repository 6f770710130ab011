use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
};
use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    coaches::Coach,
    schema::teams,
    state::Conn,
    storage::{IMAGE_EXTENSIONS, ObjectStore},
    teams::{Team, form::TeamForm, is_duplicate_name},
    template::Page,
    upload::MultipartForm,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::{has_length, has_no_delimiter},
    widgets::{actions::Actions, alert::ErrorAlert},
};

pub async fn teams_page(user: User<true>, mut conn: Conn<true>) -> StandardResponse {
    let teams = Team::all(&mut *conn)?;
    let coaches = Coach::all(&mut *conn)?;

    success(
        Page::new()
            .user(user)
            .active_nav("teams")
            .body(maud! {
                h1 { "Teams" }
                Actions options=(&[
                    ("/dashboard/teams/new", "New team"),
                    ("/dashboard/coaches/new", "New coach"),
                ]);
                @if teams.is_empty() {
                    p class="text-muted" { "No teams yet." }
                } @else {
                    table class="table align-middle" {
                        thead {
                            tr {
                                th { "" }
                                th { "Name" }
                                th { "Category" }
                                th { "" }
                            }
                        }
                        tbody {
                            @for team in &teams {
                                tr {
                                    td style="width: 48px;" {
                                        @if let Some(logo) = &team.logo_url {
                                            img src=(logo) alt=(format!("{} logo", team.name)) style="height: 32px;";
                                        }
                                    }
                                    td { (team.name) }
                                    td { span class="badge text-bg-secondary" { (team.category) } }
                                    td class="text-end" {
                                        a href=(format!("/dashboard/teams/{}/edit", team.id)) { "Edit" }
                                    }
                                }
                            }
                        }
                    }
                }

                h2 class="mt-5" { "Coaches" }
                @if coaches.is_empty() {
                    p class="text-muted" { "No coaches yet." }
                } @else {
                    ul class="list-group" {
                        @for coach in &coaches {
                            li class="list-group-item d-flex align-items-center gap-3" {
                                @if let Some(photo) = &coach.photo_url {
                                    img src=(photo) alt=(coach.name) class="rounded-circle" style="height: 40px; width: 40px; object-fit: cover;";
                                }
                                span class="flex-grow-1" { (coach.name) }
                                a href=(format!("/dashboard/coaches/{}/edit", coach.id)) { "Edit" }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

fn team_form_page(
    user: User<true>,
    title: &str,
    error: Option<String>,
    form: TeamForm,
) -> hypertext::Rendered<String> {
    Page::new()
        .user(user)
        .active_nav("teams")
        .body(maud! {
            div class="card" {
                div class="card-body" {
                    h1 class="card-title" { (title) }
                    @if let Some(error) = &error {
                        ErrorAlert msg=(error);
                    }
                    form method="post" enctype="multipart/form-data" {
                        (form)
                        button type="submit" class="btn btn-primary" { "Save" }
                    }
                }
            }
        })
        .render()
}

pub async fn create_team_page(user: User<true>) -> StandardResponse {
    success(team_form_page(user, "New team", None, TeamForm::new()))
}

/// The validated, trimmed contents of a submitted team form.
struct TeamInput {
    name: String,
    category: String,
    logo: Option<String>,
}

async fn read_team_form(
    form: &MultipartForm,
    store: &ObjectStore,
) -> Result<TeamInput, String> {
    let name = form.text("name").trim().to_string();
    let category = form.text("category").trim().to_string();

    has_length("Team name", &name, 1..=128)?;
    has_length("Category", &category, 1..=64)?;
    has_no_delimiter("Team name", &name)?;
    has_no_delimiter("Category", &category)?;

    let logo = match form.file("logo") {
        Some(file) => Some(
            store
                .put("team-logos", &file.file_name, &file.bytes, IMAGE_EXTENSIONS)
                .await
                .map_err(|e| format!("Could not store the logo: {e}"))?,
        ),
        None => None,
    };

    Ok(TeamInput {
        name,
        category,
        logo,
    })
}

/// Removes a logo uploaded with a form whose team was never saved.
async fn discard_logo(store: &ObjectStore, input: &TeamInput) {
    if let Some(url) = &input.logo {
        store.remove(url).await;
    }
}

pub async fn do_create_team(
    user: User<true>,
    mut conn: Conn<true>,
    State(store): State<ObjectStore>,
    multipart: Multipart,
) -> StandardResponse {
    let form = MultipartForm::read(multipart).await?;

    let input = match read_team_form(&form, &store).await {
        Ok(input) => input,
        Err(e) => {
            let retry = TeamForm::new()
                .with_name(form.text("name"))
                .with_category(form.text("category"));
            return bad_request(team_form_page(user, "New team", Some(e), retry));
        }
    };

    let inserted = Team::insert(
        &input.name,
        &input.category,
        input.logo.as_deref(),
        &mut *conn,
    );
    if inserted.is_err() {
        discard_logo(&store, &input).await;
    }

    match inserted {
        Ok(id) => {
            tracing::debug!("created team {id}");
            see_other_ok(Redirect::to("/dashboard/teams"))
        }
        Err(e) if is_duplicate_name(&e) => {
            let retry = TeamForm::new()
                .with_name(&input.name)
                .with_category(&input.category);
            bad_request(team_form_page(
                user,
                "New team",
                Some(format!("A team called {} already exists.", input.name)),
                retry,
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_team_page(
    Path(team_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;

    let form = TeamForm::new()
        .with_name(&team.name)
        .with_category(&team.category)
        .with_logo(team.logo_url.as_deref());

    success(team_form_page(user, "Edit team", None, form))
}

pub async fn do_edit_team(
    Path(team_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    State(store): State<ObjectStore>,
    multipart: Multipart,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    let form = MultipartForm::read(multipart).await?;

    let input = match read_team_form(&form, &store).await {
        Ok(input) => input,
        Err(e) => {
            let retry = TeamForm::new()
                .with_name(form.text("name"))
                .with_category(form.text("category"))
                .with_logo(team.logo_url.as_deref());
            return bad_request(team_form_page(user, "Edit team", Some(e), retry));
        }
    };

    // keep the current logo unless a new one was uploaded
    let logo_url = input.logo.clone().or(team.logo_url.clone());

    let updated = diesel::update(teams::table.filter(teams::id.eq(&team.id)))
        .set((
            teams::name.eq(&input.name),
            teams::category.eq(&input.category),
            teams::logo_url.eq(&logo_url),
        ))
        .execute(&mut *conn);
    if updated.is_err() {
        discard_logo(&store, &input).await;
    }

    match updated {
        Ok(_) => see_other_ok(Redirect::to("/dashboard/teams")),
        Err(e) if is_duplicate_name(&e) => {
            let retry = TeamForm::new()
                .with_name(&input.name)
                .with_category(&input.category)
                .with_logo(team.logo_url.as_deref());
            bad_request(team_form_page(
                user,
                "Edit team",
                Some(format!("A team called {} already exists.", input.name)),
                retry,
            ))
        }
        Err(e) => Err(e.into()),
    }
}
