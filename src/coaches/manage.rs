use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
};
use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    coaches::Coach,
    schema::coaches,
    state::Conn,
    storage::{IMAGE_EXTENSIONS, ObjectStore},
    template::Page,
    upload::MultipartForm,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::has_length,
    widgets::alert::ErrorAlert,
};

fn coach_form_page(
    user: User<true>,
    title: &str,
    error: Option<String>,
    name: &str,
    photo_url: Option<&str>,
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
                        div class="mb-3" {
                            label for="coachName" class="form-label" { "Name" }
                            input
                                type="text"
                                class="form-control"
                                id="coachName"
                                name="name"
                                maxlength="128"
                                required
                                value=(name);
                        }
                        div class="mb-3" {
                            label for="coachPhoto" class="form-label" { "Photo" }
                            @if let Some(url) = photo_url {
                                div class="mb-2" {
                                    img src=(url) alt="Current photo" class="rounded-circle" style="height: 64px; width: 64px; object-fit: cover;";
                                }
                            }
                            input
                                type="file"
                                class="form-control"
                                id="coachPhoto"
                                name="photo"
                                accept="image/*";
                        }
                        button type="submit" class="btn btn-primary" { "Save" }
                    }
                }
            }
        })
        .render()
}

pub async fn create_coach_page(user: User<true>) -> StandardResponse {
    success(coach_form_page(user, "New coach", None, "", None))
}

async fn read_coach_form(
    form: &MultipartForm,
    store: &ObjectStore,
) -> Result<(String, Option<String>), String> {
    let name = form.text("name").trim().to_string();
    has_length("Name", &name, 1..=128)?;

    let photo = match form.file("photo") {
        Some(file) => Some(
            store
                .put("coach-photos", &file.file_name, &file.bytes, IMAGE_EXTENSIONS)
                .await
                .map_err(|e| format!("Could not store the photo: {e}"))?,
        ),
        None => None,
    };

    Ok((name, photo))
}

pub async fn do_create_coach(
    user: User<true>,
    mut conn: Conn<true>,
    State(store): State<ObjectStore>,
    multipart: Multipart,
) -> StandardResponse {
    let form = MultipartForm::read(multipart).await?;

    let (name, photo) = match read_coach_form(&form, &store).await {
        Ok(input) => input,
        Err(e) => {
            return bad_request(coach_form_page(
                user,
                "New coach",
                Some(e),
                form.text("name"),
                None,
            ));
        }
    };

    let inserted = Coach::insert(&name, photo.as_deref(), &mut *conn);
    if let (Err(_), Some(url)) = (&inserted, &photo) {
        store.remove(url).await;
    }
    let id = inserted?;
    tracing::debug!("created coach {id}");

    see_other_ok(Redirect::to("/dashboard/teams"))
}

pub async fn edit_coach_page(
    Path(coach_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let coach = Coach::fetch(&coach_id, &mut *conn)?;

    success(coach_form_page(
        user,
        "Edit coach",
        None,
        &coach.name,
        coach.photo_url.as_deref(),
    ))
}

pub async fn do_edit_coach(
    Path(coach_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    State(store): State<ObjectStore>,
    multipart: Multipart,
) -> StandardResponse {
    let coach = Coach::fetch(&coach_id, &mut *conn)?;
    let form = MultipartForm::read(multipart).await?;

    let (name, photo) = match read_coach_form(&form, &store).await {
        Ok(input) => input,
        Err(e) => {
            return bad_request(coach_form_page(
                user,
                "Edit coach",
                Some(e),
                form.text("name"),
                coach.photo_url.as_deref(),
            ));
        }
    };

    let updated = diesel::update(coaches::table.filter(coaches::id.eq(&coach.id)))
        .set((
            coaches::name.eq(&name),
            coaches::photo_url.eq(photo.clone().or(coach.photo_url)),
        ))
        .execute(&mut *conn);
    if let (Err(_), Some(url)) = (&updated, &photo) {
        store.remove(url).await;
    }
    updated?;

    see_other_ok(Redirect::to("/dashboard/teams"))
}
