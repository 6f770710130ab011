use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::{
    extract::Form,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use diesel::{insert_into, prelude::*};
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::validation::*;
use crate::{
    auth::{User, set_login_cookie},
    schema::users,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

struct RegisterFields;

impl Renderable for RegisterFields {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            h1 {"Register"}
            form method="post" action="/register" class="mt-4" {
                div class="mb-3" {
                    label for="username" class="form-label" { "Username" }
                    input type="text" class="form-control" id="username" name="username" required;
                }
                div class="mb-3" {
                    label for="email" class="form-label" { "Email" }
                    input type="email" class="form-control" id="email" name="email" required;
                }
                div class="mb-3" {
                    label for="password" class="form-label" { "Password" }
                    input type="password" class="form-control" id="password" name="password" required;
                }
                div class="mb-3" {
                    label for="password2" class="form-label" { "Confirm Password" }
                    input type="password" class="form-control" id="password2" name="password2" required;
                }
                button type="submit" class="btn btn-primary" { "Register" }
            }
        }
        .render_to(buffer);
    }
}

pub async fn register_page(user: Option<User<true>>) -> StandardResponse {
    if user.is_some() {
        return see_other_ok(Redirect::to("/dashboard"));
    }

    success(Page::new().body(RegisterFields).render())
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    fn validate(&self) -> Result<(), String> {
        is_ascii_no_spaces(&self.username)?;
        if !User::<true>::validate_username(&self.username) {
            return Err("Usernames must be at least four letters or digits."
                .to_string());
        }
        is_valid_email(&self.email)?;
        if !User::<true>::validate_password(&self.password) {
            return Err(
                "Passwords must be at least six characters long.".to_string()
            );
        }
        if self.password != self.password2 {
            return Err("The two passwords do not match.".to_string());
        }
        Ok(())
    }
}

fn try_again(msg: String) -> StandardResponse {
    bad_request(
        Page::new()
            .body(maud! {
                ErrorAlert msg=(&msg);
                (RegisterFields)
            })
            .render(),
    )
}

pub async fn do_register(
    user: Option<User<true>>,
    mut conn: Conn<true>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, FailureResponse> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    if let Err(e) = form.validate() {
        return try_again(e).map(IntoResponse::into_response);
    }

    let existing = users::table
        .filter(
            users::username
                .eq(&form.username)
                .or(users::email.eq(&form.email)),
        )
        .first::<User<true>>(&mut *conn)
        .optional()?;

    if let Some(existing) = existing {
        let msg = if existing.email == form.email {
            "That email is already taken."
        } else {
            "That username is already taken."
        };
        return try_again(msg.to_string()).map(IntoResponse::into_response);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("failed to hash password: {e}");
            FailureResponse::ServerError(())
        })?
        .to_string();

    let id = Uuid::now_v7().to_string();
    insert_into(users::table)
        .values((
            users::id.eq(&id),
            users::email.eq(&form.email),
            users::username.eq(&form.username),
            users::password_hash.eq(password_hash),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!("registered user {}", form.username);

    let jar = set_login_cookie(id, jar).map_err(|e| {
        tracing::error!("could not encode session: {e}");
        FailureResponse::ServerError(())
    })?;

    Ok((jar, Redirect::to("/dashboard")).into_response())
}
