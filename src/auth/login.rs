use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{Form, Query},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{User, clear_login_cookie, set_login_cookie},
    schema::users,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

struct LoginFormFields<'a> {
    next: Option<&'a str>,
}

impl Renderable for LoginFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let action = match self.next {
            Some(next) => format!(
                "/login?{}",
                url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("next", next)
                    .finish()
            ),
            None => "/login".to_string(),
        };

        maud! {
            div class="row justify-content-center" {
                div class="col-md-6 col-lg-4" {
                    h1 class="h3 mb-3" { "Sign in" }
                    form method="post" action=(action) {
                        div class="mb-3" {
                            label for="id" class="form-label" { "Email or username" }
                            input type="text" class="form-control" id="id" name="id" required;
                        }
                        div class="mb-3" {
                            label for="password" class="form-label" { "Password" }
                            input type="password" class="form-control" id="password" name="password" required;
                        }
                        button type="submit" class="btn btn-primary w-100" { "Sign in" }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_page(
    user: Option<User<true>>,
    Query(query): Query<NextQuery>,
) -> StandardResponse {
    if user.is_some() {
        return see_other_ok(Redirect::to("/dashboard"));
    }

    success(
        Page::new()
            .body(LoginFormFields {
                next: query.next.as_deref(),
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    id: String,
    password: String,
}

/// Only same-site paths are honoured, so that `next` cannot be used to send
/// users to another site.
fn redirect_target(next: Option<&str>) -> String {
    let base = Url::parse("http://localhost/").ok();
    next.and_then(|next| base?.join(next).ok())
        .filter(|url| url.host_str() == Some("localhost"))
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| "/dashboard".to_string())
}

fn login_failed(msg: &'static str) -> StandardResponse {
    bad_request(
        Page::new()
            .body(maud! {
                ErrorAlert msg=(msg);
                (LoginFormFields { next: None })
            })
            .render(),
    )
}

pub async fn do_login(
    Query(query): Query<NextQuery>,
    mut conn: Conn<true>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, FailureResponse> {
    let user = match users::table
        .filter(users::email.eq(&form.id).or(users::username.eq(&form.id)))
        .first::<User<true>>(&mut *conn)
        .optional()?
    {
        Some(user) => user,
        None => {
            return login_failed("No such user exists. Please try again.")
                .map(IntoResponse::into_response);
        }
    };

    let verified = PasswordHash::new(&user.password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(form.password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false);

    if !verified {
        tracing::debug!("failed login attempt for {}", user.username);
        return login_failed("Incorrect password. Please try again.")
            .map(IntoResponse::into_response);
    }

    let jar = set_login_cookie(user.id, jar).map_err(|e| {
        tracing::error!("could not encode session: {e}");
        FailureResponse::ServerError(())
    })?;

    Ok((jar, Redirect::to(&redirect_target(query.next.as_deref())))
        .into_response())
}

pub async fn do_logout(jar: PrivateCookieJar) -> Response {
    (clear_login_cookie(jar), Redirect::to("/")).into_response()
}
