use axum::http::StatusCode;
use diesel::prelude::*;

use crate::{
    matches::Match,
    schema::{coaches, teams},
    summaries::MatchSummary,
    teams::Team,
    test::{TestApp, assert_res_ok, body_text, location},
};

#[tokio::test]
async fn dashboard_requires_sign_in() {
    let app = TestApp::new();

    let response = app.get("/dashboard", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");

    let response = app.get("/dashboard/matches/import", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn signed_in_users_skip_the_login_page() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app.get("/", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/dashboard");

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Welcome, admin"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new();
    app.sign_in().await;

    let response = app
        .post_form("/login", None, &[("id", "admin"), ("password", "nope")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn team_names_are_unique_ignoring_case() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app
        .post_multipart(
            "/dashboard/teams/new",
            &cookie,
            &[("name", "BCUS A"), ("category", "U11F")],
            &[("logo", "crest.png", &b"fake logo"[..])],
        )
        .await;
    assert_res_ok!(response);

    let response = app
        .post_multipart(
            "/dashboard/teams/new",
            &cookie,
            &[("name", "bcus a"), ("category", "U13M")],
            &[("logo", "other.png", &b"other logo"[..])],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("already exists"));

    // the rejected team's logo is not left behind
    assert_eq!(app.stored_files("team-logos"), 1);

    let mut conn = app.pool.get().unwrap();
    let all = Team::all(&mut conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].category, "U11F");

    let logo = all[0].logo_url.clone().unwrap();
    drop(conn);
    let response = app.get(&logo, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await.as_bytes(), b"fake logo");
}

#[tokio::test]
async fn team_form_validates_lengths() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let long = "x".repeat(129);
    let response = app
        .post_multipart(
            "/dashboard/teams/new",
            &cookie,
            &[("name", long.as_str()), ("category", "U11F")],
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut conn = app.pool.get().unwrap();
    let count: i64 = teams::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn team_names_may_not_contain_commas() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app
        .post_multipart(
            "/dashboard/teams/new",
            &cookie,
            &[("name", "Lions, Seniors"), ("category", "U11F")],
            &[("logo", "crest.png", &b"fake logo"[..])],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_text(response)
            .await
            .contains("Team name may not contain")
    );
    assert_eq!(app.stored_files("team-logos"), 0);

    let response = app
        .post_multipart(
            "/dashboard/teams/new",
            &cookie,
            &[("name", "Lions"), ("category", "Seniors, U18")],
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut conn = app.pool.get().unwrap();
    let count: i64 = teams::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn failed_coach_insert_leaves_no_photo() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    {
        let mut conn = app.pool.get().unwrap();
        diesel::sql_query(
            "CREATE TRIGGER refuse_coaches BEFORE INSERT ON coaches \
             BEGIN SELECT RAISE(ABORT, 'no new coaches'); END",
        )
        .execute(&mut conn)
        .unwrap();
    }

    let response = app
        .post_multipart(
            "/dashboard/coaches/new",
            &cookie,
            &[("name", "Sam Coach")],
            &[("photo", "sam.jpg", &b"photo"[..])],
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.stored_files("coach-photos"), 0);
}

#[tokio::test]
async fn failed_registration_explains_why() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/register",
            None,
            &[
                ("username", "admin"),
                ("email", "admin@club.test"),
                ("password", "password"),
                ("password2", "different"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_text(response)
            .await
            .contains("The two passwords do not match.")
    );
}

#[tokio::test]
async fn create_and_edit_match() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let home = {
        let mut conn = app.pool.get().unwrap();
        Team::insert("BCUS A", "U11F", None, &mut conn).unwrap()
    };

    let response = app
        .post_form(
            "/dashboard/matches/new",
            Some(&cookie),
            &[
                ("date", "2024-10-12"),
                ("time", "18:00"),
                ("division", "U11F"),
                ("match_number", "53"),
                ("home_team_id", home.as_str()),
                ("away_team_id", ""),
                ("home_score", ""),
                ("away_score", ""),
                ("location", "Gym"),
            ],
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/dashboard/matches");

    let created = {
        let mut conn = app.pool.get().unwrap();
        Match::all(&mut conn).unwrap().remove(0)
    };
    assert_eq!(created.home_team_id.as_deref(), Some(home.as_str()));
    assert_eq!(created.away_team_id, None);

    let response = app
        .post_form(
            &format!("/dashboard/matches/{}/edit", created.id),
            Some(&cookie),
            &[
                ("date", "2024-10-12"),
                ("time", "18:00"),
                ("division", "U11F"),
                ("match_number", "53"),
                ("home_team_id", home.as_str()),
                ("home_score", "54"),
                ("away_score", "12"),
                ("location", "Gym"),
            ],
        )
        .await;
    assert_res_ok!(response);

    let response = app
        .post_form(
            &format!("/dashboard/matches/{}/edit", created.id),
            Some(&cookie),
            &[("date", "2024-10-12"), ("home_score", "lots")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/dashboard/matches", Some(&cookie)).await;
    let page = body_text(response).await;
    assert!(page.contains("54 - 12"));
    assert!(page.contains("TBD"));
}

#[tokio::test]
async fn unknown_match_is_not_found() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app
        .get("/dashboard/matches/does-not-exist/summary", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_saves_and_previews() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app
        .post_multipart(
            "/dashboard/coaches/new",
            &cookie,
            &[("name", "Sam Coach")],
            &[],
        )
        .await;
    assert_res_ok!(response);

    let (match_id, coach_id) = {
        let mut conn = app.pool.get().unwrap();
        crate::matches::import::reconcile::import_matches(
            "Division,Match,Home,Away,Date,Time,Location\n\
             U11F,53,BCUS A,BCUS B,12/10/2024,18:00,Gym",
            &mut conn,
        )
        .unwrap();
        let coach_id: String = coaches::table
            .select(coaches::id)
            .first(&mut conn)
            .unwrap();
        (Match::all(&mut conn).unwrap().remove(0).id, coach_id)
    };

    let uri = format!("/dashboard/matches/{match_id}/summary");

    let response = app.get(&uri, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("BCUS A v BCUS B"));

    let response = app
        .post_multipart(
            &uri,
            &cookie,
            &[
                ("coach_id", coach_id.as_str()),
                ("summary", "A close first half.\n\nWe pulled away late."),
            ],
            &[("visual", "card.png", &b"png bytes"[..])],
        )
        .await;
    assert!(response.status().is_redirection());

    let response = app.get(&uri, Some(&cookie)).await;
    let page = body_text(response).await;
    assert!(page.contains("Sam Coach"));
    assert!(page.contains("We pulled away late."));
    assert!(page.contains("BCUS-U11F-12-10-2024.png"));

    let response = app.get("/dashboard/matches", Some(&cookie)).await;
    let page = body_text(response).await;
    assert!(page.contains("View summary"));
    assert!(!page.contains("Write summary"));

    // a visual must be a PNG
    let response = app
        .post_multipart(
            &uri,
            &cookie,
            &[("summary", "Rewritten.")],
            &[("visual", "card.gif", &b"gif bytes"[..])],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut conn = app.pool.get().unwrap();
    let saved = MatchSummary::for_match(&match_id, &mut conn).unwrap().unwrap();
    assert_eq!(saved.coach_id.as_deref(), Some(coach_id.as_str()));
    assert_eq!(
        saved.paragraphs(),
        vec!["A close first half.", "We pulled away late."]
    );
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app.post_form("/logout", Some(&cookie), &[]).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");

    let cleared = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cleared.starts_with("bcus_session="));
}
