use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
};
use hypertext::prelude::*;

use crate::{
    auth::User,
    coaches::Coach,
    matches::{Match, TeamIndex},
    state::Conn,
    storage::ObjectStore,
    summaries::{MatchSummary, SummaryInput, card::SummaryCard},
    template::Page,
    upload::MultipartForm,
    util_resp::{FailureResponse, StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

const VISUAL_EXTENSIONS: &[&str] = &["png"];

/// Keeps the preview close to the exported square visual.
const CARD_STYLE: &str = "#summary-card { aspect-ratio: 1 / 1; overflow: hidden; } \
                          #summary-card p { font-size: 0.95rem; }";

struct SummaryFields<'a> {
    coaches: &'a [Coach],
    coach_id: &'a str,
    summary: &'a str,
}

impl Renderable for SummaryFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="mb-3" {
                label for="coach" class="form-label" { "Coach" }
                select class="form-select" id="coach" name="coach_id" {
                    option value="" { "No coach" }
                    @for coach in self.coaches {
                        @if coach.id == self.coach_id {
                            option value=(coach.id) selected { (coach.name) }
                        } @else {
                            option value=(coach.id) { (coach.name) }
                        }
                    }
                }
            }
            div class="mb-3" {
                label for="summary" class="form-label" { "Summary" }
                textarea class="form-control" id="summary" name="summary" rows="8" { (self.summary) }
                div class="form-text" { "Each line becomes a paragraph of the visual." }
            }
            div class="mb-3" {
                label for="visual" class="form-label" { "Rendered visual (PNG)" }
                input type="file" class="form-control" id="visual" name="visual" accept="image/png";
            }
        }
        .render_to(buffer);
    }
}

/// Everything the summary page shows about one match.
struct SummaryContext {
    m: Match,
    teams: TeamIndex,
    coaches: Vec<Coach>,
    summary: Option<MatchSummary>,
}

impl SummaryContext {
    fn load(
        match_id: &str,
        conn: &mut Conn<true>,
    ) -> Result<SummaryContext, FailureResponse> {
        let m = Match::fetch(match_id, &mut **conn)?;
        Ok(SummaryContext {
            teams: TeamIndex::load(&mut **conn)?,
            coaches: Coach::all(&mut **conn)?,
            summary: MatchSummary::for_match(&m.id, &mut **conn)?,
            m,
        })
    }

    fn render(
        &self,
        user: User<true>,
        error: Option<String>,
        coach_id: &str,
        summary: &str,
    ) -> hypertext::Rendered<String> {
        let ctx = self;
        let title = format!(
            "{} v {}",
            ctx.teams.name(ctx.m.home_team_id.as_deref()),
            ctx.teams.name(ctx.m.away_team_id.as_deref())
        );
        let coach = ctx.summary.as_ref().and_then(|s| {
            ctx.coaches
                .iter()
                .find(|c| Some(c.id.as_str()) == s.coach_id.as_deref())
        });

        Page::new_full()
            .user(user)
            .active_nav("matches")
            .extra_head(maud! {
                style { (CARD_STYLE) }
            })
            .body(maud! {
                h1 { "Match summary" }
                p class="text-muted" { (title) }
                @if let Some(error) = &error {
                    ErrorAlert msg=(error);
                }
                div class="row g-4" {
                    div class="col-lg-6" {
                        form method="post" enctype="multipart/form-data" {
                            (SummaryFields { coaches: &ctx.coaches, coach_id, summary })
                            button type="submit" class="btn btn-primary" { "Save summary" }
                        }
                    }
                    div class="col-lg-6" {
                        @if let Some(saved) = &ctx.summary {
                            (SummaryCard {
                                m: &ctx.m,
                                home: ctx.teams.get(ctx.m.home_team_id.as_deref()),
                                away: ctx.teams.get(ctx.m.away_team_id.as_deref()),
                                summary: saved,
                                coach,
                            })
                        } @else {
                            p class="text-muted" { "The preview appears once the summary is saved." }
                        }
                    }
                }
            })
            .render()
    }
}

pub async fn summary_page(
    Path(match_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let ctx = SummaryContext::load(&match_id, &mut conn)?;

    let coach_id = ctx
        .summary
        .as_ref()
        .and_then(|s| s.coach_id.clone())
        .unwrap_or_default();
    let summary = ctx
        .summary
        .as_ref()
        .and_then(|s| s.summary.clone())
        .unwrap_or_default();

    success(ctx.render(user, None, &coach_id, &summary))
}

pub async fn do_save_summary(
    Path(match_id): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    State(store): State<ObjectStore>,
    multipart: Multipart,
) -> StandardResponse {
    let ctx = SummaryContext::load(&match_id, &mut conn)?;
    let form = MultipartForm::read(multipart).await?;

    let coach_id = match form.text("coach_id").trim() {
        "" => None,
        id => Some(id.to_string()),
    };
    if let Some(id) = &coach_id {
        if !ctx.coaches.iter().any(|c| &c.id == id) {
            return bad_request(ctx.render(
                user,
                Some("That coach does not exist.".to_string()),
                "",
                form.text("summary"),
            ));
        }
    }

    let visual_url = match form.file("visual") {
        Some(file) => match store
            .put("summary-visuals", &file.file_name, &file.bytes, VISUAL_EXTENSIONS)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                return bad_request(ctx.render(
                    user,
                    Some(format!("Could not store the visual: {e}")),
                    form.text("coach_id"),
                    form.text("summary"),
                ));
            }
        },
        None => None,
    };

    let summary = match form.text("summary").trim() {
        "" => None,
        text => Some(text.to_string()),
    };

    let saved = MatchSummary::save(
        &ctx.m.id,
        SummaryInput {
            coach_id,
            summary,
            visual_url: visual_url.clone(),
        },
        &mut *conn,
    );
    if let (Err(_), Some(url)) = (&saved, &visual_url) {
        store.remove(url).await;
    }
    let id = saved?;
    tracing::debug!("saved summary {id} for match {}", ctx.m.id);

    see_other_ok(Redirect::to(&format!(
        "/dashboard/matches/{}/summary",
        ctx.m.id
    )))
}
