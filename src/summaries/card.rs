use hypertext::prelude::*;

use crate::{coaches::Coach, matches::Match, summaries::MatchSummary, teams::Team};

/// The file name suggested when downloading the visual of a match summary.
pub fn download_name(m: &Match) -> String {
    format!(
        "BCUS-{}-{}.png",
        m.division.as_deref().unwrap_or(""),
        m.date.format("%d-%m-%Y")
    )
}

struct TeamSide<'a> {
    team: Option<&'a Team>,
    score: Option<i64>,
}

impl Renderable for TeamSide<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let name = self.team.map(|team| team.name.as_str()).unwrap_or("TBD");
        let logo = self.team.and_then(|team| team.logo_url.as_deref());

        maud! {
            div class="col text-center" {
                @if let Some(logo) = logo {
                    img src=(logo) alt=(format!("{name} logo")) class="mb-2" style="height: 72px;";
                }
                div class="fw-semibold" { (name) }
                @if let Some(score) = self.score {
                    div class="display-5 fw-bold" { (score.to_string()) }
                }
            }
        }
        .render_to(buffer);
    }
}

/// Preview of the shareable summary visual.
pub struct SummaryCard<'a> {
    pub m: &'a Match,
    pub home: Option<&'a Team>,
    pub away: Option<&'a Team>,
    pub summary: &'a MatchSummary,
    pub coach: Option<&'a Coach>,
}

impl Renderable for SummaryCard<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="card shadow-sm" id="summary-card" style="max-width: 640px;" {
                div class="card-header d-flex justify-content-between" {
                    span class="badge text-bg-primary" { (self.m.division.as_deref().unwrap_or("")) }
                    span class="text-muted" { (self.m.date.format("%d/%m/%Y").to_string()) }
                }
                div class="card-body" {
                    div class="row align-items-center mb-3" {
                        (TeamSide { team: self.home, score: self.m.home_score })
                        div class="col-auto text-muted" { "vs" }
                        (TeamSide { team: self.away, score: self.m.away_score })
                    }
                    @for paragraph in self.summary.paragraphs() {
                        p { (paragraph) }
                    }
                    @if let Some(coach) = self.coach {
                        div class="d-flex align-items-center gap-2 mt-3" {
                            @if let Some(photo) = &coach.photo_url {
                                img src=(photo) alt=(coach.name) class="rounded-circle" style="height: 40px; width: 40px; object-fit: cover;";
                            }
                            span class="small text-muted" { "Coach " (coach.name) }
                        }
                    }
                }
                @if let Some(url) = &self.summary.visual_url {
                    div class="card-footer" {
                        a class="btn btn-sm btn-outline-primary" href=(url) download=(download_name(self.m)) { "Download visual" }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
