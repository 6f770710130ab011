use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    schema::{matches, teams},
    state::Conn,
    summaries::MatchSummary,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::{actions::Actions, stat_card::StatCard},
};

pub async fn dashboard_page(user: User<true>, mut conn: Conn<true>) -> StandardResponse {
    let match_count: i64 = matches::table.count().get_result(&mut *conn)?;
    let team_count: i64 = teams::table.count().get_result(&mut *conn)?;
    let summary_count = MatchSummary::count(&mut *conn)?;

    tracing::trace!(match_count, team_count, summary_count, "dashboard counts");

    let username = user.username.clone();

    success(
        Page::new()
            .user(user)
            .active_nav("dashboard")
            .body(maud! {
                h1 { "Welcome, " (username) }
                div class="row g-3 mt-2" {
                    StatCard
                        title=("Matches")
                        count=(match_count)
                        caption=("All matches")
                        href=("/dashboard/matches");
                    StatCard
                        title=("Teams")
                        count=(team_count)
                        caption=("Teams & coaches")
                        href=("/dashboard/teams");
                    StatCard
                        title=("Summaries")
                        count=(summary_count)
                        caption=("Write a summary")
                        href=("/dashboard/matches");
                }
                Actions options=(&[
                    ("/dashboard/matches/import", "Import matches"),
                    ("/dashboard/matches/new", "New match"),
                ]);
            })
            .render(),
    )
}
