use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    matches::{Match, TeamIndex},
    teams::Team,
    validation::{has_no_delimiter, parse_score},
};

const NO_TEAM: &str = "";

/// The create/edit match form, as submitted.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct MatchForm {
    pub date: String,
    pub time: String,
    pub division: String,
    pub match_number: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: String,
    pub away_score: String,
    pub location: String,
}

/// A validated [`MatchForm`].
#[derive(Debug, PartialEq, Eq)]
pub struct MatchInput {
    pub date: NaiveDateTime,
    pub division: Option<String>,
    pub match_number: Option<String>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub location: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        value => Some(value.to_string()),
    }
}

impl MatchForm {
    pub fn from_match(m: &Match) -> Self {
        MatchForm {
            date: m.date.format("%Y-%m-%d").to_string(),
            time: m.date.format("%H:%M").to_string(),
            division: m.division.clone().unwrap_or_default(),
            match_number: m.match_number.clone().unwrap_or_default(),
            home_team_id: m.home_team_id.clone().unwrap_or_default(),
            away_team_id: m.away_team_id.clone().unwrap_or_default(),
            home_score: m.home_score.map(|s| s.to_string()).unwrap_or_default(),
            away_score: m.away_score.map(|s| s.to_string()).unwrap_or_default(),
            location: m.location.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, teams: &TeamIndex) -> Result<MatchInput, String> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Please enter a valid match date.".to_string())?;
        let time = match self.time.trim() {
            "" => NaiveTime::MIN,
            time => NaiveTime::parse_from_str(time, "%H:%M")
                .map_err(|_| "Please enter a valid time (HH:MM).".to_string())?,
        };

        has_no_delimiter("Division", &self.division)?;
        has_no_delimiter("Match number", &self.match_number)?;
        has_no_delimiter("Location", &self.location)?;

        let team = |id: &str, side: &str| -> Result<Option<String>, String> {
            match non_empty(id) {
                None => Ok(None),
                Some(id) => match teams.get(Some(&id)) {
                    Some(_) => Ok(Some(id)),
                    None => Err(format!("The {side} team does not exist.")),
                },
            }
        };

        Ok(MatchInput {
            date: date.and_time(time),
            division: non_empty(&self.division),
            match_number: non_empty(&self.match_number),
            home_team_id: team(&self.home_team_id, "home")?,
            away_team_id: team(&self.away_team_id, "away")?,
            home_score: parse_score("Home score", &self.home_score)?,
            away_score: parse_score("Away score", &self.away_score)?,
            location: non_empty(&self.location),
        })
    }
}

pub struct MatchFields<'a> {
    pub form: &'a MatchForm,
    pub teams: &'a [Team],
}

struct TeamSelect<'a> {
    name: &'static str,
    label: &'static str,
    selected: &'a str,
    teams: &'a [Team],
}

impl Renderable for TeamSelect<'_> {
    fn render_to(&self, buffer: &mut hypertext::Buffer) {
        maud! {
            label for=(self.name) class="form-label" { (self.label) }
            select class="form-select" id=(self.name) name=(self.name) {
                option value=(NO_TEAM) { "Not set" }
                @for team in self.teams {
                    @if team.id == self.selected {
                        option value=(team.id) selected { (team.name) }
                    } @else {
                        option value=(team.id) { (team.name) }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

impl Renderable for MatchFields<'_> {
    fn render_to(&self, buffer: &mut hypertext::Buffer) {
        let form = self.form;

        maud! {
            div class="row g-3 mb-3" {
                div class="col-md-4" {
                    label for="date" class="form-label" { "Match date" }
                    input type="date" class="form-control" id="date" name="date" required value=(form.date);
                }
                div class="col-md-2" {
                    label for="time" class="form-label" { "Time" }
                    input type="time" class="form-control" id="time" name="time" value=(form.time);
                }
                div class="col-md-3" {
                    label for="division" class="form-label" { "Division" }
                    input type="text" class="form-control" id="division" name="division" value=(form.division);
                }
                div class="col-md-3" {
                    label for="match_number" class="form-label" { "Match number" }
                    input type="text" class="form-control" id="match_number" name="match_number" value=(form.match_number);
                }
            }
            div class="row g-3 mb-3" {
                div class="col-md-6" {
                    (TeamSelect { name: "home_team_id", label: "Home team", selected: &form.home_team_id, teams: self.teams })
                }
                div class="col-md-6" {
                    (TeamSelect { name: "away_team_id", label: "Away team", selected: &form.away_team_id, teams: self.teams })
                }
            }
            div class="row g-3 mb-3" {
                div class="col-md-3" {
                    label for="home_score" class="form-label" { "Home score" }
                    input type="number" min="0" class="form-control" id="home_score" name="home_score" value=(form.home_score);
                }
                div class="col-md-3" {
                    label for="away_score" class="form-label" { "Away score" }
                    input type="number" min="0" class="form-control" id="away_score" name="away_score" value=(form.away_score);
                }
                div class="col-md-6" {
                    label for="location" class="form-label" { "Location" }
                    input type="text" class="form-control" id="location" name="location" value=(form.location);
                }
            }
        }
        .render_to(buffer);
    }
}
