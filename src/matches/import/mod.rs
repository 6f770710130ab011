//! Bulk import of fixtures from a CSV file.

use axum::extract::Multipart;
use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::import::{
        parse::{PREVIEW_ROWS, ParsedRow, data_lines, preview},
        reconcile::{ImportError, ImportReport, RowOutcome, import_matches, read_upload},
    },
    state::Conn,
    template::Page,
    upload::MultipartForm,
    util_resp::{StandardResponse, bad_request, success},
    widgets::alert::{ErrorAlert, SuccessAlert},
};

pub mod parse;
pub mod reconcile;

struct UploadForm;

impl Renderable for UploadForm {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            form method="post" action="/dashboard/matches/import" enctype="multipart/form-data" {
                div class="mb-3" {
                    label for="importFile" class="form-label" { "Fixture file" }
                    input type="file" class="form-control" id="importFile" name="file" accept=".csv,text/csv" required;
                    div class="form-text" {
                        "One match per line: Division, Match, Home, Away, Date (DD/MM/YYYY), Time (HH:MM), Location. "
                        "The first line is treated as a header."
                    }
                }
                div class="d-flex gap-2" {
                    button type="submit" class="btn btn-primary" { "Import" }
                    button type="submit" class="btn btn-outline-secondary" formaction="/dashboard/matches/import/preview" { "Preview" }
                }
            }
        }
        .render_to(buffer);
    }
}

fn import_form_page(user: User<true>, error: Option<String>) -> hypertext::Rendered<String> {
    Page::new()
        .user(user)
        .active_nav("import")
        .body(maud! {
            h1 { "Import matches" }
            @if let Some(error) = &error {
                ErrorAlert msg=(error);
            }
            (UploadForm)
        })
        .render()
}

pub async fn import_page(user: User<true>) -> StandardResponse {
    success(import_form_page(user, None))
}

struct PreviewTable<'a> {
    rows: &'a [ParsedRow],
}

impl Renderable for PreviewTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            table class="table table-sm" {
                thead {
                    tr {
                        th { "Line" }
                        th { "Division" }
                        th { "Match" }
                        th { "Home" }
                        th { "Away" }
                        th { "Date" }
                        th { "Location" }
                    }
                }
                tbody {
                    @for row in self.rows {
                        @match &row.outcome {
                            Ok(data) => {
                                tr {
                                    td { (row.line.to_string()) }
                                    td { (data.division) }
                                    td { (data.match_number) }
                                    td { (data.home_team) }
                                    td { (data.away_team) }
                                    td { (data.date.format("%d/%m/%Y %H:%M").to_string()) }
                                    td { (data.location) }
                                }
                            }
                            Err(e) => {
                                tr class="table-warning" {
                                    td { (row.line.to_string()) }
                                    td colspan="6" { "Will be skipped: " (e.to_string()) }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

async fn read_import_file(multipart: Multipart) -> Result<Vec<u8>, String> {
    let form = MultipartForm::read(multipart)
        .await
        .map_err(|_| ImportError::Unreadable.to_string())?;

    match form.file("file") {
        Some(file) => Ok(file.bytes.clone()),
        None => Err("Please choose a file to import.".to_string()),
    }
}

/// Shows how the first rows of the file would be read, without writing
/// anything.
pub async fn do_preview(user: User<true>, multipart: Multipart) -> StandardResponse {
    let bytes = match read_import_file(multipart).await {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(import_form_page(user, Some(e))),
    };
    let text = match read_upload(&bytes) {
        Ok(text) => text,
        Err(e) => return bad_request(import_form_page(user, Some(e.to_string()))),
    };

    let total = data_lines(text).count();
    let shown = preview(text);

    success(
        Page::new()
            .user(user)
            .active_nav("import")
            .body(maud! {
                h1 { "Import preview" }
                p class="text-muted" {
                    "The file contains " (total.to_string()) " data rows. "
                    @if total > PREVIEW_ROWS {
                        "The first " (PREVIEW_ROWS.to_string()) " are shown below. "
                    }
                    "Nothing has been imported yet."
                }
                @if shown.is_empty() {
                    ErrorAlert msg=(ImportError::NothingToImport);
                } @else {
                    (PreviewTable { rows: &shown })
                }
                (UploadForm)
            })
            .render(),
    )
}

struct ReportTable<'a> {
    report: &'a ImportReport,
}

impl Renderable for ReportTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            table class="table table-sm" {
                thead {
                    tr {
                        th { "Line" }
                        th { "Result" }
                    }
                }
                tbody {
                    @for row in &self.report.rows {
                        @match &row.outcome {
                            RowOutcome::Imported(data) => {
                                tr {
                                    td { (row.line.to_string()) }
                                    td {
                                        (format!(
                                            "Imported {} #{}: {} v {}",
                                            data.division,
                                            data.match_number,
                                            data.home_team,
                                            data.away_team
                                        ))
                                    }
                                }
                            }
                            RowOutcome::Skipped(e) => {
                                tr class="table-warning" {
                                    td { (row.line.to_string()) }
                                    td { "Skipped: " (e.to_string()) }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn do_import(
    user: User<true>,
    mut conn: Conn<true>,
    multipart: Multipart,
) -> StandardResponse {
    let bytes = match read_import_file(multipart).await {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(import_form_page(user, Some(e))),
    };

    // a failed import answers 400, which rolls back any teams it created
    let report = match read_upload(&bytes)
        .and_then(|text| import_matches(text, &mut *conn))
    {
        Ok(report) => report,
        Err(e) => {
            if let ImportError::Store(inner) = &e {
                tracing::warn!("import failed: {inner}");
            }
            return bad_request(import_form_page(user, Some(e.to_string())));
        }
    };

    success(
        Page::new()
            .user(user)
            .active_nav("import")
            .body(maud! {
                h1 { "Import complete" }
                SuccessAlert msg=(format!("{} matches imported", report.imported));
                p {
                    (format!(
                        "{} new teams were created. {} rows were skipped.",
                        report.teams_created,
                        report.skipped()
                    ))
                }
                (ReportTable { report: &report })
                a class="btn btn-primary" href="/dashboard/matches" { "View matches" }
            })
            .render(),
    )
}
