//! Templating code.
//!
//! This defines the [`Page`] item, which is used by every page of the
//! dashboard.

use hypertext::prelude::*;

use crate::auth::User;

const NAV_LINKS: &[(&str, &str, &str)] = &[
    ("dashboard", "/dashboard", "Dashboard"),
    ("matches", "/dashboard/matches", "Matches"),
    ("import", "/dashboard/matches/import", "Import"),
    ("teams", "/dashboard/teams", "Teams & coaches"),
];

pub struct Page<R1: Renderable, R2: Renderable> {
    body: Option<R1>,
    username: Option<String>,
    extra_head: Option<R2>,
    active_nav: Option<&'static str>,
}

// unfortunate generic argument shenanigans
impl<R1: Renderable> Page<R1, String> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn new_full() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user<const TX: bool>(mut self, user: User<TX>) -> Self {
        self.username = Some(user.username);
        self
    }

    pub fn extra_head(mut self, content: R2) -> Page<R1, R2> {
        self.extra_head = Some(content);
        self
    }

    /// Highlights the navbar entry with this key.
    pub fn active_nav(mut self, key: &'static str) -> Self {
        self.active_nav = Some(key);
        self
    }
}

impl<R1: Renderable, R2: Renderable> Renderable
    for Page<R1, R2>
{
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { "BCUS Matchday" }
                    link
                        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                        rel="stylesheet";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    @if let Some(extra) = &self.extra_head {
                        (extra)
                    }
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #1d3461;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            @if self.username.is_some() {
                                a class="navbar-brand text-white" href="/dashboard" {
                                    "BCUS"
                                }
                                ul class="navbar-nav me-auto" {
                                    @for (key, href, label) in NAV_LINKS {
                                        li class="nav-item" {
                                            @if self.active_nav == Some(*key) {
                                                a class="nav-link active text-white fw-bold" href=(href) aria-current="page" {
                                                    (label)
                                                }
                                            } @else {
                                                a class="nav-link text-white" href=(href) {
                                                    (label)
                                                }
                                            }
                                        }
                                    }
                                }
                            } @else {
                                a class="navbar-brand text-white" href="/" {
                                    "BCUS"
                                }
                            }
                            ul class="navbar-nav" style="display: flex; gap: 1rem; align-items: center;" {
                                @if let Some(username) = &self.username {
                                    li class="nav-item text-white" {
                                        (username)
                                    }
                                    li class="nav-item" {
                                        form method="post" action="/logout" class="m-0" {
                                            button type="submit" class="btn btn-sm btn-outline-light" {
                                                "Log out"
                                            }
                                        }
                                    }
                                } @else {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/" {
                                            "Login"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/register" {
                                            "Register"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="container flex-grow-1 py-4" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R1: Renderable, R2: Renderable> Default
    for Page<R1, R2>
{
    fn default() -> Self {
        Self {
            body: Default::default(),
            username: Default::default(),
            extra_head: Default::default(),
            active_nav: Default::default(),
        }
    }
}
