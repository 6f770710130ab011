use hypertext::prelude::*;

/// The fields of the create/edit team form. The form itself must be sent as
/// `multipart/form-data` because of the logo upload.
#[derive(Default)]
pub struct TeamForm<'a> {
    name: Option<&'a str>,
    category: Option<&'a str>,
    logo_url: Option<&'a str>,
}

impl<'a> TeamForm<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_category(mut self, category: &'a str) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_logo(mut self, logo_url: Option<&'a str>) -> Self {
        self.logo_url = logo_url;
        self
    }
}

impl<'a> Renderable for TeamForm<'a> {
    fn render_to(&self, buffer: &mut hypertext::Buffer) {
        maud! {
            div class="mb-3" {
                label for="teamName" class="form-label" { "Team name" }
                input
                    type="text"
                    class="form-control"
                    id="teamName"
                    name="name"
                    maxlength="128"
                    required
                    value=(self.name.unwrap_or(""));
            }
            div class="mb-3" {
                label for="teamCategory" class="form-label" { "Category" }
                input
                    type="text"
                    class="form-control"
                    id="teamCategory"
                    aria-describedby="teamCategoryHelp"
                    name="category"
                    maxlength="64"
                    required
                    value=(self.category.unwrap_or(""));
                div id="teamCategoryHelp" class="form-text" {
                    "The division this team plays in, e.g. U11F."
                }
            }
            div class="mb-3" {
                label for="teamLogo" class="form-label" { "Logo" }
                @if let Some(url) = self.logo_url {
                    div class="mb-2" {
                        img src=(url) alt="Current logo" style="height: 64px;";
                    }
                }
                input
                    type="file"
                    class="form-control"
                    id="teamLogo"
                    name="logo"
                    accept="image/*";
            }
        }
        .render_to(buffer);
    }
}
