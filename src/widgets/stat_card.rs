use hypertext::prelude::*;

/// A card showing a single count, linking to the corresponding list.
pub struct StatCard<'r> {
    pub title: &'r str,
    pub count: i64,
    pub caption: &'r str,
    pub href: &'r str,
}

impl<'r> Renderable for StatCard<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="col-md-4" {
                div class="card h-100" {
                    div class="card-body" {
                        h2 class="card-title h6 text-muted" { (self.title) }
                        p class="display-6 fw-bold mb-1" { (self.count.to_string()) }
                        a class="card-link small" href=(self.href) { (self.caption) }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
