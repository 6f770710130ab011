use hypertext::prelude::*;

/// A row of buttons for the actions available on a page. The first action is
/// the primary one.
pub struct Actions<'r> {
    pub options: &'r [(&'r str, &'r str)],
}

impl<'r> Renderable for Actions<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="d-flex flex-wrap gap-2 mt-3 mb-4" {
                @for (i, (link, text)) in self.options.iter().enumerate() {
                    @if i == 0 {
                        a class="btn btn-primary" href=(link) { (text) }
                    } @else {
                        a class="btn btn-outline-primary" href=(link) { (text) }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
