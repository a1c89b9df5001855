use crate::auth::{access::home_links, AuthContext};
use crate::templates::{page, page_context, PageResult};

/// GET / - links for the signed-in role, or a login prompt
pub async fn index(session: Option<AuthContext>) -> PageResult {
    let mut context = page_context("Home", session.as_ref());
    context.insert("links", &home_links(session.as_ref()));
    page("index.html", &context)
}
