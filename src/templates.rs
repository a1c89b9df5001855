//! HTML rendering with Tera templates compiled into the binary.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use once_cell::sync::OnceCell;
use tera::{Context, Tera};
use thiserror::Error;

use crate::auth::{Access, AuthContext, JwtError};
use crate::database::DatabaseError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("block.html", include_str!("../templates/block.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("cases.html", include_str!("../templates/cases.html")),
    ("case.html", include_str!("../templates/case.html")),
    ("clients.html", include_str!("../templates/clients.html")),
    ("client.html", include_str!("../templates/client.html")),
    ("lawyers.html", include_str!("../templates/lawyers.html")),
    ("lawyer.html", include_str!("../templates/lawyer.html")),
    ("record.html", include_str!("../templates/record.html")),
];

static ENGINE: OnceCell<Tera> = OnceCell::new();

pub fn engine() -> Result<&'static Tera, tera::Error> {
    ENGINE.get_or_try_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(tera)
    })
}

pub fn render(name: &str, context: &Context) -> Result<String, tera::Error> {
    engine()?.render(name, context)
}

/// Base context every page extends: title plus the session banner
pub fn page_context(title: &str, session: Option<&AuthContext>) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("session", &session);
    context
}

/// Failures of a server-rendered page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("You do not have access to this page")]
    Forbidden,

    /// No session; the visitor is sent to the login page
    #[error("Sign in required")]
    Login,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PageError {
    /// Turn a denied access check into the error the page should return
    pub fn check(access: Access) -> Result<(), PageError> {
        match access {
            Access::Allow => Ok(()),
            denied => Err(PageError::denied(denied)),
        }
    }

    pub fn denied(access: Access) -> PageError {
        match access {
            Access::Login => PageError::Login,
            Access::Allow | Access::Deny => PageError::Forbidden,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::Login => StatusCode::SEE_OTHER,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            PageError::NotFound(_) => "Not found",
            PageError::Forbidden => "Access denied",
            PageError::Login => "Sign in required",
            PageError::Internal(_) => "Something went wrong",
        }
    }
}

impl From<DatabaseError> for PageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { kind, id } => PageError::NotFound(format!("{} {}", kind.label(), id)),
            other => {
                tracing::error!("Store error while rendering page: {}", other);
                PageError::Internal(other.to_string())
            }
        }
    }
}

impl From<JwtError> for PageError {
    fn from(err: JwtError) -> Self {
        tracing::error!("Session token error: {}", err);
        PageError::Internal(err.to_string())
    }
}

impl From<tera::Error> for PageError {
    fn from(err: tera::Error) -> Self {
        tracing::error!("Template error: {:?}", err);
        PageError::Internal(err.to_string())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if let PageError::Login = self {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        let message = match &self {
            // Internal details stay in the log
            PageError::Internal(_) => "The request could not be completed.".to_string(),
            other => other.to_string(),
        };
        let mut context = page_context(self.heading(), None);
        context.insert("heading", self.heading());
        context.insert("message", &message);

        match render("block.html", &context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render placeholder page: {:?}", e);
                (status, message).into_response()
            }
        }
    }
}

pub type PageResult = Result<Response, PageError>;

/// Render a page template into a 200 response
pub fn page(name: &str, context: &Context) -> PageResult {
    Ok(Html(render(name, context)?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;

    #[test]
    fn all_templates_compile() {
        let tera = engine().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        for (name, _) in TEMPLATES {
            assert!(names.contains(name), "{} not registered", name);
        }
    }

    #[test]
    fn banner_shows_name_and_admin_marker() {
        let ctx = AuthContext::new(Principal::Lawyer, 1, "Reyes, Maria Lopez".into(), true);
        let mut context = page_context("Home", Some(&ctx));
        context.insert("links", &Vec::<String>::new());
        let html = render("index.html", &context).unwrap();
        assert!(html.contains("Signed in as Reyes, Maria Lopez"));
        assert!(html.contains("(Admin)"));
        assert!(html.contains("Logout"));
    }

    #[test]
    fn anonymous_banner_offers_login() {
        let mut context = page_context("Home", None);
        context.insert("links", &Vec::<String>::new());
        let html = render("index.html", &context).unwrap();
        assert!(!html.contains("Signed in as"));
        assert!(html.contains("href=\"/login\""));
    }

    #[test]
    fn access_maps_to_page_errors() {
        assert!(PageError::check(Access::Allow).is_ok());
        assert!(matches!(PageError::check(Access::Deny), Err(PageError::Forbidden)));
        assert!(matches!(PageError::check(Access::Login), Err(PageError::Login)));
    }

    #[test]
    fn login_error_redirects() {
        let response = PageError::Login.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn denial_renders_placeholder() {
        let response = PageError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
