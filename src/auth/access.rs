//! Role checks for every gated page, as pure functions of the session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Principal {
    Client,
    Lawyer,
}

/// Signed-in user as seen by handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub principal: Principal,
    /// ClientID or LawyerID depending on `principal`
    pub user_id: i64,
    pub name: String,
    pub is_admin: bool,
    pub is_lawyer: bool,
    pub is_client: bool,
}

impl AuthContext {
    /// Only lawyers can be admins
    pub fn new(principal: Principal, user_id: i64, name: String, is_admin: bool) -> Self {
        let is_lawyer = principal == Principal::Lawyer;
        Self {
            principal,
            user_id,
            name,
            is_admin: is_admin && is_lawyer,
            is_lawyer,
            is_client: principal == Principal::Client,
        }
    }

    pub fn lawyer_id(&self) -> Option<i64> {
        self.is_lawyer.then_some(self.user_id)
    }

    pub fn client_id(&self) -> Option<i64> {
        self.is_client.then_some(self.user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
    /// No session: send the visitor to the login page
    Login,
}

impl Access {
    fn check(ctx: Option<&AuthContext>, allowed: impl FnOnce(&AuthContext) -> bool) -> Access {
        match ctx {
            None => Access::Login,
            Some(ctx) if allowed(ctx) => Access::Allow,
            Some(_) => Access::Deny,
        }
    }
}

/// Admin, the owning client, or a lawyer assigned to the case
pub fn case_access(ctx: Option<&AuthContext>, owner_client_id: i64, assigned_lawyers: &[i64]) -> Access {
    Access::check(ctx, |ctx| {
        ctx.is_admin
            || ctx.client_id() == Some(owner_client_id)
            || ctx.lawyer_id().map_or(false, |id| assigned_lawyers.contains(&id))
    })
}

/// Admin, the client themselves, or a lawyer on one of the client's cases
pub fn client_access(ctx: Option<&AuthContext>, client_id: i64, lawyer_client_ids: &[i64]) -> Access {
    Access::check(ctx, |ctx| {
        ctx.is_admin || ctx.client_id() == Some(client_id) || (ctx.is_lawyer && lawyer_client_ids.contains(&client_id))
    })
}

/// Which clients the all-clients page may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientScope {
    All,
    OfLawyer(i64),
}

pub fn client_list_scope(ctx: Option<&AuthContext>) -> Result<ClientScope, Access> {
    match ctx {
        None => Err(Access::Login),
        Some(ctx) if ctx.is_admin => Ok(ClientScope::All),
        Some(ctx) => ctx.lawyer_id().map(ClientScope::OfLawyer).ok_or(Access::Deny),
    }
}

/// Case list: admins see all, lawyers their assignments, clients their own
pub fn case_list_access(ctx: Option<&AuthContext>) -> Access {
    Access::check(ctx, |_| true)
}

pub fn lawyer_list_access(ctx: Option<&AuthContext>) -> Access {
    Access::check(ctx, |ctx| ctx.is_admin)
}

/// Admins, or a lawyer viewing their own profile
pub fn lawyer_access(ctx: Option<&AuthContext>, lawyer_id: i64) -> Access {
    Access::check(ctx, |ctx| ctx.is_admin || ctx.lawyer_id() == Some(lawyer_id))
}

/// Creating, updating and deleting records
pub fn write_access(ctx: Option<&AuthContext>) -> Access {
    Access::check(ctx, |ctx| ctx.is_admin)
}

/// The "Add" work link on a case page
pub fn can_add_work(ctx: Option<&AuthContext>, assigned_lawyers: &[i64]) -> bool {
    ctx.map_or(false, |ctx| {
        ctx.is_admin || ctx.lawyer_id().map_or(false, |id| assigned_lawyers.contains(&id))
    })
}

/// Payments are shown to admins only
pub fn can_see_payments(ctx: Option<&AuthContext>) -> bool {
    ctx.map_or(false, |ctx| ctx.is_admin)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
}

/// Home page links for the signed-in role
pub fn home_links(ctx: Option<&AuthContext>) -> Vec<NavLink> {
    let link = |label, href: &str| NavLink { label, href: href.to_string() };
    match ctx {
        None => vec![link("Login", "/login")],
        Some(ctx) if ctx.is_admin => vec![
            link("Clients", "/client/all"),
            link("Cases", "/case/all"),
            link("Lawyers", "/lawyer/all"),
            link("Add client", "/record/client/new"),
        ],
        Some(ctx) if ctx.is_lawyer => vec![
            link("My clients", "/client/all"),
            link("My cases", "/case/all"),
            link("My profile", &format!("/lawyer/{}", ctx.user_id)),
        ],
        Some(ctx) => vec![
            link("My account", &format!("/client/{}", ctx.user_id)),
            link("My cases", "/case/all"),
        ],
    }
}
