//! Protected area layouts (`/admin`, `/authority`, `/superadmin`).
//!
//! Each layout validates the session once it is authenticated, then renders
//! its nested routes behind a [`RoleGuard`] built from the route table. Page
//! bodies are placeholders.

use leptos::prelude::*;
use leptos_router::components::Outlet;
use leptos_router::hooks::{use_location, use_navigate, use_params_map};

use crate::components::role_guard::RoleGuard;
use crate::state::session::{Session, SessionStore};
use crate::util::auth::{ClientRoleGuard, install_session_validator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Admin,
    Authority,
    SuperAdmin,
}

impl Area {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Authority => "/authority",
            Self::SuperAdmin => "/superadmin",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Admin => "Administration",
            Self::Authority => "Authority Console",
            Self::SuperAdmin => "Platform Administration",
        }
    }

    /// Guard for this area. An area missing from the route table admits no one.
    #[must_use]
    pub fn guard(self) -> ClientRoleGuard {
        ClientRoleGuard::for_path(self.prefix()).unwrap_or_else(|| ClientRoleGuard::new(&[]))
    }
}

#[component]
fn AreaLayout(area: Area) -> impl IntoView {
    let store = expect_context::<SessionStore>();
    let session = expect_context::<RwSignal<Session>>();
    let path = use_location().pathname.get_untracked();
    install_session_validator(session, store.clone(), path, use_navigate());

    let who = move || session.with(|s| s.user.as_ref().map(|u| u.label().to_owned()).unwrap_or_default());

    view! {
        <div class="area-layout">
            <header class="area-layout__header">
                <h1>{area.title()}</h1>
                <span class="area-layout__user">{who}</span>
                <button class="area-layout__logout" on:click=move |_| store.logout()>
                    "Sign out"
                </button>
            </header>
            <main class="area-layout__body">
                <RoleGuard guard=area.guard()>
                    <Outlet/>
                </RoleGuard>
            </main>
        </div>
    }
}

#[component]
pub fn AdminLayout() -> impl IntoView {
    view! { <AreaLayout area=Area::Admin/> }
}

#[component]
pub fn AuthorityLayout() -> impl IntoView {
    view! { <AreaLayout area=Area::Authority/> }
}

#[component]
pub fn SuperAdminLayout() -> impl IntoView {
    view! { <AreaLayout area=Area::SuperAdmin/> }
}

#[component]
pub fn AreaIndex() -> impl IntoView {
    view! { <p class="area-placeholder">"Overview"</p> }
}

/// Placeholder for any page under an area, e.g. `/admin/zones`.
#[component]
pub fn AreaSection() -> impl IntoView {
    let params = use_params_map();
    let section = move || params.with(|p| p.get("section").unwrap_or_default());
    view! { <p class="area-placeholder">"Section: " {section}</p> }
}
