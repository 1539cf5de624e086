//! Root application component with routing and context providers.

use access::routes::{LOGIN_PATH, landing_path};
use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{A, ParentRoute, Route, Router, Routes},
};

use crate::pages::area::{AdminLayout, AreaIndex, AreaSection, AuthorityLayout, SuperAdminLayout};
use crate::pages::{callback::CallbackPage, forbidden::ForbiddenPage, login::LoginPage};
use crate::state::browser_store;
use crate::state::session::Session;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session store and a reactive mirror of its state. The store
/// is restored from durable storage only after hydration, so the first
/// client render matches the server's (which never sees a session).
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let store = browser_store();
    let session = RwSignal::new(store.state());
    let subscription = store.subscribe(move |next| {
        let _ = session.try_set(next.clone());
    });
    {
        let store = store.clone();
        on_cleanup(move || store.unsubscribe(subscription));
    }

    provide_context(store.clone());
    provide_context(session);

    #[cfg(feature = "hydrate")]
    {
        use std::sync::Arc;

        use crate::state::refresh::{BrowserRuntime, RefreshScheduler};

        let scheduler = RefreshScheduler::attach(&store, Arc::new(BrowserRuntime));
        on_cleanup(move || scheduler.detach());
        Effect::new(move || store.hydrate());
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/flood-dashboard.css"/>
        <Title text="Flood Dashboard"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=(StaticSegment("auth"), StaticSegment("login")) view=LoginPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("callback")) view=CallbackPage/>
                <Route path=StaticSegment("forbidden") view=ForbiddenPage/>
                <ParentRoute path=StaticSegment("admin") view=AdminLayout>
                    <Route path=StaticSegment("") view=AreaIndex/>
                    <Route path=ParamSegment("section") view=AreaSection/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("authority") view=AuthorityLayout>
                    <Route path=StaticSegment("") view=AreaIndex/>
                    <Route path=ParamSegment("section") view=AreaSection/>
                </ParentRoute>
                <ParentRoute path=StaticSegment("superadmin") view=SuperAdminLayout>
                    <Route path=StaticSegment("") view=AreaIndex/>
                    <Route path=ParamSegment("section") view=AreaSection/>
                </ParentRoute>
            </Routes>
        </Router>
    }
}

/// Public landing page: points signed-in users at their area.
#[component]
fn HomePage() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let target = move || {
        session.with(|s| match &s.user {
            Some(user) if s.is_authenticated() => landing_path(&user.roles).to_owned(),
            _ => LOGIN_PATH.to_owned(),
        })
    };
    let label = move || if session.with(Session::is_authenticated) { "Open dashboard" } else { "Sign in" };

    view! {
        <div class="home-page">
            <h1>"Flood Dashboard"</h1>
            <A href=target>{label}</A>
        </div>
    }
}
