use crate::components::icons::{GraduationCap, LogOut};
use crate::web::router::use_router;
use leptos::prelude::*;

#[component]
pub fn Navbar() -> impl IntoView {
    let router = use_router();
    let signed_in = router.signed_in();

    view! {
        <nav class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1">
                <button data-route="home" class="btn btn-ghost text-xl gap-2">
                    <GraduationCap attr:class="h-6 w-6 text-primary" />
                    "XP Board"
                </button>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || signed_in.get()
                    fallback=|| view! {
                        <button data-route="login" class="btn btn-primary btn-sm">"Login"</button>
                    }
                >
                    <button data-route="profile" class="btn btn-ghost btn-sm">"Profile"</button>
                    <button data-route="stats" class="btn btn-ghost btn-sm">"Statistics"</button>
                    <button on:click=move |_| router.logout() class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" /> "Logout"
                    </button>
                </Show>
            </div>
        </nav>
    }
}
