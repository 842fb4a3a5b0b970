use leptos::prelude::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center p-4 bg-base-100 text-base-content/70 text-sm">
            <aside class="flex flex-wrap items-center justify-center gap-4">
                <p>"XP Board · student progress dashboard"</p>
                <button data-route="home" class="link link-hover">"Home"</button>
                <button data-route="stats" class="link link-hover">"Statistics"</button>
            </aside>
        </footer>
    }
}
