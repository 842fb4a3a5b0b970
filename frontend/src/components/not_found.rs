use leptos::prelude::*;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-[60vh]">
            <div class="text-center space-y-4">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl">"Page not found"</p>
                <p class="text-base-content/70">"The page you are looking for does not exist."</p>
                <button data-route="home" class="btn btn-primary">"Return Home"</button>
            </div>
        </div>
    }
}
