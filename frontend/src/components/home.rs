use crate::components::icons::{ChartLine, ShieldCheck, Trophy};
use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="space-y-10">
            <div class="hero bg-base-100 rounded-box shadow-xl py-12">
                <div class="hero-content text-center">
                    <div class="max-w-xl space-y-4">
                        <h1 class="text-4xl font-bold">"Track your learning journey"</h1>
                        <p class="text-base-content/70">
                            "Sign in with your platform account to see your XP, grades, audits and progress charts in one place."
                        </p>
                        <button data-route="login" class="btn btn-primary">"Get Started"</button>
                    </div>
                </div>
            </div>

            <div class="grid gap-6 md:grid-cols-3">
                <FeatureCard title="XP Progress" description="Monitor your XP growth and level progression.">
                    <ChartLine attr:class="h-8 w-8 text-primary" />
                </FeatureCard>
                <FeatureCard title="Grades & Audits" description="Review recent project results and audit outcomes.">
                    <Trophy attr:class="h-8 w-8 text-secondary" />
                </FeatureCard>
                <FeatureCard title="Private by Default" description="Your token stays in this browser and is never shared.">
                    <ShieldCheck attr:class="h-8 w-8 text-accent" />
                </FeatureCard>
            </div>
        </div>
    }
}

#[component]
fn FeatureCard(
    title: &'static str,
    description: &'static str,
    /// 图标
    children: Children,
) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-md">
            <div class="card-body items-center text-center">
                {children()}
                <h3 class="card-title">{title}</h3>
                <p class="text-base-content/70">{description}</p>
            </div>
        </div>
    }
}
