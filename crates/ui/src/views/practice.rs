use dioxus::prelude::*;

use crate::views::{CelebrationSlot, PersistQueue, SessionSlot, ViewState, apply_effects};
use crate::vm::{
    MetronomeIndicatorVm, PracticeIntent, PracticeScreenVm, ScaleCardVm, TrackerRowVm,
};

#[component]
pub fn PracticeView() -> Element {
    let mut slot = use_context::<SessionSlot>();
    let celebration = use_context::<CelebrationSlot>();
    let persist = use_context::<PersistQueue>();

    let dispatch = use_callback(move |intent: PracticeIntent| {
        let effects = match &mut *slot.write() {
            ViewState::Ready(vm) => vm.dispatch(intent),
            _ => return,
        };
        apply_effects(&persist, &slot, celebration, effects);
    });

    let screen = match &*slot.read() {
        ViewState::Ready(vm) => ViewState::Ready(vm.screen()),
        ViewState::Loading => ViewState::Loading,
        ViewState::Error(err) => ViewState::Error(*err),
    };

    rsx! {
        div { class: "page practice-page",
            match screen {
                ViewState::Loading => rsx! {
                    p { class: "practice-loading", "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "practice-error", "{err.message()}" }
                },
                ViewState::Ready(screen) => rsx! {
                    PracticeScreen { screen, on_intent: dispatch }
                },
            }
            if let Some(scale) = celebration() {
                CelebrationBanner { scale }
            }
        }
    }
}

#[component]
pub fn PracticeScreen(screen: PracticeScreenVm, on_intent: Callback<PracticeIntent>) -> Element {
    rsx! {
        div { class: "practice-grid",
            section { class: "practice-main",
                header { class: "practice-header",
                    h1 { class: "practice-title", "Scaled" }
                    p { class: "practice-subtitle", "{screen.completed_label}" }
                }
                if screen.all_completed {
                    CompletionPanel {
                        total: screen.total,
                        on_restart: move |()| on_intent.call(PracticeIntent::Reset),
                    }
                } else if let Some(card) = screen.current.clone() {
                    ScaleCard {
                        key: "{card.name}",
                        card,
                        on_accept: move |()| on_intent.call(PracticeIntent::Accept),
                        on_decline: move |()| on_intent.call(PracticeIntent::Decline),
                    }
                }
            }
            aside { class: "practice-sidebar",
                ProgressTracker { rows: screen.tracker.clone() }
            }
        }
    }
}

#[component]
pub fn ScaleCard(
    card: ScaleCardVm,
    on_accept: Callback<()>,
    on_decline: Callback<()>,
) -> Element {
    let dots = (0..card.repetitions_required).map(|idx| {
        let class = if idx < card.success_count {
            "rep-dot rep-dot--done"
        } else {
            "rep-dot"
        };
        rsx! { span { key: "{idx}", class: "{class}" } }
    });
    rsx! {
        div { class: "scale-card",
            p { class: "scale-card-eyebrow", "Practice Scale" }
            h2 { class: "scale-card-name", "{card.name}" }
            div { class: "scale-card-reps",
                div { class: "rep-dots", {dots} }
                span { class: "scale-card-count", "{card.count_label}" }
            }
            if card.completed {
                div { class: "scale-card-mastered", "Scale Mastered!" }
            } else {
                div { class: "scale-card-actions",
                    button {
                        class: "btn btn-decline",
                        r#type: "button",
                        aria_label: "Mark scale as incomplete",
                        onclick: move |_| on_decline.call(()),
                        "✕"
                    }
                    button {
                        class: "btn btn-accept",
                        r#type: "button",
                        aria_label: "Mark scale as completed",
                        onclick: move |_| on_accept.call(()),
                        "✓"
                    }
                }
            }
        }
    }
}

#[component]
pub fn ProgressTracker(rows: Vec<TrackerRowVm>) -> Element {
    rsx! {
        div { class: "tracker",
            h3 { class: "tracker-title", "Progress" }
            div { class: "tracker-list",
                for row in rows {
                    div {
                        key: "{row.name}",
                        class: tracker_row_class(&row),
                        div { class: "tracker-row-head",
                            span { class: "tracker-row-name", "{row.name}" }
                            span { class: "tracker-row-count", "{row.count_label}" }
                            if row.completed {
                                span { class: "tracker-row-check", "✓" }
                            }
                        }
                        div { class: "tracker-bar",
                            div {
                                class: "tracker-bar-fill",
                                style: "width: {row.percent}%",
                            }
                        }
                    }
                }
            }
        }
    }
}

fn tracker_row_class(row: &TrackerRowVm) -> &'static str {
    match (row.is_current, row.completed) {
        (true, true) => "tracker-row tracker-row--current tracker-row--completed",
        (true, false) => "tracker-row tracker-row--current",
        (false, true) => "tracker-row tracker-row--completed",
        (false, false) => "tracker-row",
    }
}

#[component]
pub fn CompletionPanel(total: usize, on_restart: Callback<()>) -> Element {
    rsx! {
        div { class: "completion",
            h2 { class: "completion-title", "Practice Complete!" }
            p { class: "completion-body", "You've mastered all {total} scales" }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| on_restart.call(()),
                "Start New Session"
            }
        }
    }
}

#[component]
pub fn MetronomeIndicator(indicator: MetronomeIndicatorVm, on_toggle: Callback<()>) -> Element {
    if !indicator.enabled {
        return rsx! {};
    }
    let label = if indicator.playing { "Stop metronome" } else { "Start metronome" };
    rsx! {
        div { class: "metronome-indicator",
            button {
                class: if indicator.playing {
                    "btn metronome-toggle metronome-toggle--playing"
                } else {
                    "btn metronome-toggle"
                },
                r#type: "button",
                aria_label: label,
                onclick: move |_| on_toggle.call(()),
                if indicator.playing { "❚❚" } else { "▶" }
            }
            span { class: "metronome-bpm", "{indicator.bpm} BPM" }
        }
    }
}

#[component]
fn CelebrationBanner(scale: String) -> Element {
    rsx! {
        div { class: "celebration", role: "status",
            "🎉 {scale} mastered!"
        }
    }
}
