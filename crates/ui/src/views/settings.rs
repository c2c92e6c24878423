use dioxus::prelude::*;
use scaled_core::model::{PracticeSettings, Tone};

use crate::views::{CelebrationSlot, PersistQueue, SessionSlot, ViewState, apply_effects};
use crate::vm::{
    PracticeEffects, PracticeIntent, SettingsFormVm, SettingsIntent, apply_settings_intent,
    map_settings_form, submit_new_scale,
};

#[component]
pub fn SettingsView() -> Element {
    let mut slot = use_context::<SessionSlot>();
    let celebration = use_context::<CelebrationSlot>();
    let persist = use_context::<PersistQueue>();
    let mut new_scale = use_signal(String::new);

    let commit_persist = persist.clone();
    let commit = use_callback(move |next: PracticeSettings| {
        let changed = match &mut *slot.write() {
            ViewState::Ready(vm) => !vm.replace_settings(next).is_empty(),
            _ => return,
        };
        if changed {
            let effects = PracticeEffects {
                persist: true,
                celebrate: None,
            };
            apply_effects(&commit_persist, &slot, celebration, effects);
        }
    });
    let update = use_callback(move |intent: SettingsIntent| {
        let next = match &*slot.peek() {
            ViewState::Ready(vm) => apply_settings_intent(vm.settings(), intent),
            _ => None,
        };
        if let Some(next) = next {
            commit.call(next);
        }
    });

    let reset = use_callback(move |()| {
        let effects = match &mut *slot.write() {
            ViewState::Ready(vm) => vm.dispatch(PracticeIntent::Reset),
            _ => return,
        };
        apply_effects(&persist, &slot, celebration, effects);
    });

    let mut add_scale = move || {
        let mut input = new_scale();
        let next = match &*slot.peek() {
            ViewState::Ready(vm) => submit_new_scale(vm.settings(), &mut input),
            _ => None,
        };
        if let Some(next) = next {
            commit.call(next);
            new_scale.set(input);
        }
    };

    let form = match &*slot.read() {
        ViewState::Ready(vm) => Some(map_settings_form(vm.settings())),
        _ => None,
    };
    let Some(form) = form else {
        return rsx! {
            div { class: "page settings-page",
                p { "Loading..." }
            }
        };
    };

    rsx! {
        div { class: "page settings-page",
            header { class: "view-header",
                h2 { class: "view-title", "Settings" }
            }
            MetronomeSection { form: form.clone(), on_change: update }
            section { class: "settings-section",
                h3 { class: "settings-section-title", "Repetitions" }
                label { class: "settings-field",
                    span { "Repetitions required: {form.repetitions}" }
                    input {
                        r#type: "range",
                        min: "{form.repetitions_range.0}",
                        max: "{form.repetitions_range.1}",
                        value: "{form.repetitions}",
                        oninput: move |evt| {
                            if let Ok(value) = evt.value().parse::<u32>() {
                                update.call(SettingsIntent::SetRepetitions(value));
                            }
                        },
                    }
                }
            }
            section { class: "settings-section",
                h3 { class: "settings-section-title", "Scales" }
                div { class: "settings-add-scale",
                    input {
                        r#type: "text",
                        placeholder: "Add a scale (e.g., F# Minor)",
                        value: "{new_scale}",
                        oninput: move |evt| new_scale.set(evt.value()),
                        onkeydown: move |evt| {
                            if evt.key() == Key::Enter {
                                add_scale();
                            }
                        },
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| add_scale(),
                        "Add"
                    }
                }
                ul { class: "settings-scale-list",
                    for scale in form.scales.clone() {
                        li { key: "{scale}", class: "settings-scale-item",
                            span { "{scale}" }
                            button {
                                class: "btn btn-ghost",
                                r#type: "button",
                                aria_label: "Remove {scale}",
                                onclick: {
                                    let scale = scale.clone();
                                    move |_| update.call(SettingsIntent::RemoveScale(scale.clone()))
                                },
                                "Remove"
                            }
                        }
                    }
                }
            }
            section { class: "settings-section",
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| reset.call(()),
                    "Reset All Progress"
                }
            }
        }
    }
}

#[component]
fn MetronomeSection(form: SettingsFormVm, on_change: Callback<SettingsIntent>) -> Element {
    rsx! {
        section { class: "settings-section",
            h3 { class: "settings-section-title", "Metronome" }
            label { class: "settings-field settings-field--inline",
                span { "Enabled" }
                input {
                    r#type: "checkbox",
                    checked: form.metronome_enabled,
                    onchange: move |evt| {
                        on_change.call(SettingsIntent::SetMetronomeEnabled(evt.checked()));
                    },
                }
            }
            label { class: "settings-field",
                span { "Tempo: {form.bpm} BPM" }
                input {
                    r#type: "range",
                    min: "{form.bpm_range.0}",
                    max: "{form.bpm_range.1}",
                    value: "{form.bpm}",
                    disabled: !form.metronome_enabled,
                    oninput: move |evt| {
                        if let Ok(bpm) = evt.value().parse::<u32>() {
                            on_change.call(SettingsIntent::SetBpm(bpm));
                        }
                    },
                }
            }
            label { class: "settings-field",
                span { "Volume: {form.volume}%" }
                input {
                    r#type: "range",
                    min: "0",
                    max: "{form.volume_max}",
                    value: "{form.volume}",
                    disabled: !form.metronome_enabled,
                    oninput: move |evt| {
                        if let Ok(volume) = evt.value().parse::<u32>() {
                            on_change.call(SettingsIntent::SetVolume(volume));
                        }
                    },
                }
            }
            label { class: "settings-field",
                span { "Tone" }
                select {
                    disabled: !form.metronome_enabled,
                    onchange: move |evt| {
                        if let Some(tone) = Tone::parse(&evt.value()) {
                            on_change.call(SettingsIntent::SetTone(tone));
                        }
                    },
                    for tone in form.tones.clone() {
                        option {
                            key: "{tone.value}",
                            value: tone.value,
                            selected: tone.selected,
                            "{tone.label}"
                        }
                    }
                }
            }
        }
    }
}
