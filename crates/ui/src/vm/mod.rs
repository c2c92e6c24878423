mod practice_vm;
mod settings_vm;

pub use practice_vm::{
    MetronomeIndicatorVm, PracticeEffects, PracticeIntent, PracticeScreenVm, PracticeVm,
    ScaleCardVm, TrackerRowVm, map_practice_screen,
};
pub use settings_vm::{
    SettingsFormVm, SettingsIntent, ToneOptionVm, apply_settings_intent, map_settings_form,
    submit_new_scale,
};
