use std::sync::Arc;

use dioxus::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scaled_core::model::{MetronomeSettings, PracticeSettings, PracticeState};
use scaled_core::time::fixed_clock;
use services::{
    AppServices, ClickOutput, PracticeService, PracticeSession, SilentOutput, SnapshotWriter,
};

use crate::context::{UiApp, build_app_context};
use crate::views::{MetronomeIndicator, PracticeView, SettingsView, ViewState};
use crate::vm::{MetronomeIndicatorVm, PracticeVm};

struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn practice(&self) -> Arc<PracticeService> {
        self.services.practice()
    }

    fn click_output(&self) -> Arc<dyn ClickOutput> {
        Arc::new(SilentOutput)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum HarnessView {
    Practice,
    Settings,
}

#[derive(Props, Clone)]
struct HarnessProps {
    app: Arc<TestApp>,
    settings: PracticeSettings,
    view: HarnessView,
}

impl PartialEq for HarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn fixture_vm(settings: PracticeSettings) -> PracticeVm {
    let mut rng = StdRng::seed_from_u64(21);
    let state = PracticeState::initialize(&settings, &mut rng);
    PracticeVm::new(PracticeSession::with_rng(settings, state, fixed_clock(), rng))
}

#[component]
fn Harness(props: HarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| SnapshotWriter::channel(app.practice()).0);
    let settings = props.settings.clone();
    use_context_provider(|| Signal::new(ViewState::Ready(fixture_vm(settings))));
    use_context_provider(|| Signal::new(None::<String>));
    match props.view {
        HarnessView::Practice => rsx! { PracticeView {} },
        HarnessView::Settings => rsx! { SettingsView {} },
    }
}

fn render(view: HarnessView, settings: PracticeSettings) -> String {
    let app = Arc::new(TestApp {
        services: AppServices::in_memory(fixed_clock()),
    });
    let mut dom = VirtualDom::new_with_props(
        Harness,
        HarnessProps {
            app,
            settings,
            view,
        },
    );
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

fn settings(scales: &[&str]) -> PracticeSettings {
    PracticeSettings::from_persisted(
        scales.iter().map(|s| (*s).to_owned()).collect(),
        3,
        MetronomeSettings::default(),
    )
    .unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn practice_view_smoke_renders_card_and_tracker() {
    let html = render(HarnessView::Practice, settings(&["C Major", "G Major"]));

    for expected in [
        "0 of 2 scales completed",
        "Practice Scale",
        "0 / 3",
        "Progress",
        "C Major",
        "G Major",
        "0/3",
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(html.contains("tracker-row--current"), "no current row in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn practice_view_smoke_shows_completion_for_empty_rotation() {
    let html = render(HarnessView::Practice, settings(&[]));

    assert!(html.contains("Practice Complete!"), "missing title in {html}");
    assert!(html.contains("mastered all 0 scales"), "missing body in {html}");
    assert!(html.contains("Start New Session"), "missing restart in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn settings_view_smoke_renders_form() {
    let html = render(HarnessView::Settings, PracticeSettings::default());

    for expected in [
        "Repetitions required: 3",
        "Tempo: 80 BPM",
        "Volume: 70%",
        "Medium (440 Hz)",
        "Bb Major",
        "Reset All Progress",
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
}

#[component]
fn IndicatorHarness(enabled: bool, playing: bool) -> Element {
    rsx! {
        MetronomeIndicator {
            indicator: MetronomeIndicatorVm { enabled, playing, bpm: 96 },
            on_toggle: move |()| {},
        }
    }
}

#[test]
fn metronome_indicator_hidden_when_disabled() {
    let mut dom = VirtualDom::new_with_props(
        IndicatorHarness,
        IndicatorHarnessProps {
            enabled: false,
            playing: false,
        },
    );
    dom.rebuild_in_place();
    assert!(!dioxus_ssr::render(&dom).contains("BPM"));

    let mut dom = VirtualDom::new_with_props(
        IndicatorHarness,
        IndicatorHarnessProps {
            enabled: true,
            playing: true,
        },
    );
    dom.rebuild_in_place();
    let html = dioxus_ssr::render(&dom);
    assert!(html.contains("96 BPM"), "missing bpm in {html}");
    assert!(html.contains("Stop metronome"), "missing toggle label in {html}");
}
