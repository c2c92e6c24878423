use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};
use services::SnapshotWriter;
use tracing::warn;

use crate::context::AppContext;
use crate::views::{
    CelebrationSlot, MetronomeIndicator, PersistQueue, PracticeView, SessionSlot, SettingsView,
    ViewError, ViewState, apply_effects,
};
use crate::vm::{PracticeIntent, PracticeVm};

/// How often pending session timers are checked.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", PracticeView)] Practice {},
        #[route("/settings", SettingsView)] Settings {},
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let mut slot: SessionSlot = use_context_provider(|| Signal::new(ViewState::Loading));
    let celebration: CelebrationSlot = use_context_provider(|| Signal::new(None));
    let persist: PersistQueue = use_context_provider(|| {
        let (queue, writer) = SnapshotWriter::channel(ctx.practice());
        spawn(writer.run());
        queue
    });

    let loader_ctx = ctx.clone();
    use_future(move || {
        let ctx = loader_ctx.clone();
        async move {
            let mut slot = slot;
            match ctx.practice().open_session().await {
                Ok(session) => {
                    slot.set(ViewState::Ready(PracticeVm::with_output(
                        session,
                        ctx.click_output(),
                    )));
                }
                Err(err) => {
                    warn!(%err, "failed to open practice session");
                    slot.set(ViewState::Error(ViewError::Unknown));
                }
            }
        }
    });

    use_future(move || {
        let persist = persist.clone();
        async move {
            let mut slot = slot;
            loop {
                tokio::time::sleep(POLL_INTERVAL).await;
                let pending =
                    matches!(&*slot.peek(), ViewState::Ready(vm) if vm.has_pending_timers());
                if !pending {
                    continue;
                }
                let effects = match &mut *slot.write() {
                    ViewState::Ready(vm) => vm.tick(),
                    _ => continue,
                };
                apply_effects(&persist, &slot, celebration, effects);
            }
        }
    });

    let indicator = match &*slot.read() {
        ViewState::Ready(vm) => Some(vm.screen().metronome),
        _ => None,
    };
    let on_toggle = use_callback(move |()| {
        if let ViewState::Ready(vm) = &mut *slot.write() {
            vm.dispatch(PracticeIntent::ToggleMetronome);
        }
    });

    rsx! {
        div { class: "app",
            nav { class: "top-controls",
                if let Some(indicator) = indicator {
                    MetronomeIndicator { indicator, on_toggle }
                }
                Link { class: "nav-link", to: Route::Practice {}, "Practice" }
                Link { class: "nav-link", to: Route::Settings {}, "Settings" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
