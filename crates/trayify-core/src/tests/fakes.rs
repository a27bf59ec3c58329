//! Recording fakes for the window controller and tray host.
#![allow(clippy::unwrap_used)]

use crate::{
    CoreResult, EntryHandle, EntryRegistry, MenuSpec, MenuTarget, RegistryOptions, SelectedWindow,
    TrayHost, TrayifyError, WindowController, WindowId,
};

use std::{
    collections::{HashMap, HashSet, VecDeque},
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WindowCall {
    Show(WindowId),
    Hide(WindowId),
    Terminate(WindowId, String),
}

#[derive(Default)]
struct FakeWindows {
    hidden: HashSet<WindowId>,
    terminated: HashSet<WindowId>,
    calls: Vec<WindowCall>,
    selections: VecDeque<SelectedWindow>,
    fail_show: HashSet<WindowId>,
    fail_hide: HashSet<WindowId>,
    confirm_kill: bool,
    terminate_fails: bool,
}

/// Window controller that tracks which windows are hidden.
pub(crate) struct FakeWindowController {
    state: Mutex<FakeWindows>,
    gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeWindowController {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeWindows {
                confirm_kill: true,
                ..FakeWindows::default()
            }),
            gate: Mutex::new(None),
        })
    }

    pub(crate) fn queue_selection(&self, id: &str, title: &str) {
        self.state
            .lock()
            .unwrap()
            .selections
            .push_back(SelectedWindow {
                window_id: WindowId::from(id),
                title: title.to_string(),
            });
    }

    /// Mark a window as hidden outside of `hide`, as if the user hid it first.
    pub(crate) fn mark_hidden(&self, id: &str) {
        self.state.lock().unwrap().hidden.insert(WindowId::from(id));
    }

    pub(crate) fn fail_show(&self, id: &str) {
        self.state.lock().unwrap().fail_show.insert(WindowId::from(id));
    }

    pub(crate) fn fail_hide(&self, id: &str) {
        self.state.lock().unwrap().fail_hide.insert(WindowId::from(id));
    }

    pub(crate) fn set_confirm_kill(&self, confirm: bool) {
        self.state.lock().unwrap().confirm_kill = confirm;
    }

    pub(crate) fn set_terminate_fails(&self, fails: bool) {
        self.state.lock().unwrap().terminate_fails = fails;
    }

    /// Make `terminate` wait for a release signal.
    ///
    /// Returns `(entered, release)`: `entered` fires once `terminate` is
    /// waiting, `release` lets it finish.
    pub(crate) fn gate_terminate(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((Arc::clone(&entered), Arc::clone(&release)));
        (entered, release)
    }

    pub(crate) fn hidden(&self) -> HashSet<WindowId> {
        self.state.lock().unwrap().hidden.clone()
    }

    pub(crate) fn terminated(&self) -> HashSet<WindowId> {
        self.state.lock().unwrap().terminated.clone()
    }

    pub(crate) fn calls(&self) -> Vec<WindowCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn show_count(&self, id: &str) -> usize {
        let id = WindowId::from(id);
        self.calls()
            .iter()
            .filter(|call| **call == WindowCall::Show(id.clone()))
            .count()
    }
}

#[async_trait]
impl WindowController for FakeWindowController {
    async fn select_window(&self) -> CoreResult<SelectedWindow> {
        self.state
            .lock()
            .unwrap()
            .selections
            .pop_front()
            .ok_or_else(|| TrayifyError::SelectionFailed {
                reason: "selection cancelled".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn show(&self, window_id: &WindowId) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(WindowCall::Show(window_id.clone()));
        if state.fail_show.contains(window_id) {
            return Err(TrayifyError::ControlFailed {
                reason: format!("cannot map {window_id}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        state.hidden.remove(window_id);
        Ok(())
    }

    async fn hide(&self, window_id: &WindowId) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(WindowCall::Hide(window_id.clone()));
        if state.fail_hide.contains(window_id) {
            return Err(TrayifyError::ControlFailed {
                reason: format!("cannot unmap {window_id}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        state.hidden.insert(window_id.clone());
        Ok(())
    }

    async fn terminate(&self, window_id: &WindowId, title: &str) -> CoreResult<bool> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(WindowCall::Terminate(window_id.clone(), title.to_string()));

        let gate = self.gate.lock().unwrap().clone();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.terminate_fails {
            return Err(TrayifyError::ControlFailed {
                reason: format!("cannot kill {window_id}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if state.confirm_kill {
            state.hidden.remove(window_id);
            state.terminated.insert(window_id.clone());
        }
        Ok(state.confirm_kill)
    }
}

#[derive(Default)]
struct FakeTray {
    live: HashMap<u64, (WindowId, String, MenuSpec)>,
    created: usize,
    destroyed: Vec<u64>,
    unknown_destroys: usize,
    primary_menus: Vec<MenuSpec>,
    fail_create: bool,
    fail_update: bool,
}

/// Tray host that records every entry and primary menu.
pub(crate) struct FakeTrayHost {
    next: AtomicU64,
    state: Mutex<FakeTray>,
    gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeTrayHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU64::new(1),
            state: Mutex::new(FakeTray::default()),
            gate: Mutex::new(None),
        })
    }

    pub(crate) fn set_fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub(crate) fn set_fail_update(&self, fail: bool) {
        self.state.lock().unwrap().fail_update = fail;
    }

    /// Make the next `create_entry` calls wait for a release signal.
    ///
    /// Returns `(entered, release)` like [`FakeWindowController::gate_terminate`].
    pub(crate) fn gate_create(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((Arc::clone(&entered), Arc::clone(&release)));
        (entered, release)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub(crate) fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.state.lock().unwrap().destroyed.len()
    }

    pub(crate) fn unknown_destroys(&self) -> usize {
        self.state.lock().unwrap().unknown_destroys
    }

    pub(crate) fn live_menu(&self, id: &str) -> Option<MenuSpec> {
        let id = WindowId::from(id);
        self.state
            .lock()
            .unwrap()
            .live
            .values()
            .find(|(window_id, _, _)| *window_id == id)
            .map(|(_, _, menu)| menu.clone())
    }

    pub(crate) fn primary_updates(&self) -> usize {
        self.state.lock().unwrap().primary_menus.len()
    }

    pub(crate) fn last_primary_menu(&self) -> Option<MenuSpec> {
        self.state.lock().unwrap().primary_menus.last().cloned()
    }
}

#[async_trait]
impl TrayHost for FakeTrayHost {
    async fn create_entry(
        &self,
        window_id: &WindowId,
        title: &str,
        menu: MenuSpec,
    ) -> CoreResult<EntryHandle> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(TrayifyError::DisplayFailed {
                reason: "no tray available".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        state
            .live
            .insert(raw, (window_id.clone(), title.to_string(), menu));
        state.created += 1;
        Ok(EntryHandle::new(raw))
    }

    async fn update_menu(&self, target: MenuTarget<'_>, menu: MenuSpec) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_update {
            return Err(TrayifyError::DisplayFailed {
                reason: "menu rejected".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match target {
            MenuTarget::Primary => state.primary_menus.push(menu),
            MenuTarget::Entry(handle) => {
                if let Some(entry) = state.live.get_mut(&handle.raw()) {
                    entry.2 = menu;
                }
            }
        }
        Ok(())
    }

    async fn destroy_entry(&self, handle: EntryHandle) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.live.remove(&handle.raw()).is_none() {
            state.unknown_destroys += 1;
        }
        state.destroyed.push(handle.raw());
        Ok(())
    }
}

pub(crate) fn registry(
    controller: &Arc<FakeWindowController>,
    host: &Arc<FakeTrayHost>,
) -> EntryRegistry {
    registry_with_grace(controller, host, Duration::from_millis(500))
}

pub(crate) fn registry_with_grace(
    controller: &Arc<FakeWindowController>,
    host: &Arc<FakeTrayHost>,
    shutdown_grace: Duration,
) -> EntryRegistry {
    EntryRegistry::new(
        Arc::clone(controller) as Arc<dyn WindowController>,
        Arc::clone(host) as Arc<dyn TrayHost>,
        RegistryOptions {
            shutdown_grace,
            show_window_list: false,
        },
    )
}

/// Hide `id` through the fake controller and create its entry.
#[allow(clippy::unwrap_used)]
pub(crate) async fn hide_and_track(
    registry: &EntryRegistry,
    controller: &FakeWindowController,
    id: &str,
    title: &str,
) {
    controller.mark_hidden(id);
    registry.create(WindowId::from(id), title).await.unwrap();
}
