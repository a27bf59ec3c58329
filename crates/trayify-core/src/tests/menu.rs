use crate::{
    EXIT_LABEL, MenuAction, MenuItemSpec, MenuSynchronizer, RegistrySnapshot, TRAYIFY_LABEL,
    TrayHost, WindowId, build_menu, entry_menu,
    tests::fakes::{FakeTrayHost, FakeWindowController, hide_and_track, registry},
};

use std::sync::Arc;

fn snapshot(revision: u64, entries: &[(&str, &str)]) -> RegistrySnapshot {
    RegistrySnapshot {
        revision,
        entries: entries
            .iter()
            .map(|(id, title)| (WindowId::from(*id), title.to_string()))
            .collect(),
    }
}

/// WHAT: The unhide-all count follows the registry down to zero
/// WHY: The primary menu must always reflect how many windows are hidden
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_two_entries_when_removing_them_then_unhide_all_label_tracks_count() {
    // Given: A registry with the primary entry set and two entries
    let controller = FakeWindowController::new();
    let host = FakeTrayHost::new();
    let registry = registry(&controller, &host);
    registry.set_main_entry().await;
    hide_and_track(&registry, &controller, "0x1", "Editor").await;
    hide_and_track(&registry, &controller, "0x2", "Terminal").await;

    // Then: The label shows 2
    let menu = host.last_primary_menu().unwrap();
    assert!(menu.label_of(&MenuAction::UnhideAll).unwrap().contains('2'));

    // When: One entry is restored, the label shows 1
    registry.restore(&WindowId::from("0x1")).await.unwrap();
    let menu = host.last_primary_menu().unwrap();
    assert!(menu.label_of(&MenuAction::UnhideAll).unwrap().contains('1'));

    // When: The last entry is restored, the item disappears
    registry.restore(&WindowId::from("0x2")).await.unwrap();
    let menu = host.last_primary_menu().unwrap();
    assert_eq!(menu.label_of(&MenuAction::UnhideAll), None);
}

/// WHAT: An empty snapshot yields only the fixed actions
/// WHY: Unhide All must be absent when nothing is hidden
#[test]
fn given_empty_snapshot_when_building_menu_then_only_fixed_actions() {
    // Given/When: Building the menu for an empty registry
    let menu = build_menu(&snapshot(0, &[]), true);

    // Then: Trayify, separator, Exit
    assert_eq!(
        menu.items(),
        &[
            MenuItemSpec::Action {
                label: TRAYIFY_LABEL.to_string(),
                action: MenuAction::Trayify,
            },
            MenuItemSpec::Separator,
            MenuItemSpec::Action {
                label: EXIT_LABEL.to_string(),
                action: MenuAction::Exit,
            },
        ]
    );
}

/// WHAT: The optional window list adds one restore item per window
/// WHY: Users can restore a single window from the primary entry
#[test]
fn given_window_list_enabled_when_building_menu_then_restore_item_per_window() {
    // Given: Two tracked windows
    let snap = snapshot(3, &[("0x2", "Browser"), ("0x1", "Editor")]);

    // When: Building with and without the window list
    let with_list = build_menu(&snap, true);
    let without_list = build_menu(&snap, false);

    // Then: Only the listed menu has per-window restore items
    assert_eq!(
        with_list.label_of(&MenuAction::Restore(WindowId::from("0x1"))),
        Some("Restore \"Editor\"")
    );
    assert_eq!(
        with_list.label_of(&MenuAction::Restore(WindowId::from("0x2"))),
        Some("Restore \"Browser\"")
    );
    assert_eq!(
        without_list.label_of(&MenuAction::Restore(WindowId::from("0x1"))),
        None
    );
    assert_eq!(
        without_list.label_of(&MenuAction::UnhideAll),
        Some("Unhide All (2)")
    );
}

/// WHAT: Entry menus carry restore and kill actions bound to the window
/// WHY: Each entry dispatches commands for its own window only
#[test]
fn given_window_when_building_entry_menu_then_restore_separator_kill() {
    let id = WindowId::from("0x3e00004");

    let menu = entry_menu(&id, "Notes");

    assert_eq!(menu.items().len(), 3);
    assert_eq!(
        menu.label_of(&MenuAction::Restore(id.clone())),
        Some("Restore \"Notes\"")
    );
    assert_eq!(menu.items()[1], MenuItemSpec::Separator);
    assert_eq!(menu.label_of(&MenuAction::Kill(id)), Some("Kill Notes"));
}

/// WHAT: Refresh before the primary entry exists is a no-op
/// WHY: Entries can be created before startup finishes
#[tokio::test]
async fn given_primary_not_set_when_refreshing_then_host_not_called() {
    // Given: A synchronizer whose primary entry is not set
    let host = FakeTrayHost::new();
    let sync = MenuSynchronizer::new(Arc::clone(&host) as Arc<dyn TrayHost>, false);

    // When: Refreshing
    sync.refresh(&snapshot(1, &[("0x1", "Editor")])).await;

    // Then: Nothing published
    assert_eq!(host.primary_updates(), 0);
}

/// WHAT: An older snapshot never replaces a newer published menu
/// WHY: Concurrent refreshes must not leave a stale menu on screen
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_newer_menu_published_when_refreshing_stale_snapshot_then_skipped() {
    // Given: A synchronizer that published revision 5
    let host = FakeTrayHost::new();
    let sync = MenuSynchronizer::new(Arc::clone(&host) as Arc<dyn TrayHost>, false);
    sync.set_primary_ready();
    sync.refresh(&snapshot(5, &[("0x1", "Editor"), ("0x2", "Terminal")]))
        .await;

    // When: Refreshing with revision 3
    sync.refresh(&snapshot(3, &[("0x1", "Editor")])).await;

    // Then: Only the newer menu was published
    assert_eq!(host.primary_updates(), 1);
    let menu = host.last_primary_menu().unwrap();
    assert_eq!(
        menu.label_of(&MenuAction::UnhideAll),
        Some("Unhide All (2)")
    );
}

/// WHAT: Host failures during refresh are swallowed
/// WHY: A broken tray display must not break window restoration
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_host_when_refreshing_then_registry_keeps_working() {
    // Given: A host that rejects menu updates
    let controller = FakeWindowController::new();
    let host = FakeTrayHost::new();
    host.set_fail_update(true);
    let registry = registry(&controller, &host);
    registry.set_main_entry().await;

    // When: Creating and restoring an entry
    hide_and_track(&registry, &controller, "0x1", "Editor").await;
    registry.restore(&WindowId::from("0x1")).await.unwrap();

    // Then: Registry operations succeed and no menu was published
    assert!(registry.is_empty().await);
    assert_eq!(host.primary_updates(), 0);
}

/// WHAT: Menu ids decode back to the action that produced them
/// WHY: One dispatcher routes every click through these ids
#[test]
fn given_actions_when_encoding_menu_ids_then_decoded_back() {
    let actions = [
        MenuAction::Trayify,
        MenuAction::UnhideAll,
        MenuAction::Exit,
        MenuAction::Restore(WindowId::from("0x3e00004")),
        MenuAction::Kill(WindowId::from("0x3e00004")),
    ];

    for action in actions {
        assert_eq!(MenuAction::from_menu_id(&action.menu_id()), Some(action));
    }
}

/// WHAT: Foreign or malformed menu ids are ignored
/// WHY: Other menu items may share the global event channel
#[test]
fn given_unknown_menu_id_when_decoding_then_none() {
    assert_eq!(MenuAction::from_menu_id("settings"), None);
    assert_eq!(MenuAction::from_menu_id("restore:"), None);
    assert_eq!(MenuAction::from_menu_id("kill:"), None);
    assert_eq!(MenuAction::from_menu_id(""), None);
}
