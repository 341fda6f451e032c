use crate::events::{IconRequest, IconUpdate, UserEvent};
use crate::icons::{load_app_icon, resize_to_square};
use crate::system;
use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;
use log::{error, info, warn};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};
use std::thread;
use std::time::Duration;

/// Icon updates are delivered in batches to limit repaint churn.
const ICON_BATCH_SIZE: usize = 10;
/// Filesystem events settle for this long before a rescan is requested.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(1500);

pub struct RuntimeHandles {
    pub rx: Receiver<UserEvent>,
    pub icon_req_tx: Sender<IconRequest>,
    pub scan_tx: Sender<()>,
    // Held so the watcher threads stay alive with the app.
    _watcher: Option<Debouncer<notify::RecommendedWatcher>>,
}

pub fn build_runtime(ctx: &egui::Context) -> RuntimeHandles {
    let (ui_tx, ui_rx) = unbounded::<UserEvent>();
    let (icon_req_tx, icon_req_rx) = unbounded::<IconRequest>();
    let (scan_tx, scan_rx) = unbounded::<()>();

    spawn_scan_worker(scan_rx, ui_tx.clone(), ctx.clone());
    spawn_icon_worker(icon_req_rx, ui_tx.clone(), ctx.clone());
    let watcher = start_app_watcher(ui_tx, ctx.clone());

    // Kick off the initial scan immediately.
    let _ = scan_tx.send(());

    RuntimeHandles {
        rx: ui_rx,
        icon_req_tx,
        scan_tx,
        _watcher: watcher,
    }
}

fn spawn_scan_worker(scan_rx: Receiver<()>, tx: Sender<UserEvent>, ctx: egui::Context) {
    thread::spawn(move || {
        while scan_rx.recv().is_ok() {
            // Collapse a burst of rescan requests into one pass.
            while scan_rx.try_recv().is_ok() {}

            info!("scanning application directories");
            let result = system::scan_installed_apps().map_err(|err| err.to_string());
            if let Err(err) = &result {
                error!("application scan failed: {err}");
            }
            if tx.send(UserEvent::AppsLoaded(result)).is_err() {
                break;
            }
            ctx.request_repaint();
        }
    });
}

fn spawn_icon_worker(req_rx: Receiver<IconRequest>, tx: Sender<UserEvent>, ctx: egui::Context) {
    thread::spawn(move || {
        while let Ok(first) = req_rx.recv() {
            let mut pending = vec![first];
            while pending.len() < ICON_BATCH_SIZE {
                match req_rx.try_recv() {
                    Ok(req) => pending.push(req),
                    Err(_) => break,
                }
            }

            let mut updates = Vec::with_capacity(pending.len());
            for req in pending {
                let side = req.size.clamp(16, 256) as usize;
                if let Some(image) = load_app_icon(&req.path) {
                    updates.push(IconUpdate {
                        bundle_id: req.bundle_id,
                        image: resize_to_square(&image, side),
                    });
                }
            }
            if updates.is_empty() {
                continue;
            }
            if tx.send(UserEvent::IconsReady(updates)).is_err() {
                break;
            }
            ctx.request_repaint();
        }
    });
}

/// Watch the application directories and request a rescan when a bundle
/// changes. Best-effort: a missing watcher only disables auto-refresh.
fn start_app_watcher(
    tx: Sender<UserEvent>,
    ctx: egui::Context,
) -> Option<Debouncer<notify::RecommendedWatcher>> {
    let handler = move |result: DebounceEventResult| match result {
        Ok(events) => {
            let relevant = events.iter().any(|event| {
                event.path.to_string_lossy().contains(".app")
                    && matches!(
                        event.kind,
                        DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                    )
            });
            if relevant {
                let _ = tx.send(UserEvent::AppsChanged);
                ctx.request_repaint();
            }
        }
        Err(err) => warn!("application watcher error: {err}"),
    };

    let mut debouncer = match new_debouncer(WATCH_DEBOUNCE, handler) {
        Ok(debouncer) => debouncer,
        Err(err) => {
            warn!("failed to start application watcher: {err}");
            return None;
        }
    };

    for path in system::watch_roots() {
        if !path.exists() {
            continue;
        }
        match debouncer.watcher().watch(&path, RecursiveMode::Recursive) {
            Ok(()) => info!("watching {}", path.display()),
            Err(err) => warn!("failed to watch {}: {err}", path.display()),
        }
    }

    Some(debouncer)
}
