use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::device::{Device, DeviceId, DeviceStore, load_devices};
use crate::layout::{LayoutConfig, LayoutSession, LayoutSnapshot, TickHandle};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Vec<Device>, String>;

pub struct DashboardApp {
    devices_path: PathBuf,
    layout_config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    store: DeviceStore,
    layout_config: LayoutConfig,
    search: String,
    group_filter: Option<String>,
    selected: Option<DeviceId>,
    hovered: Option<DeviceId>,
    dragging: Option<DeviceId>,
    rename_buffer: String,
    pan: Vec2,
    zoom: f32,
    layout: Option<ActiveLayout>,
    layout_error: Option<String>,
    filter_key: Option<FilterKey>,
    filtered: Vec<Arc<Device>>,
    snapshot: Option<Arc<LayoutSnapshot>>,
    notifications: VecDeque<Notification>,
}

/// The one running layout and the only handle allowed to drive it.
struct ActiveLayout {
    session: LayoutSession,
    handle: TickHandle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct FilterKey {
    search: String,
    group: Option<String>,
    store_revision: u64,
}

struct Notification {
    title: String,
    body: String,
    is_error: bool,
    expires_at: Option<f64>,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        devices_path: PathBuf,
        layout_config: LayoutConfig,
    ) -> Self {
        let state = Self::start_load(devices_path.clone());
        Self {
            devices_path,
            layout_config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(devices_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_devices(&devices_path).map_err(|error| format!("{error:#}"));
            if let Ok(devices) = &result {
                info!(count = devices.len(), path = %devices_path.display(), "device inventory loaded");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(devices_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(devices_path),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(devices)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            devices,
                            self.layout_config,
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading device inventory...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the device inventory");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.devices_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.devices_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(devices)) => model.replace_devices(devices),
                        Ok(Err(error)) => {
                            warn!(%error, "device reload failed; keeping the current inventory");
                            model.notify_error(ctx, "Reload failed", error);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.notify_error(
                                ctx,
                                "Reload failed",
                                "Background load worker disconnected".to_owned(),
                            );
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
