use std::collections::VecDeque;

use eframe::egui::{self, Context, Vec2};
use tracing::info;

use crate::device::{Device, DeviceId, DeviceStore};
use crate::layout::LayoutConfig;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(devices: Vec<Device>, layout_config: LayoutConfig) -> Self {
        Self {
            store: DeviceStore::new(devices),
            layout_config,
            search: String::new(),
            group_filter: None,
            selected: None,
            hovered: None,
            dragging: None,
            rename_buffer: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            layout: None,
            layout_error: None,
            filter_key: None,
            filtered: Vec::new(),
            snapshot: None,
            notifications: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_header(ui, reload_requested, is_reloading));

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        self.draw_notifications(ctx);
    }

    /// Swaps in a freshly loaded inventory. The layout survives: devices
    /// that are still present keep their positions.
    pub(in crate::app) fn replace_devices(&mut self, devices: Vec<Device>) {
        info!(count = devices.len(), "device inventory replaced");
        self.store.replace_all(devices);

        if let Some(selected) = &self.selected
            && self.store.get(selected).is_none()
        {
            self.set_selected(None);
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<DeviceId>) {
        if self.selected == selected {
            return;
        }

        match &selected {
            Some(id) => info!(device = %id, "device selected"),
            None => info!("selection cleared"),
        }

        self.rename_buffer = selected
            .as_ref()
            .and_then(|id| self.store.get(id))
            .map(|device| device.display_name().to_owned())
            .unwrap_or_default();
        self.selected = selected;
    }
}
