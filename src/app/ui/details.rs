use std::sync::Arc;

use eframe::egui::{self, Color32, Context, RichText, Ui};
use tracing::{info, warn};

use crate::device::{BlockCategory, Device, DeviceAction, DeviceId, StoreError, group_name};

use super::super::ViewModel;

const MOVABLE_GROUPS: [u32; 4] = [1, 2, 3, 4];

fn field_row(ui: &mut Ui, label: &str, value: &str) {
    ui.label(RichText::new(label).weak());
    if value.is_empty() {
        ui.label("-");
    } else {
        ui.label(value);
    }
    ui.end_row();
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.selected.clone() else {
            return;
        };

        let Some(device) = self.store.get(&selected_id).map(Arc::clone) else {
            ui.label("Selected device is no longer in the inventory.");
            if ui.button("Close").clicked() {
                self.set_selected(None);
            }
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(device.display_name());
            if ui.small_button("Close").clicked() {
                self.set_selected(None);
            }
        });
        ui.small(format!("id {}", device.id));
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("device_details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_identity(ui, &device);
                ui.separator();
                self.draw_management(ui, &device);
                ui.separator();
                self.draw_blocklist(ui, &device);
            });
    }

    fn draw_identity(ui: &mut Ui, device: &Device) {
        egui::Grid::new("device_identity")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                field_row(ui, "Hostname", &device.hostname);
                field_row(ui, "Vendor", &device.vendor);
                field_row(ui, "IP", &device.ip);
                field_row(ui, "MAC", &device.mac);
                field_row(
                    ui,
                    "Status",
                    if device.is_active { "active" } else { "inactive" },
                );
                field_row(ui, "Group", device.group_name().unwrap_or(""));
                field_row(ui, "First seen", &device.first_seen);
                field_row(ui, "Last seen", &device.last_seen);
                field_row(ui, "OS", &device.os_name);
                field_row(ui, "OS family", &device.os_family);
                field_row(ui, "Category", device.category());
                field_row(ui, "Type", &device.ai_classification.device_type);
                field_row(
                    ui,
                    "Confidence",
                    &format!("{:.0}%", device.confidence() * 100.0),
                );
            });

        if !device.ai_classification.reasoning.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new(&device.ai_classification.reasoning).italics());
        }
    }

    fn draw_management(&mut self, ui: &mut Ui, device: &Device) {
        ui.label(RichText::new("Manage").strong());

        let mut rename_to = None;
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.rename_buffer).desired_width(180.0));
            let trimmed = self.rename_buffer.trim();
            let can_rename = !trimmed.is_empty() && trimmed != device.display_name();
            if ui.add_enabled(can_rename, egui::Button::new("Rename")).clicked() {
                rename_to = Some(trimmed.to_owned());
            }
        });

        let mut move_to = None;
        ui.horizontal(|ui| {
            ui.label("Move to");
            for group_id in MOVABLE_GROUPS {
                let Some(name) = group_name(group_id) else {
                    continue;
                };
                let current = device.group_id() == Some(group_id);
                if ui.add_enabled(!current, egui::Button::new(name)).clicked() {
                    move_to = Some(group_id);
                }
            }
        });

        let ctx = ui.ctx().clone();
        if let Some(name) = rename_to {
            let result = self.store.rename(&device.id, &name);
            self.report_store_result(&ctx, &device.id, "Device renamed", result);
        }
        if let Some(group_id) = move_to {
            let result = self.store.set_group(&device.id, group_id);
            self.report_store_result(&ctx, &device.id, "Device moved", result);
        }
    }

    fn draw_blocklist(&mut self, ui: &mut Ui, device: &Device) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Blocklist").strong());
            if device.has_custom_blocklist() {
                ui.small(RichText::new("custom").color(Color32::from_rgb(214, 160, 86)));
            }
        });

        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("Isolate").clicked() {
                action = Some(DeviceAction::Isolate);
            }
            if ui.button("Release").clicked() {
                action = Some(DeviceAction::Release);
            }
        });

        egui::Grid::new("device_blocklist")
            .num_columns(2)
            .spacing([12.0, 2.0])
            .show(ui, |ui| {
                for category in BlockCategory::ALL {
                    let mut blocked = device.blocklist.get(category);
                    ui.label(category.label());
                    if ui.checkbox(&mut blocked, "blocked").changed() {
                        action = Some(DeviceAction::ToggleBlock { category });
                    }
                    ui.end_row();
                }
            });

        if let Some(action) = action {
            let ctx = ui.ctx().clone();
            self.dispatch_action(&ctx, &device.id, action);
        }
    }

    pub(in crate::app) fn dispatch_action(
        &mut self,
        ctx: &Context,
        id: &DeviceId,
        action: DeviceAction,
    ) {
        info!(device = %id, ?action, "dispatching device action");
        let result = self.store.apply(id, action);
        self.report_store_result(ctx, id, &action.describe(), result);
    }

    fn report_store_result(
        &mut self,
        ctx: &Context,
        id: &DeviceId,
        success_title: &str,
        result: Result<Arc<Device>, StoreError>,
    ) {
        match result {
            Ok(updated) => {
                if self.selected.as_ref() == Some(id) {
                    self.rename_buffer = updated.display_name().to_owned();
                }
                self.notify(ctx, success_title, updated.display_name().to_owned());
            }
            Err(error) => {
                warn!(device = %id, %error, "device update failed");
                self.notify_error(ctx, "Device update failed", error.to_string());
            }
        }
    }
}
