use eframe::egui::{self, Align, Layout, Ui};

use crate::layout::Phase;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_header(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        let summary = self.store.summary();

        ui.horizontal(|ui| {
            ui.heading("lanmap");
            ui.separator();
            let by_category = summary
                .by_category
                .iter()
                .map(|(category, count)| format!("{category}: {count}"))
                .collect::<Vec<_>>()
                .join("\n");
            ui.label(format!("devices: {}", summary.total))
                .on_hover_text(by_category);
            ui.label(format!("active: {}", summary.active));
            for (group, count) in &summary.by_group {
                ui.small(format!("{group}: {count}"));
            }
            ui.separator();

            ui.label("Search");
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("name, hostname, vendor or IP")
                    .desired_width(220.0),
            );

            let selected_text = self.group_filter.as_deref().unwrap_or("All groups").to_owned();
            egui::ComboBox::from_id_salt("group_filter")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.group_filter, None, "All groups");
                    for name in self.store.group_names() {
                        ui.selectable_value(&mut self.group_filter, Some(name.clone()), name);
                    }
                });

            let reload_button = ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
            if reload_button.clicked() {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(self.layout_status_text());
            });
        });
    }

    fn layout_status_text(&self) -> String {
        if let Some(error) = &self.layout_error {
            return format!("update rejected: {error}");
        }

        let Some(active) = self.layout.as_ref() else {
            return "no devices match".to_owned();
        };

        let phase = match active.session.phase() {
            _ if !active.session.is_current(&active.handle) => "idle",
            Phase::Running => "settling",
            Phase::Converged => "settled",
            Phase::Idle => "idle",
        };
        format!(
            "{phase} | step {} | alpha {:.3} | {} shown",
            active.session.step(),
            active.session.alpha(),
            active.session.particles().len()
        )
    }
}
