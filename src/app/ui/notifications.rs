use eframe::egui::{self, Align2, Color32, Context, RichText, vec2};

use super::super::{Notification, ViewModel};

const MAX_NOTIFICATIONS: usize = 5;
const INFO_SECONDS: f64 = 4.0;
const ERROR_SECONDS: f64 = 8.0;

impl ViewModel {
    /// Queues a toast. The expiry clock starts the first frame it is drawn
    /// unless `expires_at` is already known.
    pub(in crate::app) fn push_notification(
        &mut self,
        title: &str,
        body: String,
        is_error: bool,
        expires_at: Option<f64>,
    ) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            title: title.to_owned(),
            body,
            is_error,
            expires_at,
        });
    }

    pub(in crate::app) fn notify(&mut self, ctx: &Context, title: &str, body: String) {
        let now = ctx.input(|input| input.time);
        self.push_notification(title, body, false, Some(now + INFO_SECONDS));
    }

    pub(in crate::app) fn notify_error(&mut self, ctx: &Context, title: &str, body: String) {
        let now = ctx.input(|input| input.time);
        self.push_notification(title, body, true, Some(now + ERROR_SECONDS));
    }

    pub(in crate::app) fn draw_notifications(&mut self, ctx: &Context) {
        let now = ctx.input(|input| input.time);
        for notification in &mut self.notifications {
            if notification.expires_at.is_none() {
                let lifetime = if notification.is_error {
                    ERROR_SECONDS
                } else {
                    INFO_SECONDS
                };
                notification.expires_at = Some(now + lifetime);
            }
        }
        self.notifications
            .retain(|notification| notification.expires_at.is_some_and(|at| at > now));

        if self.notifications.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("notifications"))
            .anchor(Align2::RIGHT_BOTTOM, vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                ui.set_max_width(320.0);
                for (index, notification) in self.notifications.iter().enumerate() {
                    let accent = if notification.is_error {
                        Color32::from_rgb(220, 110, 110)
                    } else {
                        Color32::from_rgb(110, 190, 140)
                    };

                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&notification.title).strong().color(accent));
                            if ui.small_button("x").clicked() {
                                dismissed = Some(index);
                            }
                        });
                        if !notification.body.is_empty() {
                            ui.label(&notification.body);
                        }
                    });
                    ui.add_space(6.0);
                }
            });

        if let Some(index) = dismissed {
            self.notifications.remove(index);
        }

        // Keep repainting so expired toasts disappear without input.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
