use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, Vec2, pos2, vec2,
};

use crate::device::group_name;
use crate::layout::{LayoutSnapshot, NodeSnapshot, group_band_center};
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, category_color, category_legend, circle_visible, device_radius, draw_background,
    group_tint, world_to_screen,
};

const INACTIVE_GREY: Color32 = Color32::from_rgb(105, 108, 115);
const SELECTION_RING: Color32 = Color32::from_rgb(250, 250, 255);
const RESTRICTION_DOT: Color32 = Color32::from_rgb(230, 90, 90);
const CUSTOM_BLOCKLIST_BADGE: Color32 = Color32::from_rgb(214, 160, 86);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let canvas = rect.size();

        draw_background(&painter, rect, self.pan, self.zoom);

        if canvas.x < 1.0 || canvas.y < 1.0 {
            return;
        }

        self.sync_layout(canvas);
        let running = self.advance_layout();

        let layout_canvas = self
            .layout
            .as_ref()
            .map_or(canvas, |active| active.session.canvas());

        self.handle_graph_zoom(ui, rect, &response, layout_canvas);
        self.handle_graph_pan(&response);

        let Some(snapshot) = self.snapshot.clone() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No devices match the current filter",
                FontId::proportional(16.0),
                Color32::from_gray(170),
            );
            self.hovered = None;
            return;
        };

        self.draw_group_bands(&painter, rect, &snapshot);

        let screen_nodes = snapshot
            .nodes
            .iter()
            .map(|node| {
                (
                    node.id.clone(),
                    world_to_screen(rect, self.pan, self.zoom, node.position, snapshot.canvas),
                    device_radius(node.device.confidence()) * self.zoom,
                )
            })
            .collect::<Vec<_>>();

        if self.dragging.is_none() {
            self.hovered = Self::hovered_device(ui, &screen_nodes);
        }
        self.handle_node_drag(rect, &response, snapshot.canvas);
        self.handle_graph_click(&response);

        for (node, (_, center, radius)) in snapshot.nodes.iter().zip(&screen_nodes) {
            if !circle_visible(rect, *center, radius + 40.0) {
                continue;
            }
            self.draw_node(&painter, node, *center, *radius);
        }

        Self::draw_legend(&painter, rect);

        if let Some(hovered) = &self.hovered
            && let Some(node) = snapshot.node(hovered)
        {
            response.on_hover_text(format!(
                "{}\n{}\n{}",
                node.device.display_name(),
                node.device.ip,
                node.device.vendor
            ));
        }

        if running || self.dragging.is_some() {
            ui.ctx().request_repaint();
        }
    }

    fn draw_group_bands(&self, painter: &Painter, rect: Rect, snapshot: &LayoutSnapshot) {
        let bands = self
            .layout
            .as_ref()
            .map_or(self.layout_config.group_bands, |active| {
                active.session.config().group_bands
            })
            .max(1);
        let band_width = snapshot.canvas.x / bands as f32;

        for band in 0..bands {
            let group_id = band as u32 + 1;
            let center_x = group_band_center(group_id, snapshot.canvas.x, bands);
            let top_left = world_to_screen(
                rect,
                self.pan,
                self.zoom,
                vec2(center_x - band_width * 0.5, 0.0),
                snapshot.canvas,
            );
            let bottom_right = world_to_screen(
                rect,
                self.pan,
                self.zoom,
                vec2(center_x + band_width * 0.5, snapshot.canvas.y),
                snapshot.canvas,
            );
            let band_rect = Rect::from_min_max(top_left, bottom_right);
            if !band_rect.intersects(rect) {
                continue;
            }

            painter.rect_filled(band_rect, 6.0, group_tint(group_id));
            painter.text(
                pos2(band_rect.center().x, band_rect.top() + 14.0),
                Align2::CENTER_CENTER,
                group_name(group_id).unwrap_or("Other"),
                FontId::proportional(13.0),
                Color32::from_gray(160),
            );
        }
    }

    fn node_fill(node: &NodeSnapshot) -> Color32 {
        let base = category_color(node.device.category());
        if node.device.is_active {
            base
        } else {
            blend_color(base, INACTIVE_GREY, 0.75)
        }
    }

    fn draw_node(&self, painter: &Painter, node: &NodeSnapshot, center: Pos2, radius: f32) {
        let device = &node.device;
        let fill = Self::node_fill(node);
        let is_selected = self.selected.as_ref() == Some(&node.id);
        let is_hovered = self.hovered.as_ref() == Some(&node.id);

        if device.is_active {
            painter.circle_stroke(
                center,
                radius + 3.0 * self.zoom.max(0.5),
                Stroke::new(2.0, fill.gamma_multiply(0.35)),
            );
        }

        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(1.0, Color32::from_black_alpha(140)),
        );

        if device.has_restrictions() {
            let offset = vec2(radius * 0.72, -radius * 0.72);
            painter.circle_filled(center + offset, (radius * 0.28).max(2.5), RESTRICTION_DOT);
        }

        if device.has_custom_blocklist() {
            let side = (radius * 0.45).max(4.0);
            let corner = center + vec2(-radius * 0.72, -radius * 0.72);
            painter.rect_filled(
                Rect::from_center_size(corner, Vec2::splat(side)),
                1.0,
                CUSTOM_BLOCKLIST_BADGE,
            );
        }

        if is_selected || is_hovered {
            let width = if is_selected { 2.5 } else { 1.5 };
            painter.circle_stroke(center, radius + 5.0, Stroke::new(width, SELECTION_RING));
        }

        if self.zoom >= 0.45 || is_selected {
            let label_color = if device.is_active {
                Color32::from_gray(225)
            } else {
                Color32::from_gray(150)
            };
            painter.text(
                center + vec2(0.0, radius + 9.0),
                Align2::CENTER_CENTER,
                truncate_label(device.display_name(), 22),
                FontId::proportional(12.0),
                label_color,
            );
            painter.text(
                center + vec2(0.0, radius + 22.0),
                Align2::CENTER_CENTER,
                &device.ip,
                FontId::monospace(10.0),
                Color32::from_gray(130),
            );
        }
    }

    fn draw_legend(painter: &Painter, rect: Rect) {
        let mut cursor = pos2(rect.left() + 14.0, rect.bottom() - 14.0);
        let entries = category_legend().collect::<Vec<_>>();
        for (name, color) in entries.iter().rev() {
            painter.circle_filled(cursor, 5.0, *color);
            painter.text(
                cursor + vec2(10.0, 0.0),
                Align2::LEFT_CENTER,
                *name,
                FontId::proportional(11.0),
                Color32::from_gray(185),
            );
            cursor.y -= 16.0;
        }
    }
}
