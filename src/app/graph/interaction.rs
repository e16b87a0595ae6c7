use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::device::DeviceId;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        canvas: Vec2,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer, canvas);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 5.0);
        self.pan = pointer - rect.center() - (world_before - canvas * 0.5) * self.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Topmost disc under the pointer; later nodes are drawn on top.
    pub(in crate::app) fn hovered_device(
        ui: &Ui,
        screen_nodes: &[(DeviceId, Pos2, f32)],
    ) -> Option<DeviceId> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        screen_nodes
            .iter()
            .rev()
            .find(|(_, position, radius)| position.distance(pointer) <= *radius)
            .map(|(id, _, _)| id.clone())
    }

    /// Primary drag pins the grabbed device under the pointer; letting go
    /// hands it back to the simulation.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        canvas: Vec2,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.dragging = self.hovered.clone();
        }

        let Some(dragged) = self.dragging.clone() else {
            return;
        };

        if response.drag_stopped() {
            if let Some(active) = self.layout.as_mut() {
                active.session.release(&dragged);
            }
            self.dragging = None;
            return;
        }

        if !response.dragged_by(egui::PointerButton::Primary) {
            return;
        }

        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };
        let world = screen_to_world(rect, self.pan, self.zoom, pointer, canvas);
        let pinned = self
            .layout
            .as_mut()
            .is_some_and(|active| active.session.pin(&dragged, world));
        if !pinned {
            self.dragging = None;
        }
    }

    pub(in crate::app) fn handle_graph_click(&mut self, response: &egui::Response) {
        if response.clicked_by(egui::PointerButton::Primary) {
            self.set_selected(self.hovered.clone());
        }
    }
}
