use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::layout::{LayoutError, LayoutSession, filter_devices};

use super::super::{ActiveLayout, FilterKey, ViewModel};

impl ViewModel {
    fn current_filter_key(&self) -> FilterKey {
        FilterKey {
            search: self.search.trim().to_owned(),
            group: self.group_filter.clone(),
            store_revision: self.store.revision(),
        }
    }

    /// Re-filters the inventory when the search, group filter or store
    /// changed, then keeps the running layout in step with the result.
    pub(in crate::app) fn sync_layout(&mut self, canvas: Vec2) {
        let key = self.current_filter_key();
        if self.filter_key.as_ref() != Some(&key) {
            self.filtered = filter_devices(self.store.devices(), &key.search, key.group.as_deref());
            debug!(
                visible = self.filtered.len(),
                total = self.store.devices().len(),
                search = %key.search,
                "device filter applied"
            );
            self.filter_key = Some(key);
            self.apply_filtered(canvas);
        }

        if let Some(active) = self.layout.as_mut()
            && let Err(error) = active.session.resize(canvas.x, canvas.y)
        {
            warn!(%error, "layout canvas rejected");
        }
    }

    fn apply_filtered(&mut self, canvas: Vec2) {
        if self.filtered.is_empty() {
            self.teardown_layout();
            return;
        }

        let result = match self.layout.as_mut() {
            Some(active) => active.session.reconcile(&self.filtered).map(|_| ()),
            None => self.mount_layout(canvas),
        };

        match result {
            Ok(()) => {
                self.layout_error = None;
                if let Some(active) = self.layout.as_ref() {
                    self.snapshot = active.session.latest_snapshot();
                }
            }
            Err(error) => {
                warn!(%error, "device set rejected by the layout; keeping the previous layout");
                let message = error.to_string();
                self.layout_error = Some(message.clone());
                self.push_notification("Layout update rejected", message, true, None);
            }
        }
    }

    fn mount_layout(&mut self, canvas: Vec2) -> Result<(), LayoutError> {
        let mut session = LayoutSession::new(self.layout_config, canvas.x, canvas.y)?;
        session.reconcile(&self.filtered)?;
        let handle = session.start();
        self.snapshot = session.latest_snapshot();
        self.layout = Some(ActiveLayout { session, handle });
        Ok(())
    }

    fn teardown_layout(&mut self) {
        if let Some(mut active) = self.layout.take() {
            active.session.stop();
        }
        self.snapshot = None;
        self.hovered = None;
        self.dragging = None;
    }

    /// One frame's worth of layout: a tick while running, otherwise the last
    /// snapshot the session produced.
    pub(in crate::app) fn advance_layout(&mut self) -> bool {
        let Some(active) = self.layout.as_mut() else {
            self.snapshot = None;
            return false;
        };

        let ticked = active.session.tick(&active.handle);
        let running = ticked.is_some();
        self.snapshot = ticked.or_else(|| active.session.latest_snapshot());
        running
    }
}
