use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const BASE_NODE_RADIUS: f32 = 12.0;

const CATEGORY_COLORS: [(&str, Color32); 8] = [
    ("computer", Color32::from_rgb(86, 156, 214)),
    ("phone", Color32::from_rgb(106, 190, 120)),
    ("tablet", Color32::from_rgb(140, 200, 170)),
    ("printer", Color32::from_rgb(214, 160, 86)),
    ("tv", Color32::from_rgb(190, 120, 210)),
    ("iot", Color32::from_rgb(230, 200, 90)),
    ("camera", Color32::from_rgb(220, 110, 110)),
    ("network", Color32::from_rgb(120, 180, 220)),
];

const GROUP_TINTS: [Color32; 4] = [
    Color32::from_rgba_premultiplied(40, 60, 90, 40),
    Color32::from_rgba_premultiplied(40, 80, 55, 40),
    Color32::from_rgba_premultiplied(90, 70, 35, 40),
    Color32::from_rgba_premultiplied(75, 45, 90, 40),
];

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step) + rect.left();
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step) + rect.top();
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Layout coordinates put the canvas centre at the middle of the viewport
/// before pan and zoom apply.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2, canvas: Vec2) -> Pos2 {
    rect.center() + pan + (world - canvas * 0.5) * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2, canvas: Vec2) -> Vec2 {
    (screen - rect.center() - pan) / zoom + canvas * 0.5
}

pub(super) fn device_radius(confidence: f32) -> f32 {
    BASE_NODE_RADIUS * (confidence.clamp(0.0, 1.0) * 0.5 + 0.5)
}

pub(super) fn category_color(category: &str) -> Color32 {
    CATEGORY_COLORS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(category))
        .map(|(_, color)| *color)
        .unwrap_or(Color32::from_rgb(150, 150, 160))
}

pub(super) fn category_legend() -> impl Iterator<Item = (&'static str, Color32)> {
    CATEGORY_COLORS.iter().copied()
}

pub(super) fn group_tint(group_id: u32) -> Color32 {
    GROUP_TINTS[(group_id.saturating_sub(1) as usize) % GROUP_TINTS.len()]
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn screen_mapping_round_trips_through_pan_and_zoom() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(640.0, 480.0));
        let canvas = vec2(800.0, 600.0);
        let world = vec2(123.0, 456.0);

        let screen = world_to_screen(rect, vec2(15.0, -7.0), 1.7, world, canvas);
        let back = screen_to_world(rect, vec2(15.0, -7.0), 1.7, screen, canvas);

        assert!((back - world).length() < 1e-3);
        assert_eq!(
            world_to_screen(rect, Vec2::ZERO, 1.0, canvas * 0.5, canvas),
            rect.center()
        );
    }

    #[test]
    fn radius_grows_with_confidence() {
        assert_eq!(device_radius(0.0), 6.0);
        assert_eq!(device_radius(1.0), 12.0);
        assert!(device_radius(0.5) > device_radius(0.2));
    }

    #[test]
    fn unknown_categories_get_a_neutral_color() {
        assert_eq!(category_color("Printer"), category_color("printer"));
        assert_eq!(category_color("toaster"), Color32::from_rgb(150, 150, 160));
    }
}
