use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic pair in `[-1, 1]` derived from `id`; the same id always
/// spawns at the same offset.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated = text.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("device-17");
        assert_eq!(first, stable_pair("device-17"));
        assert_ne!(first, stable_pair("device-18"));
        for value in [first.0, first.1] {
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(truncate_label("printer", 10), "printer");
        assert_eq!(truncate_label("living-room-television", 8), "living-…");
    }
}
