//! Shrink-to-fit sizing and greedy word wrap.

use super::font::measure_text;

/// Bounds for [`shrink_to_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitLimits {
    /// Largest size ever returned.
    pub ceiling: f32,
    /// Smallest size ever returned.
    pub floor: f32,
    /// Decrement per attempt.
    pub step: f32,
    /// Starting size as a fraction of the box height.
    pub height_ratio: f32,
}

impl Default for FitLimits {
    fn default() -> Self {
        Self {
            ceiling: 40.0,
            floor: 8.0,
            step: 2.0,
            height_ratio: 0.8,
        }
    }
}

/// Largest font size (pixels) at which `text` fits in `box_width`.
///
/// Starts at `min(box_height × 0.8, 40)` and steps down by 2 until the
/// measured width fits or the 8px floor is reached. The result always lies
/// in `[floor, ceiling]`.
pub fn shrink_to_fit(text: &str, box_width: f32, box_height: f32) -> f32 {
    shrink_to_fit_with(text, box_width, box_height, FitLimits::default())
}

pub fn shrink_to_fit_with(text: &str, box_width: f32, box_height: f32, limits: FitLimits) -> f32 {
    let mut size = (box_height * limits.height_ratio).min(limits.ceiling);
    if !size.is_finite() {
        size = limits.floor;
    }
    let step = if limits.step > 0.0 { limits.step } else { 1.0 };
    while size > limits.floor && measure_text(text, size) > box_width {
        size -= step;
    }
    size.clamp(limits.floor, limits.ceiling)
}

/// Greedy word wrap at `px`, keeping at most `max_lines` lines.
///
/// Words that do not fit on the last allowed line are dropped without an
/// ellipsis. A single word wider than the line stays on its own line.
pub fn wrap_words(text: &str, px: f32, max_width: f32, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if current.is_empty() || measure_text(&candidate, px) <= max_width {
            current = candidate;
            continue;
        }

        lines.push(std::mem::take(&mut current));
        if lines.len() == max_lines {
            return lines;
        }
        current = word.to_string();
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}
