use crate::color::RgbColor;
use crate::vector::Vector2;

/// Body proportions shared by many fish, all relative to the fish's size.
#[derive(Debug, PartialEq)]
pub(crate) struct FishKind {
    pub(crate) tail_width: f64,
    pub(crate) tail_length: f64,
    pub(crate) main_floater_length: f64,
    pub(crate) top_floater_height: f64,
    pub(crate) body_length: f64,
    pub(crate) eye_size: f64,
}

pub(crate) static FISH_KINDS: [FishKind; 4] = [
    FishKind {
        tail_width: 0.45,
        tail_length: 0.5,
        main_floater_length: 0.33,
        top_floater_height: 0.2,
        body_length: 1.1,
        eye_size: 0.1,
    },
    FishKind {
        tail_width: 0.5,
        tail_length: 0.5,
        main_floater_length: 0.4,
        top_floater_height: 0.15,
        body_length: 0.7,
        eye_size: 0.08,
    },
    FishKind {
        tail_width: 0.35,
        tail_length: 0.45,
        main_floater_length: 0.45,
        top_floater_height: 0.2,
        body_length: 1.0,
        eye_size: 0.11,
    },
    FishKind {
        tail_width: 0.4,
        tail_length: 0.3,
        main_floater_length: 0.35,
        top_floater_height: 0.15,
        body_length: 0.8,
        eye_size: 0.07,
    },
];

#[derive(Clone, Debug)]
pub(crate) struct Fish {
    pub(crate) position: Vector2,
    /// Heading; the sign of x decides facing and bubble side.
    pub(crate) move_dir: Vector2,
    /// Gaze; offsets the pupil inside the eye.
    pub(crate) look_dir: Vector2,
    pub(crate) size: f64,
    /// Pixels per millisecond.
    pub(crate) speed: f64,
    pub(crate) pupil_ratio: f64,
    pub(crate) kind: &'static FishKind,
    pub(crate) color: RgbColor,
    pub(crate) floater_phase: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct Weed {
    pub(crate) position: Vector2,
    pub(crate) length: f64,
    pub(crate) width: f64,
    pub(crate) layer: i32,
    pub(crate) bend_distance: f64,
    pub(crate) segment_length: f64,
    pub(crate) color: RgbColor,
}

#[derive(Clone, Debug)]
pub(crate) struct Bubble {
    pub(crate) position: Vector2,
    pub(crate) radius: f64,
}

/// Fixed surface size in pixels, set once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Bounds {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Strictly inside; points on an edge count as out.
    pub(crate) fn contains(&self, p: Vector2) -> bool {
        p.x > 0.0 && p.x < self.width && p.y > 0.0 && p.y < self.height
    }
}

/// Behavioural tuning shared by the behaviour tick and the bubble motion.
#[derive(Clone, Debug)]
pub(crate) struct Rules {
    pub(crate) heading_change_chance: f64,
    pub(crate) gaze_change_chance: f64,
    pub(crate) bubble_chance: f64,
    /// Upward drift per millisecond, per pixel of radius.
    pub(crate) bubble_rise_factor: f64,
    pub(crate) bubble_sway_amplitude: f64,
    pub(crate) bubble_sway_frequency: f64,
    /// Elapsed time that yields one full sway step.
    pub(crate) bubble_sway_frame_ms: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            heading_change_chance: 0.05,
            gaze_change_chance: 0.6,
            bubble_chance: 0.3,
            bubble_rise_factor: 0.03,
            bubble_sway_amplitude: 0.2,
            bubble_sway_frequency: 0.1,
            bubble_sway_frame_ms: 16.0,
        }
    }
}

/// Everything both ticks read and write. Owned by the app controller.
#[derive(Debug)]
pub(crate) struct SimulationState {
    pub(crate) bounds: Bounds,
    pub(crate) rules: Rules,
    pub(crate) fish: Vec<Fish>,
    /// Sorted ascending by layer.
    weeds: Vec<Weed>,
    pub(crate) bubbles: Vec<Bubble>,
    pub(crate) last_frame_ms: f64,
}

impl SimulationState {
    pub(crate) fn new(bounds: Bounds, rules: Rules, now_ms: f64) -> Self {
        Self {
            bounds,
            rules,
            fish: Vec::new(),
            weeds: Vec::new(),
            bubbles: Vec::new(),
            last_frame_ms: now_ms,
        }
    }

    pub(crate) fn weeds(&self) -> &[Weed] {
        &self.weeds
    }

    /// Adds weeds while keeping the collection ordered by layer. The sort is
    /// stable, so weeds of one layer keep their insertion order.
    pub(crate) fn add_weeds(&mut self, weeds: impl IntoIterator<Item = Weed>) {
        self.weeds.extend(weeds);
        self.weeds.sort_by_key(|w| w.layer);
    }
}
