use crate::foundation::core::FrameSize;

/// Viewfinder pan state, mutated once per transform update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanState {
    /// Horizontal offset of the preview canvas, in canvas pixels.
    pub offset: f64,
    pub last_translation_x: f64,
    pub active: bool,
}

/// Derives a clamped horizontal pan offset from frame-to-frame translation.
#[derive(Clone, Debug)]
pub struct PanController {
    state: PanState,
    factor: f64,
    border: f64,
    canvas_width: f64,
    frame_width: f64,
    center_offset_x: f64,
}

impl PanController {
    pub fn new(factor: f64, border: f64, canvas: FrameSize, frame: FrameSize) -> Self {
        let canvas_width = f64::from(canvas.width);
        let frame_width = f64::from(frame.width);
        let mut pan = Self {
            state: PanState::default(),
            factor,
            border,
            canvas_width,
            frame_width,
            center_offset_x: 0.5 * (canvas_width - frame_width),
        };
        pan.reset();
        pan
    }

    pub fn state(&self) -> PanState {
        self.state
    }

    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    /// Back to the centered offset; inactive when even that leaves the border band.
    pub fn reset(&mut self) {
        self.state = PanState {
            active: self.within_limits(0.0),
            ..PanState::default()
        };
        if !self.state.active {
            tracing::warn!(
                canvas_width = self.canvas_width,
                frame_width = self.frame_width,
                border = self.border,
                "frame does not fit inside the viewport border"
            );
        }
    }

    /// Normalized screen positions of the frame's left and right edges at `offset`.
    pub fn projected_edges(&self, offset: f64) -> (f64, f64) {
        let left = self.center_offset_x + offset;
        let right = left + self.frame_width;
        (
            2.0 * left / self.canvas_width - 1.0,
            2.0 * right / self.canvas_width - 1.0,
        )
    }

    /// Allowed `[min, max]` band for projected edges.
    pub fn limits(&self) -> (f64, f64) {
        (-1.0 + 2.0 * self.border, 1.0 - 2.0 * self.border)
    }

    pub fn within_limits(&self, offset: f64) -> bool {
        let (left, right) = self.projected_edges(offset);
        let (min, max) = self.limits();
        left >= min && right <= max
    }

    /// Feed the current frame's x translation; returns the offset to present with.
    pub fn update(&mut self, translation_x: f64) -> f64 {
        let delta = (translation_x - self.state.last_translation_x) * self.factor;
        self.state.last_translation_x = translation_x;

        let candidate = self.state.offset + delta;
        if self.within_limits(candidate) {
            self.state.offset = candidate;
            self.state.active = true;
        } else {
            if self.state.active {
                tracing::debug!(offset = self.state.offset, "viewfinder pan frozen at border");
            }
            self.state.active = false;
        }
        self.state.offset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pan.rs"]
mod tests;
