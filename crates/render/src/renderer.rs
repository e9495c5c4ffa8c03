use std::fmt::Write;

use neoncity_kernel::CameraState;
use neoncity_layout::{FaceMode, Layout};

use crate::palette::Palette;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// `prepare` runs once with the finished layout; `render` runs every tick
/// with the final, collision-corrected camera pose. Renderers never feed
/// anything back into the session.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    fn prepare(&mut self, layout: &Layout, palette: &Palette);

    fn render(&mut self, camera: &CameraState) -> Self::Output;
}

/// Face behaviour counts for a prepared layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceSummary {
    pub pulse: usize,
    pub select: usize,
    pub scroll_fast: usize,
    pub scroll_slow: usize,
}

impl FaceSummary {
    pub fn count(&mut self, mode: FaceMode) {
        match mode {
            FaceMode::Pulse => self.pulse += 1,
            FaceMode::Select => self.select += 1,
            FaceMode::ScrollFast => self.scroll_fast += 1,
            FaceMode::ScrollSlow => self.scroll_slow += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pulse + self.select + self.scroll_fast + self.scroll_slow
    }
}

/// Headless renderer producing a human-readable frame description.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    header: String,
    faces: FaceSummary,
    special_face: Option<FaceMode>,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faces(&self) -> FaceSummary {
        self.faces
    }

    /// Face behaviour of the special entity, if the layout has one.
    pub fn special_face(&self) -> Option<FaceMode> {
        self.special_face
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn prepare(&mut self, layout: &Layout, palette: &Palette) {
        self.faces = FaceSummary::default();
        for entity in layout.entities() {
            self.faces.count(FaceMode::at(entity.position.x, entity.position.z));
        }
        let special = layout.special();
        self.special_face = special.map(|e| FaceMode::at(e.position.x, e.position.z));

        let config = layout.config();
        let mut header = format!(
            "=== City {}x{} ({} buildings, {} themes) ===\n",
            config.rows,
            config.cols,
            layout.entity_count(),
            palette.theme_count()
        );
        let _ = writeln!(
            header,
            "Faces: pulse={} select={} scroll_fast={} scroll_slow={}",
            self.faces.pulse, self.faces.select, self.faces.scroll_fast, self.faces.scroll_slow
        );
        match special {
            Some(e) => {
                let edge = palette
                    .special(e.material.theme, e.material.variant)
                    .map(|m| m.edge.to_string())
                    .unwrap_or_default();
                let _ = writeln!(
                    header,
                    "Special: cell={} pos=({:.1}, {:.1}, {:.1}) face={:?} edge={}",
                    e.cell, e.position.x, e.position.y, e.position.z, self.special_face, edge
                );
            }
            None => header.push_str("Special: none\n"),
        }
        self.header = header;
        tracing::debug!(faces = self.faces.total(), "debug renderer prepared");
    }

    fn render(&mut self, camera: &CameraState) -> String {
        self.frames += 1;
        let mut out = self.header.clone();
        let f = camera.forward();
        let _ = writeln!(
            out,
            "Frame {} [{:?}] eye=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3} fwd=({:.2}, {:.2}, {:.2})",
            self.frames,
            camera.mode,
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.yaw,
            camera.pitch,
            f.x,
            f.y,
            f.z
        );
        out
    }
}
