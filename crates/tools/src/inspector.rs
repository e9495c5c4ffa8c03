use neoncity_common::CellCoord;
use neoncity_kernel::{Mode, Session};
use neoncity_layout::{FaceMode, Layout, seed};
use serde::Serialize;

/// Read-only queries against a layout or a running session.
pub struct LayoutInspector;

impl LayoutInspector {
    pub fn summary(layout: &Layout) -> LayoutSummary {
        let config = layout.config();
        LayoutSummary {
            rows: config.rows,
            cols: config.cols,
            entity_count: layout.entity_count(),
            void_cells: config.cell_count() - config.buildable_count(),
            special: layout.special().map(|e| e.cell),
            theme_histogram: layout.theme_histogram(),
        }
    }

    pub fn inspect_cell(layout: &Layout, coord: CellCoord) -> Option<CellInfo> {
        let Some(cell) = layout.cell(coord) else {
            tracing::debug!(%coord, "inspected cell lies outside the grid");
            return None;
        };
        let center = layout.config().cell_center(coord);
        let value = seed(center.x, center.z);
        let entity = layout.at(coord);
        Some(CellInfo {
            coord,
            world: [center.x, center.z],
            seed: value,
            face: format!("{:?}", FaceMode::from_seed(value)),
            theme: cell.theme_index,
            variant: entity.map(|e| e.material.variant),
            is_void: cell.is_void,
            is_special: cell.is_special,
        })
    }

    /// One character per cell, row 0 first: theme digit for buildings, `.`
    /// for void cells, `*` for the special entity.
    pub fn ascii_map(layout: &Layout) -> String {
        let config = layout.config();
        let mut out = String::with_capacity((config.cols as usize + 1) * config.rows as usize);
        for row in 0..config.rows as i32 {
            for col in 0..config.cols as i32 {
                let ch = match layout.at(CellCoord::new(row, col)) {
                    Some(e) if e.is_special() => '*',
                    Some(e) => char::from_digit(e.material.theme % 36, 36).unwrap_or('#'),
                    None => '.',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    pub fn session(session: &Session) -> SessionSummary {
        let camera = session.camera();
        SessionSummary {
            ticks: session.ticks(),
            elapsed: session.elapsed(),
            mode: camera.mode,
            position: camera.position.to_array(),
            yaw: camera.yaw,
            pitch: camera.pitch,
            pending_events: session.events().len(),
            garbage_progress: session.garbage().map(|g| g.progress),
            run_time_ms: session.run_time_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub rows: u32,
    pub cols: u32,
    pub entity_count: usize,
    pub void_cells: usize,
    pub special: Option<CellCoord>,
    pub theme_histogram: Vec<usize>,
}

impl std::fmt::Display for LayoutSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Layout: {}x{} entities={} void={} themes={:?} special=",
            self.rows, self.cols, self.entity_count, self.void_cells, self.theme_histogram
        )?;
        match self.special {
            Some(cell) => write!(f, "{cell}"),
            None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellInfo {
    pub coord: CellCoord,
    /// World `(x, z)` of the cell centre.
    pub world: [f32; 2],
    pub seed: f64,
    pub face: String,
    pub theme: Option<u32>,
    pub variant: Option<u32>,
    pub is_void: bool,
    pub is_special: bool,
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cell {} world=({:.1}, {:.1}) seed={:.6} face={}",
            self.coord, self.world[0], self.world[1], self.seed, self.face
        )?;
        if self.is_void {
            f.write_str(" void")?;
        }
        if let (Some(theme), Some(variant)) = (self.theme, self.variant) {
            write!(f, " material={theme}/{variant}")?;
        }
        if self.is_special {
            f.write_str(" special")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub ticks: u64,
    pub elapsed: f64,
    pub mode: Mode,
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub pending_events: usize,
    pub garbage_progress: Option<f32>,
    pub run_time_ms: Option<u64>,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session: tick={} t={:.2}s mode={:?} pos=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3} pending_events={}",
            self.ticks,
            self.elapsed,
            self.mode,
            self.position[0],
            self.position[1],
            self.position[2],
            self.yaw,
            self.pitch,
            self.pending_events
        )?;
        if let Some(p) = self.garbage_progress {
            write!(f, " garbage={p:.1}%")?;
        }
        Ok(())
    }
}
