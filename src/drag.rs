use eframe::egui::{Pos2, Rect};
use std::time::{Duration, Instant};

/// Promotion threshold per axis. The trigger is `|dx| > 5 || |dy| > 5`,
/// not Euclidean distance — kept for behavioral compatibility.
pub const DRAG_THRESHOLD_PX: f32 = 5.0;
/// Width of the page-switch zones at the viewport's left/right edges.
pub const EDGE_ZONE_PX: f32 = 100.0;
/// Dwell time before an edge zone flips the page.
pub const EDGE_SWITCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    App,
    Folder,
}

/// Where a drag started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// An item cell in the main grid, by global list index.
    Grid { index: usize, kind: CellKind },
    /// An app inside the open folder view.
    FolderView { folder_id: String, bundle_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHit {
    pub index: usize,
    pub kind: CellKind,
    /// Pointer is over the icon region, not just the cell's outer bounds.
    /// Distinguishes a folder-join hover from a reorder hover.
    pub over_icon: bool,
}

#[derive(Debug, Clone)]
pub struct CellGeom {
    /// Global index of the item rendered in this cell.
    pub index: usize,
    pub kind: CellKind,
    pub rect: Rect,
    pub icon_rect: Rect,
}

/// Geometry of the currently rendered page, rebuilt every frame from the
/// actual cell rects. Hit-testing and slot math happen here instead of
/// querying rendered output.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    pub viewport: Rect,
    pub cells: Vec<CellGeom>,
    pub cols: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_capacity: usize,
    pub item_count: usize,
    /// Content rect of the open folder view, if any.
    pub folder_view: Option<Rect>,
}

impl GridGeometry {
    /// The cell whose outer bounds contain `pos`.
    pub fn hit_test(&self, pos: Pos2) -> Option<CellHit> {
        self.cells.iter().find(|c| c.rect.contains(pos)).map(|c| CellHit {
            index: c.index,
            kind: c.kind,
            over_icon: c.icon_rect.contains(pos),
        })
    }

    /// The tentative insertion index for a reorder preview. Cell pitch is
    /// derived from the rendered rects so non-uniform gaps stay tolerable.
    pub fn slot_at(&self, pos: Pos2) -> Option<usize> {
        if !self.viewport.contains(pos) || self.cols == 0 || self.item_count == 0 {
            return None;
        }
        let page_start = self.page_index * self.page_capacity;
        let Some(first) = self.cells.first() else {
            return Some(page_start.min(self.item_count - 1));
        };

        let origin = first.rect.min;
        let pitch_x = self
            .cells
            .iter()
            .find(|c| c.rect.min.x > origin.x + 0.5)
            .map(|c| c.rect.min.x - origin.x)
            .unwrap_or_else(|| first.rect.width().max(1.0));
        let pitch_y = self
            .cells
            .iter()
            .find(|c| c.rect.min.y > origin.y + 0.5)
            .map(|c| c.rect.min.y - origin.y)
            .unwrap_or_else(|| first.rect.height().max(1.0));

        let col = ((((pos.x - origin.x) / pitch_x).floor()).max(0.0) as usize)
            .min(self.cols.saturating_sub(1));
        let row = (((pos.y - origin.y) / pitch_y).floor()).max(0.0) as usize;
        let slot = (row * self.cols + col).min(self.cells.len().saturating_sub(1));
        Some((page_start + slot).min(self.item_count - 1))
    }

    fn edge_side(&self, pos: Pos2) -> Option<EdgeSide> {
        if !self.viewport.contains(pos) {
            return None;
        }
        if pos.x <= self.viewport.left() + EDGE_ZONE_PX && self.page_index > 0 {
            Some(EdgeSide::Left)
        } else if pos.x >= self.viewport.right() - EDGE_ZONE_PX
            && self.page_index + 1 < self.page_count
        {
            Some(EdgeSide::Right)
        } else {
            None
        }
    }
}

/// What a finished drag resolved to. `None` still clears all drag state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResolution {
    CreateFolder { dragged: usize, target: usize },
    AddToFolder { app_index: usize, folder_index: usize },
    Reorder { from: usize, to: usize },
    RemoveFromFolder { folder_id: String, bundle_id: String },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pending { origin: Pos2 },
    Active,
}

#[derive(Debug, Clone, Copy)]
struct EdgePending {
    side: EdgeSide,
    deadline: Instant,
}

/// Pointer-driven drag state machine: `Idle → Pending → Active → Idle`.
pub struct DragEngine {
    phase: Phase,
    source: Option<DragSource>,
    pointer: Pos2,
    hover: Option<CellHit>,
    preview_slot: Option<usize>,
    edge: Option<EdgePending>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            source: None,
            pointer: Pos2::ZERO,
            hover: None,
            preview_slot: None,
            edge: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn source(&self) -> Option<&DragSource> {
        self.source.as_ref()
    }

    pub fn pointer(&self) -> Pos2 {
        self.pointer
    }

    pub fn hover(&self) -> Option<CellHit> {
        self.hover
    }

    pub fn preview_slot(&self) -> Option<usize> {
        self.preview_slot
    }

    /// Record a candidate drag. No visual change until the threshold trips.
    pub fn pointer_down(&mut self, source: DragSource, pos: Pos2) {
        if !matches!(self.phase, Phase::Idle) {
            return;
        }
        self.phase = Phase::Pending { origin: pos };
        self.source = Some(source);
        self.pointer = pos;
    }

    pub fn pointer_move(&mut self, pos: Pos2, geom: &GridGeometry, now: Instant) {
        self.pointer = pos;
        match self.phase {
            Phase::Idle => {}
            Phase::Pending { origin } => {
                let dx = (pos.x - origin.x).abs();
                let dy = (pos.y - origin.y).abs();
                if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                    self.phase = Phase::Active;
                    self.track(pos, geom, now);
                }
            }
            Phase::Active => self.track(pos, geom, now),
        }
    }

    fn track(&mut self, pos: Pos2, geom: &GridGeometry, now: Instant) {
        let dragged_index = match &self.source {
            Some(DragSource::Grid { index, .. }) => Some(*index),
            _ => None,
        };
        self.hover = geom.hit_test(pos).filter(|hit| Some(hit.index) != dragged_index);
        self.preview_slot = geom.slot_at(pos);

        // Cancel-and-restart on every qualifying move; leaving the zone
        // cancels outright so a stale switch can never fire.
        self.edge = geom.edge_side(pos).map(|side| EdgePending {
            side,
            deadline: now + EDGE_SWITCH_DELAY,
        });
    }

    /// Fires at most once per scheduled deadline.
    pub fn poll_page_switch(&mut self, now: Instant) -> Option<EdgeSide> {
        let pending = self.edge?;
        if now >= pending.deadline {
            self.edge = None;
            Some(pending.side)
        } else {
            None
        }
    }

    /// Resolve the drop and clear all transient state unconditionally.
    pub fn pointer_up(&mut self, pos: Pos2, geom: &GridGeometry) -> DropResolution {
        let resolution = if matches!(self.phase, Phase::Active) {
            self.resolve(pos, geom)
        } else {
            DropResolution::None
        };
        self.reset();
        resolution
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.source = None;
        self.hover = None;
        self.preview_slot = None;
        self.edge = None;
    }

    fn resolve(&self, pos: Pos2, geom: &GridGeometry) -> DropResolution {
        let Some(source) = &self.source else {
            return DropResolution::None;
        };

        match source {
            DragSource::FolderView { folder_id, bundle_id } => match geom.folder_view {
                Some(rect) if rect.contains(pos) => DropResolution::None,
                Some(_) => DropResolution::RemoveFromFolder {
                    folder_id: folder_id.clone(),
                    bundle_id: bundle_id.clone(),
                },
                None => DropResolution::None,
            },
            DragSource::Grid { index, kind } => {
                let from = *index;
                // Resolve against the element under the pointer at drop
                // time, not the last computed preview slot.
                if let Some(hit) = geom.hit_test(pos) {
                    if hit.index == from {
                        return DropResolution::None;
                    }
                    return match (kind, hit.kind) {
                        (CellKind::App, CellKind::App) => DropResolution::CreateFolder {
                            dragged: from,
                            target: hit.index,
                        },
                        (CellKind::App, CellKind::Folder) => DropResolution::AddToFolder {
                            app_index: from,
                            folder_index: hit.index,
                        },
                        // Folder-to-folder merge is not supported; treated
                        // as a same-position no-op.
                        (CellKind::Folder, _) => DropResolution::None,
                    };
                }
                if let Some(slot) = geom.slot_at(pos) {
                    if slot != from {
                        return DropResolution::Reorder { from, to: slot };
                    }
                }
                DropResolution::None
            }
        }
    }
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    const CELL: f32 = 100.0;
    const GAP: f32 = 20.0;
    const ORIGIN_X: f32 = 150.0;
    const ORIGIN_Y: f32 = 80.0;

    fn geometry(kinds: &[CellKind], cols: usize, page_index: usize, page_count: usize) -> GridGeometry {
        let capacity = cols * 3;
        let cells = kinds
            .iter()
            .enumerate()
            .map(|(slot, kind)| {
                let col = slot % cols;
                let row = slot / cols;
                let min = pos2(
                    ORIGIN_X + col as f32 * (CELL + GAP),
                    ORIGIN_Y + row as f32 * (CELL + GAP),
                );
                let rect = Rect::from_min_size(min, vec2(CELL, CELL));
                CellGeom {
                    index: page_index * capacity + slot,
                    kind: *kind,
                    rect,
                    icon_rect: Rect::from_center_size(rect.center(), vec2(60.0, 60.0)),
                }
            })
            .collect();
        GridGeometry {
            viewport: Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)),
            cells,
            cols,
            page_index,
            page_count,
            page_capacity: capacity,
            item_count: page_count * capacity,
            folder_view: None,
        }
    }

    fn cell_center(slot: usize, cols: usize) -> Pos2 {
        let col = slot % cols;
        let row = slot / cols;
        pos2(
            ORIGIN_X + col as f32 * (CELL + GAP) + CELL / 2.0,
            ORIGIN_Y + row as f32 * (CELL + GAP) + CELL / 2.0,
        )
    }

    fn apps(n: usize) -> Vec<CellKind> {
        vec![CellKind::App; n]
    }

    /// Engine mid-drag of the cell at `slot` on the geometry's page.
    fn active_engine(slot: usize, geom: &GridGeometry, now: Instant) -> DragEngine {
        let cell = &geom.cells[slot];
        let start = cell.rect.center();
        let mut engine = DragEngine::new();
        engine.pointer_down(
            DragSource::Grid {
                index: cell.index,
                kind: cell.kind,
            },
            start,
        );
        engine.pointer_move(start + vec2(10.0, 0.0), geom, now);
        assert!(engine.is_active());
        engine
    }

    #[test]
    fn threshold_is_per_axis_not_euclidean() {
        let geom = geometry(&apps(4), 4, 0, 1);
        let now = Instant::now();
        let start = cell_center(0, 4);

        let mut engine = DragEngine::new();
        engine.pointer_down(DragSource::Grid { index: 0, kind: CellKind::App }, start);

        // Euclidean distance ~6.9 but neither axis exceeds 5: still pending.
        engine.pointer_move(start + vec2(4.9, 4.9), &geom, now);
        assert!(!engine.is_active());

        engine.pointer_move(start + vec2(5.5, 0.0), &geom, now);
        assert!(engine.is_active());

        let mut vertical = DragEngine::new();
        vertical.pointer_down(DragSource::Grid { index: 0, kind: CellKind::App }, start);
        vertical.pointer_move(start + vec2(0.0, -5.5), &geom, now);
        assert!(vertical.is_active());
    }

    #[test]
    fn click_without_movement_resolves_to_nothing() {
        let geom = geometry(&apps(4), 4, 0, 1);
        let start = cell_center(0, 4);
        let mut engine = DragEngine::new();
        engine.pointer_down(DragSource::Grid { index: 0, kind: CellKind::App }, start);
        assert_eq!(engine.pointer_up(start, &geom), DropResolution::None);
        assert!(engine.is_idle());
    }

    #[test]
    fn hover_skips_the_dragged_cell() {
        let geom = geometry(&apps(4), 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(0, &geom, now);

        engine.pointer_move(cell_center(0, 4) + vec2(12.0, 0.0), &geom, now);
        assert_eq!(engine.hover(), None);

        engine.pointer_move(cell_center(2, 4), &geom, now);
        assert_eq!(engine.hover().map(|h| h.index), Some(2));
    }

    #[test]
    fn hover_distinguishes_icon_region_from_outer_bounds() {
        let geom = geometry(&apps(4), 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(0, &geom, now);

        engine.pointer_move(cell_center(2, 4), &geom, now);
        assert!(engine.hover().unwrap().over_icon);

        // Corner of the cell: inside the outer bounds, outside the icon.
        let corner = cell_center(2, 4) + vec2(45.0, 45.0);
        engine.pointer_move(corner, &geom, now);
        let hit = engine.hover().unwrap();
        assert_eq!(hit.index, 2);
        assert!(!hit.over_icon);
    }

    #[test]
    fn app_dropped_on_app_creates_folder() {
        let geom = geometry(&apps(8), 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(3, &geom, now);
        let resolution = engine.pointer_up(cell_center(7, 4), &geom);
        assert_eq!(resolution, DropResolution::CreateFolder { dragged: 3, target: 7 });
        assert!(engine.is_idle());
    }

    #[test]
    fn app_dropped_on_folder_joins_it() {
        let mut kinds = apps(4);
        kinds[2] = CellKind::Folder;
        let geom = geometry(&kinds, 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(0, &geom, now);
        let resolution = engine.pointer_up(cell_center(2, 4), &geom);
        assert_eq!(resolution, DropResolution::AddToFolder { app_index: 0, folder_index: 2 });
    }

    #[test]
    fn folder_dropped_on_anything_is_a_noop() {
        let mut kinds = apps(4);
        kinds[1] = CellKind::Folder;
        kinds[3] = CellKind::Folder;
        let geom = geometry(&kinds, 4, 0, 1);
        let now = Instant::now();

        let mut engine = active_engine(1, &geom, now);
        assert_eq!(engine.pointer_up(cell_center(0, 4), &geom), DropResolution::None);

        let mut engine = active_engine(1, &geom, now);
        assert_eq!(engine.pointer_up(cell_center(3, 4), &geom), DropResolution::None);
    }

    #[test]
    fn drop_on_empty_cell_reorders_to_slot() {
        // Two rows of four; drop into the gap area below the first row
        // between cells, far from any outer bounds.
        let geom = geometry(&apps(8), 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(0, &geom, now);

        // Point inside the viewport, in the gutter between cell 5 and 6.
        let gutter = pos2(
            ORIGIN_X + 2.0 * (CELL + GAP) - GAP / 2.0,
            ORIGIN_Y + (CELL + GAP) + CELL / 2.0,
        );
        assert!(geom.hit_test(gutter).is_none());
        let resolution = engine.pointer_up(gutter, &geom);
        assert!(matches!(resolution, DropResolution::Reorder { from: 0, .. }));
    }

    #[test]
    fn self_drop_is_a_noop() {
        let geom = geometry(&apps(4), 4, 0, 1);
        let now = Instant::now();
        let mut engine = active_engine(1, &geom, now);
        assert_eq!(engine.pointer_up(cell_center(1, 4), &geom), DropResolution::None);
    }

    #[test]
    fn preview_slot_accounts_for_page_offset() {
        let geom = geometry(&apps(8), 4, 1, 2);
        let now = Instant::now();
        let mut engine = active_engine(0, &geom, now);
        engine.pointer_move(cell_center(2, 4), &geom, now);
        assert_eq!(engine.preview_slot(), Some(12 + 2));
    }

    #[test]
    fn folder_view_drag_out_removes_from_folder() {
        let mut geom = geometry(&apps(4), 4, 0, 1);
        geom.folder_view = Some(Rect::from_min_size(pos2(200.0, 150.0), vec2(300.0, 250.0)));
        let now = Instant::now();

        let mut engine = DragEngine::new();
        let start = pos2(250.0, 200.0);
        engine.pointer_down(
            DragSource::FolderView {
                folder_id: "f1".to_string(),
                bundle_id: "com.test.appx".to_string(),
            },
            start,
        );
        engine.pointer_move(start + vec2(20.0, 0.0), &geom, now);

        // Drop inside the folder view: nothing happens.
        let mut inside = DragEngine::new();
        inside.pointer_down(
            DragSource::FolderView {
                folder_id: "f1".to_string(),
                bundle_id: "com.test.appx".to_string(),
            },
            start,
        );
        inside.pointer_move(start + vec2(20.0, 0.0), &geom, now);
        assert_eq!(inside.pointer_up(pos2(300.0, 220.0), &geom), DropResolution::None);

        // Drop outside it: the app leaves the folder.
        assert_eq!(
            engine.pointer_up(pos2(60.0, 500.0), &geom),
            DropResolution::RemoveFromFolder {
                folder_id: "f1".to_string(),
                bundle_id: "com.test.appx".to_string(),
            }
        );
    }

    #[test]
    fn edge_zone_schedules_after_dwell() {
        let geom = geometry(&apps(8), 4, 1, 3);
        let t0 = Instant::now();
        let mut engine = active_engine(0, &geom, t0);

        engine.pointer_move(pos2(50.0, 300.0), &geom, t0);
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(400)), None);
        assert_eq!(
            engine.poll_page_switch(t0 + Duration::from_millis(500)),
            Some(EdgeSide::Left)
        );
        // Fires once per deadline.
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn edge_timer_restarts_on_every_qualifying_move() {
        let geom = geometry(&apps(8), 4, 1, 3);
        let t0 = Instant::now();
        let mut engine = active_engine(0, &geom, t0);

        engine.pointer_move(pos2(50.0, 300.0), &geom, t0);
        engine.pointer_move(pos2(60.0, 310.0), &geom, t0 + Duration::from_millis(300));
        // The first deadline would have passed; the restart supersedes it.
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(600)), None);
        assert_eq!(
            engine.poll_page_switch(t0 + Duration::from_millis(800)),
            Some(EdgeSide::Left)
        );
    }

    #[test]
    fn leaving_the_edge_zone_cancels_the_timer() {
        let geom = geometry(&apps(8), 4, 1, 3);
        let t0 = Instant::now();
        let mut engine = active_engine(0, &geom, t0);

        engine.pointer_move(pos2(50.0, 300.0), &geom, t0);
        engine.pointer_move(pos2(400.0, 300.0), &geom, t0 + Duration::from_millis(100));
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(2000)), None);
    }

    #[test]
    fn edge_zone_only_schedules_toward_existing_pages() {
        let geom = geometry(&apps(8), 4, 0, 1);
        let t0 = Instant::now();
        let mut engine = active_engine(0, &geom, t0);

        engine.pointer_move(pos2(50.0, 300.0), &geom, t0);
        engine.pointer_move(pos2(750.0, 300.0), &geom, t0);
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(2000)), None);
    }

    #[test]
    fn pointer_up_clears_everything_including_edge_timer() {
        let geom = geometry(&apps(8), 4, 1, 3);
        let t0 = Instant::now();
        let mut engine = active_engine(0, &geom, t0);

        engine.pointer_move(pos2(50.0, 300.0), &geom, t0);
        let _ = engine.pointer_up(pos2(50.0, 300.0), &geom);

        assert!(engine.is_idle());
        assert_eq!(engine.source(), None);
        assert_eq!(engine.hover(), None);
        assert_eq!(engine.preview_slot(), None);
        assert_eq!(engine.poll_page_switch(t0 + Duration::from_millis(2000)), None);
    }
}
