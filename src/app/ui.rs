use super::state::ScanStatus;
use super::style::{
    LaunchpadTheme, CELL_ICON_SIDE, CONTENT_PADDING, DOT_RADIUS, DOT_SPACING, FOLDER_VIEW_HEIGHT,
    FOLDER_VIEW_WIDTH, LABEL_HEIGHT, PAGE_BAR_HEIGHT, TOP_BAR_HEIGHT,
};
use super::LaunchpadApp;
use crate::drag::{CellGeom, CellKind, DragSource, EdgeSide, GridGeometry};
use crate::events::UserEvent;
use crate::filter;
use crate::model::LaunchpadItem;
use crate::pagination;
use eframe::egui;
use std::time::{Duration, Instant};

const TOAST_LIFETIME: Duration = Duration::from_millis(2500);

/// Deferred cell actions, applied after the render loops so the item list
/// is not mutated mid-iteration.
enum CellAction {
    Launch(String),
    Reveal(String),
    Trash(String),
    OpenFolder(String),
    Disband(String),
    ToggleTag { bundle_id: String, tag: String },
    RemoveFromFolder { folder_id: String, bundle_id: String },
}

impl eframe::App for LaunchpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_runtime_events(ctx);
        self.expire_toast();
        self.handle_keys(ctx);

        let folder_open_at_frame_start = self.folder_view.is_some();

        self.draw_top_bar(ctx);
        let mut actions = Vec::new();
        self.draw_folder_window(ctx, &mut actions);
        self.draw_central(ctx, folder_open_at_frame_start, &mut actions);
        self.draw_settings_window(ctx);
        self.draw_toast(ctx);

        for action in actions {
            self.apply_cell_action(action);
        }

        if !self.drag.is_idle() {
            ctx.request_repaint();
        }
    }
}

impl LaunchpadApp {
    fn handle_runtime_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.runtime.rx.try_recv() {
            match event {
                UserEvent::AppsLoaded(Ok(apps)) => self.install_scanned_apps(apps),
                UserEvent::AppsLoaded(Err(message)) => {
                    self.scan = ScanStatus::Failed(message);
                }
                UserEvent::IconsReady(updates) => {
                    for update in updates {
                        self.attach_icon_texture(ctx, &update.bundle_id, update.image);
                    }
                }
                UserEvent::AppsChanged => self.request_rescan(),
            }
        }
    }

    fn expire_toast(&mut self) {
        if let Some((_, shown_at)) = &self.toast {
            if shown_at.elapsed() >= TOAST_LIFETIME {
                self.toast = None;
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.settings_open {
                self.settings_open = false;
            } else if self.folder_view.is_some() {
                self.folder_view = None;
                self.drag.cancel();
            } else if self.is_filtering() {
                self.query.clear();
                self.selected_tag = None;
                self.page = 0;
            }
        }

        if !self.is_filtering() && self.folder_view.is_none() && self.drag.is_idle() {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.page = self.page.saturating_sub(1);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.page = (self.page + 1).min(self.page_count() - 1);
            }
        }
    }

    fn draw_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .exact_height(TOP_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.add_space(8.0);
                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .hint_text("Search")
                            .desired_width(220.0),
                    );
                    if search.changed() {
                        self.page = 0;
                        self.drag.cancel();
                    }
                    if !self.query.is_empty() && ui.small_button("✕").clicked() {
                        self.query.clear();
                        self.page = 0;
                    }

                    ui.separator();
                    if self.settings.tag_settings.show_tag_bar {
                        self.draw_tag_chips(ui);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_space(8.0);
                        if ui.button("⚙").on_hover_text("Settings").clicked() {
                            self.settings_open = !self.settings_open;
                        }
                    });
                });
            });
    }

    fn draw_tag_chips(&mut self, ui: &mut egui::Ui) {
        let chips = filter::tag_bar_chips(&self.apps, &self.custom_tags);
        let mut clicked: Option<String> = None;
        egui::ScrollArea::horizontal()
            .id_salt("tag_bar")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for chip in &chips {
                        let selected = self.selected_tag.as_deref() == Some(chip.key.as_str());
                        let text = if chip.count > 0 {
                            format!("{} {}", chip.label, chip.count)
                        } else {
                            chip.label.clone()
                        };
                        if ui.selectable_label(selected, text).clicked() {
                            clicked = Some(chip.key.clone());
                        }
                    }
                });
            });
        if let Some(key) = clicked {
            self.selected_tag = if self.selected_tag.as_deref() == Some(key.as_str()) {
                None
            } else {
                Some(key)
            };
            self.page = 0;
            self.drag.cancel();
        }
    }

    fn draw_central(
        &mut self,
        ctx: &egui::Context,
        folder_open: bool,
        actions: &mut Vec<CellAction>,
    ) {
        let theme = LaunchpadTheme::default();
        let frame = egui::Frame::none().fill(theme.backdrop);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let failed = match &self.scan {
                ScanStatus::Failed(message) => Some(message.clone()),
                _ => None,
            };
            if let Some(message) = failed {
                self.draw_scan_banner(ui, &theme, &message);
            }

            let panel_rect = ui.max_rect();

            if self.items.is_empty() {
                let text = match self.scan {
                    ScanStatus::Scanning => "Loading applications…",
                    _ => "No applications found",
                };
                ui.painter().text(
                    panel_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(16.0),
                    theme.label_dim,
                );
                return;
            }

            if self.is_filtering() {
                self.draw_search_results(ui, &theme, folder_open, actions);
                // A drag out of the folder view still needs to resolve;
                // there is no grid to hit, only the folder rect.
                let geom = GridGeometry {
                    viewport: panel_rect,
                    cells: Vec::new(),
                    cols: self.settings.cols.max(1) as usize,
                    page_index: 0,
                    page_count: 1,
                    page_capacity: self.settings.page_capacity(),
                    item_count: 0,
                    folder_view: self.folder_view.as_ref().and_then(|view| view.rect),
                };
                self.pump_drag(ctx, &geom);
                self.draw_drag_decorations(ctx, &geom, &theme);
            } else {
                self.draw_grid(ui, ctx, panel_rect, &theme, folder_open, actions);
            }
        });
    }

    fn draw_scan_banner(&mut self, ui: &mut egui::Ui, theme: &LaunchpadTheme, message: &str) {
        egui::Frame::none()
            .fill(theme.banner_bg)
            .inner_margin(egui::Margin::symmetric(12.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(theme.toast_text, format!("Could not load applications: {message}"));
                    if ui.button("Retry").clicked() {
                        self.request_rescan();
                    }
                });
            });
    }

    /// Paged grid with drag support. Cell geometry is captured from the
    /// rendered rects and handed to the drag engine.
    fn draw_grid(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        panel_rect: egui::Rect,
        theme: &LaunchpadTheme,
        folder_open: bool,
        actions: &mut Vec<CellAction>,
    ) {
        let capacity = self.settings.page_capacity();
        let cols = self.settings.cols.max(1) as usize;
        let rows = self.settings.rows.max(1) as usize;
        let page_count = pagination::page_count(self.items.len(), capacity);
        self.page = self.page.min(page_count - 1);
        let page_start = self.page * capacity;
        let page_len = pagination::page_slice(&self.items, self.page, capacity).len();

        let content = egui::Rect::from_min_max(
            panel_rect.min + egui::vec2(CONTENT_PADDING, CONTENT_PADDING),
            egui::pos2(
                panel_rect.max.x - CONTENT_PADDING,
                panel_rect.max.y - PAGE_BAR_HEIGHT,
            ),
        );
        let cell_w = content.width() / cols as f32;
        let cell_h = (content.height() / rows as f32).max(CELL_ICON_SIDE + LABEL_HEIGHT + 12.0);

        let interactive = !folder_open;
        let mut cells: Vec<CellGeom> = Vec::with_capacity(page_len);

        for slot in 0..page_len {
            let global = page_start + slot;
            let col = slot % cols;
            let row = slot / cols;
            let rect = egui::Rect::from_min_size(
                egui::pos2(
                    content.min.x + col as f32 * cell_w,
                    content.min.y + row as f32 * cell_h,
                ),
                egui::vec2(cell_w, cell_h),
            );
            let icon_rect = egui::Rect::from_center_size(
                egui::pos2(rect.center().x, rect.min.y + 10.0 + CELL_ICON_SIDE * 0.5),
                egui::vec2(CELL_ICON_SIDE, CELL_ICON_SIDE),
            );

            let kind = match &self.items[global] {
                LaunchpadItem::App(_) => CellKind::App,
                LaunchpadItem::Folder(_) => CellKind::Folder,
            };
            cells.push(CellGeom {
                index: global,
                kind,
                rect,
                icon_rect,
            });

            let response = ui.interact(
                rect,
                ui.make_persistent_id(("grid_cell", global)),
                egui::Sense::click_and_drag(),
            );

            let dragged_away = match self.drag.source() {
                Some(DragSource::Grid { index, .. }) => {
                    *index == global && self.drag.is_active()
                }
                _ => false,
            };
            self.paint_cell(ui, theme, global, rect, icon_rect, dragged_away, response.hovered());

            if !interactive {
                continue;
            }

            if response.is_pointer_button_down_on() && self.drag.is_idle() {
                if let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) {
                    self.drag
                        .pointer_down(DragSource::Grid { index: global, kind }, pos);
                }
            }

            if response.clicked() && !self.drag.is_active() {
                match &self.items[global] {
                    LaunchpadItem::App(app) => actions.push(CellAction::Launch(app.path.clone())),
                    LaunchpadItem::Folder(folder) => {
                        actions.push(CellAction::OpenFolder(folder.id.clone()))
                    }
                }
            }

            self.cell_context_menu(&response, global, actions);
        }

        let geom = GridGeometry {
            viewport: panel_rect,
            cells,
            cols,
            page_index: self.page,
            page_count,
            page_capacity: capacity,
            item_count: self.items.len(),
            folder_view: self.folder_view.as_ref().and_then(|view| view.rect),
        };

        self.pump_drag(ctx, &geom);
        self.draw_drag_decorations(ctx, &geom, theme);
        self.draw_page_dots(ui, panel_rect, page_count, theme);
    }

    /// Feed pointer state through the engine and resolve drops.
    fn pump_drag(&mut self, ctx: &egui::Context, geom: &GridGeometry) {
        let now = Instant::now();

        if !self.drag.is_idle() {
            if let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) {
                self.drag.pointer_move(pos, geom, now);
            }
        }

        if let Some(side) = self.drag.poll_page_switch(now) {
            match side {
                EdgeSide::Left => self.page = self.page.saturating_sub(1),
                EdgeSide::Right => self.page = (self.page + 1).min(geom.page_count - 1),
            }
        }

        if !self.drag.is_idle() && ctx.input(|i| i.pointer.primary_released()) {
            let pos = ctx
                .input(|i| i.pointer.latest_pos())
                .unwrap_or_else(|| self.drag.pointer());
            let resolution = self.drag.pointer_up(pos, geom);
            self.apply_drop(resolution);
        }
    }

    fn paint_cell(
        &self,
        ui: &mut egui::Ui,
        theme: &LaunchpadTheme,
        global: usize,
        rect: egui::Rect,
        icon_rect: egui::Rect,
        dragged_away: bool,
        hovered: bool,
    ) {
        if dragged_away {
            // The ghost overlay represents the item while it is in flight.
            return;
        }
        let painter = ui.painter();
        if hovered && self.drag.is_idle() {
            painter.rect_filled(rect.shrink(4.0), 10.0, theme.cell_hover);
        }

        match &self.items[global] {
            LaunchpadItem::App(app) => {
                if let Some(texture) = &app.icon {
                    painter.image(
                        texture.id(),
                        icon_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                } else {
                    painter.rect_filled(icon_rect, 12.0, theme.icon_placeholder);
                }
            }
            LaunchpadItem::Folder(folder) => {
                painter.rect_filled(icon_rect, 14.0, theme.folder_well);
                self.paint_folder_preview(painter, folder, icon_rect, theme);
            }
        }

        painter.text(
            egui::pos2(rect.center().x, icon_rect.max.y + 4.0 + LABEL_HEIGHT * 0.5),
            egui::Align2::CENTER_CENTER,
            self.items[global].display_name(),
            egui::FontId::proportional(12.5),
            theme.label_color,
        );
    }

    /// Up to four member icons in a 2×2 well.
    fn paint_folder_preview(
        &self,
        painter: &egui::Painter,
        folder: &crate::model::Folder,
        icon_rect: egui::Rect,
        theme: &LaunchpadTheme,
    ) {
        let inset = icon_rect.shrink(8.0);
        let half = inset.width() / 2.0;
        for (i, app) in folder.apps.iter().take(4).enumerate() {
            let col = (i % 2) as f32;
            let row = (i / 2) as f32;
            let mini = egui::Rect::from_min_size(
                inset.min + egui::vec2(col * half, row * half),
                egui::vec2(half - 2.0, half - 2.0),
            );
            if let Some(texture) = &app.icon {
                painter.image(
                    texture.id(),
                    mini,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            } else {
                painter.rect_filled(mini, 4.0, theme.icon_placeholder);
            }
        }
    }

    fn cell_context_menu(
        &self,
        response: &egui::Response,
        global: usize,
        actions: &mut Vec<CellAction>,
    ) {
        let item = self.items[global].clone();
        response.context_menu(|ui| match &item {
            LaunchpadItem::App(app) => {
                if ui.button("Open").clicked() {
                    actions.push(CellAction::Launch(app.path.clone()));
                    ui.close_menu();
                }
                if ui.button("Reveal in Finder").clicked() {
                    actions.push(CellAction::Reveal(app.path.clone()));
                    ui.close_menu();
                }
                ui.menu_button("Tags", |ui| {
                    for def in filter::PREDEFINED_TAGS {
                        let has = app.tags.iter().any(|t| t == def.key);
                        if ui.selectable_label(has, def.label).clicked() {
                            actions.push(CellAction::ToggleTag {
                                bundle_id: app.bundle_id.clone(),
                                tag: def.key.to_string(),
                            });
                            ui.close_menu();
                        }
                    }
                    if !self.custom_tags.is_empty() {
                        ui.separator();
                        for tag in &self.custom_tags {
                            let has = app.tags.iter().any(|t| t == &tag.key);
                            if ui.selectable_label(has, &tag.label).clicked() {
                                actions.push(CellAction::ToggleTag {
                                    bundle_id: app.bundle_id.clone(),
                                    tag: tag.key.clone(),
                                });
                                ui.close_menu();
                            }
                        }
                    }
                });
                ui.separator();
                if ui.button("Move to Trash").clicked() {
                    actions.push(CellAction::Trash(app.path.clone()));
                    ui.close_menu();
                }
            }
            LaunchpadItem::Folder(folder) => {
                if ui.button("Open").clicked() {
                    actions.push(CellAction::OpenFolder(folder.id.clone()));
                    ui.close_menu();
                }
                if ui.button("Disband Folder").clicked() {
                    actions.push(CellAction::Disband(folder.id.clone()));
                    ui.close_menu();
                }
            }
        });
    }

    fn draw_drag_decorations(
        &self,
        ctx: &egui::Context,
        geom: &GridGeometry,
        theme: &LaunchpadTheme,
    ) {
        if !self.drag.is_active() {
            return;
        }
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drag_overlay"),
        ));

        // Folder-join hover ring, or a reorder placeholder at the preview
        // slot. Pointer over an icon means "join"; anywhere else previews
        // a reorder.
        let join_hover = self.drag.hover().filter(|hit| hit.over_icon);
        if let Some(hit) = join_hover {
            if let Some(cell) = geom.cells.iter().find(|c| c.index == hit.index) {
                painter.rect_stroke(
                    cell.icon_rect.expand(6.0),
                    14.0,
                    egui::Stroke::new(2.0, theme.join_hint),
                );
            }
        } else if let Some(slot) = self.drag.preview_slot() {
            if let Some(cell) = geom.cells.iter().find(|c| c.index == slot) {
                let marker = egui::Rect::from_center_size(
                    egui::pos2(cell.rect.min.x + 2.0, cell.rect.center().y),
                    egui::vec2(3.0, cell.rect.height() * 0.6),
                );
                painter.rect_filled(marker, 2.0, theme.drop_hint);
            }
        }

        self.paint_drag_ghost(&painter, theme);
    }

    fn paint_drag_ghost(&self, painter: &egui::Painter, theme: &LaunchpadTheme) {
        let pos = self.drag.pointer();
        let icon_rect = egui::Rect::from_center_size(
            pos,
            egui::vec2(CELL_ICON_SIDE * 0.9, CELL_ICON_SIDE * 0.9),
        );

        let (texture, name) = match self.drag.source() {
            Some(DragSource::Grid { index, .. }) => match self.items.get(*index) {
                Some(LaunchpadItem::App(app)) => (app.icon.clone(), app.name.clone()),
                Some(LaunchpadItem::Folder(folder)) => (None, folder.name.clone()),
                None => return,
            },
            Some(DragSource::FolderView { bundle_id, .. }) => {
                match self.apps.iter().find(|a| &a.bundle_id == bundle_id) {
                    Some(app) => (app.icon.clone(), app.name.clone()),
                    None => return,
                }
            }
            None => return,
        };

        if let Some(texture) = texture {
            painter.image(
                texture.id(),
                icon_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.rect_filled(icon_rect, 12.0, theme.icon_placeholder);
        }
        painter.text(
            egui::pos2(pos.x, icon_rect.max.y + 10.0),
            egui::Align2::CENTER_CENTER,
            name,
            egui::FontId::proportional(12.0),
            theme.label_dim,
        );
    }

    fn draw_page_dots(
        &mut self,
        ui: &mut egui::Ui,
        panel_rect: egui::Rect,
        page_count: usize,
        theme: &LaunchpadTheme,
    ) {
        if page_count <= 1 {
            return;
        }
        let center_y = panel_rect.max.y - PAGE_BAR_HEIGHT * 0.5;
        let total_w = (page_count - 1) as f32 * DOT_SPACING;
        let left = panel_rect.center().x - total_w * 0.5;

        for page in 0..page_count {
            let center = egui::pos2(left + page as f32 * DOT_SPACING, center_y);
            let hit = egui::Rect::from_center_size(center, egui::vec2(14.0, 14.0));
            let response = ui.interact(
                hit,
                ui.make_persistent_id(("page_dot", page)),
                egui::Sense::click(),
            );
            let color = if page == self.page {
                theme.dot_active
            } else {
                theme.dot_inactive
            };
            let radius = if response.hovered() {
                DOT_RADIUS + 1.5
            } else {
                DOT_RADIUS
            };
            ui.painter().circle_filled(center, radius, color);
            if response.clicked() {
                self.page = page;
            }
        }
    }

    /// Search and tag filters bypass pagination: one unpaged sequence,
    /// dragging disabled.
    fn draw_search_results(
        &mut self,
        ui: &mut egui::Ui,
        theme: &LaunchpadTheme,
        folder_open: bool,
        actions: &mut Vec<CellAction>,
    ) {
        let visible = self.visible_items();
        if visible.is_empty() {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(theme.label_dim, "No matches");
            });
            return;
        }

        let cols = self.settings.cols.max(1) as usize;
        let avail = ui.available_width() - CONTENT_PADDING * 2.0;
        let cell_w = avail / cols as f32;
        let cell_h = CELL_ICON_SIDE + LABEL_HEIGHT + 24.0;

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add_space(CONTENT_PADDING * 0.5);
            let origin = ui.cursor().min + egui::vec2(CONTENT_PADDING, 0.0);
            let rows = visible.len().div_ceil(cols);
            let total_height = rows as f32 * cell_h;
            ui.allocate_space(egui::vec2(avail, total_height));

            for (slot, item) in visible.iter().enumerate() {
                let col = slot % cols;
                let row = slot / cols;
                let rect = egui::Rect::from_min_size(
                    origin + egui::vec2(col as f32 * cell_w, row as f32 * cell_h),
                    egui::vec2(cell_w, cell_h),
                );
                if !ui.is_rect_visible(rect) {
                    continue;
                }
                let icon_rect = egui::Rect::from_center_size(
                    egui::pos2(rect.center().x, rect.min.y + CELL_ICON_SIDE * 0.5),
                    egui::vec2(CELL_ICON_SIDE, CELL_ICON_SIDE),
                );

                let response = ui.interact(
                    rect,
                    ui.make_persistent_id(("search_cell", slot)),
                    egui::Sense::click(),
                );
                let painter = ui.painter();
                if response.hovered() {
                    painter.rect_filled(rect.shrink(4.0), 10.0, theme.cell_hover);
                }
                match item {
                    LaunchpadItem::App(app) => {
                        if let Some(texture) = &app.icon {
                            painter.image(
                                texture.id(),
                                icon_rect,
                                egui::Rect::from_min_max(
                                    egui::pos2(0.0, 0.0),
                                    egui::pos2(1.0, 1.0),
                                ),
                                egui::Color32::WHITE,
                            );
                        } else {
                            painter.rect_filled(icon_rect, 12.0, theme.icon_placeholder);
                        }
                    }
                    LaunchpadItem::Folder(folder) => {
                        painter.rect_filled(icon_rect, 14.0, theme.folder_well);
                        self.paint_folder_preview(painter, folder, icon_rect, theme);
                    }
                }
                painter.text(
                    egui::pos2(rect.center().x, icon_rect.max.y + 4.0 + LABEL_HEIGHT * 0.5),
                    egui::Align2::CENTER_CENTER,
                    item.display_name(),
                    egui::FontId::proportional(12.5),
                    theme.label_color,
                );

                if !folder_open && response.clicked() {
                    match item {
                        LaunchpadItem::App(app) => {
                            actions.push(CellAction::Launch(app.path.clone()))
                        }
                        LaunchpadItem::Folder(folder) => {
                            actions.push(CellAction::OpenFolder(folder.id.clone()))
                        }
                    }
                }
            }
        });
    }

    fn draw_folder_window(&mut self, ctx: &egui::Context, actions: &mut Vec<CellAction>) {
        let Some(mut view) = self.folder_view.take() else {
            return;
        };
        let Some(folder) = self
            .items
            .iter()
            .find_map(|item| item.as_folder().filter(|f| f.id == view.folder_id))
            .cloned()
        else {
            return;
        };
        let theme = LaunchpadTheme::default();

        let mut rename_changed = false;
        let response = egui::Window::new("folder_view")
            .id(egui::Id::new("folder_view"))
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .movable(false)
            .fixed_size(egui::vec2(FOLDER_VIEW_WIDTH, FOLDER_VIEW_HEIGHT))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, -10.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let edit = ui.add(
                        egui::TextEdit::singleline(&mut view.rename)
                            .hint_text("Folder name")
                            .horizontal_align(egui::Align::Center)
                            .desired_width(220.0),
                    );
                    if edit.changed() {
                        rename_changed = true;
                    }
                });
                ui.add_space(10.0);

                let cols = 5usize;
                let cell_w = (FOLDER_VIEW_WIDTH - 24.0) / cols as f32;
                let cell_h = CELL_ICON_SIDE + LABEL_HEIGHT + 18.0;
                let origin = ui.cursor().min + egui::vec2(12.0, 0.0);
                let rows = folder.apps.len().div_ceil(cols).max(1);
                ui.allocate_space(egui::vec2(FOLDER_VIEW_WIDTH - 24.0, rows as f32 * cell_h));

                for (slot, app) in folder.apps.iter().enumerate() {
                    let col = slot % cols;
                    let row = slot / cols;
                    let rect = egui::Rect::from_min_size(
                        origin + egui::vec2(col as f32 * cell_w, row as f32 * cell_h),
                        egui::vec2(cell_w, cell_h),
                    );
                    let icon_rect = egui::Rect::from_center_size(
                        egui::pos2(rect.center().x, rect.min.y + CELL_ICON_SIDE * 0.5),
                        egui::vec2(CELL_ICON_SIDE * 0.8, CELL_ICON_SIDE * 0.8),
                    );

                    let response = ui.interact(
                        rect,
                        ui.make_persistent_id(("folder_cell", slot)),
                        egui::Sense::click_and_drag(),
                    );
                    let painter = ui.painter();
                    if response.hovered() && self.drag.is_idle() {
                        painter.rect_filled(rect.shrink(2.0), 8.0, theme.cell_hover);
                    }
                    if let Some(texture) = &app.icon {
                        painter.image(
                            texture.id(),
                            icon_rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    } else {
                        painter.rect_filled(icon_rect, 10.0, theme.icon_placeholder);
                    }
                    painter.text(
                        egui::pos2(rect.center().x, icon_rect.max.y + 4.0 + LABEL_HEIGHT * 0.5),
                        egui::Align2::CENTER_CENTER,
                        &app.name,
                        egui::FontId::proportional(11.5),
                        theme.label_color,
                    );

                    if response.is_pointer_button_down_on() && self.drag.is_idle() {
                        if let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) {
                            self.drag.pointer_down(
                                DragSource::FolderView {
                                    folder_id: folder.id.clone(),
                                    bundle_id: app.bundle_id.clone(),
                                },
                                pos,
                            );
                        }
                    }
                    if response.clicked() && !self.drag.is_active() {
                        actions.push(CellAction::Launch(app.path.clone()));
                    }
                    response.context_menu(|ui| {
                        if ui.button("Open").clicked() {
                            actions.push(CellAction::Launch(app.path.clone()));
                            ui.close_menu();
                        }
                        if ui.button("Remove from Folder").clicked() {
                            actions.push(CellAction::RemoveFromFolder {
                                folder_id: folder.id.clone(),
                                bundle_id: app.bundle_id.clone(),
                            });
                            ui.close_menu();
                        }
                    });
                }
            });

        if let Some(response) = &response {
            view.rect = Some(response.response.rect);
        }

        // Click outside the window closes the view (drags resolve first).
        let mut close = false;
        if self.drag.is_idle() && ctx.input(|i| i.pointer.primary_clicked()) {
            if let (Some(pos), Some(rect)) =
                (ctx.input(|i| i.pointer.interact_pos()), view.rect)
            {
                if !rect.contains(pos) {
                    close = true;
                }
            }
        }

        let rename = rename_changed.then(|| view.rename.clone());
        if !close {
            self.folder_view = Some(view);
        } else {
            self.drag.cancel();
        }
        if let Some(name) = rename {
            self.rename_open_folder(&name);
        }
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }
        let mut open = true;
        let mut changed = false;
        let mut reset_tags = false;
        let mut remove_tag: Option<String> = None;
        let mut add_tag: Option<(String, String)> = None;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Grid");
                changed |= ui
                    .add(egui::Slider::new(&mut self.settings.rows, 2..=10).text("Rows"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut self.settings.cols, 3..=12).text("Columns"))
                    .changed();
                changed |= ui
                    .checkbox(&mut self.settings.full_width, "Full width window")
                    .changed();

                ui.separator();
                ui.heading("Tags");
                changed |= ui
                    .checkbox(&mut self.settings.tag_settings.show_tag_bar, "Show tag bar")
                    .changed();
                changed |= ui
                    .checkbox(
                        &mut self.settings.tag_settings.auto_tag_new_apps,
                        "Auto-tag new apps",
                    )
                    .changed();

                for tag in &self.custom_tags {
                    ui.horizontal(|ui| {
                        ui.label(format!("{} ({})", tag.label, tag.key));
                        if ui.small_button("Remove").clicked() {
                            remove_tag = Some(tag.key.clone());
                        }
                    });
                }
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_tag_key)
                            .hint_text("key")
                            .desired_width(80.0),
                    );
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_tag_label)
                            .hint_text("Label")
                            .desired_width(120.0),
                    );
                    if ui.button("Add tag").clicked() && !self.new_tag_key.trim().is_empty() {
                        add_tag = Some((
                            std::mem::take(&mut self.new_tag_key),
                            std::mem::take(&mut self.new_tag_label),
                        ));
                    }
                });

                ui.separator();
                if ui.button("Reset all tags").clicked() {
                    reset_tags = true;
                }
            });

        self.settings_open = open;
        if changed {
            self.persist_settings();
            self.clamp_page();
        }
        if let Some((key, label)) = add_tag {
            self.add_custom_tag(key, label);
        }
        if let Some(key) = remove_tag {
            self.remove_custom_tag(&key);
        }
        if reset_tags {
            self.reset_all_tags();
            self.show_toast("Tags reset");
        }
    }

    fn draw_toast(&mut self, ctx: &egui::Context) {
        let Some((message, _)) = &self.toast else {
            return;
        };
        let theme = LaunchpadTheme::default();
        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("toast"),
        ));

        let pos = egui::pos2(screen.center().x, screen.max.y - 48.0);
        let galley = painter.layout_no_wrap(
            message.clone(),
            egui::FontId::proportional(13.0),
            theme.toast_text,
        );
        let rect = egui::Rect::from_center_size(
            pos,
            galley.size() + egui::vec2(24.0, 14.0),
        );
        painter.rect_filled(rect, 8.0, theme.toast_bg);
        painter.galley(
            rect.center() - galley.size() * 0.5,
            galley,
            theme.toast_text,
        );
        ctx.request_repaint_after(Duration::from_millis(200));
    }

    fn apply_cell_action(&mut self, action: CellAction) {
        match action {
            CellAction::Launch(path) => self.launch(&path),
            CellAction::Reveal(path) => self.reveal(&path),
            CellAction::Trash(path) => self.trash(&path),
            CellAction::OpenFolder(id) => self.open_folder(&id),
            CellAction::Disband(id) => self.disband_folder(&id),
            CellAction::ToggleTag { bundle_id, tag } => self.toggle_tag(&bundle_id, &tag),
            CellAction::RemoveFromFolder { folder_id, bundle_id } => {
                self.apply_drop(crate::drag::DropResolution::RemoveFromFolder {
                    folder_id,
                    bundle_id,
                });
            }
        }
    }
}
