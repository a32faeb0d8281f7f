//! Dual-pane file browser, the application's root window.
//!
//! Two directory panes share the screen; one of them is the source of
//! every action, the other the target of copy, move, and transfer. All
//! menus are nested modal dialogs opened from the handlers, so a whole
//! delete-with-confirmation round trip is ordinary straight-line code.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use mullion_core::{
    DisplayMetrics, Gamepad, HeldKeys, HoldTimers, Key, KeyEvent, PadButton, Point, PointerButton,
    Rect, Runtime, RuntimeConfig, Scene, Window, WindowResult,
};

use crate::dialog::{error_dialog, Dialog};
use crate::fs::{self, Entry, ListerRef};
use crate::prompt::Prompt;
use crate::theme;
use crate::viewer::{self, Viewer};

fn with_parent(list: Vec<Entry>) -> Vec<Entry> {
    let mut rows = Vec::with_capacity(list.len() + 1);
    rows.push(Entry::dir(".."));
    rows.extend(list);
    rows
}

/// One directory listing with a cursor, a camera, and a selection.
///
/// Row 0 is always the `..` parent row; it can be opened but never
/// selected. The camera is the index of the first visible row.
pub struct Pane {
    lister: ListerRef,
    path: String,
    rows: Vec<Entry>,
    cursor: usize,
    camera: usize,
    selected: BTreeSet<usize>,
}

impl Pane {
    /// Opens `path`, or the root when `path` cannot be listed.
    pub fn new(lister: ListerRef, path: &str) -> Self {
        let mut pane = Self {
            lister,
            path: "/".to_owned(),
            rows: with_parent(Vec::new()),
            cursor: 0,
            camera: 0,
            selected: BTreeSet::new(),
        };
        if !pane.enter(path, None, 1) && path != "/" {
            pane.enter("/", None, 1);
        }
        pane
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn rows(&self) -> &[Entry] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position relative to the camera, as rendered.
    pub fn cursor_relative(&self) -> usize {
        self.cursor - self.camera
    }

    pub fn highlighted(&self) -> &Entry {
        &self.rows[self.cursor]
    }

    /// Full path of the highlighted row.
    pub fn highlighted_full(&self) -> String {
        fs::join(&self.path, &self.rows[self.cursor].name)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Full paths of the selection, in listing order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|&i| fs::join(&self.path, &self.rows[i].name))
            .collect()
    }

    pub fn move_up(&mut self, step: usize, visible: usize) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = self.cursor.saturating_sub(step);
        self.adjust_camera(visible);
        true
    }

    pub fn move_down(&mut self, step: usize, visible: usize) -> bool {
        let last = self.rows.len() - 1;
        if self.cursor >= last {
            return false;
        }
        self.cursor = (self.cursor + step).min(last);
        self.adjust_camera(visible);
        true
    }

    /// Opens the highlighted row. On `..` the cursor is restored onto the
    /// directory it came out of.
    pub fn open_highlighted(&mut self, visible: usize) -> bool {
        if self.rows[self.cursor].name == ".." {
            let (parent, leaf) = fs::split_last(&self.path);
            let parent = parent.to_owned();
            let leaf = (!leaf.is_empty()).then(|| leaf.to_owned());
            self.enter(&parent, leaf.as_deref(), visible)
        } else {
            let target = fs::join(&self.path, &self.rows[self.cursor].name);
            self.enter(&target, None, visible)
        }
    }

    /// Opens an explicit path; a no-op when already there.
    pub fn open_path(&mut self, path: &str, visible: usize) -> bool {
        if path == self.path {
            return false;
        }
        self.enter(path, None, visible)
    }

    pub fn go_to_parent(&mut self, visible: usize) -> bool {
        if self.path == "/" {
            return false;
        }
        self.cursor = 0;
        self.open_highlighted(visible)
    }

    /// Relists the current path, keeping the cursor in bounds. A path that
    /// disappeared underneath us falls back to the root.
    pub fn refresh(&mut self, visible: usize) {
        match self.lister.list(&self.path) {
            Ok(list) => {
                self.rows = with_parent(list);
                self.cursor = self.cursor.min(self.rows.len() - 1);
            }
            Err(err) => {
                log::warn!("cannot relist {}: {err}", self.path);
                let list = self.lister.list("/").unwrap_or_default();
                self.rows = with_parent(list);
                self.path = "/".to_owned();
                self.cursor = 0;
            }
        }
        self.adjust_camera(visible);
        self.selected.clear();
    }

    /// Toggles the highlighted row in the selection; `step` also advances
    /// the cursor. The parent row is not selectable.
    pub fn toggle_select(&mut self, step: bool, visible: usize) -> bool {
        if self.cursor == 0 {
            return false;
        }
        if !self.selected.remove(&self.cursor) {
            self.selected.insert(self.cursor);
        }
        if step {
            self.move_down(1, visible);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selected.extend(1..self.rows.len());
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Maps a screen row below the header to a visible line index.
    pub fn line_at(&self, row: i32, visible: usize) -> Option<usize> {
        if row < 0 || row >= visible as i32 {
            return None;
        }
        let line = row as usize;
        (self.camera + line < self.rows.len()).then_some(line)
    }

    /// Puts the cursor on a visible line.
    pub fn focus_row(&mut self, line: usize) {
        self.cursor = (self.camera + line).min(self.rows.len() - 1);
    }

    fn enter(&mut self, path: &str, restore: Option<&str>, visible: usize) -> bool {
        match self.lister.list(path) {
            Ok(list) => {
                self.rows = with_parent(list);
                self.path = path.to_owned();
                self.cursor = restore
                    .and_then(|dir| self.rows.iter().position(|e| e.is_dir && e.name == dir))
                    .unwrap_or(0);
                self.adjust_camera(visible);
                self.selected.clear();
                true
            }
            Err(err) => {
                log::warn!("cannot open {path}: {err}");
                false
            }
        }
    }

    fn adjust_camera(&mut self, visible: usize) {
        if self.rows.len() <= visible {
            self.camera = 0;
        } else if self.cursor < self.camera {
            self.camera = self.cursor;
        } else if self.cursor > self.camera + visible - 1 {
            self.camera = self.cursor - visible + 1;
        }
    }

    fn render(&self, scene: &mut Scene, x: i32, pane_w: i32, active: bool) {
        let width = pane_w.max(1) as usize;
        let visible = theme::list_rows(scene.h);

        // Header: the current path, end kept when it does not fit.
        scene.text(
            x,
            0,
            theme::clip_head(&self.path, width),
            theme::TEXT_TITLE,
            None,
        );

        let bar = if active {
            theme::CURSOR_FOCUS
        } else {
            theme::CURSOR_BLUR
        };
        scene.rect(
            Rect::new(
                x - 1,
                theme::Y_LIST + self.cursor_relative() as i32,
                pane_w + 1,
                1,
            ),
            bar,
        );

        for (row, i) in (self.camera..(self.camera + visible).min(self.rows.len())).enumerate() {
            let entry = &self.rows[i];
            let color = if self.selected.contains(&i) {
                theme::TEXT_SELECTED
            } else if entry.is_dir {
                theme::TEXT_DIR
            } else {
                theme::TEXT_NORMAL
            };
            scene.text(
                x,
                theme::Y_LIST + row as i32,
                theme::clip_tail(&entry.name, width),
                color,
                None,
            );
        }

        // Footer: size of the highlighted file.
        let highlighted = self.highlighted();
        let value = if highlighted.is_dir {
            "-".to_owned()
        } else {
            theme::format_size(highlighted.size)
        };
        let footer_y = scene.h - 1;
        scene.text(x + 1, footer_y, "Size:", theme::TEXT_TITLE, None);
        scene.text(
            x + pane_w - theme::text_width(&value) as i32,
            footer_y,
            value,
            theme::TEXT_TITLE,
            None,
        );
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Overwrite {
    Yes,
    YesToAll,
    No,
    Cancel,
}

fn overwrite_dialog(rt: &mut Runtime, dest: &str, is_last: bool) -> Overwrite {
    let mut dialog = Dialog::new(rt.config())
        .title("File already exists:")
        .label(format!("Overwrite {dest}?"))
        .option("Yes");
    if !is_last {
        dialog = dialog.option("Yes to all");
    }
    dialog = dialog.option("No");
    if !is_last {
        dialog = dialog.option("Cancel");
    }
    let choice = match rt.run(Rc::new(dialog)) {
        Ok(n) => n,
        Err(err) => {
            log::error!("overwrite dialog aborted: {err}");
            0
        }
    };
    match (is_last, choice) {
        (_, 1) => Overwrite::Yes,
        (true, 2) => Overwrite::No,
        (false, 2) => Overwrite::YesToAll,
        (false, 3) => Overwrite::No,
        _ => Overwrite::Cancel,
    }
}

/// Reports one failed step; true means carry on with the remaining items.
fn error_step(rt: &mut Runtime, action: &str, error: &str, is_last: bool) -> bool {
    if is_last {
        error_dialog(rt, action, error);
        return false;
    }
    let dialog = Dialog::new(rt.config())
        .title("Error:")
        .label(action)
        .label(error)
        .option("Continue")
        .option("Abort");
    match rt.run(Rc::new(dialog)) {
        Ok(n) => n == 1,
        Err(err) => {
            log::error!("error dialog aborted: {err}");
            false
        }
    }
}

/// The root window: two [`Pane`]s, a splitter, and the menus binding them
/// to the filesystem operations.
pub struct Commander {
    result: WindowResult,
    lister: ListerRef,
    left: RefCell<Pane>,
    right: RefCell<Pane>,
    source_is_left: Cell<bool>,
    /// List rows at the current display size; kept current by render and
    /// resize for the hold handlers, which have no runtime handle.
    visible: Cell<usize>,
    timers: HoldTimers,
}

impl Commander {
    pub fn new(
        config: &RuntimeConfig,
        lister: ListerRef,
        left_path: &str,
        right_path: &str,
    ) -> Self {
        Self {
            result: WindowResult::new(),
            lister: lister.clone(),
            left: RefCell::new(Pane::new(lister.clone(), left_path)),
            right: RefCell::new(Pane::new(lister, right_path)),
            source_is_left: Cell::new(true),
            visible: Cell::new(theme::list_rows(config.base_height)),
            timers: HoldTimers::new(config),
        }
    }

    fn source(&self) -> &RefCell<Pane> {
        if self.source_is_left.get() {
            &self.left
        } else {
            &self.right
        }
    }

    fn target(&self) -> &RefCell<Pane> {
        if self.source_is_left.get() {
            &self.right
        } else {
            &self.left
        }
    }

    fn focus_pane(&self, left: bool) -> bool {
        if self.source_is_left.get() == left {
            return false;
        }
        self.source_is_left.set(left);
        true
    }

    /// Marks the highlighted row when nothing is selected yet, so the
    /// operation menu always has something to act on.
    fn auto_select(&self) {
        let mut src = self.source().borrow_mut();
        if src.selected().is_empty() && src.cursor() != 0 {
            src.toggle_select(false, self.visible.get());
        }
    }

    /// Open on the highlighted row: directories are entered, files viewed.
    fn item_menu(&self, rt: &mut Runtime) -> bool {
        let is_dir = self.source().borrow().highlighted().is_dir;
        if is_dir {
            return self.source().borrow_mut().open_highlighted(self.visible.get());
        }
        self.view_file(rt);
        true
    }

    fn view_file(&self, rt: &mut Runtime) {
        let (path, size) = {
            let src = self.source().borrow();
            (src.highlighted_full(), src.highlighted().size)
        };
        if size > viewer::MAX_TEXT_SIZE {
            error_dialog(rt, &path, "File too large (>16 MiB)");
            return;
        }
        match self.lister.read_file(&path) {
            Ok(text) => {
                let shown = Rc::new(Viewer::new(rt.config(), &path, &text));
                if let Err(err) = rt.run(shown) {
                    log::error!("viewer aborted: {err}");
                }
            }
            Err(err) => error_dialog(rt, &path, &err.to_string()),
        }
    }

    fn operation_menu(&self, rt: &mut Runtime) -> bool {
        if self.source().borrow().selected().is_empty() {
            return false;
        }
        if self.copy_menu(rt) {
            let visible = self.visible.get();
            self.source().borrow_mut().refresh(visible);
            self.target().borrow_mut().refresh(visible);
        } else {
            // Drop a selection the menu itself made and nothing acted on.
            let mut src = self.source().borrow_mut();
            if src.selected().len() == 1
                && src.selected().iter().next().copied() == Some(src.cursor())
            {
                src.select_none();
            }
        }
        true
    }

    /// The file operation menu. Returns true when an operation ran and the
    /// panes need relisting.
    fn copy_menu(&self, rt: &mut Runtime) -> bool {
        let (list, anchor, source_left, target_dir, source_dir, highlighted_name) = {
            let src = self.source().borrow();
            (
                src.selected_paths(),
                theme::Y_LIST + src.cursor_relative() as i32,
                self.source_is_left.get(),
                self.target().borrow().path().to_owned(),
                src.path().to_owned(),
                src.highlighted().name.clone(),
            )
        };
        let single = list.len() == 1;

        let mut menu = Dialog::new(rt.config())
            .title(format!("{} selected:", list.len()))
            .option(if source_left { "Copy >" } else { "< Copy" })
            .option(if source_left { "Move >" } else { "< Move" });
        if single {
            menu = menu.option("Rename");
        }
        let menu = Rc::new(menu.option("Delete").anchor_y(anchor));
        let delete_choice = if single { 4 } else { 3 };

        let choice = loop {
            let n = match rt.run(menu.clone()) {
                Ok(n) => n,
                Err(err) => {
                    log::error!("operation menu aborted: {err}");
                    0
                }
            };
            if n != delete_choice {
                break n;
            }
            // Deletion asks again, in a box hung off the menu's own row.
            let placed = menu.placed();
            let confirm = Rc::new(
                Dialog::new(rt.config())
                    .option("Yes")
                    .option("No")
                    .anchor_x(placed.x + placed.w - 1)
                    .anchor_y(placed.y + 1 + menu.cursor() as i32 + 1),
            );
            match rt.run(confirm) {
                Ok(1) => break n,
                Ok(_) => {}
                Err(err) => {
                    log::error!("delete confirmation aborted: {err}");
                    break 0;
                }
            }
        };

        if choice == delete_choice {
            self.remove_selected(rt, &list);
            return true;
        }
        match choice {
            1 => {
                self.transfer_selected(rt, &list, &target_dir, "Copying", false);
                true
            }
            2 => {
                self.transfer_selected(rt, &list, &target_dir, "Moving", true);
                true
            }
            3 => self.rename_highlighted(rt, &source_dir, &highlighted_name),
            _ => false,
        }
    }

    /// Copies or moves every path in `list` into `dest_dir`, confirming
    /// overwrites and asking whether to carry on after a failure.
    fn transfer_selected(
        &self,
        rt: &mut Runtime,
        list: &[String],
        dest_dir: &str,
        verb: &str,
        move_files: bool,
    ) {
        let mut confirm = true;
        for (i, source) in list.iter().enumerate() {
            let is_last = i + 1 == list.len();
            let dest = fs::join(dest_dir, fs::file_name(source));
            if confirm && self.lister.exists(&dest) {
                match overwrite_dialog(rt, &dest, is_last) {
                    Overwrite::Yes => {}
                    Overwrite::YesToAll => confirm = false,
                    Overwrite::No => continue,
                    Overwrite::Cancel => return,
                }
            }
            let outcome = if move_files {
                self.lister.move_to(source, dest_dir)
            } else {
                self.lister.copy(source, dest_dir)
            };
            if let Err(err) = outcome {
                let desc = format!("{verb} {}", fs::file_name(source));
                if !error_step(rt, &desc, &err.to_string(), is_last) {
                    return;
                }
            }
        }
    }

    fn remove_selected(&self, rt: &mut Runtime, list: &[String]) {
        for (i, path) in list.iter().enumerate() {
            if let Err(err) = self.lister.remove(path) {
                let is_last = i + 1 == list.len();
                if !error_step(rt, &format!("Removing {path}"), &err.to_string(), is_last) {
                    return;
                }
            }
        }
    }

    /// Prompts for a new name for the highlighted row. True once a valid
    /// name was accepted, whatever the outcome on disk.
    fn rename_highlighted(&self, rt: &mut Runtime, dir: &str, old_name: &str) -> bool {
        let prompt = Rc::new(Prompt::new(rt.config(), old_name));
        let accepted = match rt.run(prompt.clone()) {
            Ok(n) => n,
            Err(err) => {
                log::error!("rename prompt aborted: {err}");
                0
            }
        };
        let new_name = prompt.text();
        if accepted != 1 || new_name.is_empty() || new_name == old_name {
            return false;
        }
        let from = fs::join(dir, old_name);
        let to = fs::join(dir, &new_name);
        if self.lister.exists(&to) && overwrite_dialog(rt, &to, true) != Overwrite::Yes {
            return true;
        }
        if let Err(err) = self.lister.rename(&from, &to) {
            error_dialog(
                rt,
                &format!("Renaming {old_name} to {new_name}"),
                &err.to_string(),
            );
        }
        true
    }

    fn system_menu(&self, rt: &mut Runtime) {
        let menu = Rc::new(
            Dialog::new(rt.config())
                .title("System:")
                .option("Select all")
                .option("Select none")
                .option("New directory")
                .option("Quit")
                .anchor_y(theme::Y_LIST + self.source().borrow().cursor_relative() as i32),
        );
        let choice = match rt.run(menu) {
            Ok(n) => n,
            Err(err) => {
                log::error!("system menu aborted: {err}");
                0
            }
        };
        match choice {
            1 => self.source().borrow_mut().select_all(),
            2 => self.source().borrow_mut().select_none(),
            3 => self.make_directory(rt),
            4 => self.result.cancel(),
            _ => {}
        }
    }

    fn make_directory(&self, rt: &mut Runtime) {
        let prompt = Rc::new(Prompt::new(rt.config(), ""));
        let accepted = match rt.run(prompt.clone()) {
            Ok(n) => n,
            Err(err) => {
                log::error!("new directory prompt aborted: {err}");
                0
            }
        };
        let name = prompt.text();
        if accepted != 1 || name.is_empty() {
            return;
        }
        let path = fs::join(self.source().borrow().path(), &name);
        if let Err(err) = self.lister.make_dir(&path) {
            error_dialog(rt, &format!("Creating {path}"), &err.to_string());
        }
        self.source().borrow_mut().refresh(self.visible.get());
    }

    /// Shows the highlighted directory (or the current one) in the other
    /// pane.
    fn transfer(&self) -> bool {
        let path = {
            let src = self.source().borrow();
            if src.highlighted().is_dir && src.cursor() != 0 {
                src.highlighted_full()
            } else {
                src.path().to_owned()
            }
        };
        self.target().borrow_mut().open_path(&path, self.visible.get())
    }

    fn page_step(&self) -> usize {
        (self.visible.get() - 1).max(1)
    }
}

impl Window for Commander {
    fn render(&self, scene: &mut Scene, has_focus: bool) {
        self.visible.set(theme::list_rows(scene.h));
        let w = scene.w;
        let h = scene.h;

        scene.rect(Rect::new(0, 0, w, theme::HEADER_ROWS), theme::TITLE_BG);
        scene.rect(
            Rect::new(0, h - theme::FOOTER_ROWS, w, theme::FOOTER_ROWS),
            theme::TITLE_BG,
        );
        let stripes = h - theme::HEADER_ROWS - theme::FOOTER_ROWS;
        for i in 0..stripes {
            let color = if i % 2 == 0 {
                theme::BG_LIGHT
            } else {
                theme::BG_SHADE
            };
            scene.rect(Rect::new(0, theme::Y_LIST + i, w, 1), color);
        }
        scene.rect(Rect::new(w / 2, theme::Y_LIST, 1, stripes), theme::TITLE_BG);

        let pane_w = (w / 2 - 2).max(1);
        let source_left = self.source_is_left.get();
        self.left
            .borrow()
            .render(scene, 1, pane_w, has_focus && source_left);
        self.right
            .borrow()
            .render(scene, w / 2 + 2, pane_w, has_focus && !source_left);
    }

    fn result(&self) -> &WindowResult {
        &self.result
    }

    fn is_full_screen(&self) -> bool {
        true
    }

    fn on_resize(&self, metrics: &DisplayMetrics) {
        let visible = theme::list_rows(metrics.h);
        self.visible.set(visible);
        self.left.borrow_mut().adjust_camera(visible);
        self.right.borrow_mut().adjust_camera(visible);
    }

    fn key_press(&self, rt: &mut Runtime, ev: &KeyEvent) -> bool {
        if !ev.is_repeat {
            self.timers.key_pressed(ev.key);
        }
        let visible = self.visible.get();
        match ev.key {
            Key::Character('q') => {
                self.system_menu(rt);
                true
            }
            Key::ArrowUp => self.source().borrow_mut().move_up(1, visible),
            Key::ArrowDown => self.source().borrow_mut().move_down(1, visible),
            Key::PageUp => self.source().borrow_mut().move_up(self.page_step(), visible),
            Key::PageDown => self
                .source()
                .borrow_mut()
                .move_down(self.page_step(), visible),
            Key::ArrowLeft => self.focus_pane(true),
            Key::ArrowRight => self.focus_pane(false),
            Key::Enter => self.item_menu(rt),
            Key::Backspace => self.source().borrow_mut().go_to_parent(visible),
            Key::Character('a') => {
                self.auto_select();
                self.operation_menu(rt)
            }
            Key::Insert => self.source().borrow_mut().toggle_select(true, visible),
            Key::Character('w') => self.transfer(),
            _ => false,
        }
    }

    fn button_press(&self, rt: &mut Runtime, button: PadButton) -> bool {
        self.timers.button_pressed(button);
        let visible = self.visible.get();
        match button {
            PadButton::Up => self.source().borrow_mut().move_up(1, visible),
            PadButton::Down => self.source().borrow_mut().move_down(1, visible),
            PadButton::Left => self.focus_pane(true),
            PadButton::Right => self.focus_pane(false),
            PadButton::A => self.item_menu(rt),
            PadButton::B => self.source().borrow_mut().go_to_parent(visible),
            PadButton::X => {
                self.auto_select();
                self.operation_menu(rt)
            }
            PadButton::Y => self.source().borrow_mut().toggle_select(true, visible),
            PadButton::Select => {
                self.system_menu(rt);
                true
            }
            PadButton::Start => self.transfer(),
            PadButton::LeftShoulder => {
                self.source().borrow_mut().move_up(self.page_step(), visible)
            }
            PadButton::RightShoulder => self
                .source()
                .borrow_mut()
                .move_down(self.page_step(), visible),
            _ => false,
        }
    }

    fn mouse_down(&self, rt: &mut Runtime, button: PointerButton, pos: Point) -> bool {
        let w = rt.metrics().w;
        if pos.x < 1 {
            return false;
        }
        let visible = self.visible.get();
        let right = pos.x >= w / 2 + 2;
        let mut changed = false;
        if self.source_is_left.get() == right {
            self.source_is_left.set(!right);
            changed = true;
        }

        let line = self
            .source()
            .borrow()
            .line_at(pos.y - theme::Y_LIST, visible);
        match button {
            PointerButton::Primary => {
                match line {
                    None => self.system_menu(rt),
                    Some(line) => {
                        self.source().borrow_mut().focus_row(line);
                        self.item_menu(rt);
                    }
                }
                true
            }
            PointerButton::Tertiary => match line {
                Some(line) => {
                    let mut src = self.source().borrow_mut();
                    src.focus_row(line);
                    src.toggle_select(false, visible);
                    true
                }
                None => changed,
            },
            PointerButton::Secondary => {
                if self.source().borrow().selected().is_empty() {
                    match line {
                        None => {
                            self.system_menu(rt);
                            return true;
                        }
                        Some(line) => {
                            let mut src = self.source().borrow_mut();
                            src.focus_row(line);
                            src.toggle_select(false, visible);
                            changed = true;
                        }
                    }
                }
                self.operation_menu(rt) || changed
            }
        }
    }

    fn mouse_wheel(&self, _rt: &mut Runtime, _dx: i32, dy: i32) -> bool {
        let visible = self.visible.get();
        if dy > 0 {
            self.source().borrow_mut().move_up(1, visible)
        } else if dy < 0 {
            self.source().borrow_mut().move_down(1, visible)
        } else {
            false
        }
    }

    fn key_hold(&self, held: &dyn HeldKeys) -> bool {
        let visible = self.visible.get();
        for key in [
            Key::ArrowUp,
            Key::ArrowDown,
            Key::PageUp,
            Key::PageDown,
            Key::Insert,
        ] {
            if self.timers.tick_key(key, held) {
                return match key {
                    Key::ArrowUp => self.source().borrow_mut().move_up(1, visible),
                    Key::ArrowDown => self.source().borrow_mut().move_down(1, visible),
                    Key::PageUp => self.source().borrow_mut().move_up(self.page_step(), visible),
                    Key::PageDown => self
                        .source()
                        .borrow_mut()
                        .move_down(self.page_step(), visible),
                    _ => self.source().borrow_mut().toggle_select(true, visible),
                };
            }
        }
        false
    }

    fn pad_hold(&self, pad: &dyn Gamepad) -> bool {
        let visible = self.visible.get();
        for button in [
            PadButton::Up,
            PadButton::Down,
            PadButton::LeftShoulder,
            PadButton::RightShoulder,
            PadButton::Y,
        ] {
            if self.timers.tick_button(button, pad) {
                return match button {
                    PadButton::Up => self.source().borrow_mut().move_up(1, visible),
                    PadButton::Down => self.source().borrow_mut().move_down(1, visible),
                    PadButton::LeftShoulder => {
                        self.source().borrow_mut().move_up(self.page_step(), visible)
                    }
                    PadButton::RightShoulder => self
                        .source()
                        .borrow_mut()
                        .move_down(self.page_step(), visible),
                    _ => self.source().borrow_mut().toggle_select(true, visible),
                };
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{DirLister, MemoryLister};
    use mullion_core::sim::ScriptedPlatform;
    use mullion_core::{DrawCmd, RawEvent, TestClock};

    fn sample() -> Rc<MemoryLister> {
        let fs = MemoryLister::new();
        fs.add_dir("/apps");
        fs.add_dir("/media/data");
        fs.add_file("/readme.txt", "hello");
        fs.add_file("/apps/a.txt", "aa");
        fs.add_file("/apps/B.txt", "bbb");
        Rc::new(fs)
    }

    fn commander(fs: &Rc<MemoryLister>) -> Rc<Commander> {
        Rc::new(Commander::new(
            &RuntimeConfig::default(),
            fs.clone(),
            "/",
            "/media",
        ))
    }

    fn run_with(
        window: Rc<Commander>,
        build: impl FnOnce(&mut ScriptedPlatform),
    ) -> i32 {
        let clock = TestClock::new();
        clock.set(1_000);
        let mut platform = ScriptedPlatform::new(clock.clone());
        build(&mut platform);
        let mut rt = Runtime::new(
            Box::new(platform),
            Box::new(clock),
            RuntimeConfig::default(),
        );
        rt.run(window).unwrap()
    }

    #[test]
    fn test_pane_lists_with_parent_row_first() {
        let pane = Pane::new(sample(), "/");
        let names: Vec<&str> = pane.rows().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "apps", "media", "readme.txt"]);
        assert!(pane.rows()[0].is_dir);
    }

    #[test]
    fn test_pane_bad_start_path_falls_back_to_root() {
        let pane = Pane::new(sample(), "/nope");
        assert_eq!(pane.path(), "/");
    }

    #[test]
    fn test_pane_parent_restores_cursor() {
        let mut pane = Pane::new(sample(), "/");
        pane.move_down(2, 10);
        assert_eq!(pane.highlighted().name, "media");
        assert!(pane.open_highlighted(10));
        assert_eq!(pane.path(), "/media");
        assert!(pane.go_to_parent(10));
        assert_eq!(pane.path(), "/");
        assert_eq!(pane.highlighted().name, "media");
    }

    #[test]
    fn test_pane_open_same_path_is_noop() {
        let mut pane = Pane::new(sample(), "/apps");
        assert!(!pane.open_path("/apps", 10));
        assert!(!pane.open_path("/nope", 10));
        assert_eq!(pane.path(), "/apps");
    }

    #[test]
    fn test_pane_camera_follows_cursor() {
        let fs = MemoryLister::new();
        for i in 0..8 {
            fs.add_file(&format!("/f{i}.txt"), "x");
        }
        let mut pane = Pane::new(Rc::new(fs), "/");
        // 9 rows with "..", 3 visible.
        assert!(pane.move_down(5, 3));
        assert_eq!(pane.cursor(), 5);
        assert_eq!(pane.cursor_relative(), 2);
        assert!(pane.move_down(10, 3));
        assert_eq!(pane.cursor(), 8);
        assert!(!pane.move_down(1, 3));
        assert!(pane.move_up(20, 3));
        assert_eq!(pane.cursor(), 0);
        assert_eq!(pane.cursor_relative(), 0);
    }

    #[test]
    fn test_pane_selection_skips_parent_row() {
        let mut pane = Pane::new(sample(), "/");
        assert!(!pane.toggle_select(false, 10));
        pane.select_all();
        assert_eq!(pane.selected().len(), pane.rows().len() - 1);
        assert!(!pane.selected().contains(&0));
        pane.select_none();
        pane.move_down(1, 10);
        assert!(pane.toggle_select(true, 10));
        assert_eq!(pane.selected_paths(), vec!["/apps".to_owned()]);
        // Stepped one row past the item it marked.
        assert_eq!(pane.cursor(), 2);
    }

    #[test]
    fn test_pane_refresh_clamps_cursor_and_falls_back() {
        let fs = sample();
        let mut pane = Pane::new(fs.clone(), "/apps");
        pane.move_down(2, 10);
        fs.remove("/apps/B.txt").unwrap();
        pane.refresh(10);
        assert_eq!(pane.cursor(), 1);
        fs.remove("/apps").unwrap();
        pane.refresh(10);
        assert_eq!(pane.path(), "/");
        assert_eq!(pane.cursor(), 0);
    }

    #[test]
    fn test_arrow_keys_switch_source_pane() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowRight);
        });
        assert!(!cmd.source_is_left.get());
    }

    #[test]
    fn test_enter_opens_directory_and_backspace_returns() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            p.press_key(Key::Backspace);
        });
        let left = cmd.left.borrow();
        assert_eq!(left.path(), "/");
        assert_eq!(left.highlighted().name, "apps");
    }

    #[test]
    fn test_transfer_shows_highlighted_dir_in_target() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('w'));
        });
        assert_eq!(cmd.right.borrow().path(), "/apps");
    }

    #[test]
    fn test_system_menu_quit_cancels_the_commander() {
        let fs = sample();
        let cmd = commander(&fs);
        let result = run_with(cmd.clone(), |p| {
            p.press_key(Key::Character('q'));
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
        });
        assert_eq!(result, 0);
        assert_eq!(cmd.result().get(), WindowResult::CANCELED);
    }

    #[test]
    fn test_system_menu_creates_directory_via_prompt() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::Character('q'));
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            // The naming prompt starts focused on its text field.
            p.press_key(Key::Character('d'));
            p.press_key(Key::Character('o'));
            p.press_key(Key::Character('c'));
            p.press_key(Key::Character('s'));
            p.press_key(Key::Enter);
        });
        assert!(fs.exists("/docs"));
        assert!(cmd
            .left
            .borrow()
            .rows()
            .iter()
            .any(|e| e.name == "docs" && e.is_dir));
    }

    #[test]
    fn test_operation_menu_copies_to_target_pane() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            p.press_key(Key::Enter);
        });
        assert_eq!(fs.read_file("/media/readme.txt").unwrap(), "hello");
        assert_eq!(fs.read_file("/readme.txt").unwrap(), "hello");
        // Refresh after the operation dropped the selection.
        assert!(cmd.left.borrow().selected().is_empty());
    }

    #[test]
    fn test_operation_menu_moves_and_removes_source() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
        });
        assert!(!fs.exists("/readme.txt"));
        assert_eq!(fs.read_file("/media/readme.txt").unwrap(), "hello");
    }

    #[test]
    fn test_delete_backs_out_through_the_confirmation() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            // Down to Delete, confirm "No", then leave the menu.
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            p.press_key(Key::Escape);
        });
        assert!(fs.exists("/readme.txt"));
        // The auto-added selection was dropped on the way out.
        assert!(cmd.left.borrow().selected().is_empty());
    }

    #[test]
    fn test_delete_confirmed_removes_the_file() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            p.press_key(Key::Enter);
        });
        assert!(!fs.exists("/readme.txt"));
    }

    #[test]
    fn test_rename_through_the_prompt() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
            // "readme.txt" -> "readme.md".
            p.press_key(Key::Backspace);
            p.press_key(Key::Backspace);
            p.press_key(Key::Backspace);
            p.press_key(Key::Character('m'));
            p.press_key(Key::Character('d'));
            p.press_key(Key::Enter);
        });
        assert!(!fs.exists("/readme.txt"));
        assert_eq!(fs.read_file("/readme.md").unwrap(), "hello");
    }

    #[test]
    fn test_copy_over_existing_file_asks_first() {
        let fs = sample();
        fs.add_file("/media/readme.txt", "old");
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Character('a'));
            p.press_key(Key::Enter);
            // Overwrite prompt: move to "No".
            p.press_key(Key::ArrowDown);
            p.press_key(Key::Enter);
        });
        assert_eq!(fs.read_file("/media/readme.txt").unwrap(), "old");
    }

    #[test]
    fn test_view_file_runs_the_viewer() {
        let fs = sample();
        let cmd = commander(&fs);
        let clock = TestClock::new();
        clock.set(1_000);
        let mut platform = ScriptedPlatform::new(clock.clone());
        platform.press_key(Key::ArrowDown);
        platform.press_key(Key::ArrowDown);
        platform.press_key(Key::ArrowDown);
        platform.press_key(Key::Enter);
        platform.wait_frames(1);
        platform.press_key(Key::Escape);
        let recording = platform.recording();
        let mut rt = Runtime::new(
            Box::new(platform),
            Box::new(clock),
            RuntimeConfig::default(),
        );
        rt.run(cmd).unwrap();
        let showed_viewer = recording.borrow().scenes.iter().any(|scene| {
            scene.cmds.iter().any(|cmd| {
                matches!(cmd, DrawCmd::Text { text, .. } if text.contains("/readme.txt"))
            })
        });
        assert!(showed_viewer);
    }

    #[test]
    fn test_click_in_right_pane_focuses_and_opens() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            // Right pane starts at /media; row 1 under the header is "data".
            p.push_event(RawEvent::PointerDown {
                button: PointerButton::Primary,
                x: 162,
                y: theme::Y_LIST + 1,
            });
        });
        assert!(!cmd.source_is_left.get());
        assert_eq!(cmd.right.borrow().path(), "/media/data");
    }

    #[test]
    fn test_held_down_key_repeats_cursor_movement() {
        let fs = sample();
        let cmd = commander(&fs);
        run_with(cmd.clone(), |p| {
            p.press_key(Key::ArrowDown);
            p.wait_frames(16);
            p.release_key(Key::ArrowDown);
        });
        // One press plus repeats at polls 13 and 16.
        assert_eq!(cmd.left.borrow().cursor(), 3);
    }
}
