//! File list view-model: raw entries of one folder plus the derived
//! sorted and paginated window that the panel renders.

use std::cmp::Ordering;

use crate::api::Entry;

/// How files are displayed in the panel
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ViewMode {
    /// Two columns, name only
    Brief,
    /// Single column with size and modification time
    #[default]
    Full,
}

impl ViewMode {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "brief" => ViewMode::Brief,
            _ => ViewMode::Full,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Brief => ViewMode::Full,
            ViewMode::Full => ViewMode::Brief,
        }
    }
}

/// Sort field for the listing. `Unsorted` keeps server order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SortField {
    #[default]
    Unsorted,
    Name,
    Size,
    Modified,
}

impl SortField {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "name" => SortField::Name,
            "size" => SortField::Size,
            "modified" | "time" => SortField::Modified,
            _ => SortField::Unsorted,
        }
    }

    /// Short label used in the panel title
    pub fn label(self) -> &'static str {
        match self {
            SortField::Unsorted => "",
            SortField::Name => "Name",
            SortField::Size => "Size",
            SortField::Modified => "Time",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub reverse: bool,
}

/// One page of the sorted list: `sorted[index*size .. index*size+size]`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PageWindow {
    pub index: usize,
    pub size: usize,
}

impl PageWindow {
    fn start(&self) -> usize {
        self.index.saturating_mul(self.size)
    }
}

/// Ascending order of two values. Values that can not be ordered
/// (NaN and the like) compare equal.
pub fn compare<T: PartialOrd + ?Sized>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Stable sort by `spec.field`, then reverse the whole list if requested.
pub fn sort_entries(entries: &[Entry], spec: SortSpec) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    match spec.field {
        SortField::Unsorted => {}
        SortField::Name => sorted.sort_by(|a, b| compare(&a.name, &b.name)),
        SortField::Size => sorted.sort_by(|a, b| compare(&a.size, &b.size)),
        SortField::Modified => sorted.sort_by(|a, b| compare(&a.modified, &b.modified)),
    }
    if spec.reverse {
        sorted.reverse();
    }
    sorted
}

/// Slice one page out of a sorted list. Out-of-range pages are empty.
pub fn page_slice(sorted: &[Entry], page: PageWindow) -> &[Entry] {
    let start = page.start().min(sorted.len());
    let end = start.saturating_add(page.size).min(sorted.len());
    &sorted[start..end]
}

/// Search results shown in place of the folder listing
#[derive(Debug, Clone)]
pub struct SearchState {
    pub pattern: String,
}

/// The browsing panel
#[derive(Debug)]
pub struct Panel {
    /// Current folder, "" for the bucket root, never with a trailing '/'
    pub path: String,
    /// Entries exactly as the server returned them
    entries: Vec<Entry>,
    sort: SortSpec,
    page: PageWindow,
    /// Derived page, recomputed whenever entries, sort or page change
    displayed: Vec<Entry>,
    sorted_len: usize,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub view_mode: ViewMode,
    /// Visible rows, updated by the renderer
    pub visible_height: usize,
    /// Active search, if the panel shows results instead of a folder
    pub search: Option<SearchState>,
    /// True while a listing request is outstanding
    pub loading: bool,
    /// Last load error, shown in place of the listing
    pub error: Option<String>,
}

impl Panel {
    pub fn new(page_size: usize, sort: SortSpec, view_mode: ViewMode) -> Self {
        Self {
            path: String::new(),
            entries: Vec::new(),
            sort,
            page: PageWindow { index: 0, size: page_size.max(1) },
            displayed: Vec::new(),
            sorted_len: 0,
            cursor: 0,
            scroll_offset: 0,
            view_mode,
            visible_height: 20,
            search: None,
            loading: false,
            error: None,
        }
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> PageWindow {
        self.page
    }

    /// Full sorted list (all pages)
    pub fn sorted_entries(&self) -> Vec<Entry> {
        sort_entries(&self.entries, self.sort)
    }

    /// Entries of the current page
    pub fn displayed_entries(&self) -> &[Entry] {
        &self.displayed
    }

    pub fn page_count(&self) -> usize {
        self.sorted_len.div_ceil(self.page.size).max(1)
    }

    fn recompute(&mut self) {
        let sorted = self.sorted_entries();
        self.sorted_len = sorted.len();
        self.displayed = page_slice(&sorted, self.page).to_vec();
        if self.cursor >= self.displayed.len() {
            self.cursor = self.displayed.len().saturating_sub(1);
        }
        self.adjust_scroll();
    }

    /// Replace the listing with a fresh snapshot
    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.error = None;
        self.loading = false;
        self.recompute();
    }

    /// Switch to another folder: the listing is cleared until the reload
    /// lands and paging starts over.
    pub fn change_path(&mut self, path: &str) {
        self.path = path.trim_matches('/').to_string();
        self.search = None;
        self.entries.clear();
        self.reset_page();
    }

    /// Back to the first page with the cursor on top
    pub fn reset_page(&mut self) {
        self.page.index = 0;
        self.cursor = 0;
        self.scroll_offset = 0;
        self.recompute();
    }

    pub fn set_page(&mut self, index: usize) {
        let index = index.min(self.page_count() - 1);
        if index != self.page.index {
            self.page.index = index;
            self.cursor = 0;
            self.scroll_offset = 0;
            self.recompute();
        }
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.index + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.index.saturating_sub(1));
    }

    /// Set sort field. The same field toggles the direction; a new field
    /// keeps the current direction. `Unsorted` is always server order.
    pub fn set_sort(&mut self, field: SortField) {
        if field == SortField::Unsorted {
            self.sort = SortSpec { field, reverse: false };
        } else if self.sort.field == field {
            self.sort.reverse = !self.sort.reverse;
        } else {
            self.sort.field = field;
        }

        let selected_path = self.selected().map(|e| e.path.clone());
        self.recompute();
        if let Some(path) = selected_path
            && let Some(i) = self.displayed.iter().position(|e| e.path == path)
        {
            self.cursor = i;
            self.adjust_scroll();
        }
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.displayed.get(self.cursor)
    }

    /// Parent of the current folder, `None` at the root
    pub fn parent_path(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        Some(match self.path.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        })
    }

    /// Place the cursor on the entry with this display name
    pub fn select_name(&mut self, name: &str) -> bool {
        match self.displayed.iter().position(|e| e.display_name() == name) {
            Some(i) => {
                self.cursor = i;
                self.adjust_scroll();
                true
            }
            None => false,
        }
    }

    pub fn is_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn folder_count(&self) -> usize {
        self.entries.iter().filter(|e| e.folder).count()
    }

    pub fn file_count(&self) -> usize {
        self.entries.len() - self.folder_count()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.size).sum()
    }

    fn visible_items(&self) -> usize {
        match self.view_mode {
            ViewMode::Brief => self.visible_height * 2,
            ViewMode::Full => self.visible_height,
        }
    }

    fn adjust_scroll(&mut self) {
        let visible = self.visible_items();
        if visible == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor - visible + 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.adjust_scroll();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.displayed.len() {
            self.cursor += 1;
            self.adjust_scroll();
        }
    }

    /// Brief mode: jump to the left column, or a screen up from there
    pub fn move_left(&mut self) {
        if self.view_mode != ViewMode::Brief || self.visible_height == 0 {
            return;
        }
        let col_height = self.visible_height;
        let visible_pos = self.cursor.saturating_sub(self.scroll_offset);
        if visible_pos >= col_height {
            self.cursor -= col_height;
        } else {
            self.cursor = self.cursor.saturating_sub(col_height * 2);
        }
        self.adjust_scroll();
    }

    /// Brief mode: jump to the right column, or a screen down from there
    pub fn move_right(&mut self) {
        let count = self.displayed.len();
        if self.view_mode != ViewMode::Brief || self.visible_height == 0 || count == 0 {
            return;
        }
        let col_height = self.visible_height;
        let visible_pos = self.cursor.saturating_sub(self.scroll_offset);
        if visible_pos < col_height && self.cursor + col_height < count {
            self.cursor += col_height;
        } else {
            self.cursor = (self.cursor + col_height * 2).min(count - 1);
        }
        self.adjust_scroll();
    }

    pub fn page_up(&mut self) {
        let step = self.visible_items().max(1);
        self.cursor = self.cursor.saturating_sub(step);
        self.adjust_scroll();
    }

    pub fn page_down(&mut self) {
        let step = self.visible_items().max(1);
        self.cursor = (self.cursor + step).min(self.displayed.len().saturating_sub(1));
        self.adjust_scroll();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
        self.adjust_scroll();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.displayed.len().saturating_sub(1);
        self.adjust_scroll();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.scroll_offset = 0;
            self.adjust_scroll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{file, folder};

    fn sized(path: &str, size: u64) -> Entry {
        file(path, size)
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn panel_with(entries: Vec<Entry>, page_size: usize) -> Panel {
        let mut panel = Panel::new(page_size, SortSpec::default(), ViewMode::Full);
        panel.set_entries(entries);
        panel
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&1, &2), Ordering::Less);
        assert_eq!(compare("b", "a"), Ordering::Greater);
        assert_eq!(compare(&f64::NAN, &1.0), Ordering::Equal);
        assert_eq!(compare(&None, &Some(1u64)), Ordering::Less);
    }

    #[test]
    fn test_sort_by_name() {
        let entries = vec![sized("b", 1), sized("a", 2)];
        let asc = sort_entries(&entries, SortSpec { field: SortField::Name, reverse: false });
        assert_eq!(names(&asc), vec!["a", "b"]);
        let desc = sort_entries(&entries, SortSpec { field: SortField::Name, reverse: true });
        assert_eq!(names(&desc), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let entries = vec![sized("x", 5), sized("y", 1), sized("z", 5), sized("w", 5)];
        let sorted = sort_entries(&entries, SortSpec { field: SortField::Size, reverse: false });
        assert_eq!(names(&sorted), vec!["y", "x", "z", "w"]);
    }

    #[test]
    fn test_reverse_is_exact_reverse() {
        let entries = vec![sized("x", 5), sized("y", 1), sized("z", 5), sized("w", 3)];
        for field in [SortField::Unsorted, SortField::Name, SortField::Size, SortField::Modified] {
            let mut asc = sort_entries(&entries, SortSpec { field, reverse: false });
            let desc = sort_entries(&entries, SortSpec { field, reverse: true });
            asc.reverse();
            assert_eq!(asc, desc, "field {:?}", field);
        }
    }

    #[test]
    fn test_unsorted_keeps_server_order() {
        let entries = vec![sized("c", 1), sized("a", 1), sized("b", 1)];
        let sorted = sort_entries(&entries, SortSpec::default());
        assert_eq!(names(&sorted), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_page_slice_bounds() {
        let entries: Vec<Entry> = (0..5).map(|i| sized(&format!("f{}", i), i)).collect();
        assert_eq!(page_slice(&entries, PageWindow { index: 0, size: 2 }).len(), 2);
        assert_eq!(names(page_slice(&entries, PageWindow { index: 2, size: 2 })), vec!["f4"]);
        assert!(page_slice(&entries, PageWindow { index: 3, size: 2 }).is_empty());
        assert!(page_slice(&entries, PageWindow { index: usize::MAX, size: 2 }).is_empty());
        assert!(page_slice(&[], PageWindow { index: 0, size: 2 }).is_empty());
    }

    #[test]
    fn test_displayed_follows_sort_and_page() {
        let entries: Vec<Entry> = ["e", "d", "c", "b", "a"].iter().map(|n| sized(n, 0)).collect();
        let mut panel = panel_with(entries, 2);
        assert_eq!(names(panel.displayed_entries()), vec!["e", "d"]);
        assert_eq!(panel.page_count(), 3);

        panel.set_sort(SortField::Name);
        assert_eq!(names(panel.displayed_entries()), vec!["a", "b"]);

        panel.next_page();
        assert_eq!(names(panel.displayed_entries()), vec!["c", "d"]);
        panel.next_page();
        panel.next_page();
        assert_eq!(panel.page().index, 2);
        assert_eq!(names(panel.displayed_entries()), vec!["e"]);
    }

    #[test]
    fn test_set_sort_toggles_and_keeps_direction() {
        let mut panel = panel_with(vec![sized("a", 2), sized("b", 1)], 10);
        panel.set_sort(SortField::Name);
        assert_eq!(panel.sort(), SortSpec { field: SortField::Name, reverse: false });
        panel.set_sort(SortField::Name);
        assert!(panel.sort().reverse);
        panel.set_sort(SortField::Size);
        assert_eq!(panel.sort(), SortSpec { field: SortField::Size, reverse: true });
        assert_eq!(names(panel.displayed_entries()), vec!["a", "b"]);
    }

    #[test]
    fn test_unsorted_after_reverse_is_server_order() {
        let mut panel = panel_with(vec![sized("b", 1), sized("c", 3), sized("a", 2)], 10);
        panel.set_sort(SortField::Name);
        panel.set_sort(SortField::Name);
        assert_eq!(names(panel.displayed_entries()), vec!["c", "b", "a"]);

        panel.set_sort(SortField::Unsorted);
        assert_eq!(panel.sort(), SortSpec { field: SortField::Unsorted, reverse: false });
        assert_eq!(names(panel.displayed_entries()), vec!["b", "c", "a"]);
        panel.set_sort(SortField::Unsorted);
        assert_eq!(names(panel.displayed_entries()), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_set_sort_keeps_cursor_on_entry() {
        let mut panel = panel_with(vec![sized("b", 1), sized("a", 2), sized("c", 3)], 10);
        panel.cursor = 0;
        panel.set_sort(SortField::Name);
        assert_eq!(panel.selected().map(|e| e.name.as_str()), Some("b"));
    }

    #[test]
    fn test_change_path_resets_page() {
        let entries: Vec<Entry> = (0..10).map(|i| sized(&format!("f{}", i), i)).collect();
        let mut panel = panel_with(entries, 3);
        panel.next_page();
        panel.move_down();
        assert_eq!(panel.page().index, 1);

        panel.change_path("/photos/2024/");
        assert_eq!(panel.path, "photos/2024");
        assert_eq!(panel.page().index, 0);
        assert_eq!(panel.cursor, 0);
        assert!(panel.displayed_entries().is_empty());
    }

    #[test]
    fn test_cursor_clamped_on_shorter_listing() {
        let mut panel = panel_with((0..5).map(|i| sized(&format!("f{}", i), i)).collect(), 10);
        panel.move_end();
        assert_eq!(panel.cursor, 4);
        panel.set_entries(vec![sized("only", 1)]);
        assert_eq!(panel.cursor, 0);
    }

    #[test]
    fn test_parent_path() {
        let mut panel = Panel::new(10, SortSpec::default(), ViewMode::Full);
        assert_eq!(panel.parent_path(), None);
        panel.change_path("a");
        assert_eq!(panel.parent_path().as_deref(), Some(""));
        panel.change_path("a/b/c");
        assert_eq!(panel.parent_path().as_deref(), Some("a/b"));
    }

    #[test]
    fn test_counts_and_select_name() {
        let mut panel = panel_with(vec![folder("docs"), sized("a.txt", 3), sized("b.txt", 4)], 10);
        assert_eq!(panel.folder_count(), 1);
        assert_eq!(panel.file_count(), 2);
        assert_eq!(panel.total_size(), 7);
        assert!(panel.select_name("docs"));
        assert_eq!(panel.cursor, 0);
        assert!(panel.select_name("b.txt"));
        assert_eq!(panel.cursor, 2);
        assert!(!panel.select_name("zzz"));
    }

    #[test]
    fn test_brief_columns() {
        let mut panel = panel_with((0..30).map(|i| sized(&format!("f{:02}", i), i)).collect(), 100);
        panel.set_view_mode(ViewMode::Brief);
        panel.visible_height = 10;
        panel.move_right();
        assert_eq!(panel.cursor, 10);
        panel.move_left();
        assert_eq!(panel.cursor, 0);
    }
}
