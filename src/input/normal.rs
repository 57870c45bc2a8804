//! Normal mode: browsing the bucket listing

use crossterm::event::{KeyCode, KeyEvent};

use crate::state::app::App;
use crate::state::panel::SortField;

pub fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Esc clears the status message first, then leaves search results
    if key.code == KeyCode::Esc {
        if app.notifications.current().is_some() {
            app.notifications.dismiss();
        } else if app.panel.is_search() {
            app.exit_search();
        }
        return;
    }

    if app.key_matches("quit", &key) || app.key_matches("quit_alt", &key) {
        app.should_quit = true;
        return;
    }
    if app.key_matches("refresh", &key) {
        app.reload();
        return;
    }

    // Bucket switching
    if app.key_matches("select_bucket", &key) || app.key_matches("select_bucket_alt", &key) {
        app.show_bucket_selector();
        return;
    }

    // File operations
    if app.key_matches("view", &key) {
        if app.panel.selected().is_some_and(|e| !e.folder) {
            app.open_viewer(app.panel.cursor);
        }
        return;
    }
    if app.key_matches("download", &key) {
        app.download_selected();
        return;
    }
    if app.key_matches("upload", &key) {
        app.show_upload_dialog();
        return;
    }
    if app.key_matches("mkdir", &key) {
        app.show_mkdir_dialog();
        return;
    }
    if app.key_matches("delete", &key) {
        app.delete_selected();
        return;
    }
    if app.key_matches("search", &key) {
        app.show_search_dialog();
        return;
    }
    if app.key_matches("cdn_link", &key) {
        app.show_cdn_link();
        return;
    }
    if app.key_matches("share_link", &key) {
        app.show_share_link();
        return;
    }

    // Sorting
    if app.key_matches("sort_name", &key) {
        app.set_sort(SortField::Name);
        return;
    }
    if app.key_matches("sort_size", &key) {
        app.set_sort(SortField::Size);
        return;
    }
    if app.key_matches("sort_modified", &key) {
        app.set_sort(SortField::Modified);
        return;
    }
    if app.key_matches("sort_unsorted", &key) {
        app.set_sort(SortField::Unsorted);
        return;
    }

    // Paging and layout
    if app.key_matches("prev_page", &key) {
        app.prev_page();
        return;
    }
    if app.key_matches("next_page", &key) {
        app.next_page();
        return;
    }
    if app.key_matches("toggle_view", &key) {
        app.toggle_view_mode();
        return;
    }

    // Navigation
    if app.key_matches("enter", &key) {
        app.enter_selected();
    } else if app.key_matches("go_parent", &key) {
        app.go_parent();
    } else if app.key_matches("move_up", &key) {
        app.panel.move_up();
    } else if app.key_matches("move_down", &key) {
        app.panel.move_down();
    } else if app.key_matches("move_left", &key) {
        app.panel.move_left();
    } else if app.key_matches("move_right", &key) {
        app.panel.move_right();
    } else if app.key_matches("page_up", &key) {
        app.panel.page_up();
    } else if app.key_matches("page_down", &key) {
        app.panel.page_down();
    } else if app.key_matches("home", &key) {
        app.panel.move_home();
    } else if app.key_matches("end", &key) {
        app.panel.move_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    use crate::api::mock::{MockApi, file, folder};
    use crate::config::Config;
    use crate::state::mode::Mode;

    fn loaded_app(api: Arc<MockApi>) -> App {
        let mut app = App::new(Config::default(), api);
        app.start(None);
        app.wait_for_task();
        app
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_normal_mode(app, KeyEvent::new(code, modifiers));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded_app(Arc::new(MockApi::new()));
        press(&mut app, KeyCode::F(10), KeyModifiers::NONE);
        assert!(app.should_quit);

        let mut app = loaded_app(Arc::new(MockApi::new()));
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_folder_and_back() {
        let api = Arc::new(
            MockApi::new()
                .with_listing("", vec![folder("docs"), file("a.txt", 3)])
                .with_listing("docs", vec![file("docs/b.txt", 1)]),
        );
        let mut app = loaded_app(api);

        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        app.wait_for_task();
        assert_eq!(app.panel.path, "docs");
        assert_eq!(app.panel.displayed_entries().len(), 1);

        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        app.wait_for_task();
        assert_eq!(app.panel.path, "");
        assert_eq!(app.panel.selected().map(|e| e.name.as_str()), Some("docs/"));
    }

    #[test]
    fn test_cursor_and_sort_keys() {
        let api = Arc::new(MockApi::new().with_listing(
            "",
            vec![file("b.txt", 1), file("c.txt", 30), file("a.txt", 2)],
        ));
        let mut app = loaded_app(api);

        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.panel.cursor, 1);
        press(&mut app, KeyCode::End, KeyModifiers::NONE);
        assert_eq!(app.panel.cursor, 2);
        press(&mut app, KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(app.panel.cursor, 0);

        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        let names: Vec<&str> = app.panel.displayed_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);

        press(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        let names: Vec<&str> = app.panel.displayed_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "c.txt", "a.txt"]);
    }

    #[test]
    fn test_view_ignores_folders() {
        let api = Arc::new(MockApi::new().with_listing("", vec![folder("docs"), file("a.png", 3)]));
        let mut app = loaded_app(api);

        press(&mut app, KeyCode::F(3), KeyModifiers::NONE);
        assert!(matches!(app.mode, Mode::Normal));

        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        press(&mut app, KeyCode::F(3), KeyModifiers::NONE);
        assert!(matches!(app.mode, Mode::Viewing { .. }));
    }

    #[test]
    fn test_mkdir_needs_upload_permission() {
        let mut app = loaded_app(Arc::new(MockApi::new()));
        press(&mut app, KeyCode::F(7), KeyModifiers::NONE);
        assert!(matches!(app.mode, Mode::Normal));

        let mut app = loaded_app(Arc::new(MockApi::new().with_permissions(true, false)));
        press(&mut app, KeyCode::F(7), KeyModifiers::NONE);
        assert!(matches!(app.mode, Mode::MakingDir { .. }));
    }

    #[test]
    fn test_esc_dismisses_notification_before_leaving_search() {
        let api = Arc::new(MockApi::new().with_listing("", vec![file("a.txt", 1)]));
        let mut app = loaded_app(api);
        app.execute_search("a.txt");
        app.wait_for_task();
        app.notifications.info("Share link: x");

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.notifications.current().is_none());
        assert!(app.panel.is_search());

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        app.wait_for_task();
        assert!(!app.panel.is_search());
    }
}
