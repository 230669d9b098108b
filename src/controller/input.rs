//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, FormKind, FormState, SelectedItem};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Ctrl+C / Ctrl+Q quit from anywhere, forms included
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Esc dismisses a notification before anything else sees it
        if key.code == KeyCode::Esc && model.has_notification().await {
            model.clear_notification().await;
            return Ok(());
        }

        // Handle form input
        if let Some(kind) = model.form_kind().await {
            match key.code {
                KeyCode::Tab | KeyCode::Down => model.edit_form(|f| f.focus_next()).await,
                KeyCode::BackTab | KeyCode::Up => model.edit_form(|f| f.focus_prev()).await,
                KeyCode::Backspace => model.edit_form(|f| f.backspace()).await,
                KeyCode::Char(c) => model.edit_form(|f| f.push_char(c)).await,
                KeyCode::Esc => {
                    // Nothing to go back to before signing in
                    if kind != FormKind::SignIn || model.is_signed_in().await {
                        model.close_form().await;
                    }
                }
                KeyCode::Enter => {
                    if let Some(form) = model.close_form().await {
                        drop(model);
                        self.spawn_task(|c| async move { c.submit_form(form).await });
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        // Only the sign-in form and quit work while signed out
        if !model.is_signed_in().await {
            if let KeyCode::Char('q') | KeyCode::Char('Q') = key.code {
                model.set_should_quit(true).await;
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle add-to-playlist picker
        if model.is_playlist_picker_open().await {
            return match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    model.playlist_picker_move_up().await;
                    Ok(())
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    model.playlist_picker_move_down().await;
                    Ok(())
                }
                KeyCode::Enter => {
                    let selection = model.get_picker_selection().await;
                    model.hide_playlist_picker().await;
                    drop(model);
                    if let Some((playlist, track)) = selection {
                        self.spawn_task(|c| async move { c.add_to_playlist(playlist, track).await });
                    }
                    Ok(())
                }
                KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('A') => {
                    model.hide_playlist_picker().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    model.cycle_section_forward().await;
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    drop(model);
                    self.perform_search(&query).await;
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.set_active_section(ActiveSection::MainContent).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Left => {
                    model.switch_home_row(false).await;
                    return Ok(());
                }
                KeyCode::Right => {
                    model.switch_home_row(true).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('l') => {
                    // Falls back to the current track when no row is selected
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    self.toggle_liked_track(selected.map(|item| item.track().clone())).await;
                    return Ok(());
                }
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.add_to_queue(item.track().clone()).await;
                    }
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    if let Some(item) = model.get_selected_content_item().await {
                        if ui_state.playlists.is_empty() {
                            model.notify("Create a playlist first (c).".to_string()).await;
                        } else {
                            model.show_playlist_picker(item.track().clone()).await;
                        }
                    }
                    return Ok(());
                }
                KeyCode::Delete | KeyCode::Char('d') => {
                    match model.get_selected_content_item().await {
                        Some(SelectedItem::QueuedTrack { index, .. }) => {
                            drop(model);
                            self.remove_queued(index).await;
                        }
                        Some(SelectedItem::PlaylistEntry { entry, .. }) => {
                            drop(model);
                            self.spawn_task(|c| async move {
                                c.remove_playlist_entry(&entry.id).await
                            });
                        }
                        _ => {}
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle Playlists section actions
        if ui_state.active_section == ActiveSection::Playlists {
            if let KeyCode::Delete | KeyCode::Char('d') = key.code {
                drop(model);
                self.spawn_task(|c| async move { c.delete_selected_playlist().await });
                return Ok(());
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                model.cycle_section_forward().await;
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.move_selection_up().await;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => {
                // Handle Enter based on active section
                match ui_state.active_section {
                    ActiveSection::Library => {
                        if let Some(kind) = model.get_selected_library_item().await {
                            drop(model);
                            self.spawn_task(|c| async move { c.open_library_item(kind).await });
                        }
                    }
                    ActiveSection::Playlists => {
                        if let Some(playlist) = model.get_selected_playlist().await {
                            drop(model);
                            self.spawn_task(|c| async move { c.open_playlist(&playlist.id).await });
                        }
                    }
                    _ => {}
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            // Next track
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            // Previous track
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            // Like the current track
            KeyCode::Char('l') => {
                drop(model);
                self.toggle_liked_track(None).await;
            }
            // Focus search
            KeyCode::Char('/') | KeyCode::Char('g') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Show queue
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.show_queue().await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                model.open_form(FormState::create_playlist()).await;
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                model.open_form(FormState::import_files()).await;
            }
            KeyCode::Char('L') => {
                drop(model);
                self.spawn_task(|c| async move { c.sign_out().await });
            }
            // Show help popup
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::super::tests::{controller, track};
    use crate::model::{ActiveSection, FormKind, FormState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn sign_in_form_cannot_be_dismissed_while_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.model.lock().await.open_form(FormState::sign_in()).await;

        c.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        c.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();

        let model = c.model.lock().await;
        assert_eq!(model.form_kind().await, Some(FormKind::SignIn));
        assert!(!model.should_quit().await, "q is typed into the form");
        assert_eq!(model.get_ui_state().await.form.unwrap().value(0), "q");
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_a_form() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.model.lock().await.open_form(FormState::sign_in()).await;

        c.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(c.model.lock().await.should_quit().await);
    }

    #[tokio::test]
    async fn typing_in_search_does_not_trigger_shortcuts() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        {
            let model = c.model.lock().await;
            model.set_signed_in_as(Some("a@b.c".into())).await;
            model.set_active_section(ActiveSection::Search).await;
        }

        for ch in "nq ".chars() {
            c.handle_key_event(press(KeyCode::Char(ch))).await.unwrap();
        }

        let model = c.model.lock().await;
        assert_eq!(model.search_query().await, "nq ");
        assert!(!model.should_quit().await);
    }

    #[tokio::test]
    async fn signed_out_app_ignores_everything_but_quit() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());

        c.handle_key_event(press(KeyCode::Char('?'))).await.unwrap();
        assert!(!c.model.lock().await.is_help_popup_open().await);

        c.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(c.model.lock().await.should_quit().await);
    }

    #[tokio::test]
    async fn picker_needs_a_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        {
            let model = c.model.lock().await;
            model.set_signed_in_as(Some("a@b.c".into())).await;
            model.set_liked_songs(vec![track("a")]).await;
            model.set_active_section(ActiveSection::MainContent).await;
        }

        c.handle_key_event(press(KeyCode::Char('a'))).await.unwrap();
        let model = c.model.lock().await;
        assert!(!model.is_playlist_picker_open().await);
        assert!(model.has_notification().await);
    }

    #[tokio::test]
    async fn like_without_selected_row_likes_current_track() {
        let dir = tempfile::tempdir().unwrap();
        let c = controller(dir.path());
        c.model.lock().await.play_track(track("now")).await;
        {
            let model = c.model.lock().await;
            model.set_signed_in_as(Some("a@b.c".into())).await;
            model.set_active_section(ActiveSection::MainContent).await;
        }

        c.handle_key_event(press(KeyCode::Char('l'))).await.unwrap();

        assert!(c.model.lock().await.liked_ids().await.contains("now"));
    }
}
