// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for UI updates.

use crate::models::{AppState, CopyTarget, LoadedFile};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events let front-ends react to state changes without polling.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Files were appended to the collection
    FilesAppended { added: usize, total: usize },

    /// The collection was emptied
    FilesCleared,

    /// A batch started or finished loading
    LoadingChanged { is_loading: bool },

    /// The search term changed
    SearchTermChanged { term: String },

    /// The user-visible error changed
    ErrorChanged { message: Option<String> },

    /// The "Copied!" indicator changed
    CopiedChanged { target: Option<CopyTarget> },

    /// A file was expanded or collapsed
    ExpansionChanged,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state under the lock
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Multiple subscribers can listen for state changes
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a snapshot of the current state
    ///
    /// File contents are shared, not copied.
    pub fn snapshot(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let loading = state_manager.read(|state| state.is_loading);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It captures the old state,
    /// applies the update, diffs the two and broadcasts one event per change.
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if new.files.len() < old.files.len() {
            changes.push(StateChange::FilesCleared);
        } else if new.files.len() > old.files.len() {
            changes.push(StateChange::FilesAppended {
                added: new.files.len() - old.files.len(),
                total: new.files.len(),
            });
        }

        if old.is_loading != new.is_loading {
            changes.push(StateChange::LoadingChanged {
                is_loading: new.is_loading,
            });
        }

        if old.search_term != new.search_term {
            changes.push(StateChange::SearchTermChanged {
                term: new.search_term.clone(),
            });
        }

        if old.error_message != new.error_message {
            changes.push(StateChange::ErrorChanged {
                message: new.error_message.clone(),
            });
        }

        if old.copied != new.copied {
            changes.push(StateChange::CopiedChanged { target: new.copied });
        }

        if old.expanded != new.expanded {
            changes.push(StateChange::ExpansionChanged);
        }

        changes
    }

    // Convenience methods for common state updates

    /// Mark a batch as loading.
    ///
    /// # Returns
    /// `false` if another batch is already loading; the state is left untouched.
    pub fn begin_loading(&self) -> bool {
        let mut started = false;
        self.update(|state| {
            if !state.is_loading {
                state.is_loading = true;
                state.error_message = None;
                started = true;
            }
        });
        started
    }

    /// Mark the current batch as finished, recording an error if it failed
    pub fn finish_loading(&self, error: Option<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.is_loading = false;
            if error.is_some() {
                state.error_message = error;
            }
        })
    }

    /// Append one loaded file to the collection
    pub fn append_file(&self, file: LoadedFile) -> Vec<StateChange> {
        self.update(|state| state.files.push(file))
    }

    /// Remove all files and reset the search term
    pub fn clear_files(&self) -> Vec<StateChange> {
        self.update(AppState::clear)
    }

    pub fn set_search_term(&self, term: impl Into<String>) -> Vec<StateChange> {
        let term = term.into();
        self.update(|state| state.search_term = term)
    }

    pub fn set_error(&self, message: Option<String>) -> Vec<StateChange> {
        self.update(|state| state.error_message = message)
    }

    /// Show the "Copied!" indicator for a target.
    ///
    /// # Returns
    /// The generation of this copy, to hand back to [`Self::clear_copied`]
    pub fn set_copied(&self, target: CopyTarget) -> u64 {
        let mut generation = 0;
        self.update(|state| {
            state.copied = Some(target);
            state.copy_generation += 1;
            generation = state.copy_generation;
        });
        generation
    }

    /// Hide the indicator, unless a newer copy happened since `generation`
    pub fn clear_copied(&self, generation: u64) -> Vec<StateChange> {
        self.update(|state| {
            if state.copy_generation == generation {
                state.copied = None;
            }
        })
    }

    /// Expand or collapse a file's content.
    ///
    /// # Returns
    /// The new expansion state, or `None` if the index is out of range
    pub fn toggle_expanded(&self, index: usize) -> Option<bool> {
        let mut expanded = None;
        self.update(|state| {
            if index >= state.files.len() {
                return;
            }
            let now_expanded = if state.expanded.remove(&index) {
                false
            } else {
                state.expanded.insert(index);
                true
            };
            expanded = Some(now_expanded);
        });
        expanded
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> LoadedFile {
        LoadedFile::new(name, "content".to_string(), 7, 0)
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_loading);
        assert!(state.files.is_empty());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_update_with_change_detection() {
        let manager = StateManager::new();

        let changes = manager.update(|state| {
            state.is_loading = true;
            state.files.push(file("a.txt"));
        });

        assert_eq!(
            changes,
            vec![
                StateChange::FilesAppended { added: 1, total: 1 },
                StateChange::LoadingChanged { is_loading: true },
            ]
        );
    }

    #[test]
    fn test_begin_loading_is_exclusive() {
        let manager = StateManager::new();

        assert!(manager.begin_loading());
        assert!(!manager.begin_loading());

        manager.finish_loading(None);
        assert!(manager.begin_loading());
    }

    #[test]
    fn test_begin_loading_clears_previous_error() {
        let manager = StateManager::new();
        manager.set_error(Some("File \"x\" is too large.".to_string()));

        manager.begin_loading();
        assert!(manager.read(|s| s.error_message.is_none()));
    }

    #[test]
    fn test_finish_loading_with_error() {
        let manager = StateManager::new();
        manager.begin_loading();

        let changes = manager.finish_loading(Some("read failed".to_string()));

        assert!(changes.contains(&StateChange::LoadingChanged { is_loading: false }));
        assert!(changes.contains(&StateChange::ErrorChanged {
            message: Some("read failed".to_string())
        }));
    }

    #[test]
    fn test_append_and_clear() {
        let manager = StateManager::new();
        manager.append_file(file("a.txt"));
        let changes = manager.append_file(file("b.txt"));
        assert_eq!(changes, vec![StateChange::FilesAppended { added: 1, total: 2 }]);

        manager.set_search_term("con");
        let changes = manager.clear_files();

        assert!(changes.contains(&StateChange::FilesCleared));
        assert!(changes.contains(&StateChange::SearchTermChanged {
            term: String::new()
        }));
        assert!(manager.read(|s| s.files.is_empty()));
    }

    #[test]
    fn test_clearing_empty_collection_emits_nothing() {
        let manager = StateManager::new();
        assert!(manager.clear_files().is_empty());
    }

    #[test]
    fn test_copied_indicator() {
        let manager = StateManager::new();
        let first = manager.set_copied(CopyTarget::File(0));
        let second = manager.set_copied(CopyTarget::All);

        // A stale timer for the first copy must not hide the newer one
        assert!(manager.clear_copied(first).is_empty());
        assert_eq!(manager.read(|s| s.copied), Some(CopyTarget::All));

        let changes = manager.clear_copied(second);
        assert_eq!(changes, vec![StateChange::CopiedChanged { target: None }]);
    }

    #[test]
    fn test_recopying_same_target_keeps_indicator() {
        let manager = StateManager::new();
        let first = manager.set_copied(CopyTarget::File(0));
        let second = manager.set_copied(CopyTarget::File(0));
        assert!(second > first);

        assert!(manager.clear_copied(first).is_empty());
        assert_eq!(manager.read(|s| s.copied), Some(CopyTarget::File(0)));

        manager.clear_copied(second);
        assert_eq!(manager.read(|s| s.copied), None);
    }

    #[test]
    fn test_toggle_expanded() {
        let manager = StateManager::new();
        manager.append_file(file("a.txt"));

        assert_eq!(manager.toggle_expanded(0), Some(true));
        assert_eq!(manager.toggle_expanded(0), Some(false));
        assert_eq!(manager.toggle_expanded(5), None);
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.set_search_term("needle");

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            StateChange::SearchTermChanged {
                term: "needle".to_string()
            }
        );
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.append_file(file("a.txt"));

        assert_eq!(manager2.snapshot().files.len(), 1);
    }
}
