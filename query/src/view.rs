/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Table view state: search, sort, status filter and single-row editing.
//!
//! The view never owns rows. [`TableView::apply`] derives the visible rows
//! from the full list every time, so a refetch is reflected immediately.

use entity::{Project, Task, TaskStatus};
use std::cmp::Ordering;
use uuid::Uuid;

pub trait TableRow {
    type Draft: Clone;

    fn id(&self) -> Uuid;

    /// Text that search and sort operate on.
    fn label(&self) -> &str;

    fn status(&self) -> Option<TaskStatus> {
        None
    }

    fn draft(&self) -> Self::Draft;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
}

impl TableRow for Project {
    type Draft = ProjectDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn draft(&self) -> ProjectDraft {
        ProjectDraft {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

impl TableRow for Task {
    type Draft = TaskDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Option<TaskStatus> {
        Some(self.status)
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The underlying list has no rows.
    NoRows,
    /// Rows exist but the filters hide all of them.
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession<D> {
    pub id: Uuid,
    pub draft: D,
}

pub struct TableView<R: TableRow> {
    pub search: String,
    pub sort: SortDirection,
    pub status_filter: Option<TaskStatus>,
    editing: Option<EditSession<R::Draft>>,
}

impl<R: TableRow> Default for TableView<R> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortDirection::default(),
            status_filter: None,
            editing: None,
        }
    }
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl<R: TableRow> TableView<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggled();
    }

    pub fn has_filters(&self) -> bool {
        !self.search.is_empty() || self.status_filter.is_some()
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.status_filter = None;
    }

    pub fn matches(&self, row: &R) -> bool {
        let search_hit = self.search.is_empty()
            || row
                .label()
                .to_lowercase()
                .contains(&self.search.to_lowercase());
        let status_hit = self
            .status_filter
            .is_none_or(|status| row.status() == Some(status));

        search_hit && status_hit
    }

    /// Visible rows in display order. Ties keep their source order.
    pub fn apply<'a>(&self, rows: &'a [R]) -> Vec<&'a R> {
        let mut visible: Vec<&R> = rows.iter().filter(|row| self.matches(row)).collect();

        match self.sort {
            SortDirection::Ascending => {
                visible.sort_by(|a, b| compare_labels(a.label(), b.label()))
            }
            SortDirection::Descending => {
                visible.sort_by(|a, b| compare_labels(b.label(), a.label()))
            }
        }

        visible
    }

    pub fn empty_state(&self, rows: &[R]) -> Option<EmptyState> {
        if rows.is_empty() {
            Some(EmptyState::NoRows)
        } else if !rows.iter().any(|row| self.matches(row)) {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }

    /// Puts `row` in edit mode, replacing any row already being edited.
    pub fn begin_edit(&mut self, row: &R) {
        self.editing = Some(EditSession {
            id: row.id(),
            draft: row.draft(),
        });
    }

    pub fn editing(&self) -> Option<&EditSession<R::Draft>> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self, id: Uuid) -> bool {
        self.editing.as_ref().is_some_and(|session| session.id == id)
    }

    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        self.editing.as_mut().map(|session| &mut session.draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Leaves edit mode and hands back the draft for submission.
    pub fn finish_edit(&mut self) -> Option<EditSession<R::Draft>> {
        self.editing.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            status,
            project_id: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    fn titles(rows: Vec<&Task>) -> Vec<&str> {
        rows.into_iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_sort_toggles_direction() {
        let rows = vec![
            task("b", TaskStatus::Pending),
            task("a", TaskStatus::Pending),
            task("c", TaskStatus::Pending),
        ];
        let mut view = TableView::<Task>::new();

        assert_eq!(titles(view.apply(&rows)), vec!["a", "b", "c"]);
        view.toggle_sort();
        assert_eq!(titles(view.apply(&rows)), vec!["c", "b", "a"]);
        view.toggle_sort();
        assert_eq!(titles(view.apply(&rows)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let rows = vec![
            task("Write report", TaskStatus::Pending),
            task("Review REPORT", TaskStatus::Completed),
            task("Call bank", TaskStatus::Pending),
        ];
        let mut view = TableView::<Task>::new();
        view.search = "report".to_string();

        assert_eq!(titles(view.apply(&rows)), vec!["Review REPORT", "Write report"]);
        assert!(view.has_filters());
    }

    #[test]
    fn test_status_filter_keeps_subset() {
        let rows = vec![
            task("d", TaskStatus::Completed),
            task("a", TaskStatus::Pending),
            task("c", TaskStatus::Completed),
            task("b", TaskStatus::InProgress),
        ];
        let mut view = TableView::<Task>::new();
        view.status_filter = Some(TaskStatus::Completed);

        let visible = view.apply(&rows);
        assert_eq!(titles(visible.clone()), vec!["c", "d"]);
        assert!(visible.iter().all(|t| t.status == TaskStatus::Completed));
    }

    #[test]
    fn test_equal_labels_keep_source_order() {
        let first = task("same", TaskStatus::Pending);
        let second = task("same", TaskStatus::Completed);
        let rows = vec![first.clone(), second.clone()];
        let mut view = TableView::<Task>::new();

        let ids: Vec<Uuid> = view.apply(&rows).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        view.toggle_sort();
        let ids: Vec<Uuid> = view.apply(&rows).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_empty_states() {
        let mut view = TableView::<Task>::new();
        assert_eq!(view.empty_state(&[]), Some(EmptyState::NoRows));

        let rows = vec![task("a", TaskStatus::Pending)];
        assert_eq!(view.empty_state(&rows), None);

        view.status_filter = Some(TaskStatus::Completed);
        assert_eq!(view.empty_state(&rows), Some(EmptyState::NoMatches));

        view.clear_filters();
        assert!(!view.has_filters());
        assert_eq!(view.empty_state(&rows), None);
    }

    #[test]
    fn test_edit_session_snapshot() {
        let project = Project {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: None,
            user_id: Uuid::new_v4(),
            created_at: Utc::now() - Duration::days(1),
        };
        let mut view = TableView::<Project>::new();

        view.begin_edit(&project);
        assert!(view.is_editing(project.id));
        view.draft_mut().unwrap().name = "Landing page".to_string();
        assert_eq!(project.name, "Website");

        let session = view.finish_edit().unwrap();
        assert_eq!(session.id, project.id);
        assert_eq!(session.draft.name, "Landing page");
        assert_eq!(session.draft.description, "");
        assert!(view.editing().is_none());
    }

    #[test]
    fn test_cancel_edit_discards_draft() {
        let row = task("a", TaskStatus::Pending);
        let other = task("b", TaskStatus::Pending);
        let mut view = TableView::<Task>::new();

        view.begin_edit(&row);
        view.begin_edit(&other);
        assert!(!view.is_editing(row.id));
        assert!(view.is_editing(other.id));

        view.cancel_edit();
        assert!(view.finish_edit().is_none());
    }
}
