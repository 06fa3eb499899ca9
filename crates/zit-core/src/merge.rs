//! Chronological merge of the project and subtask streams.

use serde::Serialize;
use thiserror::Error;

use crate::event::{Event, Project, Subtask};

/// Errors from grouping a merged timeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A subtask precedes every project, so it has no owner.
    #[error("first event cannot be a subtask (subtask {name:?} has no preceding project)")]
    FirstEventCannotBeSubtask { name: String },
}

/// Interleaves projects and subtasks by `(timestamp, type rank)`.
///
/// A project and a subtask with the same timestamp always come out project
/// first. The sort is stable, so equal keys keep their input order.
pub fn merge_chronological(projects: &[Project], subtasks: &[Subtask]) -> Vec<Event> {
    let mut merged: Vec<Event> = projects
        .iter()
        .cloned()
        .map(Event::from)
        .chain(subtasks.iter().cloned().map(Event::from))
        .collect();
    merged.sort_by_key(|event| (event.timestamp(), event.type_rank()));
    merged
}

/// One project occurrence and the subtasks that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGroup {
    pub project: Project,
    pub subtasks: Vec<Subtask>,
}

/// Assigns every run of subtasks to the most recent preceding project.
pub fn group_subtasks(merged: &[Event]) -> Result<Vec<ProjectGroup>, MergeError> {
    let mut groups: Vec<ProjectGroup> = Vec::new();
    for event in merged {
        match event {
            Event::Project(project) => groups.push(ProjectGroup {
                project: project.clone(),
                subtasks: Vec::new(),
            }),
            Event::Subtask(subtask) => {
                let Some(group) = groups.last_mut() else {
                    return Err(MergeError::FirstEventCannotBeSubtask {
                        name: subtask.name.to_string(),
                    });
                };
                group.subtasks.push(subtask.clone());
            }
            // Commits are not owners; subtasks after one stay with the
            // preceding project.
            Event::GitCommit(_) => {}
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::types::EventName;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn project(h: u32, m: u32, name: &str) -> Project {
        Project::new(at(h, m), EventName::new(name).unwrap())
    }

    fn subtask(h: u32, m: u32, name: &str) -> Subtask {
        Subtask::new(at(h, m), EventName::new(name).unwrap(), "")
    }

    #[test]
    fn merge_interleaves_by_time() {
        let merged = merge_chronological(
            &[project(9, 0, "Setup"), project(9, 30, "Coding")],
            &[subtask(9, 10, "Email"), subtask(9, 45, "Tests")],
        );
        let names: Vec<_> = merged.iter().map(Event::name).collect();
        assert_eq!(names, vec!["Setup", "Email", "Coding", "Tests"]);
    }

    #[test]
    fn project_wins_timestamp_tie() {
        let merged = merge_chronological(&[project(9, 0, "Setup")], &[subtask(9, 0, "Email")]);
        assert!(matches!(merged[0], Event::Project(_)));
        assert!(matches!(merged[1], Event::Subtask(_)));
    }

    #[test]
    fn subtask_grouped_under_preceding_project() {
        let merged = merge_chronological(
            &[project(9, 0, "Setup"), project(9, 30, "Coding")],
            &[subtask(9, 10, "Email")],
        );
        let groups = group_subtasks(&merged).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].project.name, "Setup");
        assert_eq!(groups[0].subtasks.len(), 1);
        assert_eq!(groups[0].subtasks[0].name, "Email");
        assert!(groups[1].subtasks.is_empty());
    }

    #[test]
    fn leading_subtask_is_an_error() {
        let merged = merge_chronological(&[project(9, 30, "Coding")], &[subtask(9, 10, "Email")]);
        assert_eq!(
            group_subtasks(&merged),
            Err(MergeError::FirstEventCannotBeSubtask {
                name: "Email".to_string()
            })
        );
    }

    #[test]
    fn empty_streams_merge_to_nothing() {
        let merged = merge_chronological(&[], &[]);
        assert!(merged.is_empty());
        assert!(group_subtasks(&merged).unwrap().is_empty());
    }
}
