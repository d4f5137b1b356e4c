//! Workload templates.
//!
//! A template is a reusable percent-of-total breakdown: named steps, each
//! sized as a share of the workload's hour budget, with a suggested block
//! length and a time-of-day bucket. Instantiating a template stamps fresh
//! ids through a new [`Workload`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workload::{Task, TimeOfDay, Workload};

/// A step definition within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStep {
    /// Step name (e.g. "First Draft")
    pub name: String,
    /// Share of the workload's hours this step takes (0.0-1.0)
    pub percent_of_total: f64,
    /// Suggested contiguous block length in hours
    pub preferred_hours: Option<f64>,
    /// Preferred time-of-day bucket
    pub time_of_day: TimeOfDay,
}

/// A reusable breakdown for sizing a workload's steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTemplate {
    /// Template name
    pub name: String,
    /// Description of the breakdown
    pub description: String,
    /// Step definitions in execution order
    pub steps: Vec<TemplateStep>,
}

impl WorkloadTemplate {
    /// Build a workload from this template, minting fresh ids.
    pub fn instantiate(
        &self,
        name: impl Into<String>,
        deadline: DateTime<Utc>,
        expected_hours: f64,
    ) -> Workload {
        let workload_id = uuid::Uuid::new_v4().to_string();
        let tasks = self
            .steps
            .iter()
            .map(|step| Task {
                id: uuid::Uuid::new_v4().to_string(),
                workload_id: workload_id.clone(),
                name: step.name.clone(),
                percent_of_total: step.percent_of_total,
                preferred_hours: step.preferred_hours,
                time_of_day: step.time_of_day,
            })
            .collect();

        Workload {
            id: workload_id,
            name: name.into(),
            deadline,
            expected_hours,
            tasks,
        }
    }

    /// Template for a research paper: research, outline, draft, revise.
    pub fn research_paper() -> Self {
        Self {
            name: "Research Paper".to_string(),
            description: "Split a paper into research, outline, draft, and revision"
                .to_string(),
            steps: vec![
                TemplateStep {
                    name: "Research & Notes".to_string(),
                    percent_of_total: 0.25,
                    preferred_hours: Some(2.0),
                    time_of_day: TimeOfDay::Morning,
                },
                TemplateStep {
                    name: "Outline".to_string(),
                    percent_of_total: 0.10,
                    preferred_hours: Some(1.0),
                    time_of_day: TimeOfDay::Morning,
                },
                TemplateStep {
                    name: "First Draft".to_string(),
                    percent_of_total: 0.40,
                    preferred_hours: Some(2.0),
                    time_of_day: TimeOfDay::Afternoon,
                },
                TemplateStep {
                    name: "Revise & Polish".to_string(),
                    percent_of_total: 0.25,
                    preferred_hours: Some(1.5),
                    time_of_day: TimeOfDay::Evening,
                },
            ],
        }
    }

    /// Template for exam preparation: review, practice, mock exam.
    pub fn exam_prep() -> Self {
        Self {
            name: "Exam Prep".to_string(),
            description: "Split exam preparation into review, practice, and a mock exam"
                .to_string(),
            steps: vec![
                TemplateStep {
                    name: "Review Material".to_string(),
                    percent_of_total: 0.40,
                    preferred_hours: Some(1.5),
                    time_of_day: TimeOfDay::Morning,
                },
                TemplateStep {
                    name: "Practice Problems".to_string(),
                    percent_of_total: 0.40,
                    preferred_hours: Some(1.5),
                    time_of_day: TimeOfDay::Afternoon,
                },
                TemplateStep {
                    name: "Mock Exam".to_string(),
                    percent_of_total: 0.20,
                    preferred_hours: Some(2.0),
                    time_of_day: TimeOfDay::Evening,
                },
            ],
        }
    }

    /// Template for a standard project: plan, build, test, polish.
    pub fn standard_project() -> Self {
        Self {
            name: "Standard Project".to_string(),
            description: "Split a project into planning, build, testing, and polish"
                .to_string(),
            steps: vec![
                TemplateStep {
                    name: "Planning".to_string(),
                    percent_of_total: 0.15,
                    preferred_hours: Some(1.0),
                    time_of_day: TimeOfDay::Morning,
                },
                TemplateStep {
                    name: "Build".to_string(),
                    percent_of_total: 0.50,
                    preferred_hours: Some(2.0),
                    time_of_day: TimeOfDay::Afternoon,
                },
                TemplateStep {
                    name: "Testing".to_string(),
                    percent_of_total: 0.20,
                    preferred_hours: Some(1.5),
                    time_of_day: TimeOfDay::Afternoon,
                },
                TemplateStep {
                    name: "Polish".to_string(),
                    percent_of_total: 0.15,
                    preferred_hours: Some(1.0),
                    time_of_day: TimeOfDay::Evening,
                },
            ],
        }
    }

    /// All built-in templates.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::research_paper(),
            Self::exam_prep(),
            Self::standard_project(),
        ]
    }
}
