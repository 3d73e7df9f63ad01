//! Public tracking projection.
//!
//! Turns a report plus its append-only history into the fixed 5-step
//! timeline shown on the public lookup page. Pure functions; the caller
//! injects `now` so the "time ago" buckets are testable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Report, ReportStatus, TaskAssignment, WorkflowHistoryEntry};

/// Fixed process steps, in order. Step ids double as the history `action`
/// strings that pin the timeline to a step.
pub const PROCESS_STEPS: [(&str, &str); 5] = [
    (
        "Surat Diterima",
        "Surat masuk dan didaftarkan dalam sistem",
    ),
    (
        "Verifikasi Dokumen",
        "Pemeriksaan kelengkapan dan validitas dokumen",
    ),
    (
        "Penugasan Staff",
        "Surat diagendakan kepada staff untuk diproses",
    ),
    (
        "Proses Pelayanan",
        "Pelaksanaan layanan sesuai jenis permohonan",
    ),
    (
        "Selesai",
        "Surat telah selesai diproses dan siap diambil",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelineStep {
    pub step: String,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub status: StepStatus,
    pub notes: Option<String>,
}

/// Coordinator instructions surfaced on the "Penugasan Staff" step.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoordinatorNote {
    pub staff_name: String,
    pub note: Option<String>,
    pub revision_note: Option<String>,
    pub date: DateTime<Utc>,
}

/// What the public lookup returns. Field names match what the tracking
/// page consumes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackingView {
    pub no_surat: String,
    pub tracking_number: String,
    pub hal: String,
    pub dari: String,
    pub status: String,
    pub layanan: String,
    pub progress: u32,
    pub timeline: Vec<TimelineStep>,
    pub last_update: String,
    pub last_update_raw: DateTime<Utc>,
    pub coordinator_notes: Vec<CoordinatorNote>,
    pub current_holder: Option<String>,
}

/// Coarse "time ago" phrasing used by the tracking page.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let year = seconds as f64 / 31_536_000.0;
    if year > 1.0 {
        return format!("{} tahun lalu", year.floor() as i64);
    }
    let month = seconds as f64 / 2_592_000.0;
    if month > 1.0 {
        return format!("{} bulan lalu", month.floor() as i64);
    }
    let day = seconds as f64 / 86_400.0;
    if day > 1.0 {
        return format!("{} hari lalu", day.floor() as i64);
    }
    let hour = seconds as f64 / 3_600.0;
    if hour > 1.0 {
        return format!("{} jam lalu", hour.floor() as i64);
    }
    let minute = seconds as f64 / 60.0;
    if minute > 1.0 {
        return format!("{} menit lalu", minute.floor() as i64);
    }
    "Baru saja".to_string()
}

/// Build the public tracking view for one report.
///
/// `assignments` carries `(assignment, staff display name)` pairs so the
/// projection never touches the database itself.
pub fn project(
    report: &Report,
    history: &[WorkflowHistoryEntry],
    assignments: &[(TaskAssignment, String)],
    holder_name: Option<String>,
    now: DateTime<Utc>,
) -> TrackingView {
    let is_completed = report.status == ReportStatus::Completed;

    let active_step = if is_completed {
        PROCESS_STEPS.len() - 1
    } else {
        let last_action = history.last().map(|h| h.action.as_str()).unwrap_or("");
        match PROCESS_STEPS.iter().position(|(id, _)| *id == last_action) {
            Some(idx) => idx,
            // No exact match: one step per history row, never past the
            // second-to-last step, never negative.
            None => history
                .len()
                .saturating_sub(1)
                .min(PROCESS_STEPS.len() - 2),
        }
    };

    let timeline: Vec<TimelineStep> = PROCESS_STEPS
        .iter()
        .enumerate()
        .map(|(index, (id, description))| {
            let history_item = history
                .iter()
                .find(|h| h.action == *id)
                .or_else(|| (index == active_step).then(|| history.last()).flatten());

            let status = if index < active_step {
                StepStatus::Completed
            } else if index == active_step {
                if is_completed {
                    StepStatus::Completed
                } else {
                    StepStatus::Current
                }
            } else {
                StepStatus::Pending
            };

            TimelineStep {
                step: id.to_string(),
                title: id.to_string(),
                description: history_item
                    .and_then(|h| h.notes.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| description.to_string()),
                date: history_item.map(|h| h.created_at),
                status,
                notes: history_item.and_then(|h| h.notes.clone()),
            }
        })
        .collect();

    let progress = if is_completed {
        100
    } else {
        let completed_steps = timeline
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        let pct =
            ((completed_steps as f64 / PROCESS_STEPS.len() as f64) * 100.0).round() as u32;
        if pct == 0 && !history.is_empty() {
            10
        } else {
            pct
        }
    };

    let last_update_raw = history
        .last()
        .map(|h| h.created_at)
        .unwrap_or(report.created_at);

    let coordinator_notes: Vec<CoordinatorNote> = assignments
        .iter()
        .map(|(assignment, staff_name)| CoordinatorNote {
            staff_name: staff_name.clone(),
            note: assignment.notes.clone(),
            revision_note: assignment.revision_notes.clone(),
            date: assignment.updated_at,
        })
        .filter(|n| {
            n.note.as_deref().is_some_and(|s| !s.is_empty())
                || n.revision_note.as_deref().is_some_and(|s| !s.is_empty())
        })
        .collect();

    TrackingView {
        no_surat: report.no_surat.clone(),
        tracking_number: report.tracking_number(),
        hal: report.hal.clone(),
        dari: report.dari.clone(),
        status: report.status.to_string(),
        layanan: report
            .sub_layanan
            .clone()
            .unwrap_or_else(|| report.layanan.clone()),
        progress,
        timeline,
        last_update: time_ago(last_update_raw, now),
        last_update_raw,
        coordinator_notes,
        current_holder: holder_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{actions, Priority, TaskStatus};
    use chrono::Duration;
    use uuid::Uuid;

    fn report(status: ReportStatus) -> Report {
        Report {
            id: Uuid::new_v4(),
            no_surat: "001/TU/2025".to_string(),
            hal: "Permohonan layanan".to_string(),
            layanan: "Layanan Data".to_string(),
            sub_layanan: None,
            dari: "Dinas Pendidikan".to_string(),
            tanggal_surat: None,
            tanggal_agenda: None,
            no_agenda: None,
            kelompok_asal_surat: None,
            agenda_sestama: None,
            link_documents: None,
            sifat: vec![],
            derajat: vec![],
            status,
            priority: Priority::Sedang,
            created_by: Uuid::new_v4(),
            current_holder: None,
            coordinator_id: None,
            created_at: Utc::now() - Duration::days(3),
            updated_at: Utc::now(),
        }
    }

    fn entry(action: &str, minutes_ago: i64) -> WorkflowHistoryEntry {
        WorkflowHistoryEntry {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            action: action.to_string(),
            user_id: Uuid::new_v4(),
            status: "in-progress".to_string(),
            notes: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "Baru saja");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 menit lalu");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 jam lalu");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 hari lalu");
        assert_eq!(time_ago(now - Duration::days(40), now), "1 bulan lalu");
        assert_eq!(time_ago(now - Duration::days(800), now), "2 tahun lalu");
    }

    #[test]
    fn test_completed_report_pins_last_step() {
        let view = project(
            &report(ReportStatus::Completed),
            &[entry(actions::REPORT_CREATED, 10)],
            &[],
            None,
            Utc::now(),
        );
        assert_eq!(view.progress, 100);
        assert_eq!(view.timeline.last().unwrap().status, StepStatus::Completed);
    }

    #[test]
    fn test_unmatched_history_uses_length_heuristic() {
        // Two non-step actions: active step = min(2 - 1, 3) = 1.
        let history = vec![
            entry(actions::REPORT_CREATED, 60),
            entry(actions::FORWARDED_TO_COORDINATOR, 30),
        ];
        let view = project(&report(ReportStatus::InProgress), &history, &[], None, Utc::now());
        assert_eq!(view.timeline[0].status, StepStatus::Completed);
        assert_eq!(view.timeline[1].status, StepStatus::Current);
        assert_eq!(view.timeline[2].status, StepStatus::Pending);
    }

    #[test]
    fn test_exact_step_action_match_wins() {
        let history = vec![
            entry(actions::REPORT_CREATED, 60),
            entry("Penugasan Staff", 30),
        ];
        let view = project(&report(ReportStatus::InProgress), &history, &[], None, Utc::now());
        assert_eq!(view.timeline[2].status, StepStatus::Current);
    }

    #[test]
    fn test_progress_floor_when_history_exists() {
        // One history row, active step 0, nothing completed: rounded 0 -> 10.
        let view = project(
            &report(ReportStatus::Draft),
            &[entry(actions::REPORT_CREATED, 5)],
            &[],
            None,
            Utc::now(),
        );
        assert_eq!(view.progress, 10);

        // No history at all: stays 0.
        let view = project(&report(ReportStatus::Draft), &[], &[], None, Utc::now());
        assert_eq!(view.progress, 0);
    }

    #[test]
    fn test_coordinator_notes_filtered_to_nonempty() {
        let mk = |notes: Option<&str>, revision: Option<&str>| TaskAssignment {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            coordinator_id: Uuid::new_v4(),
            todo_list: vec![],
            notes: notes.map(String::from),
            status: TaskStatus::InProgress,
            completed_tasks: vec![],
            progress: 0,
            file_path: None,
            revised_file_path: None,
            staff_notes: None,
            staff_revision_notes: None,
            revision_notes: revision.map(String::from),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let assignments = vec![
            (mk(Some("Cek kelengkapan"), None), "Budi".to_string()),
            (mk(None, None), "Sari".to_string()),
            (mk(Some(""), Some("Perbaiki lampiran")), "Andi".to_string()),
        ];
        let view = project(
            &report(ReportStatus::InProgress),
            &[],
            &assignments,
            None,
            Utc::now(),
        );
        assert_eq!(view.coordinator_notes.len(), 2);
        assert_eq!(view.coordinator_notes[0].staff_name, "Budi");
        assert_eq!(view.coordinator_notes[1].staff_name, "Andi");
    }

    #[test]
    fn test_layanan_prefers_sub_layanan() {
        let mut r = report(ReportStatus::Draft);
        r.sub_layanan = Some("Permohonan Data Statistik".to_string());
        let view = project(&r, &[], &[], None, Utc::now());
        assert_eq!(view.layanan, "Permohonan Data Statistik");
    }
}
