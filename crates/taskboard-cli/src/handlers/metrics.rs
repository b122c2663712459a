use chrono::NaiveDate;
use serde::Serialize;
use taskboard_domain::{activity_intensity, MemberMetrics, ProjectId};

use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct ActivityDay {
    date: NaiveDate,
    count: usize,
    intensity: u8,
}

#[derive(Serialize)]
struct ProjectMetrics {
    project: ProjectId,
    today: NaiveDate,
    overdue_includes_completed: bool,
    members: Vec<MemberMetrics>,
    activity: Vec<ActivityDay>,
}

pub async fn handle(
    ctx: &CliContext,
    project: ProjectId,
    today: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let store = ctx.open_board(project).await?;
    let today = ctx.today(today);

    let activity = store
        .activity()
        .into_iter()
        .map(|(date, count)| ActivityDay {
            date,
            count,
            intensity: activity_intensity(count),
        })
        .collect();

    output::output_success(ProjectMetrics {
        project,
        today,
        overdue_includes_completed: store.options().deadline_rules.overdue_includes_completed,
        members: store.member_metrics(today),
        activity,
    });
    Ok(())
}
