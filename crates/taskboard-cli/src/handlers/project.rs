use crate::cli::ProjectAction;
use crate::context::CliContext;
use crate::output;
use taskboard_domain::{BoardApi, Project};

pub async fn handle(ctx: &CliContext, action: ProjectAction) -> anyhow::Result<()> {
    match action {
        ProjectAction::List => {
            let projects = ctx.api().list_projects().await?;
            output::output_list(projects);
        }
        ProjectAction::Create { name } => {
            let name = Project::validate_name(&name)?;
            let project = ctx.api().create_project(&name).await?;
            output::output_success(&project);
        }
        ProjectAction::Rename { id, name } => {
            let update = Project::rename_update(&name)?;
            let project = ctx.api().update_project(id, &update).await?;
            output::output_success(&project);
        }
        ProjectAction::Delete { id } => {
            ctx.api().delete_project(id).await?;
            output::output_success(serde_json::json!({ "deleted": id }));
        }
        ProjectAction::AddMember { id, email } => {
            let mut project = ctx.find_project(id).await?;
            let project = if project.add_member(&email)? {
                ctx.api()
                    .update_project(id, &project.members_update())
                    .await?
            } else {
                project
            };
            output::output_success(&project);
        }
        ProjectAction::RemoveMember { id, email } => {
            let mut project = ctx.find_project(id).await?;
            if !project.remove_member(&email) {
                anyhow::bail!("{} is not a member of project {}", email.trim(), id);
            }
            let project = ctx
                .api()
                .update_project(id, &project.members_update())
                .await?;
            output::output_success(&project);
        }
    }
    Ok(())
}
