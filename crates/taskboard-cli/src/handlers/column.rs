use crate::cli::ColumnAction;
use crate::context::{confirmed, CliContext};
use crate::output;

pub async fn handle(ctx: &CliContext, action: ColumnAction) -> anyhow::Result<()> {
    match action {
        ColumnAction::List { project } => {
            let store = ctx.open_board(project).await?;
            output::output_list(store.columns());
        }
        ColumnAction::Create { project, name } => {
            let store = ctx.open_board(project).await?;
            let (column, outcome) = store.add_column(&name).await?;
            output::output_success(confirmed(column, outcome)?);
        }
        ColumnAction::Rename { project, id, name } => {
            let store = ctx.open_board(project).await?;
            let outcome = store.rename_column(id, &name).await?;
            let column = store.snapshot().column(id).cloned();
            output::output_success(confirmed(column, outcome)?);
        }
        ColumnAction::Delete { project, id } => {
            let store = ctx.open_board(project).await?;
            let outcome = store.delete_column(id).await?;
            output::output_success(confirmed(serde_json::json!({ "deleted": id }), outcome)?);
        }
    }
    Ok(())
}
