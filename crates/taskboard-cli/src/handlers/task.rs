use crate::cli::{TaskAction, TaskCreateArgs, TaskListArgs, TaskUpdateArgs};
use crate::context::{confirmed, CliContext};
use crate::output;
use taskboard_domain::{FieldUpdate, Task, TaskFilters, TaskUpdate};

pub async fn handle(ctx: &CliContext, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::List(args) => handle_list(ctx, args).await?,
        TaskAction::Create(args) => handle_create(ctx, args).await?,
        TaskAction::Update(args) => handle_update(ctx, args).await?,
        TaskAction::Move {
            project,
            id,
            column,
            position,
        } => {
            let store = ctx.open_board(project).await?;
            let position = match position {
                Some(position) => position,
                // Appending after itself when it already sits in the column.
                None => {
                    let len = store.tasks(column).len();
                    match store.snapshot().locate(id) {
                        Some((current, _)) if current == column => len.saturating_sub(1),
                        _ => len,
                    }
                }
            };
            let outcome = store.move_task_to(id, column, position).await?;
            output::output_success(confirmed(store.task(id), outcome)?);
        }
        TaskAction::Delete { project, id } => {
            let store = ctx.open_board(project).await?;
            let outcome = store.delete_task(id).await?;
            output::output_success(confirmed(serde_json::json!({ "deleted": id }), outcome)?);
        }
    }
    Ok(())
}

async fn handle_list(ctx: &CliContext, args: TaskListArgs) -> anyhow::Result<()> {
    let store = ctx.open_board(args.project).await?;
    let filters = TaskFilters {
        query: args.query,
        created_from: args.from,
        created_to: args.to,
        completion: args.completion,
        deadline: args.deadline,
    };
    let today = ctx.today(args.today);

    let columns: Vec<_> = match args.column {
        Some(column) => vec![column],
        None => store.columns().iter().map(|c| c.id).collect(),
    };
    let tasks: Vec<Task> = columns
        .into_iter()
        .flat_map(|column| store.filtered_tasks(column, &filters, today))
        .collect();
    output::output_list(tasks);
    Ok(())
}

async fn handle_create(ctx: &CliContext, args: TaskCreateArgs) -> anyhow::Result<()> {
    let store = ctx.open_board(args.project).await?;
    let (task, outcome) = store
        .add_task(args.column, &args.title, &args.description)
        .await?;
    output::output_success(confirmed(task, outcome)?);
    Ok(())
}

async fn handle_update(ctx: &CliContext, args: TaskUpdateArgs) -> anyhow::Result<()> {
    let deadline = if args.clear_deadline {
        FieldUpdate::Clear
    } else {
        FieldUpdate::from(args.deadline)
    };
    let update = TaskUpdate {
        title: args.title,
        description: args.description,
        completed: args.completed,
        deadline,
    };

    let store = ctx.open_board(args.project).await?;
    let outcome = store.update_task(args.id, update).await?;
    output::output_success(confirmed(store.task(args.id), outcome)?);
    Ok(())
}
