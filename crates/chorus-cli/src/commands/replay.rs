use chorus_core::replay::{Lifecycle, ReplayedEntity};
use serde::Serialize;

use crate::cli::root_commands::ReplayArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

/// One column of a replayed row, flattened for table and csv output.
#[derive(Debug, Serialize)]
struct FieldRow<'a> {
    column: &'a str,
    current: Option<&'a str>,
    last_known: &'a str,
    lifecycle: Lifecycle,
}

/// Handle `chorus replay`.
pub async fn handle(args: &ReplayArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entity = fetch(args, ctx).await?;
    match flags.format_or(ctx.config.history.default_format) {
        OutputFormat::Json => output(&entity, OutputFormat::Json),
        format => output(&field_rows(&entity), format),
    }
}

pub async fn fetch(args: &ReplayArgs, ctx: &AppContext) -> anyhow::Result<ReplayedEntity> {
    ctx.service
        .replay(&args.table, args.record)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no audit records for {} {}", args.table, args.record))
}

fn field_rows(entity: &ReplayedEntity) -> Vec<FieldRow<'_>> {
    entity
        .last_known
        .iter()
        .map(|(column, last)| FieldRow {
            column: column.as_str(),
            current: entity.fields.get(column).map(String::as_str),
            last_known: last.as_str(),
            lifecycle: entity.lifecycle,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_context;
    use crate::output::render;

    #[tokio::test]
    async fn deleted_playlist_keeps_last_known_title() {
        let ctx = test_context().await;
        let user = ctx.service.create_user("ana", "ana@example.com").await.unwrap();
        let playlist = ctx.service.create_playlist(user.id, "Favs").await.unwrap();
        ctx.service.delete_playlist(playlist.id).await.unwrap();

        let entity = fetch(
            &ReplayArgs {
                table: "playlist".to_string(),
                record: playlist.id,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(entity.lifecycle, Lifecycle::Deleted);

        let csv = render(&field_rows(&entity), OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("column,current,last_known,lifecycle\n"));
        assert!(csv.contains("title,null,Favs,deleted"));
    }

    #[tokio::test]
    async fn unknown_row_is_an_error() {
        let ctx = test_context().await;
        let missing = ReplayArgs {
            table: "song".to_string(),
            record: 1,
        };
        assert!(fetch(&missing, &ctx).await.is_err());
    }
}
