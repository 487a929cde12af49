use chorus_core::audit::{AuditRecord, Polarity};
use chorus_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse::parse_enum;
use crate::commands::shared::window::parse_window;
use crate::context::AppContext;
use crate::output::output;

/// Handle `chorus audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let records = fetch(args, ctx).await?;
    output(&records, flags.format_or(ctx.config.history.default_format))
}

pub async fn fetch(args: &AuditArgs, ctx: &AppContext) -> anyhow::Result<Vec<AuditRecord>> {
    let filter = AuditFilter {
        table: args.table.clone(),
        record_id: args.record,
        column: args.column.clone(),
        polarity: args
            .polarity
            .as_deref()
            .map(|value| parse_enum::<Polarity>(value, "polarity"))
            .transpose()?,
        value: None,
        window: parse_window(args.from.as_deref(), args.to.as_deref())?,
        limit: args.limit,
    };

    ctx.service.query_audit(&filter).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_context;

    fn args() -> AuditArgs {
        AuditArgs {
            table: None,
            record: None,
            column: None,
            polarity: None,
            from: None,
            to: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn filters_by_table_record_and_polarity() {
        let ctx = test_context().await;
        let user = ctx.service.create_user("ana", "ana@example.com").await.unwrap();
        let playlist = ctx.service.create_playlist(user.id, "Favs").await.unwrap();
        ctx.service.rename_playlist(playlist.id, "Best").await.unwrap();

        let all = fetch(
            &AuditArgs {
                table: Some("playlist".to_string()),
                record: Some(playlist.id),
                ..args()
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 4);

        let updates = fetch(
            &AuditArgs {
                table: Some("playlist".to_string()),
                polarity: Some("update".to_string()),
                ..args()
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].column_name, "title");
        assert_eq!(updates[0].new_value.as_deref(), Some("Best"));
    }

    #[tokio::test]
    async fn limit_caps_rows() {
        let ctx = test_context().await;
        ctx.service.create_user("ana", "ana@example.com").await.unwrap();
        let rows = fetch(
            &AuditArgs {
                limit: Some(2),
                ..args()
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn bad_polarity_is_rejected() {
        let ctx = test_context().await;
        let bad = AuditArgs {
            polarity: Some("insert".to_string()),
            ..args()
        };
        assert!(fetch(&bad, &ctx).await.is_err());
    }
}
