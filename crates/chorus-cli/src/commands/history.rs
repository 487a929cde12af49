use crate::cli::root_commands::HistoryArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::window::parse_window;
use crate::context::AppContext;
use crate::output::csv::{EVENT_HEADERS, event_rows, events_to_csv};
use crate::output::{render, table};

/// Handle `chorus history`.
pub async fn handle(args: &HistoryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let format = flags.format_or(ctx.config.history.default_format);
    let rendered = run(args, ctx, format).await?;
    println!("{}", rendered.trim_end());
    Ok(())
}

pub async fn run(args: &HistoryArgs, ctx: &AppContext, format: OutputFormat) -> anyhow::Result<String> {
    let window = parse_window(args.from.as_deref(), args.to.as_deref())?;
    let events = ctx.service.reconstruct_history(args.user, &window).await?;

    match format {
        OutputFormat::Csv => events_to_csv(&events),
        OutputFormat::Table if events.is_empty() => Ok(String::from("(no events)")),
        OutputFormat::Table => Ok(table::render_entity_table(
            &EVENT_HEADERS,
            &event_rows(&events),
            table::TableOptions::from_env(),
        )),
        OutputFormat::Json => render(&events, format),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_context;

    fn args(user: i64) -> HistoryArgs {
        HistoryArgs {
            user,
            from: None,
            to: None,
        }
    }

    #[tokio::test]
    async fn csv_lists_signup_and_playlist() {
        let ctx = test_context().await;
        let user = ctx.service.create_user("ana", "ana@example.com").await.unwrap();
        ctx.service.create_playlist(user.id, "Favs").await.unwrap();

        let out = run(&args(user.id), &ctx, OutputFormat::Csv).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "event_date_time,description");
        assert!(lines[1].ends_with(",Signed up"));
        assert!(lines[2].ends_with(",Created playlist 'Favs'"));
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn json_uses_event_date_time_key() {
        let ctx = test_context().await;
        let user = ctx.service.create_user("ana", "ana@example.com").await.unwrap();

        let out = run(&args(user.id), &ctx, OutputFormat::Json).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["description"], "Signed up");
        assert!(parsed[0]["event_date_time"].is_string());
    }

    #[tokio::test]
    async fn unknown_user_is_an_error() {
        let ctx = test_context().await;
        assert!(run(&args(42), &ctx, OutputFormat::Table).await.is_err());
    }
}
