use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use race_standings::config::Config;
use race_standings::feed::{self, FeedSource};
use race_standings::logging;
use race_standings::ordering::SortState;
use race_standings::parse::Field;
use race_standings::render::{PlanEntry, RenderPlan};
use race_standings::standings::run_pipeline;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_stderr()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = Config::from_env();
    if let Some(path) = arg_value(&args, "--file") {
        config.source = FeedSource::File {
            path: PathBuf::from(path),
        };
    } else if let Some(url) = arg_value(&args, "--url") {
        config.source = FeedSource::Http { url };
    } else if has_flag(&args, "--demo") {
        config.source = FeedSource::Demo;
    }

    let mut sort = SortState::automatic();
    if let Some(raw) = arg_value(&args, "--sort") {
        let field = Field::from_column_arg(&raw)
            .with_context(|| format!("unknown sort column: {raw}"))?;
        sort = sort.apply_click(field.table_index());
        if has_flag(&args, "--desc") {
            sort = sort.apply_click(field.table_index());
        }
    }

    info!(source = %config.source.describe(), sort = %sort.label(), "fetching standings");
    let text = feed::fetch_once(&config.source, config.request_timeout)?;
    let plan = run_pipeline(&text, &sort).context("feed rejected")?;

    if has_flag(&args, "--json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("serialize render plan")?
        );
    } else {
        print!("{}", plan_text(&plan));
    }
    Ok(())
}

fn plan_text(plan: &RenderPlan) -> String {
    const WIDTHS: [usize; 10] = [20, 12, 4, 9, 5, 4, 9, 9, 9, 6];

    let mut out = String::new();
    for (field, width) in Field::ALL.iter().zip(WIDTHS) {
        out.push_str(&format!("{:<width$} ", field.header()));
    }
    out.push('\n');

    for entry in &plan.entries {
        match entry {
            PlanEntry::GroupHeader { display_name, .. } => {
                out.push_str(&format!("== {display_name} ==\n"));
            }
            PlanEntry::Row(row) => {
                for ((field, text), width) in Field::ALL.iter().zip(&row.cells).zip(WIDTHS) {
                    let text = match (field, row.class_icon) {
                        (Field::Class, Some(icon)) => format!("{icon}{text}"),
                        _ => text.clone(),
                    };
                    out.push_str(&format!("{text:<width$} "));
                }
                if row.leader {
                    out.push('*');
                }
                out.push('\n');
            }
        }
    }
    out
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}
