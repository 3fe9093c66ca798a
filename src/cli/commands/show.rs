use super::Workspace;
use crate::cli::output::Output;
use crate::errors::Result;
use crate::stack::Reporter;
use console::style;

pub async fn show() -> Result<()> {
    let workspace = Workspace::open()?;
    let lines = Reporter::new(workspace.context()).show()?;

    for line in &lines {
        Output::stack_line(line, workspace.settings.display.show_commit_counts);
    }

    let missing: Vec<&str> = lines
        .iter()
        .filter(|l| l.missing)
        .map(|l| l.name.as_str())
        .collect();
    if !missing.is_empty() {
        Output::warning(format!("Missing branches: {}", missing.join(", ")));
    }
    if !lines.iter().any(|l| l.is_current) {
        Output::info("The checked-out branch is not part of the stack");
    }
    Ok(())
}

pub async fn diff(patch: Option<String>) -> Result<()> {
    let workspace = Workspace::open()?;
    let diff = Reporter::new(workspace.context()).diff(patch.as_deref())?;

    if diff.text.is_empty() {
        Output::info(format!("'{}' has no changes over its parent", diff.patch));
    } else {
        print!("{}", diff.text);
    }
    Ok(())
}

pub async fn log(patch: Option<String>) -> Result<()> {
    let workspace = Workspace::open()?;
    let commits = Reporter::new(workspace.context()).log(patch.as_deref())?;
    let limit = workspace.settings.display.log_limit;

    if commits.is_empty() {
        Output::info("No commits over the parent");
        return Ok(());
    }

    for commit in commits.iter().take(limit) {
        println!(
            "{} {} {}",
            style(commit.short_id()).yellow(),
            commit.summary,
            style(format!("<{}>", commit.author)).dim()
        );
    }
    if commits.len() > limit {
        Output::sub_item(format!("... {} more", commits.len() - limit));
    }
    Ok(())
}
