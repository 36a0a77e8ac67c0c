use crate::output::print_json;
use anyhow::Context;
use reqtrace_core::{
    id, io,
    scan::{list_commits, CommitInfo},
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Group recent commit subjects by the requirement ids they reference.
/// A subject naming several requirements appears under each of them.
fn group<'a>(
    commits: &'a [CommitInfo],
) -> (BTreeMap<&'a str, Vec<&'a CommitInfo>>, Vec<&'a CommitInfo>) {
    let mut groups: BTreeMap<&str, Vec<&CommitInfo>> = BTreeMap::new();
    let mut unreferenced: Vec<&CommitInfo> = Vec::new();

    for commit in commits {
        let matches = id::recognize(&commit.subject);
        if matches.is_empty() {
            unreferenced.push(commit);
            continue;
        }
        let mut seen: Vec<&str> = Vec::new();
        for m in matches {
            if !seen.contains(&m.id) {
                groups.entry(m.id).or_default().push(commit);
                seen.push(m.id);
            }
        }
    }

    (groups, unreferenced)
}

fn commit_line(commit: &CommitInfo) -> String {
    match &commit.date {
        Some(date) => format!("- `{}` {} ({date})", commit.hash, commit.subject),
        None => format!("- `{}` {}", commit.hash, commit.subject),
    }
}

fn render(commits: &[CommitInfo]) -> String {
    let (groups, unreferenced) = group(commits);

    let mut out = String::new();
    out.push_str("# Requirement Changelog\n\n");
    let _ = writeln!(out, "{} commit(s) inspected.", commits.len());

    for (id, entries) in &groups {
        let _ = writeln!(out, "\n## {id}\n");
        for commit in entries {
            out.push_str(&commit_line(commit));
            out.push('\n');
        }
    }

    if !unreferenced.is_empty() {
        out.push_str("\n## Unreferenced\n\n");
        for commit in &unreferenced {
            out.push_str(&commit_line(commit));
            out.push('\n');
        }
    }

    out
}

pub fn run(root: &Path, limit: usize, output: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let commits = list_commits(root, limit);

    if json {
        let (groups, unreferenced) = group(&commits);
        let as_json = |c: &CommitInfo| {
            serde_json::json!({
                "hash": c.hash,
                "subject": c.subject,
                "date": c.date,
            })
        };
        let requirements: BTreeMap<&str, Vec<serde_json::Value>> = groups
            .iter()
            .map(|(id, entries)| (*id, entries.iter().map(|c| as_json(c)).collect()))
            .collect();
        let value = serde_json::json!({
            "commits": commits.len(),
            "requirements": requirements,
            "unreferenced": unreferenced.iter().map(|c| as_json(c)).collect::<Vec<_>>(),
        });
        return print_json(&value);
    }

    if commits.is_empty() {
        println!("No commits found (not a git repository, or empty history).");
        return Ok(());
    }

    let rendered = render(&commits);
    match output {
        Some(path) => {
            io::atomic_write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote: {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
