use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use reqtrace_core::{
    config::Config,
    io,
    matrix::TraceMatrix,
    report,
    store::{self, MatrixStore},
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum MatrixSubcommand {
    /// List stored matrix files
    List {
        /// Only names starting with this prefix
        prefix: Option<String>,
    },

    /// Show a stored matrix
    Show {
        /// Matrix file name or feature id
        name: String,
    },

    /// Delete a stored matrix file
    Delete {
        /// Exact matrix file name
        name: String,
    },

    /// Merge two stored matrices
    Merge {
        /// First matrix (kept order wins on duplicates)
        a: String,
        /// Second matrix (its version wins)
        b: String,
        /// Save the merged matrix under this feature id
        #[arg(long)]
        into: Option<String>,
    },

    /// Export a stored matrix as Markdown or JSON
    Export {
        /// Matrix file name or feature id
        name: String,
        /// Output format: markdown or json
        #[arg(long, default_value = "markdown")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: MatrixSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = MatrixStore::new(config.storage_dir(root));

    match subcmd {
        MatrixSubcommand::List { prefix } => list(&store, prefix.as_deref(), json),
        MatrixSubcommand::Show { name } => show(&store, &name, json),
        MatrixSubcommand::Delete { name } => delete(&store, &name),
        MatrixSubcommand::Merge { a, b, into } => merge(&store, &a, &b, into.as_deref(), json),
        MatrixSubcommand::Export {
            name,
            format,
            output,
        } => export(&store, &name, &format, output.as_deref()),
    }
}

fn load_required(store: &MatrixStore, name: &str) -> anyhow::Result<TraceMatrix> {
    store
        .load(name)
        .context("failed to load matrix")?
        .with_context(|| format!("no stored matrix matches '{name}'"))
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(store: &MatrixStore, prefix: Option<&str>, json: bool) -> anyhow::Result<()> {
    let names = store.list(prefix);

    if json {
        return print_json(&names);
    }

    if names.is_empty() {
        println!("No stored matrices in {}.", store.dir().display());
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(store: &MatrixStore, name: &str, json: bool) -> anyhow::Result<()> {
    let matrix = load_required(store, name)?;

    if json {
        return print_json(&matrix);
    }

    println!(
        "Version {} — generated {}",
        matrix.version,
        matrix.generated_at.format("%Y-%m-%d %H:%M UTC"),
    );
    println!(
        "Requirements: {} total, {} fully linked, {} gap(s), coverage {}%",
        matrix.summary.total_requirements,
        matrix.summary.fully_linked,
        matrix.summary.gaps,
        matrix.summary.coverage_percentage,
    );

    if matrix.requirements.is_empty() {
        return Ok(());
    }

    println!();
    let rows: Vec<Vec<String>> = matrix
        .requirements
        .iter()
        .map(|(id, bucket)| {
            vec![
                id.clone(),
                bucket.design.len().to_string(),
                bucket.code.len().to_string(),
                bucket.tests.len().to_string(),
                bucket.commits.len().to_string(),
            ]
        })
        .collect();
    print_table(&["REQUIREMENT", "DESIGN", "CODE", "TESTS", "COMMITS"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

fn delete(store: &MatrixStore, name: &str) -> anyhow::Result<()> {
    store
        .delete(name)
        .with_context(|| format!("failed to delete '{name}'"))?;
    println!("Deleted: {name}");
    Ok(())
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

fn merge(
    store: &MatrixStore,
    a: &str,
    b: &str,
    into: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let left = load_required(store, a)?;
    let right = load_required(store, b)?;
    let merged = store::merge(&left, &right);

    if let Some(feature_id) = into {
        let path = store
            .save(feature_id, &merged)
            .context("failed to save merged matrix")?;
        if json {
            let value = serde_json::json!({
                "feature": feature_id,
                "path": path,
                "summary": merged.summary,
            });
            return print_json(&value);
        }
        println!(
            "Merged {} + {} -> {} ({} requirement(s))",
            a,
            b,
            path.display(),
            merged.summary.total_requirements,
        );
        return Ok(());
    }

    // Dry run: report what the merge would contain.
    if json {
        return print_json(&merged);
    }
    println!(
        "Merge of {} + {}: {} requirement(s), {} fully linked, coverage {}%",
        a,
        b,
        merged.summary.total_requirements,
        merged.summary.fully_linked,
        merged.summary.coverage_percentage,
    );
    println!("(dry run — pass --into <feature-id> to save)");
    Ok(())
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

fn export(
    store: &MatrixStore,
    name: &str,
    format: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let matrix = load_required(store, name)?;

    let rendered = match format {
        "markdown" | "md" => report::to_markdown(&matrix),
        "json" => report::to_json(&matrix).context("failed to render JSON")?,
        other => anyhow::bail!("unknown format '{}'; supported formats: markdown, json", other),
    };

    match output {
        Some(path) => {
            io::atomic_write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote: {}", path.display());
        }
        None => {
            // Markdown ends with its own newline; pretty JSON does not.
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
