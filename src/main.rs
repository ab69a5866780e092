mod classifier;
mod db;
mod ingest;

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caddy", about = "Syllabus extraction pipeline: deadlines, policies, textbooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,
    /// Load extracted syllabus text (.txt file or directory) into the queue
    Ingest {
        path: PathBuf,
        /// Max files to ingest (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Classify ingested documents into deadlines, policies, textbooks
    Process {
        /// Max documents to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Reference date for year inference (YYYY-MM-DD, default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Ingest + process in one pipeline
    Run {
        path: PathBuf,
        /// Max files to ingest+process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Reference date for year inference (YYYY-MM-DD, default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Per-document extraction overview table
    Overview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Dated deadlines across all documents, soonest first
    Schedule {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Deadlines with no parseable date (need human review)
    Review {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Dump one document's extraction as JSON
    Export {
        /// Document id (see overview)
        id: i64,
    },
    /// Show pipeline statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            println!("Schema ready.");
            Ok(())
        }
        Commands::Ingest { path, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let stats = ingest::ingest_path(&conn, &path, limit)?;
            println!(
                "Ingested {} of {} files ({} skipped).",
                stats.added, stats.total, stats.skipped
            );
            Ok(())
        }
        Commands::Process { limit, as_of } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let docs = db::fetch_unprocessed(&conn, limit)?;
            if docs.is_empty() {
                println!("No unprocessed documents. Run 'ingest' first.");
                return Ok(());
            }
            println!("Processing {} documents...", docs.len());
            let counts = process_documents(&conn, &docs, resolve_as_of(as_of))?;
            counts.print();
            Ok(())
        }
        Commands::Run { path, limit, as_of } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            // Phase 1: Ingest
            let stats = ingest::ingest_path(&conn, &path, limit)?;
            println!(
                "Ingested {} of {} files ({} skipped).",
                stats.added, stats.total, stats.skipped
            );

            // Phase 2: Process
            let docs = db::fetch_unprocessed(&conn, None)?;
            if docs.is_empty() {
                println!("Nothing to process.");
                return Ok(());
            }
            println!("Processing {} documents...", docs.len());
            let counts = process_documents(&conn, &docs, resolve_as_of(as_of))?;
            counts.print();
            Ok(())
        }
        Commands::Overview { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, limit)?;
            if rows.is_empty() {
                println!("No documents found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<32} | {:>7} | {:<9} | {:>9} | {:>8} | {:>9} | {:>6}",
                "id", "Document", "Chars", "Status", "Deadlines", "Policies", "Textbooks", "Review"
            );
            println!("{}", "-".repeat(105));
            for r in &rows {
                let status = if r.processed { "processed" } else { "pending" };
                println!(
                    "{:>3} | {:<32} | {:>7} | {:<9} | {:>9} | {:>8} | {:>9} | {:>6}",
                    r.id,
                    truncate(&r.filename, 32),
                    r.char_len,
                    status,
                    r.deadline_count,
                    r.policy_count,
                    r.textbook_count,
                    r.undated_count,
                );
            }
            println!("\n{} documents | 'Review' = deadlines without a parsed date", rows.len());
            Ok(())
        }
        Commands::Schedule { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_schedule(&conn, limit)?;
            if rows.is_empty() {
                println!("No dated deadlines. Run 'process' first, or see 'review'.");
                return Ok(());
            }

            for r in &rows {
                // Stored RFC 3339; the date part is all the table needs.
                let day = r.due_at.split('T').next().unwrap_or(&r.due_at);
                println!("{} | {:<48} | {}", day, truncate(&r.title, 48), r.filename);
            }

            let stats = db::get_stats(&conn)?;
            if stats.undated > 0 {
                println!("\n{} deadlines without dates (see 'review').", stats.undated);
            }
            Ok(())
        }
        Commands::Review { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_needs_review(&conn, limit)?;
            if rows.is_empty() {
                println!("Nothing needs review.");
                return Ok(());
            }

            for r in &rows {
                println!("{:<32} | {}", truncate(&r.filename, 32), truncate(&r.title, 56));
                println!("{:<32} |   \"{}\"", "", truncate(&r.source_text, 72));
            }
            println!("\n{} deadlines need a date confirmed by hand.", rows.len());
            Ok(())
        }
        Commands::Export { id } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let (filename, extraction) = db::fetch_extraction(&conn, id)?;
            let doc = serde_json::json!({
                "document": filename,
                "deadlines": extraction.deadlines,
                "policies": extraction.policies,
                "textbooks": extraction.textbooks,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Documents:   {}", s.documents);
            println!("Processed:   {}", s.processed);
            println!("Unprocessed: {}", s.unprocessed);
            println!("Deadlines:   {} ({} without dates)", s.deadlines, s.undated);
            println!("Policies:    {}", s.policies);
            println!("Textbooks:   {}", s.textbooks);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}

struct ProcessCounts {
    documents: usize,
    deadlines: usize,
    undated: usize,
    policies: usize,
    textbooks: usize,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} deadlines ({} need review), {} policies, {} textbooks from {} documents.",
            self.deadlines, self.undated, self.policies, self.textbooks, self.documents,
        );
    }
}

fn process_documents(
    conn: &rusqlite::Connection,
    docs: &[db::PendingDocument],
    as_of: NaiveDate,
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts {
        documents: 0,
        deadlines: 0,
        undated: 0,
        policies: 0,
        textbooks: 0,
    };

    for chunk in docs.chunks(500) {
        let batch: Vec<(i64, classifier::Extraction)> = chunk
            .par_iter()
            .map(|doc| (doc.id, classifier::classify(&doc.raw_text, as_of)))
            .collect();

        for (_, extraction) in &batch {
            counts.documents += 1;
            counts.deadlines += extraction.deadlines.len();
            counts.undated += extraction.deadlines.iter().filter(|d| d.needs_review()).count();
            counts.policies += extraction.policies.len();
            counts.textbooks += extraction.textbooks.len();
        }

        db::save_extractions(conn, &batch)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
