//! `kura review` command - interactive duplicate review
//!
//! Presents one candidate group at a time and drives the session state
//! machine with a closed command set:
//!
//! ```text
//! merge [id] [: rationale]   collapse into canonical (default: oldest)
//! update <body>              edit the canonical after a merge
//! keep [: rationale]         record keep-separate
//! reject [: rationale]       reject the whole group
//! diff                       show full bodies side by side
//! split a,b / c,d            break a community into sub-groups
//! quit                       checkpoint and leave
//! ```
//!
//! Sessions are resumable: quitting saves the cursor, and re-running
//! the same bucket picks up where it left off.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use crate::config::Config;
use crate::core::graph::GraphBuilder;
use crate::core::item::Item;
use crate::core::policy::{route, Bucket};
use crate::core::session::{ReviewCommand, ReviewSession, ReviewSubject, StepOutcome};
use crate::core::storage::{Storage, StoredVectorProvider};
use crate::core::triad::detect_triads;

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Similarity tier to review (high, medium, low)
    #[arg(short, long, default_value = "high")]
    pub bucket: Bucket,

    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Include deferred groups from the manual-review queue
    #[arg(long)]
    pub queued: bool,
}

pub fn run(args: ReviewArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;

    let queue = build_queue(&storage, &config, &args)?;
    if queue.is_empty() {
        println!("✅ Nothing to review in the {} bucket", args.bucket);
        return Ok(());
    }

    let session_id = match &args.category {
        Some(c) => format!("review-{}-{}", args.bucket, c),
        None => format!("review-{}", args.bucket),
    };
    let mut session = ReviewSession::open(&storage, &session_id, args.bucket, queue)?;

    println!(
        "📋 Reviewing {} candidate group(s) in the {} bucket\n",
        session.state().remaining(),
        args.bucket
    );

    while let Some(subject) = session.current().cloned() {
        render_subject(&storage, &subject)?;

        let line: String = Input::new()
            .with_prompt("(merge/update/keep/reject/diff/split/quit)")
            .interact_text()?;

        let command = match ReviewCommand::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{} {}", "✗".red(), e);
                continue;
            }
        };

        if matches!(command, ReviewCommand::Reject { .. }) {
            let confirmed = Confirm::new()
                .with_prompt("Reject every item in this group?")
                .default(false)
                .interact()?;
            if !confirmed {
                continue;
            }
        }

        match session.handle(command)? {
            StepOutcome::Applied(action) => {
                println!("{} {}\n", "✓".green(), action);
            }
            StepOutcome::Rendered(items) => {
                render_diff(&items);
            }
            StepOutcome::Quit => {
                println!("💾 Session saved; run the same command to resume");
                return Ok(());
            }
            StepOutcome::Done => break,
        }
    }

    let reviewed = session.state().queue.len();
    session.finish()?;
    println!("✅ Review complete ({} group(s))", reviewed);

    Ok(())
}

/// Assemble the review queue: bucket-routed edges first (descending
/// score), then drift triads, then deferred groups when requested
fn build_queue(
    storage: &Storage,
    config: &Config,
    args: &ReviewArgs,
) -> Result<Vec<ReviewSubject>> {
    let provider = StoredVectorProvider::new(storage)?;
    let mut builder = GraphBuilder::new(&provider, None, config);

    let categories = match &args.category {
        Some(c) => vec![c.clone()],
        None => storage.categories()?,
    };

    let mut queue = Vec::new();
    for category in &categories {
        let items = storage.active_items(category)?;
        if items.len() < 2 {
            continue;
        }
        let graph = builder.build(category, &items)?;

        for edge in graph.edges_at_or_above(config.thresholds.low_bucket) {
            if route(edge.blended_score, &config.thresholds).bucket() == Some(args.bucket) {
                queue.push(ReviewSubject::Pair {
                    a: edge.a,
                    b: edge.b,
                    score: edge.blended_score,
                });
            }
        }

        if args.bucket == Bucket::High {
            for triad in detect_triads(&graph, config.thresholds.high_bucket) {
                queue.push(ReviewSubject::Triad { triad });
            }
        }
    }

    if args.queued {
        for entry in storage.list_manual_review()? {
            if let Some(c) = &args.category {
                if &entry.category != c {
                    continue;
                }
            }
            queue.push(ReviewSubject::Community {
                members: entry.members,
                avg_similarity: 0.0,
                queue_entry: Some(entry.id),
            });
        }
    }

    Ok(queue)
}

fn render_subject(storage: &Storage, subject: &ReviewSubject) -> Result<()> {
    match subject {
        ReviewSubject::Pair { a, b, score } => {
            println!("{} (score {:.2})", "── Candidate pair ──".bold(), score);
            print_item(storage, a)?;
            print_item(storage, b)?;
        }
        ReviewSubject::Community {
            members,
            avg_similarity,
            ..
        } => {
            println!(
                "{} ({} items, avg {:.2})",
                "── Candidate community ──".bold(),
                members.len(),
                avg_similarity
            );
            for id in members {
                print_item(storage, id)?;
            }
        }
        ReviewSubject::Triad { triad } => {
            println!(
                "{} (high {:.2}/{:.2}, low {:.2})",
                "── Drift triad ──".bold(),
                triad.close_score,
                triad.other_score,
                triad.distant_score
            );
            for id in &triad.members {
                print_item(storage, id)?;
            }
        }
    }
    Ok(())
}

fn print_item(storage: &Storage, id: &ulid::Ulid) -> Result<()> {
    match storage.get_item(id)? {
        Some(item) => {
            let first_line = item.body.lines().next().unwrap_or("");
            let preview: String = first_line.chars().take(70).collect();
            // Full id shown so it can be pasted into `merge <id>`
            println!("  {} {}", item.id.to_string().cyan(), item.title);
            println!("    {}", preview.dimmed());
        }
        None => println!("  {} (missing)", id),
    }
    Ok(())
}

fn render_diff(items: &[Item]) {
    for item in items {
        println!("\n{} {}", "───".dimmed(), item.kura_id().bold());
        println!("{}", item.body);
    }
    println!();
}
