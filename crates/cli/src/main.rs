//! FairLens - Performance Review Auditor

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::report::{render_flags, render_histogram, render_privacy, render_reviews, render_summary};
use cli::{init_logging, report_upload_error, AppConfig, Session};
use fairness::{GroupBy, MeetsThreshold};
use review_model::{Gender, ReviewSubmission, Role};
use rule_engine::{evaluate, FlagMatch};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fairlens", version, about = "Flag vague or biased review language and check rating fairness")]
struct Args {
    /// Configuration file (defaults to ./fairlens.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Review CSV to load into the session instead of the demonstration data
    #[arg(long, global = true)]
    reviews: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the reviews in the session
    Reviews,
    /// Flag every comment and count flags per category
    Audit,
    /// Group summaries, mean gap and adverse-impact ratio
    Fairness {
        /// Attribute to compare: gender or role
        #[arg(long, default_value = "gender")]
        group_by: GroupBy,
        /// Meets/exceeds threshold on the overall rating (1.0-5.0, steps of 0.5)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Flag a single comment
    Check {
        /// Demographic attribute of the reviewee
        #[arg(long, default_value = "")]
        gender: String,
        comment: String,
    },
    /// Add one review to the session, show its flags and export the table
    Submit {
        /// Anonymized employee ID, e.g. E011
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "Other")]
        role: String,
        #[arg(long, default_value = "Non-binary/Other")]
        gender: String,
        #[arg(long, default_value_t = 3)]
        kpi: i64,
        #[arg(long, default_value_t = 3)]
        competency: i64,
        #[arg(long, default_value_t = 3)]
        initiative: i64,
        #[arg(long, default_value_t = 3)]
        overall: i64,
        #[arg(long, default_value = "")]
        comment: String,
        /// Where to write the updated table
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the review table as CSV
    ExportReviews {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a timestamped flags snapshot as CSV
    ExportFlags {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show the privacy and governance statement
    Privacy,
}

fn print_matches(matches: &[FlagMatch], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
    } else if matches.is_empty() {
        println!("No flags detected by current rules.");
    } else {
        for m in matches {
            println!("{:<14} {}", m.category, m.phrase);
            if !m.tip.is_empty() {
                println!("{:>14} tip: {}", "", m.tip);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== FairLens v{} ===", env!("CARGO_PKG_VERSION"));

    let mut session = Session::start(config);
    if let Some(banner) = session.rules_banner() {
        eprintln!("{banner}");
    }
    if let Some(path) = &args.reviews {
        match session.upload(path) {
            Ok(rows) => eprintln!("Uploaded CSV loaded into session ({rows} reviews)."),
            Err(e) => eprintln!("{}", report_upload_error(path, &e)),
        }
    }

    match args.command {
        Command::Reviews => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(session.reviews.records())?);
            } else {
                print!("{}", render_reviews(&session.reviews));
            }
        }
        Command::Audit => {
            let report = session.audit();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_flags(&report.flags));
                println!();
                print!("{}", render_histogram(&report.histogram));
            }
        }
        Command::Fairness { group_by, threshold } => {
            let threshold = match threshold {
                Some(value) => MeetsThreshold::new(value)?,
                None => session.config.meets_threshold()?,
            };
            let summary = session.fairness(group_by, threshold);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render_summary(&summary, &session.config.fairness()));
            }
        }
        Command::Check { gender, comment } => {
            let matches = evaluate(&comment, &gender, session.rules.rules());
            print_matches(&matches, args.json)?;
        }
        Command::Submit {
            id,
            role,
            gender,
            kpi,
            competency,
            initiative,
            overall,
            comment,
            out,
        } => {
            let submission = ReviewSubmission {
                employee_id: id,
                role: Role::from_label(&role).unwrap_or(Role::Other),
                gender: Gender::from_label(&gender).unwrap_or(Gender::NonBinaryOther),
                kpi_rating: kpi,
                competency_rating: competency,
                initiative_rating: initiative,
                overall_rating: overall,
                comment,
            };
            let flags = session.submit(submission)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&flags)?);
            } else {
                print!("{}", render_flags(&flags));
            }
            let path = session.export_reviews(out.as_deref())?;
            eprintln!("Saved review; session table written to {}", path.display());
        }
        Command::ExportReviews { out } => {
            let path = session.export_reviews(out.as_deref())?;
            println!("{}", path.display());
        }
        Command::ExportFlags { out_dir } => match session.export_flags(&out_dir)? {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("No flags detected by current rules; nothing to export."),
        },
        Command::Privacy => print!("{}", render_privacy(session.rules.version())),
    }

    Ok(())
}
