//! CLI entry point for confguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and
//! exit codes. All business logic lives in the `confguard-app` crate.
//!
//! Exit codes: 0 = PASS or SOFT_FAIL, 2 = HARD_FAIL, 1 = load or
//! collaborator error (no decision produced).

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use confguard_app::{
    load_policy_source, persist_decision, render_records, run_decide, run_logs,
    serialize_decision, status_exit_code, write_text, DecideInput, DirPolicyStore, PolicyStore,
};
use confguard_audit::{JsonlAuditLog, LogFilter};
use confguard_domain::{ErrorMode, EvalOptions};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "confguard",
    version,
    about = "Config policy decision engine for pipeline definitions"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a config document against a policy set and print the decision.
    Decide {
        /// Owner/organization identifier recorded in the audit trail.
        #[arg(long)]
        owner: String,

        /// Path to the config document (YAML or JSON).
        #[arg(long)]
        config: Utf8PathBuf,

        /// Policy source: a rule file, or a directory whose top-level files
        /// are bundled (non-recursive).
        #[arg(long)]
        policies: Utf8PathBuf,

        /// Project identifier recorded in the audit trail.
        #[arg(long)]
        project_id: Option<String>,

        /// Branch recorded in the audit trail.
        #[arg(long)]
        branch: Option<String>,

        /// Report broken rules without blocking, instead of hard-failing.
        #[arg(long)]
        fail_open: bool,

        /// Append the decision to this JSONL audit log.
        #[arg(long)]
        audit_log: Option<Utf8PathBuf>,

        /// Pretty-print the decision JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Query the audit log. Filters combine with AND; records print oldest
    /// first.
    Logs {
        /// Path to the JSONL audit log.
        #[arg(long)]
        audit_log: Utf8PathBuf,

        /// Only records strictly after this RFC 3339 timestamp.
        #[arg(long)]
        after: Option<String>,

        /// Only records strictly before this RFC 3339 timestamp.
        #[arg(long)]
        before: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        project_id: Option<String>,

        /// Write the records to a file instead of stdout.
        #[arg(long, short)]
        out: Option<Utf8PathBuf>,
    },

    /// Manage stored policies.
    Policy {
        /// Policy store directory.
        #[arg(long)]
        dir: Utf8PathBuf,

        #[command(subcommand)]
        cmd: PolicyCmd,
    },
}

#[derive(Subcommand, Debug)]
enum PolicyCmd {
    /// Store a new policy from a rule file.
    Create {
        name: String,
        #[arg(long)]
        file: Utf8PathBuf,
    },
    /// List stored policies.
    List {
        /// Only list active policies.
        #[arg(long)]
        active: bool,
    },
    /// Print a stored policy's content.
    Get { id: String },
    /// Replace a stored policy's content from a rule file.
    Update {
        id: String,
        #[arg(long)]
        file: Utf8PathBuf,
    },
    /// Remove a stored policy.
    Delete { id: String },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let code = match cli.cmd {
        Commands::Decide {
            owner,
            config,
            policies,
            project_id,
            branch,
            fail_open,
            audit_log,
            pretty,
        } => cmd_decide(
            owner, config, policies, project_id, branch, fail_open, audit_log, pretty,
        )?,
        Commands::Logs {
            audit_log,
            after,
            before,
            branch,
            project_id,
            out,
        } => cmd_logs(audit_log, after, before, branch, project_id, out)?,
        Commands::Policy { dir, cmd } => cmd_policy(dir, cmd)?,
    };
    std::process::exit(code)
}

fn init_tracing() {
    // Errors only when already initialized (e.g. in-process tests).
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init();
}

#[allow(clippy::too_many_arguments)]
fn cmd_decide(
    owner: String,
    config: Utf8PathBuf,
    policies: Utf8PathBuf,
    project_id: Option<String>,
    branch: Option<String>,
    fail_open: bool,
    audit_log: Option<Utf8PathBuf>,
    pretty: bool,
) -> anyhow::Result<i32> {
    let config_text =
        std::fs::read_to_string(&config).with_context(|| format!("read config: {config}"))?;
    let sources = load_policy_source(&policies)?;

    let options = EvalOptions {
        on_rule_error: if fail_open {
            ErrorMode::FailOpen
        } else {
            ErrorMode::FailClosed
        },
    };

    let output = run_decide(DecideInput {
        owner_id: &owner,
        config_text: &config_text,
        policies: &sources,
        project_id,
        branch,
        options,
    })?;

    if let Some(path) = audit_log {
        let log = JsonlAuditLog::new(path);
        persist_decision(&log, &output.record)?;
    }

    println!("{}", serialize_decision(&output.decision, pretty)?);
    Ok(status_exit_code(output.decision.status))
}

fn cmd_logs(
    audit_log: Utf8PathBuf,
    after: Option<String>,
    before: Option<String>,
    branch: Option<String>,
    project_id: Option<String>,
    out: Option<Utf8PathBuf>,
) -> anyhow::Result<i32> {
    let filter = LogFilter {
        after: parse_timestamp(after.as_deref(), "--after")?,
        before: parse_timestamp(before.as_deref(), "--before")?,
        branch,
        project_id,
    };

    let log = JsonlAuditLog::new(audit_log);
    let records = run_logs(&log, &filter)?;
    let rendered = render_records(&records, true)?;

    match out {
        Some(path) => write_text(&path, &rendered)?,
        None => println!("{rendered}"),
    }
    Ok(0)
}

fn cmd_policy(dir: Utf8PathBuf, cmd: PolicyCmd) -> anyhow::Result<i32> {
    let store = DirPolicyStore::new(dir);
    match cmd {
        PolicyCmd::Create { name, file } => {
            let content =
                std::fs::read_to_string(&file).with_context(|| format!("read policy: {file}"))?;
            let summary = store.create(&name, &content)?;
            println!("{}", serde_json::to_string(&summary)?);
        }
        PolicyCmd::List { active } => {
            let summaries = store.list(active)?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        PolicyCmd::Get { id } => {
            print!("{}", store.get(&id)?);
        }
        PolicyCmd::Update { id, file } => {
            let content =
                std::fs::read_to_string(&file).with_context(|| format!("read policy: {file}"))?;
            let summary = store.update(&id, &content)?;
            println!("{}", serde_json::to_string(&summary)?);
        }
        PolicyCmd::Delete { id } => {
            store.delete(&id)?;
            println!("deleted {id}");
        }
    }
    Ok(0)
}

fn parse_timestamp(value: Option<&str>, flag: &str) -> anyhow::Result<Option<OffsetDateTime>> {
    value
        .map(|text| {
            OffsetDateTime::parse(text, &Rfc3339)
                .with_context(|| format!("{flag} expects an RFC 3339 timestamp, got: {text}"))
        })
        .transpose()
}
