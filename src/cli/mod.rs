// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all operator interaction. clap parses the
// arguments, this module wires collaborators together and
// hands over to the review shell or to a use case.
//
//   extract — HTTP backend for extraction and mirroring
//   open    — snapshot directory as the mirror
//   export  — no session, just the export use case

pub mod commands;
pub mod shell;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use crate::application::export_use_case::ExportUseCase;
use crate::application::review_use_case::ReviewSession;
use crate::infra::http_backend::HttpBackend;
use crate::infra::snapshot::SnapshotStore;
use commands::{Commands, ExportArgs, ExtractArgs, OpenArgs};
use shell::{read_pdf, ReviewShell};

#[derive(Parser, Debug)]
#[command(
    name = "exercise-review",
    version,
    about = "Review extracted math exercises, attach their figures and export a clean JSON dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Extract(args) => run_extract(args),
            Commands::Open(args)    => run_open(args),
            Commands::Export(args)  => run_export(args),
        }
    }
}

fn run_shell(mut shell: ReviewShell) -> Result<()> {
    let stdin  = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)
}

/// Extract the PDF, then open the shell even if extraction
/// failed so the operator can fix the cause and retry.
fn run_extract(args: ExtractArgs) -> Result<()> {
    let cfg = args.backend.into_config()?;
    tracing::info!("Using extraction backend at {}", cfg.api_base_url);

    let extractor = HttpBackend::new(&cfg.api_base_url, cfg.timeout())?;
    let mirror    = HttpBackend::new(&cfg.api_base_url, cfg.timeout())?;
    let mut session = ReviewSession::new(cfg, Box::new(mirror));

    let upload = read_pdf(&args.pdf)?;
    println!("Extracting '{}', this can take 30-90 seconds...", upload.name);

    match session.extract(&extractor, &upload) {
        Ok(()) => {
            let s = session.state().summary();
            println!("{} exercises, {} figures on {} pages", s.exercise_count, s.figure_count, s.page_count);
        }
        Err(e) => eprintln!("Extraction failed: {e}. Is the backend running?"),
    }

    run_shell(ReviewShell::new(session).with_extractor(Box::new(extractor), Some(args.pdf)))
}

fn run_open(args: OpenArgs) -> Result<()> {
    let cfg      = args.backend.into_config()?;
    let snapshot = SnapshotStore::new(&args.data_dir);
    let payload  = snapshot.read()?;

    let mut session = ReviewSession::new(cfg, Box::new(snapshot));
    session
        .load_payload(payload)
        .with_context(|| format!("Cannot review the data in '{}'", args.data_dir))?;

    let s = session.state().summary();
    println!("{} exercises, {} figures on {} pages", s.exercise_count, s.figure_count, s.page_count);
    run_shell(ReviewShell::new(session))
}

fn run_export(args: ExportArgs) -> Result<()> {
    let path = ExportUseCase::new(args.data_dir, args.out_dir).execute()?;
    println!("Exported to {}", path.display());
    Ok(())
}
