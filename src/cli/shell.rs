// ============================================================
// Layer 1 — Interactive Review Shell
// ============================================================
// A small line-oriented shell over one ReviewSession.
//
// Each line is split on whitespace, parsed by clap into a
// ShellCommand and dispatched to the session. Failures are printed and the shell keeps going:
// nothing the operator types can end the session except
// `quit` or end of input.

use std::io::{BufRead, ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::review_use_case::ReviewSession;
use crate::domain::exercise::{EditableField, Exercise, ExercisePatch, Slot};
use crate::domain::extraction::PdfUpload;
use crate::domain::traits::ExtractionService;
use crate::infra::export_writer::ExportWriter;
use crate::model::export::resolve;
use crate::model::page_index;
use crate::model::session::LogLevel;

// ─── Parsing ──────────────────────────────────────────────────────────────────
/// One line typed at the prompt. With `multicall` the first
/// word names the subcommand, so clap generates `help` and the
/// usage errors for every command below.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Commands understood by the review shell
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Counts, selection and current page
    Status,

    /// Pages with exercise/figure counts
    Pages,

    /// Show one page, or every page with `all`
    Page {
        /// Page number or `all`
        #[arg(value_parser = parse_page_filter)]
        page: PageFilter,
    },

    /// Exercises on the current page
    #[command(visible_alias = "ls")]
    List,

    /// Every field of one exercise
    Show { exercise: String },

    /// Make an exercise the target of attach/detach
    Select { exercise: String },

    /// Figures with their assigned/pending state
    Figures {
        /// Only figures cropped from this page
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },

    /// Attach a figure to the text or resolution of an exercise
    Attach {
        figure: String,
        #[arg(value_enum, ignore_case = true)]
        slot: Slot,
        /// Defaults to the selected exercise
        exercise: Option<String>,
    },

    /// Detach a figure from the text or resolution of an exercise
    Detach {
        figure: String,
        #[arg(value_enum, ignore_case = true)]
        slot: Slot,
        /// Defaults to the selected exercise
        exercise: Option<String>,
    },

    /// Replace one text field; write \n for a line break
    Edit {
        exercise: String,
        #[arg(value_enum, ignore_case = true)]
        field: EditableField,
        /// New value, the rest of the line
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Remove an exercise
    #[command(visible_alias = "rm")]
    Delete { exercise: String },

    /// Write the JSON dataset
    Export {
        /// Defaults to the configured export directory
        dir: Option<String>,
    },

    /// Run a new extraction
    Extract {
        /// Defaults to the last PDF extracted
        pdf: Option<String>,
    },

    /// Session log
    Log,

    /// Start over with an empty session
    Reset,

    /// Leave the shell
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

/// Argument of `page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFilter {
    All,
    Page(u32),
}

impl PageFilter {
    fn as_option(self) -> Option<u32> {
        match self {
            PageFilter::All     => None,
            PageFilter::Page(p) => Some(p),
        }
    }
}

fn parse_page_filter(word: &str) -> Result<PageFilter, String> {
    if word.eq_ignore_ascii_case("all") {
        return Ok(PageFilter::All);
    }
    match word.parse::<u32>() {
        Ok(p) if p >= 1 => Ok(PageFilter::Page(p)),
        _ => Err(format!("'{word}' is not a page number")),
    }
}

/// Turn `\n` into a line break and `\\` into a backslash
fn unescape(value: &str) -> String {
    let mut out   = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n')  => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse one input line. Blank lines give `Ok(None)`; `help`
/// comes back as a clap error of kind `DisplayHelp`.
fn parse(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words).map(|l| Some(l.command))
}

// ─── Shell ────────────────────────────────────────────────────────────────────
/// Line-oriented front end over one review session
pub struct ReviewShell {
    session:   ReviewSession,
    extractor: Option<Box<dyn ExtractionService>>,
    last_pdf:  Option<String>,
}

impl ReviewShell {
    /// A shell without an extraction backend
    pub fn new(session: ReviewSession) -> Self {
        Self { session, extractor: None, last_pdf: None }
    }

    /// Enable the `extract` command
    pub fn with_extractor(mut self, extractor: Box<dyn ExtractionService>, pdf: Option<String>) -> Self {
        self.extractor = Some(extractor);
        self.last_pdf  = pdf;
        self
    }

    /// Read commands until `quit` or end of input.
    ///
    /// Lines are decoded lossily, so stray bytes in the input
    /// only affect the line they appear on.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Type 'help' for commands.")?;
        let mut buf = Vec::new();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Input closed: {e}");
                    writeln!(out, "error: cannot read input: {e}")?;
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            match parse(&line) {
                Ok(None) => {}
                Ok(Some(ShellCommand::Quit)) => break,
                Ok(Some(cmd)) => self.execute(cmd, out)?,
                Err(e) => write!(out, "{e}")?,
            }
        }
        writeln!(out)?;
        Ok(())
    }

    /// Run one command. Only output errors propagate.
    fn execute<W: Write>(&mut self, cmd: ShellCommand, out: &mut W) -> Result<()> {
        match cmd {
            ShellCommand::Status   => self.print_status(out)?,
            ShellCommand::Pages    => self.print_pages(out)?,
            ShellCommand::List     => self.print_list(out)?,
            ShellCommand::Log      => self.print_log(out)?,
            ShellCommand::Figures { page } => self.print_figures(page, out)?,
            ShellCommand::Show { exercise } => match self.session.state().store.get(&exercise) {
                Some(ex) => self.print_exercise(ex, out)?,
                None     => writeln!(out, "error: exercise '{exercise}' not found")?,
            },
            ShellCommand::Page { page } => match self.session.set_page(page.as_option()) {
                Ok(()) => self.print_list(out)?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            ShellCommand::Select { exercise } => match self.session.select(&exercise) {
                Ok(()) => writeln!(out, "selected {exercise}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            ShellCommand::Attach { figure, slot, exercise } => {
                match self.session.attach(&figure, slot, exercise.as_deref()) {
                    Ok(true)  => writeln!(out, "{figure} attached to {slot}")?,
                    Ok(false) => writeln!(out, "{figure} was already in {slot}")?,
                    Err(e)    => writeln!(out, "error: {e}")?,
                }
            }
            ShellCommand::Detach { figure, slot, exercise } => {
                match self.session.detach(&figure, slot, exercise.as_deref()) {
                    Ok(true)  => writeln!(out, "{figure} detached from {slot}")?,
                    Ok(false) => writeln!(out, "{figure} was not in {slot}")?,
                    Err(e)    => writeln!(out, "error: {e}")?,
                }
            }
            ShellCommand::Edit { exercise, field, value } => {
                let patch = ExercisePatch::single(field, unescape(&value.join(" ")));
                match self.session.update(&exercise, &patch) {
                    Ok(()) => writeln!(out, "{exercise} updated")?,
                    Err(e) => writeln!(out, "error: {e}")?,
                }
            }
            ShellCommand::Delete { exercise } => match self.session.delete(&exercise) {
                Ok(true)  => writeln!(out, "{exercise} deleted")?,
                Ok(false) => writeln!(out, "{exercise} is not loaded, nothing to delete")?,
                Err(e)    => writeln!(out, "error: {e}")?,
            },
            ShellCommand::Export { dir } => {
                let dir = dir.unwrap_or_else(|| self.session.config().export_dir.clone());
                match self.session.export_to(&ExportWriter::new(dir)) {
                    Ok(path) => writeln!(out, "exported to {}", path.display())?,
                    Err(e)   => writeln!(out, "error: {e:#}")?,
                }
            }
            ShellCommand::Extract { pdf } => self.extract(pdf, out)?,
            ShellCommand::Reset => {
                self.session.reset();
                writeln!(out, "session cleared")?;
            }
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    fn extract<W: Write>(&mut self, pdf: Option<String>, out: &mut W) -> Result<()> {
        let Some(extractor) = self.extractor.as_deref() else {
            writeln!(out, "error: no extraction backend in this session (start with 'extract --pdf')")?;
            return Ok(());
        };
        let Some(path) = pdf.or_else(|| self.last_pdf.clone()) else {
            writeln!(out, "error: missing pdf path")?;
            return Ok(());
        };

        let upload = match read_pdf(&path) {
            Ok(u)  => u,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                return Ok(());
            }
        };

        writeln!(out, "extracting '{path}', this can take a minute...")?;
        match self.session.extract(extractor, &upload) {
            Ok(()) => {
                self.last_pdf = Some(path);
                self.print_status(out)?;
            }
            Err(e) => writeln!(out, "error: {e}")?,
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn print_status<W: Write>(&self, out: &mut W) -> Result<()> {
        let state = self.session.state();
        if state.store.is_empty() && state.registry.is_empty() {
            writeln!(out, "nothing loaded (try 'extract <pdf>')")?;
            return Ok(());
        }
        let s = state.summary();
        writeln!(
            out,
            "{} exercises | {} figures | {} assigned | {} pending | {} pages",
            s.exercise_count, s.figure_count, s.assigned_count, s.pending_count, s.page_count
        )?;
        writeln!(
            out,
            "page: {} | selected: {}",
            state.current_page().map_or("all".to_string(), |p| p.to_string()),
            state.selected().unwrap_or("-")
        )?;
        Ok(())
    }

    fn print_pages<W: Write>(&self, out: &mut W) -> Result<()> {
        let state = self.session.state();
        for page in page_index::pages(&state.store) {
            let c = page_index::counts(page, &state.store, &state.registry);
            let marker = if state.current_page() == Some(page) { "*" } else { " " };
            writeln!(
                out,
                "{marker} page {page}: {} exercises, {} figures",
                c.exercise_count, c.figure_count
            )?;
        }
        Ok(())
    }

    fn print_list<W: Write>(&self, out: &mut W) -> Result<()> {
        let state = self.session.state();
        let visible = state.visible_exercises();
        if visible.is_empty() {
            writeln!(out, "no exercises")?;
        }
        for ex in visible {
            let marker = if state.selected() == Some(ex.id.as_str()) { "*" } else { " " };
            writeln!(out, "{marker} {} (p.{}) {}", ex.id, ex.page, preview(&ex.question, 60))?;
            for slot in Slot::ALL {
                let figs = resolve(ex, slot, &state.registry);
                if !figs.is_empty() {
                    let ids: Vec<&str> = figs.iter().map(|f| f.id.as_str()).collect();
                    writeln!(out, "    {slot}: {}", ids.join(", "))?;
                }
            }
        }
        Ok(())
    }

    fn print_exercise<W: Write>(&self, ex: &Exercise, out: &mut W) -> Result<()> {
        let registry = &self.session.state().registry;
        writeln!(out, "{} (page {})", ex.id, ex.page)?;
        writeln!(out, "text:\n{}", ex.text)?;
        writeln!(out, "question:\n{}", ex.question)?;
        writeln!(out, "alternatives:\n{}", ex.alternatives)?;
        writeln!(out, "answer: {}", ex.answer)?;
        writeln!(out, "resolution:\n{}", ex.resolution)?;
        for slot in Slot::ALL {
            let figs = resolve(ex, slot, registry);
            let ids: Vec<&str> = figs.iter().map(|f| f.id.as_str()).collect();
            let listed = if ids.is_empty() { "-".to_string() } else { ids.join(", ") };
            writeln!(out, "{slot} figures: {listed}")?;
        }
        Ok(())
    }

    fn print_figures<W: Write>(&self, page: Option<u32>, out: &mut W) -> Result<()> {
        let state = self.session.state();
        let figures: Vec<_> = match page {
            Some(p) => state.registry.by_page(p).collect(),
            None    => state.registry.iter().collect(),
        };
        if figures.is_empty() {
            writeln!(out, "no figures")?;
        }
        for fig in figures {
            let status = if state.is_assigned(&fig.id) { "assigned" } else { "pending" };
            writeln!(out, "  {} (p.{}) {} [{}]", fig.id, fig.page, fig.filename, status)?;
        }
        Ok(())
    }

    fn print_log<W: Write>(&self, out: &mut W) -> Result<()> {
        for entry in self.session.state().log.entries() {
            let tag = match entry.level {
                LogLevel::Info    => "info",
                LogLevel::Success => " ok ",
                LogLevel::Error   => "FAIL",
            };
            writeln!(out, "{} [{tag}] {}", entry.time.format("%H:%M:%S"), entry.message)?;
        }
        Ok(())
    }
}

/// First line of `s`, cut to `max` characters
fn preview(s: &str, max: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    if line.chars().count() > max {
        format!("{}...", line.chars().take(max).collect::<String>())
    } else {
        line.to_string()
    }
}

/// Read a PDF from disk into an upload
pub fn read_pdf(path: &str) -> Result<PdfUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("Cannot read '{path}'"))?;
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    Ok(PdfUpload::new(name, bytes))
}
