//! Interactive capture loop.
//!
//! # Design
//! - One photo at a time: path prompt, label picker, upload, result, repeat.
//! - The catalog is loaded once per session; a load failure replaces the picker with its message.
//! - Generic over the input and output streams so sessions can be scripted in tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::anyhow;
use rebuddy_capture::{CaptureController, CapturedFile, ItemPicker, Phase, PickerView};
use rebuddy_models::{Catalog, QuickLabel};
use tracing::info;

use crate::cli::{CaptureArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_outcome;

const QUIT: &str = ":quit";
const RETAKE: &str = ":retake";
const BACK: &str = ":back";

pub(crate) async fn handle_capture(ctx: &AppContext, args: CaptureArgs) -> CliResult<()> {
    let mut session = CaptureSession::new(io::stdin().lock(), io::stdout().lock(), args.quick);
    let summary = session.run(ctx).await?;
    info!(
        uploaded = summary.uploaded,
        failed = summary.failed,
        "capture session finished"
    );
    Ok(())
}

/// Counts of settled uploads in one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) uploaded: usize,
    pub(crate) failed: usize,
}

enum Choice {
    Label(String),
    Retake,
    Quit,
}

pub(crate) struct CaptureSession<R, W> {
    input: R,
    out: W,
    quick: bool,
}

impl<R: BufRead, W: Write> CaptureSession<R, W> {
    pub(crate) const fn new(input: R, out: W, quick: bool) -> Self {
        Self { input, out, quick }
    }

    pub(crate) async fn run(&mut self, ctx: &AppContext) -> CliResult<SessionSummary> {
        let catalog = if self.quick {
            Ok(Catalog::default())
        } else {
            let state = ctx.catalog_loader().settled().await;
            state.error.map_or(Ok(state.catalog), Err)
        };

        let pipeline = ctx.pipeline();
        let mut controller = CaptureController::new();
        let mut summary = SessionSummary::default();

        loop {
            match controller.phase() {
                Phase::Capture => {
                    self.prompt("Photo path (:quit to exit)> ")?;
                    let Some(line) = self.read_line()? else { break };
                    if line == QUIT {
                        break;
                    }
                    let path = PathBuf::from(&line);
                    if !path.is_file() {
                        self.say(&format!("No photo at '{line}'."))?;
                        continue;
                    }
                    let preview = controller
                        .select_file(CapturedFile::from_path(path))
                        .map_err(CliError::failure)?;
                    let message = format!("Captured {line} ({preview}).");
                    self.say(&message)?;
                }
                Phase::Label => {
                    let choice = match &catalog {
                        _ if self.quick => self.choose_quick()?,
                        Ok(catalog) => self.choose_from_catalog(catalog)?,
                        Err(message) => self.catalog_unavailable(message)?,
                    };
                    match choice {
                        Choice::Label(label) => {
                            self.say("Uploading...")?;
                            let outcome = controller
                                .submit(&label, &pipeline)
                                .await
                                .map_err(CliError::failure)?;
                            if let Some(saved) = outcome.label() {
                                info!(label = saved, "photo saved");
                                summary.uploaded += 1;
                            } else {
                                summary.failed += 1;
                            }
                            let text = render_outcome(outcome, OutputFormat::Table)?;
                            self.say(&text)?;
                        }
                        Choice::Retake => controller.reset().map_err(CliError::failure)?,
                        Choice::Quit => break,
                    }
                }
                Phase::Result => {
                    self.prompt("Press Enter for another photo (:quit to exit)> ")?;
                    match self.read_line()? {
                        Some(line) if line != QUIT => {
                            controller.reset().map_err(CliError::failure)?;
                        }
                        _ => break,
                    }
                }
                Phase::Uploading => {
                    return Err(CliError::failure(anyhow!("upload did not settle")));
                }
            }
        }

        self.say(&format!(
            "Uploaded {}, failed {}.",
            summary.uploaded, summary.failed
        ))?;
        Ok(summary)
    }

    fn choose_quick(&mut self) -> CliResult<Choice> {
        for (index, label) in QuickLabel::ALL.iter().enumerate() {
            self.say(&format!("{:>3}) {}", index + 1, label.display_name()))?;
        }
        loop {
            self.prompt("Choose 1-2 (:retake, :quit)> ")?;
            let Some(line) = self.read_line()? else {
                return Ok(Choice::Quit);
            };
            match line.as_str() {
                QUIT => return Ok(Choice::Quit),
                RETAKE => return Ok(Choice::Retake),
                _ => {}
            }
            match pick(&line, QuickLabel::ALL.len()).map(|index| QuickLabel::ALL[index]) {
                Some(label) => return Ok(Choice::Label(label.as_value().to_string())),
                None => self.say("Enter 1 or 2.")?,
            }
        }
    }

    fn choose_from_catalog(&mut self, catalog: &Catalog) -> CliResult<Choice> {
        let mut picker = ItemPicker::new(catalog.clone());
        self.say("What is this item?")?;
        loop {
            let view = picker.view();
            self.show(&view)?;
            self.prompt("Search, pick a number, :back, :retake, :quit> ")?;
            let Some(line) = self.read_line()? else {
                return Ok(Choice::Quit);
            };
            match line.as_str() {
                QUIT => return Ok(Choice::Quit),
                RETAKE => return Ok(Choice::Retake),
                BACK => {
                    picker.back();
                    continue;
                }
                _ => {}
            }

            if line.parse::<usize>().is_err() {
                if let Some(announcement) = picker.set_query(line) {
                    let announcement = announcement.to_string();
                    self.say(&announcement)?;
                }
                continue;
            }
            match view {
                PickerView::Items { items, .. } => {
                    let chosen = pick(&line, items.len())
                        .and_then(|index| picker.choose(&items[index].value));
                    match chosen {
                        Some(value) => return Ok(Choice::Label(value)),
                        None => self.say("No such item.")?,
                    }
                }
                PickerView::Categories(categories) => {
                    let opened = pick(&line, categories.len())
                        .is_some_and(|index| picker.open_category(&categories[index].name));
                    if !opened {
                        self.say("No such category.")?;
                    }
                }
                PickerView::Empty { .. } => self.say("Nothing to choose; change the search.")?,
            }
        }
    }

    fn catalog_unavailable(&mut self, message: &str) -> CliResult<Choice> {
        self.say(&format!("Labels unavailable: {message}"))?;
        loop {
            self.prompt("(:retake, :quit)> ")?;
            match self.read_line()?.as_deref() {
                None | Some(QUIT) => return Ok(Choice::Quit),
                Some(RETAKE) => return Ok(Choice::Retake),
                Some(_) => {}
            }
        }
    }

    fn show(&mut self, view: &PickerView) -> CliResult<()> {
        match view {
            PickerView::Items { heading, items } => {
                if let Some(heading) = heading {
                    self.say(&format!("[{heading}]"))?;
                }
                for (index, item) in items.iter().enumerate() {
                    self.say(&format!("{:>3}) {}", index + 1, item.display_name))?;
                }
            }
            PickerView::Categories(categories) => {
                for (index, category) in categories.iter().enumerate() {
                    self.say(&format!(
                        "{:>3}) {} ({})",
                        index + 1,
                        category.name,
                        category.item_count
                    ))?;
                }
            }
            PickerView::Empty { message } => self.say(message)?,
        }
        Ok(())
    }

    fn read_line(&mut self) -> CliResult<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> CliResult<()> {
        write!(self.out, "{text}")
            .and_then(|()| self.out.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }

    fn say(&mut self, text: &str) -> CliResult<()> {
        writeln!(self.out, "{text}")
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }
}

/// Zero-based index for a one-based menu entry, if in range.
fn pick(line: &str, len: usize) -> Option<usize> {
    line.parse::<usize>()
        .ok()
        .filter(|entry| (1..=len).contains(entry))
        .map(|entry| entry - 1)
}
