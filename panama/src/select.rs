//! Choosing one workspace: fuzzy finder, numbered stdio prompt, or first hit.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;
use panamalib::{Ui, Workspace};

/// A selectable row.
#[derive(Debug, Clone)]
pub struct Item {
    pub label: String,
    pub description: Option<String>,
}

impl Item {
    pub fn from_workspace(ws: &Workspace, base: &Path) -> Self {
        Self {
            label: ws.label_with_base(base),
            description: ws.description.clone(),
        }
    }
}

/// How the selection is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Stdio,
    First,
}

/// Pick the selection mode. The fuzzy finder draws on stderr, so stdout
/// may be captured by `cd "$(panama)"`.
pub fn mode(ui: Ui, first: bool, terminal: bool) -> Mode {
    if first {
        Mode::First
    } else if ui == Ui::Stdio {
        Mode::Stdio
    } else if terminal {
        Mode::Interactive
    } else {
        Mode::First
    }
}

pub fn is_terminal() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Index of the chosen item.
pub fn select(items: &[Item], mode: Mode, query: Option<&str>) -> Result<usize> {
    if items.is_empty() {
        bail!("no items to select from");
    }
    match mode {
        Mode::First => Ok(0),
        Mode::Interactive => fuzzy_select(items, query),
        Mode::Stdio => {
            let stdin = io::stdin();
            stdio_select(items, &mut stdin.lock(), &mut io::stderr())
        }
    }
}

fn fuzzy_select(items: &[Item], query: Option<&str>) -> Result<usize> {
    let labels: Vec<String> = items
        .iter()
        .map(|item| match &item.description {
            Some(desc) => format!("{}  {}", item.label, style(desc).dim()),
            None => item.label.clone(),
        })
        .collect();

    let theme = ColorfulTheme::default();
    let mut prompt = FuzzySelect::with_theme(&theme)
        .with_prompt("workspaces")
        .items(labels.as_slice())
        .default(0);
    if let Some(query) = query {
        prompt = prompt.with_initial_text(query);
    }

    prompt
        .interact_on_opt(&Term::stderr())?
        .ok_or_else(|| anyhow!("selection cancelled"))
}

/// Numbered list on `output`, one line read from `input`.
pub fn stdio_select<R: BufRead, W: Write>(
    items: &[Item],
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    writeln!(output, "Available workspaces:")?;
    for (i, item) in items.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, item.label)?;
        if let Some(desc) = &item.description {
            writeln!(output, "     {desc}")?;
        }
    }
    write!(output, "Select workspace (1-{}): ", items.len())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();

    let choice: usize = line
        .parse()
        .map_err(|_| anyhow!("invalid input: {line}"))?;
    if choice < 1 || choice > items.len() {
        bail!("choice {choice} is out of range (1-{})", items.len());
    }
    Ok(choice - 1)
}
