//! Terminal front end: renders screens as text and turns typed lines into
//! session actions.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveTime};
use futures::{Stream, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::quiz::model::{Element, FavoriteColor, Goal, ProfileUpdate};
use crate::quiz::reading::ReadingView;
use crate::quiz::screen::{FullReport, ProcessingCopy, Screen, ScreenView};
use crate::quiz::session::Action;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A 1-based option number.
    Pick(usize),
    Text(String),
    Next,
    Back,
    Restart,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match line.to_ascii_lowercase().as_str() {
            "next" | "n" | "continue" => Self::Next,
            "back" | "b" => Self::Back,
            "restart" | "start over" => Self::Restart,
            "quit" | "q" | "/quit" | "exit" => Self::Quit,
            other => match other.parse::<usize>() {
                Ok(n) => Self::Pick(n),
                Err(_) => Self::Text(line.to_string()),
            },
        })
    }
}

/// What the main loop should do with a command on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Actions(Vec<Action>),
    /// Read a palm photo from disk, then upload it.
    LoadPalm(PathBuf),
    Quit,
    Invalid(String),
}

/// Translate a command against the screen it was typed on.
pub fn interpret(view: &ScreenView<'_>, command: Command) -> Intent {
    let one = |action| Intent::Actions(vec![action]);

    match (command, &view.screen) {
        (Command::Quit, _) => Intent::Quit,
        (Command::Back, _) => one(Action::Back),
        (Command::Restart, _) => one(Action::StartOver),
        (Command::Next, _) => one(Action::Continue),

        (Command::Pick(n), Screen::Landing { options, .. }) => {
            pick(options, n, |g| Action::Choose(ProfileUpdate::Gender(g)))
        }
        (Command::Pick(n), Screen::Relationship { options, .. }) => {
            pick(options, n, |r| Action::Choose(ProfileUpdate::RelationshipStatus(r)))
        }
        (Command::Pick(n), Screen::Goals { options, .. }) => pick(options, n, Action::ToggleGoal),
        (Command::Pick(n), Screen::Color { options, .. }) => {
            pick(options, n, |c| Action::Choose(ProfileUpdate::FavoriteColor(c)))
        }
        (Command::Pick(n), Screen::Element { options, .. }) => {
            pick(options, n, |e| Action::Choose(ProfileUpdate::Element(e)))
        }

        (Command::Text(text), Screen::BirthDate { .. }) => {
            if NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_err() {
                return Intent::Invalid("Enter your birthday as YYYY-MM-DD.".to_string());
            }
            Intent::Actions(vec![
                Action::Set(ProfileUpdate::BirthDate(text)),
                Action::Continue,
            ])
        }
        (Command::Text(text), Screen::BirthTime { .. }) => {
            if NaiveTime::parse_from_str(&text, "%H:%M").is_err() {
                return Intent::Invalid(
                    "Enter the time as HH:MM, or type next to skip.".to_string(),
                );
            }
            Intent::Actions(vec![
                Action::Set(ProfileUpdate::BirthTime(Some(text))),
                Action::Continue,
            ])
        }
        (Command::Text(text), Screen::BirthPlace { .. }) => Intent::Actions(vec![
            Action::Set(ProfileUpdate::BirthPlace(text)),
            Action::Continue,
        ]),
        (Command::Text(path), Screen::PalmUpload { .. }) => Intent::LoadPalm(PathBuf::from(path)),

        // Free-text screens take digits as typed, e.g. a postcode.
        (
            Command::Pick(n),
            Screen::BirthDate { .. } | Screen::BirthTime { .. } | Screen::BirthPlace { .. },
        ) => interpret(view, Command::Text(n.to_string())),

        (Command::Pick(_), _) => Intent::Invalid("There is nothing to pick here.".to_string()),
        (Command::Text(_), _) => {
            Intent::Invalid("Type next, back, or a number from the list.".to_string())
        }
    }
}

fn pick<T: Copy>(options: &[T], n: usize, to_action: impl FnOnce(T) -> Action) -> Intent {
    match n.checked_sub(1).and_then(|i| options.get(i)) {
        Some(option) => Intent::Actions(vec![to_action(*option)]),
        None => Intent::Invalid(format!("Pick a number from 1 to {}.", options.len())),
    }
}

/// Read a palm photo and wrap it as a `data:` URL.
pub async fn load_palm_photo(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is empty", path.display()),
        ));
    }
    Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(&bytes)))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Typed lines, in order.
pub type InputStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Read stdin lines on a background task.
pub fn stdin_lines() -> InputStream {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

/// Render a screen as plain text.
pub fn render(view: &ScreenView<'_>) -> String {
    let mut out = String::new();

    if let Some(header) = view.header {
        out.push_str(&format!(
            "[{}/{}] {}%\n\n",
            header.ordinal, header.total, header.percent
        ));
    }

    match &view.screen {
        Screen::Landing { options, selected } => {
            out.push_str("Unlock destiny with planets and palm reading\n");
            out.push_str("Complete a 1-minute quiz to get a personalized prediction.\n\n");
            list_options(&mut out, options, |g| selected.as_ref() == Some(g));
        }
        Screen::BirthDate { value } => {
            out.push_str("When's your birthday? (YYYY-MM-DD)\n");
            current_value(&mut out, value);
        }
        Screen::BirthTime { value } => {
            out.push_str("Do you know your birth time? (HH:MM, or next to skip)\n");
            current_value(&mut out, value.unwrap_or_default());
        }
        Screen::BirthPlace { value } => {
            out.push_str("Where were you born?\n");
            current_value(&mut out, value);
        }
        Screen::ProcessingChart(copy)
        | Screen::ProcessingAccuracy(copy)
        | Screen::ProcessingPalm(copy) => processing(&mut out, copy),
        Screen::Relationship { options, selected } => {
            out.push_str("Relationship status\n\n");
            list_options(&mut out, options, |r| selected.as_ref() == Some(r));
        }
        Screen::Goals {
            options,
            selected,
            at_cap,
        } => {
            out.push_str("What are your goals? Select up to 3, then next.\n\n");
            list_options(&mut out, options, |g: &Goal| selected.contains(g));
            if *at_cap {
                out.push_str("\nThree goals picked. Pick one again to drop it.\n");
            }
        }
        Screen::Color { options, selected } => {
            out.push_str("Preferred color?\n\n");
            list_options(&mut out, options, |c: &FavoriteColor| selected.as_ref() == Some(c));
        }
        Screen::Element { options, selected } => {
            out.push_str("Which element of nature do you like best?\n\n");
            list_options(&mut out, options, |e: &Element| selected.as_ref() == Some(e));
        }
        Screen::PalmIntro => {
            out.push_str("Take a photo of your left palm\n");
            out.push_str("Privacy is a priority. Type next when ready.\n");
        }
        Screen::PalmUpload { has_image } => {
            out.push_str("Upload your palm: type the path to a photo.\n");
            if *has_image {
                out.push_str("A photo is already stored. Type next to use it.\n");
            }
        }
        Screen::ResultsPreview { palm } => {
            out.push_str("Your palm reading IS READY!\n\n");
            match palm {
                ReadingView::Ready(reading) => {
                    for (label, score) in reading.scores() {
                        out.push_str(&format!("  {label:<7} {score:>3}%\n"));
                    }
                    out.push_str(&format!("\n{}\n", reading.summary));
                }
                ReadingView::Pending => {
                    out.push_str(crate::quiz::screen::PENDING_PALM_SUMMARY);
                    out.push('\n');
                }
            }
            out.push_str("\nType next for the full report.\n");
        }
        Screen::FullReport(report) => full_report(&mut out, report),
    }

    out
}

fn list_options<T: std::fmt::Display>(
    out: &mut String,
    options: &[T],
    is_selected: impl Fn(&T) -> bool,
) {
    for (i, option) in options.iter().enumerate() {
        let mark = if is_selected(option) { "*" } else { " " };
        out.push_str(&format!(" {mark}{:>2}. {option}\n", i + 1));
    }
}

fn current_value(out: &mut String, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("  (current: {value})\n"));
    }
}

fn processing(out: &mut String, copy: &ProcessingCopy) {
    out.push_str(&format!("{}\n{}\n", copy.title, copy.subtitle));
}

fn full_report(out: &mut String, report: &FullReport<'_>) {
    out.push_str("Your destiny report\n\n");
    out.push_str(&format!("  Sun        {}\n", report.sun_sign()));
    out.push_str(&format!("  Moon       {}\n", report.moon_sign()));
    out.push_str(&format!("  Ascendant  {}\n\n", report.ascendant()));
    out.push_str(&format!("{}\n\n", report.prediction()));
    out.push_str(&format!("Palm: {}\n\n", report.palm_summary()));
    out.push_str(&format!("Power word: {}\n", report.power_word().to_uppercase()));
    if let ReadingView::Ready(chart) = report.chart {
        out.push_str(&format!("Lucky color: {}\n", chart.lucky_color));
        out.push_str(&format!("{}\n", chart.compatibility_note));
    }
    out.push_str("\nType restart to start over, or quit.\n");
}
