//! Colored terminal output utilities.

use std::sync::{Arc, Mutex};

use console::{Emoji, Style, Term};

static CRAB: Emoji<'_, '_> = Emoji("🦀 ", "");
static ON: Emoji<'_, '_> = Emoji("🟢 ", "* ");
static OFF: Emoji<'_, '_> = Emoji("⚫ ", "- ");
static UPDATE: Emoji<'_, '_> = Emoji("💚 ", "* ");
static FIRE: Emoji<'_, '_> = Emoji("🔥 ", "* ");
static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");

/// Live status lines, redrawn in place while the server runs.
#[derive(Debug, Default)]
struct Activity {
    standing_by: bool,
    updates: Option<u64>,
    /// Lines currently drawn at the bottom of the terminal.
    drawn: usize,
}

/// Terminal output formatter.
#[derive(Clone)]
pub(crate) struct Output {
    term: Term,
    activity: Arc<Mutex<Activity>>,
    green: Style,
    orange: Style,
    grey: Style,
    red: Style,
    badge: Style,
    link: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            activity: Arc::default(),
            green: Style::new().color256(2),
            orange: Style::new().color256(166),
            grey: Style::new().color256(244),
            red: Style::new().red(),
            badge: Style::new().on_color256(22).white(),
            link: Style::new().color256(2).underlined(),
        }
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print the startup banner.
    pub(crate) fn banner(&self) {
        let _ = self.term.set_title("cargo-markdown");
        self.line(&format!(
            "{} (Ctrl-C to quit)\n",
            self.orange.apply_to(format!("{CRAB}cargo-markdown"))
        ));
    }

    /// Print an active status line (green).
    pub(crate) fn status(&self, msg: &str) {
        self.line(&format!("{ON}{}", self.green.apply_to(msg)));
    }

    /// Print an inactive status line (grey).
    pub(crate) fn inactive(&self, msg: &str) {
        self.line(&format!("{OFF}{}", self.grey.apply_to(msg)));
    }

    /// Print the preview page link.
    pub(crate) fn page(&self, url: &str) {
        self.line(&format!(
            "{ON}{} {}",
            self.badge.apply_to(format!(" {PACKAGE}crates.io (mockup) ")),
            self.link.apply_to(url)
        ));
    }

    /// Show the running update counter.
    pub(crate) fn updates(&self, count: u64) {
        self.redraw(|activity| activity.updates = Some(count));
    }

    /// Show that a page holds a hot reload connection.
    pub(crate) fn standing_by(&self) {
        self.redraw(|activity| activity.standing_by = true);
    }

    /// Apply `change` and rewrite the live status lines.
    ///
    /// Off a terminal nothing can be rewritten, so only the last live line is
    /// appended.
    fn redraw(&self, change: impl FnOnce(&mut Activity)) {
        let Ok(mut activity) = self.activity.lock() else {
            return;
        };
        change(&mut activity);

        let lines = self.activity_lines(&activity);
        if self.term.is_term() {
            if activity.drawn > 0 {
                let _ = self.term.clear_last_lines(activity.drawn);
            }
            for line in &lines {
                self.line(line);
            }
        } else if let Some(line) = lines.last() {
            self.line(line);
        }
        activity.drawn = lines.len();
    }

    fn activity_lines(&self, activity: &Activity) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if activity.standing_by {
            lines.push(format!(
                "{FIRE}{}",
                self.orange.apply_to("hot reload standing by...")
            ));
        }
        if let Some(count) = activity.updates {
            lines.push(format!(
                "{UPDATE}{}",
                self.green.apply_to(format!("readme updates => {count}"))
            ));
        }
        lines
    }

    /// Print the farewell line.
    pub(crate) fn farewell(&self) {
        self.line(&self.orange.apply_to(format!("{CRAB}nice work rustacean!")).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&format!("{OFF}{}", self.red.apply_to(msg)));
    }
}
