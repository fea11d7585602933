use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use recipe_catalog::Recipe;
use recipe_view::{Render, View};

const WRAP_INDENT: &str = "  ";
const MIN_WIDTH: usize = 20;
const KEY_HELP: &str = "type to search | left/right: page | ctrl-r: retry | esc: quit";

/// Where the image of recipe `id` is served.
pub fn image_url(image_base_url: &str, id: u64) -> String {
    format!("{}/{id}.webp", image_base_url.trim_end_matches('/'))
}

fn push_wrapped(lines: &mut Vec<String>, text: &str, width: usize) {
    let options = textwrap::Options::new(width).subsequent_indent(WRAP_INDENT);
    lines.extend(
        textwrap::wrap(text, options)
            .into_iter()
            .map(|line| line.into_owned()),
    );
}

fn recipe_lines(lines: &mut Vec<String>, recipe: &Recipe, image_base_url: &str, width: usize) {
    push_wrapped(lines, &recipe.name, width);
    push_wrapped(lines, &format!("Cuisine: {}", recipe.cuisine), width);
    push_wrapped(
        lines,
        &format!("Ingredients: {}", recipe.ingredients_joined()),
        width,
    );
    push_wrapped(
        lines,
        &format!("Instructions: {}", recipe.instructions),
        width,
    );
    lines.push(format!("Image: {}", image_url(image_base_url, recipe.id)));
}

/// The pagination and status footer.
pub fn status_line(view: &View<'_>) -> String {
    let mut status = format!(
        "Page {} of {} | {}",
        view.page, view.total_pages, view.mode
    );
    if view.loading {
        status.push_str(" | loading...");
    }
    if let Some(error) = view.last_error {
        status.push_str(&format!(" | {}: {}", error.kind, error.message));
    }
    status
}

/// Renders a [View] as text.
///
/// In plain mode every render appends to the output.
/// In full screen mode every render redraws the screen,
/// the search input at the top and the status line at the bottom.
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
    image_base_url: String,
    width: usize,
    /// Height of the screen, set in full screen mode.
    screen_rows: Option<usize>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn plain(out: W, image_base_url: impl Into<String>, width: usize) -> Self {
        Self {
            out,
            image_base_url: image_base_url.into(),
            width: width.max(MIN_WIDTH),
            screen_rows: None,
        }
    }

    pub fn full_screen(out: W, image_base_url: impl Into<String>, (cols, rows): (u16, u16)) -> Self {
        Self {
            screen_rows: Some(rows.into()),
            ..Self::plain(out, image_base_url, cols.into())
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.width = usize::from(cols).max(MIN_WIDTH);
        if let Some(screen_rows) = self.screen_rows.as_mut() {
            *screen_rows = rows.into();
        }
    }

    fn body_lines(&self, view: &View<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        if view.records.is_empty() {
            lines.push("No recipes found.".to_string());
            lines.push(String::new());
            return lines;
        }
        for recipe in view.records {
            recipe_lines(&mut lines, recipe, &self.image_base_url, self.width);
            lines.push(String::new());
        }
        lines
    }

    fn draw_full_screen(&mut self, view: &View<'_>, rows: usize) -> io::Result<()> {
        let prompt = format!("Search: {}", view.query);
        let mut status = status_line(view);
        if view.last_error.is_some() && !view.loading {
            status.push_str(" (ctrl-r to retry)");
        }
        let status = status.chars().take(self.width).collect::<String>();

        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        write!(self.out, "{prompt}\r\n{KEY_HELP}\r\n\r\n")?;

        // prompt, help, blank line and status
        let body_rows = rows.saturating_sub(4);
        for line in self.body_lines(view).iter().take(body_rows) {
            write!(self.out, "{line}\r\n")?;
        }

        let last_row = u16::try_from(rows.saturating_sub(1)).unwrap_or(u16::MAX);
        queue!(self.out, MoveTo(0, last_row))?;
        write!(self.out, "{status}")?;

        let prompt_end = u16::try_from(prompt.chars().count()).unwrap_or(u16::MAX);
        queue!(self.out, MoveTo(prompt_end, 0))?;
        Ok(())
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        match self.screen_rows {
            Some(rows) => self.draw_full_screen(view, rows)?,
            None => {
                for line in self.body_lines(view) {
                    writeln!(self.out, "{line}")?;
                }
                writeln!(self.out, "{}", status_line(view))?;
            },
        }
        self.out.flush()
    }
}
