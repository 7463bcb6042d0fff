use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Score change of one `run_eval` call against the experiment's previous set.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub experiment: String,
    pub previous_score: f64,
    pub current_score: f64,
    /// The experiment had no earlier set.
    pub is_new: bool,
}

impl EvalReport {
    pub fn diff(&self) -> f64 {
        self.current_score - self.previous_score
    }

    /// Blue for a new experiment or no change, green for improvement, red for regression.
    pub fn color(&self) -> Color {
        let diff = self.diff();
        if self.is_new || diff == 0.0 {
            Color::Blue
        } else if diff > 0.0 {
            Color::Green
        } else {
            Color::Red
        }
    }

    fn sign(&self) -> &'static str {
        if self.diff() > 0.0 {
            "+"
        } else {
            ""
        }
    }

    /// The uncolored report block.
    pub fn render(&self) -> String {
        format!(
            "Experiment: {}\nPrevious score: {:.2}\nCurrent score: {:.2}\nDifference: {}{:.2}\n",
            self.experiment,
            self.previous_score,
            self.current_score,
            self.sign(),
            self.diff()
        )
    }

    /// Write the report block with colored scores, followed by a blank line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let color = self.color();
        let colored = |out: &mut W, value: String| -> io::Result<()> {
            queue!(out, SetForegroundColor(color), Print(value), ResetColor, Print("\n"))
        };

        queue!(out, Print(format!("Experiment: {}\n", self.experiment)))?;
        queue!(out, Print("Previous score: "))?;
        colored(out, format!("{:.2}", self.previous_score))?;
        queue!(out, Print("Current score: "))?;
        colored(out, format!("{:.2}", self.current_score))?;
        queue!(out, Print(format!("Difference: {}", self.sign())))?;
        colored(out, format!("{:.2}", self.diff()))?;
        queue!(out, Print("\n"))?;
        out.flush()
    }

    pub fn print(&self) -> io::Result<()> {
        self.write_to(&mut io::stdout())
    }
}
