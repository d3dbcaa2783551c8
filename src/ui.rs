use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};

const LABEL_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Step,
    Done,
    Skip,
    Info,
    Warn,
    Error,
}

impl Kind {
    fn style(self) -> Style {
        let bold = Style::new().bold();
        match self {
            Kind::Step => bold.fg_color(Some(AnsiColor::Cyan.into())),
            Kind::Done => bold.fg_color(Some(AnsiColor::Green.into())),
            Kind::Skip => bold.fg_color(Some(AnsiColor::Blue.into())),
            Kind::Info => bold.fg_color(Some(AnsiColor::Blue.into())),
            Kind::Warn => bold.fg_color(Some(AnsiColor::Yellow.into())),
            Kind::Error => bold.fg_color(Some(AnsiColor::Red.into())),
        }
    }

    fn is_stderr(self) -> bool {
        matches!(self, Kind::Warn | Kind::Error)
    }
}

fn write_line(kind: Kind, label: &str, message: &str) {
    let (mut handle, color): (Box<dyn Write>, bool) = if kind.is_stderr() {
        let err = io::stderr();
        let color = err.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        (Box::new(err.lock()), color)
    } else {
        let out = io::stdout();
        let color = out.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        (Box::new(out.lock()), color)
    };

    let padded = format!("{:>width$}", label, width = LABEL_WIDTH);
    let line = if color {
        let style = kind.style();
        format!("{}{padded}{} {message}", style.render(), style.render_reset())
    } else {
        format!("{padded} {message}")
    };

    let _ = writeln!(handle, "{line}");
    let _ = handle.flush();
}

pub fn step(message: impl Display) {
    write_line(Kind::Step, "Step", &message.to_string());
}

pub fn done(message: impl Display) {
    write_line(Kind::Done, "Done", &message.to_string());
}

pub fn skip(message: impl Display) {
    write_line(Kind::Skip, "Skip", &message.to_string());
}

pub fn info(message: impl Display) {
    write_line(Kind::Info, "Info", &message.to_string());
}

pub fn warn(message: impl Display) {
    write_line(Kind::Warn, "Warning", &message.to_string());
}

pub fn error(message: impl Display) {
    write_line(Kind::Error, "Error", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    write_line(Kind::Done, label, &message.to_string());
}
