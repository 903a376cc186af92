/// Abstraction over user-facing output.
///
/// Command modules write through this trait instead of `println!` so they
/// can be exercised with a capturing implementation.
pub trait UserOutput: Send + Sync {
    /// Informational line
    fn status(&self, message: &str);

    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    /// Machine-readable payload, printed verbatim
    fn data(&self, payload: &str);
}

/// Standard CLI output: stdout, with warnings on stderr.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn data(&self, payload: &str) {
        println!("{}", payload);
    }
}

/// Records every line with its channel, for command tests.
#[cfg(test)]
#[derive(Default)]
pub struct CaptureOutput {
    lines: parking_lot::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl CaptureOutput {
    pub fn lines(&self, channel: &str) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn push(&self, channel: &'static str, message: &str) {
        self.lines.lock().push((channel, message.to_string()));
    }
}

#[cfg(test)]
impl UserOutput for CaptureOutput {
    fn status(&self, message: &str) {
        self.push("status", message);
    }

    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn warning(&self, message: &str) {
        self.push("warning", message);
    }

    fn data(&self, payload: &str) {
        self.push("data", payload);
    }
}
