// Statement list for a wrapper body, rendered after its declarations are known.

const INDENT: &str = "  ";

/// Indented C statements, built in emission order.
#[derive(Debug, Clone)]
pub struct CBody {
    lines: Vec<String>,
    depth: usize,
}

impl Default for CBody {
    fn default() -> Self {
        Self::new()
    }
}

impl CBody {
    /// Empty body at function-block depth.
    pub fn new() -> Self {
        CBody { lines: Vec::new(), depth: 1 }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", INDENT.repeat(self.depth), text.as_ref()));
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// `head {`, then indent.
    pub fn open(&mut self, head: impl AsRef<str>) {
        self.line(format!("{} {{", head.as_ref()));
        self.indent();
    }

    /// Dedent, then `}` followed by `tail` (e.g. ` else {`).
    pub fn close_with(&mut self, tail: &str) {
        self.dedent();
        self.line(format!("}}{tail}"));
    }

    pub fn close(&mut self) {
        self.close_with("");
    }

    /// User-supplied text, copied without re-indentation.
    pub fn verbatim(&mut self, text: &str) {
        for l in text.lines() {
            self.lines.push(l.to_string());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render_into(&self, out: &mut String) {
        for l in &self.lines {
            out.push_str(l);
            out.push('\n');
        }
    }
}
