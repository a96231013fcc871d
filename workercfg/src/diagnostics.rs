//! Diagnostics collected during a validation pass.
//!
//! A [`Diagnostics`] scope is a titled, append-only list of errors and
//! warnings. Scopes nest: the top-level pass owns the root scope and each
//! validated named environment gets its own child scope.

/// A titled, nestable collector of error and warning messages.
///
/// # Examples
///
/// ```
/// use workercfg::Diagnostics;
///
/// let mut root = Diagnostics::new("Processing worker.toml configuration:");
/// let mut child = Diagnostics::new("\"env.prod\" environment configuration");
/// child.warnings.push("something looks off".to_string());
/// root.add_child(child);
///
/// assert!(root.has_warnings());
/// assert!(!root.has_errors());
/// assert!(root.render_warnings().contains("env.prod"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    description: String,
    /// Hard errors: the configuration must not be used.
    pub errors: Vec<String>,
    /// Non-blocking findings.
    pub warnings: Vec<String>,
    children: Vec<Diagnostics>,
}

impl Diagnostics {
    /// Creates an empty scope with the given title.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// The title this scope was created with.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Nested scopes, in the order they were attached.
    #[must_use]
    pub fn children(&self) -> &[Diagnostics] {
        &self.children
    }

    /// Attaches a nested scope under this one.
    pub fn add_child(&mut self, child: Diagnostics) {
        self.children.push(child);
    }

    /// Whether this scope or any descendant holds an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.children.iter().any(Self::has_errors)
    }

    /// Whether this scope or any descendant holds a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty() || self.children.iter().any(Self::has_warnings)
    }

    /// Total number of errors in the tree.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.children.iter().map(Self::error_count).sum::<usize>()
    }

    /// Total number of warnings in the tree.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
            + self
                .children
                .iter()
                .map(Self::warning_count)
                .sum::<usize>()
    }

    /// Every error in the tree, depth-first, without titles.
    #[must_use]
    pub fn all_errors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.errors.iter().map(String::as_str).collect();
        for child in &self.children {
            out.extend(child.all_errors());
        }
        out
    }

    /// Every warning in the tree, depth-first, without titles.
    #[must_use]
    pub fn all_warnings(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.warnings.iter().map(String::as_str).collect();
        for child in &self.children {
            out.extend(child.all_warnings());
        }
        out
    }

    /// Renders the error tree as indented text.
    #[must_use]
    pub fn render_errors(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, Self::errors_of, Self::has_errors);
        out.trim_end().to_string()
    }

    /// Renders the warning tree as indented text.
    #[must_use]
    pub fn render_warnings(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, Self::warnings_of, Self::has_warnings);
        out.trim_end().to_string()
    }

    fn errors_of(&self) -> &[String] {
        &self.errors
    }

    fn warnings_of(&self) -> &[String] {
        &self.warnings
    }

    fn render_into(
        &self,
        out: &mut String,
        depth: usize,
        messages: fn(&Diagnostics) -> &[String],
        relevant: fn(&Diagnostics) -> bool,
    ) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push_str(&self.description);
        out.push('\n');

        for message in messages(self) {
            let mut lines = message.lines();
            if let Some(first) = lines.next() {
                out.push_str(&format!("{indent}  - {first}\n"));
            }
            for line in lines {
                out.push_str(&format!("{indent}    {line}\n"));
            }
        }

        for child in self.children.iter().filter(|c| relevant(c)) {
            out.push_str(&indent);
            out.push_str("  - ");
            let mut nested = String::new();
            child.render_into(&mut nested, depth + 2, messages, relevant);
            out.push_str(nested.trim_start());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Diagnostics {
        let mut root = Diagnostics::new("root");
        root.errors.push("top error".to_string());
        let mut child = Diagnostics::new("child");
        child.errors.push("nested error\nsecond line".to_string());
        child.warnings.push("nested warning".to_string());
        root.add_child(child);
        root.add_child(Diagnostics::new("quiet child"));
        root
    }

    #[test]
    fn test_counts_are_recursive() {
        let diagnostics = tree();
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.children().len(), 2);
    }

    #[test]
    fn test_empty_scope_has_nothing() {
        let diagnostics = Diagnostics::new("empty");
        assert!(!diagnostics.has_errors());
        assert!(!diagnostics.has_warnings());
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn test_all_errors_depth_first() {
        let diagnostics = tree();
        assert_eq!(
            diagnostics.all_errors(),
            vec!["top error", "nested error\nsecond line"]
        );
        assert_eq!(diagnostics.all_warnings(), vec!["nested warning"]);
    }

    #[test]
    fn test_render_errors_skips_empty_children() {
        let rendered = tree().render_errors();
        assert!(rendered.starts_with("root\n"));
        assert!(rendered.contains("  - top error"));
        assert!(rendered.contains("  - child"));
        assert!(rendered.contains("      - nested error"));
        assert!(rendered.contains("        second line"));
        assert!(!rendered.contains("quiet child"));
    }

    #[test]
    fn test_render_warnings_only_includes_warning_branches() {
        let rendered = tree().render_warnings();
        assert!(rendered.contains("nested warning"));
        assert!(!rendered.contains("top error"));
    }
}
