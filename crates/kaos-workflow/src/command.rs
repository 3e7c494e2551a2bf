//! Shell commands assembled from ordered fragments

/// A `sh -c` command built from fragments and rendered once.
///
/// The optional head and the tail are fixed at construction, so every
/// rendering starts and ends with them no matter how many fragments are pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    head: Option<String>,
    fragments: Vec<String>,
    tail: String,
    separator: &'static str,
}

impl ShellScript {
    pub fn new(separator: &'static str, tail: impl Into<String>) -> Self {
        Self {
            head: None,
            fragments: Vec::new(),
            tail: tail.into(),
            separator,
        }
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn render(&self) -> String {
        self.head
            .iter()
            .chain(self.fragments.iter())
            .chain(std::iter::once(&self.tail))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(self.separator)
    }
}
