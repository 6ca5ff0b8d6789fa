use crate::errors::HookError;
use crate::name::DomainName;
use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

#[derive(Default)]
struct SuffixNode {
    children: HashMap<CompactString, SuffixNode, FxBuildHasher>,
    terminal: bool,
}

impl SuffixNode {
    fn new() -> Self {
        Self {
            children: HashMap::with_hasher(FxBuildHasher),
            terminal: false,
        }
    }
}

/// The shapes accepted when populating a [`SuffixSet`]: a bare string, an
/// already-validated name, or a priority-ordered list of strings (the
/// priorities are carried by the caller's format and ignored here).
pub enum SuffixInput {
    Text(String),
    Name(DomainName),
    Prioritized(Vec<(u32, String)>),
}

/// A set of domain-name suffixes with subdomain-inclusive matching:
/// adding `example.com` matches `example.com` and everything below it.
#[derive(Default)]
pub struct SuffixSet {
    root: SuffixNode,
    names: Vec<DomainName>,
}

impl SuffixSet {
    pub fn new() -> Self {
        Self {
            root: SuffixNode::new(),
            names: Vec::new(),
        }
    }

    /// Insert every valid element of `input`. Elements that fail name
    /// conversion are reported in the returned list (and logged) without
    /// aborting the rest of the batch; an empty return means full success.
    pub fn add(&mut self, input: SuffixInput) -> Vec<HookError> {
        let mut failures = Vec::new();
        match input {
            SuffixInput::Text(text) => {
                if let Err(e) = self.insert_text(&text) {
                    warn!(error = %e, entry = %text, "Suffix entry rejected");
                    failures.push(e);
                }
            }
            SuffixInput::Name(name) => self.insert_name(name),
            SuffixInput::Prioritized(entries) => {
                for (_, text) in entries {
                    if let Err(e) = self.insert_text(&text) {
                        warn!(error = %e, entry = %text, "Suffix entry rejected");
                        failures.push(e);
                    }
                }
            }
        }
        failures
    }

    fn insert_text(&mut self, text: &str) -> Result<(), HookError> {
        let name = DomainName::parse(text)?;
        self.insert_name(name);
        Ok(())
    }

    fn insert_name(&mut self, name: DomainName) {
        let mut node = &mut self.root;
        for label in name.as_str().split('.').rev() {
            node = node
                .children
                .entry(CompactString::new(label))
                .or_insert_with(SuffixNode::new);
        }
        node.terminal = true;
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// True if `name` equals an inserted suffix or lies below one.
    pub fn matches(&self, name: &DomainName) -> bool {
        let labels: SmallVec<[&str; 8]> = name.as_str().split('.').rev().collect();
        let mut node = &self.root;
        for label in labels {
            match node.children.get(label) {
                Some(child) => {
                    if child.terminal {
                        return true;
                    }
                    node = child;
                }
                None => return false,
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl fmt::Display for SuffixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in &self.names {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
            first = false;
        }
        Ok(())
    }
}
