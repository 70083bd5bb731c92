//! Bundle ownership and dependency-ordered reference resolution.

use std::collections::HashMap;

use crate::bundle::Bundle;
use crate::error::{BundleError, Result};

/// Owns the full set of registered bundles, keyed by normalized path and
/// alias.
///
/// Read-only after construction: lookup and resolution take `&self` and never
/// mutate shared state, so concurrent requests can resolve references without
/// locking.
#[derive(Debug)]
pub struct BundleContainer {
    bundles: Vec<Bundle>,
    index: HashMap<String, usize>,
}

/// Canonical form of a bundle reference.
///
/// Application-relative paths lose their `~` prefix, backslashes and
/// surrounding slashes; URLs pass through unchanged.
pub(crate) fn normalize_reference(reference: &str) -> String {
    let trimmed = reference.trim();
    if trimmed.contains("://") || trimmed.starts_with("//") {
        return trimmed.to_string();
    }
    let cleaned = trimmed.trim_start_matches('~').replace('\\', "/");
    cleaned.trim_matches('/').to_string()
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl BundleContainer {
    /// Build a container from registered bundles plus an alias map
    /// (alias to bundle path).
    ///
    /// Fails fast when two bundles share a path, an alias shadows an existing
    /// key, an alias targets an unregistered path, or any bundle's dependency
    /// list names an unregistered bundle.
    pub fn new(bundles: Vec<Bundle>, aliases: HashMap<String, String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(bundles.len() + aliases.len());
        for (position, bundle) in bundles.iter().enumerate() {
            let key = normalize_reference(&bundle.path);
            if index.insert(key.clone(), position).is_some() {
                return Err(BundleError::Registration {
                    path: bundle.path.clone(),
                    source: anyhow::anyhow!("a bundle with path `{key}` is already registered"),
                });
            }
        }

        for (alias, target) in &aliases {
            let key = normalize_reference(alias);
            let position =
                *index
                    .get(&normalize_reference(target))
                    .ok_or_else(|| BundleError::BundleNotFound {
                        reference: target.clone(),
                    })?;
            if index.insert(key, position).is_some() {
                return Err(BundleError::Registration {
                    path: alias.clone(),
                    source: anyhow::anyhow!("alias `{alias}` collides with a registered bundle"),
                });
            }
        }

        let container = Self { bundles, index };
        for bundle in &container.bundles {
            for reference in &bundle.references {
                container.find(reference)?;
            }
        }
        Ok(container)
    }

    /// Build a container without aliases.
    pub fn from_bundles(bundles: Vec<Bundle>) -> Result<Self> {
        Self::new(bundles, HashMap::new())
    }

    /// All registered bundles in registration order.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Look up a bundle by path or alias.
    pub fn get(&self, reference: &str) -> Option<&Bundle> {
        self.index
            .get(&normalize_reference(reference))
            .map(|&position| &self.bundles[position])
    }

    /// Look up a bundle by path or alias, failing when unknown.
    pub fn find(&self, reference: &str) -> Result<&Bundle> {
        self.get(reference).ok_or_else(|| BundleError::BundleNotFound {
            reference: reference.to_string(),
        })
    }

    /// Resolve requested references into a dependency-ordered bundle sequence.
    ///
    /// Dependencies are emitted before their dependents; among independent
    /// bundles first-reference order is preserved; no bundle appears twice.
    /// The optional location filter keeps only bundles whose page location
    /// matches (`None` matches bundles without a location tag).
    pub fn include_references<I, S>(
        &self,
        references: I,
        location: Option<&str>,
    ) -> Result<Vec<&Bundle>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut marks = vec![Mark::Unvisited; self.bundles.len()];
        let mut stack = Vec::new();
        let mut order = Vec::new();

        for reference in references {
            let position = self.position(reference.as_ref())?;
            self.visit(position, &mut marks, &mut stack, &mut order)?;
        }

        Ok(order
            .into_iter()
            .map(|position| &self.bundles[position])
            .filter(|bundle| bundle.page_location.as_deref() == location)
            .collect())
    }

    fn position(&self, reference: &str) -> Result<usize> {
        self.index
            .get(&normalize_reference(reference))
            .copied()
            .ok_or_else(|| BundleError::BundleNotFound {
                reference: reference.to_string(),
            })
    }

    fn visit(
        &self,
        position: usize,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match marks[position] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = stack
                    .iter()
                    .position(|&entry| entry == position)
                    .unwrap_or(0);
                let mut names: Vec<&str> = stack[start..]
                    .iter()
                    .map(|&entry| self.bundles[entry].path.as_str())
                    .collect();
                names.push(&self.bundles[position].path);
                return Err(BundleError::CircularReference {
                    cycle: names.join(" -> "),
                });
            }
            Mark::Unvisited => {}
        }

        marks[position] = Mark::InProgress;
        stack.push(position);
        for reference in &self.bundles[position].references {
            let dependency = self.position(reference)?;
            self.visit(dependency, marks, stack, order)?;
        }
        stack.pop();
        marks[position] = Mark::Done;
        order.push(position);
        Ok(())
    }
}
