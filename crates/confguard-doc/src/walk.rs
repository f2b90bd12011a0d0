use crate::value::ConfigValue;
use std::fmt;

/// One step of a document path: a mapping key or a sequence index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

/// Location of a node within a document, from the root down.
///
/// Renders dotted with bracketed indices: `jobs.build.docker[1].image`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocPath {
    segs: Vec<PathSeg>,
}

impl DocPath {
    pub fn root() -> Self {
        DocPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.segs.is_empty()
    }

    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    /// The final mapping key, if the path ends in one.
    pub fn last_key(&self) -> Option<&str> {
        match self.segs.last() {
            Some(PathSeg::Key(k)) => Some(k),
            _ => None,
        }
    }

    fn child_key(&self, key: &str) -> Self {
        let mut segs = self.segs.clone();
        segs.push(PathSeg::Key(key.to_string()));
        DocPath { segs }
    }

    fn child_index(&self, index: usize) -> Self {
        let mut segs = self.segs.clone();
        segs.push(PathSeg::Index(index));
        DocPath { segs }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segs.is_empty() {
            return write!(f, ".");
        }
        let mut first = true;
        for seg in &self.segs {
            match seg {
                PathSeg::Key(key) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSeg::Index(index) => write!(f, "[{index}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Lazy depth-first traversal over a document.
///
/// Iterative (explicit stack), so adversarially deep input cannot exhaust the
/// call stack. Mapping entries are visited in lexicographic key order for
/// reproducible output; sequences in index order.
pub struct Walk<'a> {
    stack: Vec<(DocPath, &'a ConfigValue)>,
}

/// Traverse `root`, yielding every node (the root, every scalar, every
/// sequence element, every mapping entry) as a `(path, value)` pair.
pub fn walk(root: &ConfigValue) -> Walk<'_> {
    Walk {
        stack: vec![(DocPath::root(), root)],
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (DocPath, &'a ConfigValue);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, value) = self.stack.pop()?;
        match value {
            ConfigValue::Seq(items) => {
                for (index, item) in items.iter().enumerate().rev() {
                    self.stack.push((path.child_index(index), item));
                }
            }
            ConfigValue::Map(map) => {
                let mut entries: Vec<(&str, &'a ConfigValue)> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
                for (key, child) in entries.into_iter().rev() {
                    self.stack.push((path.child_key(key), child));
                }
            }
            _ => {}
        }
        Some((path, value))
    }
}

/// Lazily filter the traversal of `root` by a path/value predicate.
pub fn match_paths<'a, P>(
    root: &'a ConfigValue,
    predicate: P,
) -> impl Iterator<Item = (DocPath, &'a ConfigValue)>
where
    P: Fn(&DocPath, &ConfigValue) -> bool + 'a,
{
    walk(root).filter(move |(path, value)| predicate(path, value))
}

/// Project a field out of a mapping value.
///
/// `None` means absent; a present null is `Some(ConfigValue::Null)`. Never an
/// error on non-mapping values.
pub fn project<'a>(value: &'a ConfigValue, field: &str) -> Option<&'a ConfigValue> {
    match value {
        ConfigValue::Map(map) => map.get(field),
        _ => None,
    }
}

/// Follow a dotted key path (`build.docker`) from `root`. Key segments only;
/// sequence indexing is not part of the rule-facing path syntax.
pub fn lookup<'a>(root: &'a ConfigValue, dotted: &str) -> Option<&'a ConfigValue> {
    dotted
        .split('.')
        .try_fold(root, |node, segment| project(node, segment))
}
