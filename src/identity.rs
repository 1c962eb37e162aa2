// src/identity.rs
//
// Hierarchical item identities shared by types, functions and variables
// across the current module and every referenced module.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// Name of a module (`System.Runtime`, `Script`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(Rc<str>);

impl ModuleName {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One segment of an item path: the item's name and its own type parameter count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemPathEntry {
    pub name: Rc<str>,
    pub type_param_count: usize,
}

impl ItemPathEntry {
    pub fn new(name: &str, type_param_count: usize) -> Self {
        Self {
            name: Rc::from(name),
            type_param_count,
        }
    }
}

impl fmt::Display for ItemPathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.type_param_count == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}`{}", self.name, self.type_param_count)
        }
    }
}

/// Identifies a type, function or variable: owning module plus the path of
/// `(name, typeParamCount)` entries from the module root. Equality is
/// structural over the module and the full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaItemId {
    module: ModuleName,
    path: SmallVec<[ItemPathEntry; 2]>,
}

impl MetaItemId {
    /// A top-level item of `module`.
    pub fn new(module: ModuleName, name: &str, type_param_count: usize) -> Self {
        let mut path = SmallVec::new();
        path.push(ItemPathEntry::new(name, type_param_count));
        Self { module, path }
    }

    /// A member nested directly under `self`.
    pub fn child(&self, name: &str, type_param_count: usize) -> Self {
        let mut path = self.path.clone();
        path.push(ItemPathEntry::new(name, type_param_count));
        Self {
            module: self.module.clone(),
            path,
        }
    }

    /// The enclosing item, if this is a member.
    pub fn parent(&self) -> Option<Self> {
        if self.path.len() <= 1 {
            return None;
        }
        let mut path = self.path.clone();
        path.pop();
        Some(Self {
            module: self.module.clone(),
            path,
        })
    }

    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    pub fn is_top_level(&self) -> bool {
        self.path.len() == 1
    }

    fn last(&self) -> &ItemPathEntry {
        // Constructors always push at least one entry
        &self.path[self.path.len() - 1]
    }

    pub fn name(&self) -> &str {
        &self.last().name
    }

    pub fn type_param_count(&self) -> usize {
        self.last().type_param_count
    }
}

impl fmt::Display for MetaItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::", self.module)?;
        for (i, entry) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
