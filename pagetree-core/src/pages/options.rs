/// Configuration for page tree enumeration and flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTreeOptions {
    /// Maximum nesting of `/Pages` nodes accepted during traversal.
    ///
    /// Unbounded by default; traversal keeps its own stack, so depth costs
    /// heap only. Set a limit to reject hostile documents early.
    pub max_depth: usize,
    /// Rewrite a root `/Count` that disagrees with the enumerated leaves instead of failing
    pub repair_count: bool,
    /// Push inheritable attributes down to the leaves when flattening
    pub push_inherited: bool,
}

impl Default for PageTreeOptions {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            repair_count: false,
            push_inherited: true,
        }
    }
}

impl PageTreeOptions {
    /// Strict defaults: a wrong `/Count` is reported, not repaired.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Tolerant settings for documents written by sloppy producers.
    pub fn lenient() -> Self {
        Self {
            repair_count: true,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_repair_count(mut self, repair: bool) -> Self {
        self.repair_count = repair;
        self
    }

    pub fn with_push_inherited(mut self, push: bool) -> Self {
        self.push_inherited = push;
        self
    }
}
