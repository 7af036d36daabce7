use crate::key::Key;

/// One frame of an in-progress resolution.
///
/// Frames live on the Rust call stack and link to the frame that requested
/// them, so the chain is scoped to a single top-level `resolve` call and never
/// shared between threads or contexts.
#[derive(Debug)]
pub struct ResolutionStack<'a> {
    key: Key,
    parent: Option<&'a ResolutionStack<'a>>,
    depth: usize,
}

impl<'a> ResolutionStack<'a> {
    pub(crate) fn root(key: Key) -> Self {
        Self {
            key,
            parent: None,
            depth: 1,
        }
    }

    pub(crate) fn push(parent: &'a ResolutionStack<'a>, key: Key) -> Self {
        Self {
            key,
            parent: Some(parent),
            depth: parent.depth + 1,
        }
    }

    /// Key being computed by this frame (the top of the stack)
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.frames().any(|frame| &frame.key == key)
    }

    /// Keys from the outermost request down to this frame
    pub fn chain(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.frames().map(|frame| frame.key.clone()).collect();
        keys.reverse();
        keys
    }

    fn frames(&self) -> impl Iterator<Item = &ResolutionStack<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chain_runs_outermost_first() {
        let root = ResolutionStack::root(Key::from("c"));
        let mid = ResolutionStack::push(&root, Key::from("b"));
        let top = ResolutionStack::push(&mid, Key::from("a"));

        assert_eq!(top.key(), &Key::from("a"));
        assert_eq!(top.depth(), 3);
        assert_eq!(
            top.chain(),
            vec![Key::from("c"), Key::from("b"), Key::from("a")]
        );
        assert!(top.contains(&Key::from("c")));
        assert!(!mid.contains(&Key::from("a")));
    }
}
