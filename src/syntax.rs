//! Labeled syntax tree and the lookup accessors the model builder relies on.
//!
//! Nodes are addressed by label paths such as `"unit/unit_text"`: the first
//! segment is matched against direct children, the remainder is resolved
//! below the matching child. The builder only talks to [`SyntaxNode`], so any
//! tree that can answer these lookups can feed it.

/// Read-only view of one labeled node of a parsed source.
pub trait SyntaxNode: Sized {
    fn label(&self) -> &str;

    /// Source text covered by the node.
    fn contents(&self) -> &str;

    fn children(&self) -> &[Self];

    /// First child (at or after `index`) matching the first path segment whose
    /// remaining path also resolves. Returns the index of that child together
    /// with the node the full path leads to.
    fn child_from(&self, path: &str, index: usize) -> Option<(usize, &Self)> {
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        self.children()
            .iter()
            .enumerate()
            .skip(index)
            .filter(|(_, c)| c.label() == head)
            .find_map(|(i, c)| match rest {
                None => Some((i, c)),
                Some(rest) => c.child(rest).map(|d| (i, d)),
            })
    }

    /// First node matching `path`.
    fn child(&self, path: &str) -> Option<&Self> {
        self.child_from(path, 0).map(|(_, c)| c)
    }

    /// Every node matching `path`, in source order.
    fn children_matching<'a>(&'a self, path: &'a str) -> ChildrenMatching<'a, Self> {
        ChildrenMatching {
            node: self,
            path,
            next: 0,
        }
    }
}

/// Iterator behind [`SyntaxNode::children_matching`].
pub struct ChildrenMatching<'a, N> {
    node: &'a N,
    path: &'a str,
    next: usize,
}

impl<'a, N: SyntaxNode> Iterator for ChildrenMatching<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<&'a N> {
        let (i, found) = self.node.child_from(self.path, self.next)?;
        self.next = i + 1;
        Some(found)
    }
}

/// Owned labeled tree, as produced by [`crate::parser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    pub label: String,
    pub contents: String,
    pub children: Vec<SyntaxTree>,
}

impl SyntaxTree {
    pub fn leaf(label: &str, contents: &str) -> Self {
        SyntaxTree {
            label: label.to_string(),
            contents: contents.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: &str, children: Vec<SyntaxTree>) -> Self {
        let contents = children
            .iter()
            .map(|c| c.contents.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        SyntaxTree {
            label: label.to_string(),
            contents,
            children,
        }
    }
}

impl SyntaxNode for SyntaxTree {
    fn label(&self) -> &str {
        &self.label
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxTree {
        SyntaxTree::branch(
            "message",
            vec![
                SyntaxTree::leaf("name", "Engine"),
                SyntaxTree::branch("signal", vec![SyntaxTree::leaf("name", "Rpm")]),
                SyntaxTree::branch("other", vec![]),
                SyntaxTree::branch("signal", vec![SyntaxTree::leaf("name", "Temp")]),
            ],
        )
    }

    #[test]
    fn child_finds_first_match() {
        let t = sample();
        assert_eq!(t.child("name").map(|n| n.contents()), Some("Engine"));
        assert_eq!(t.child("signal/name").map(|n| n.contents()), Some("Rpm"));
        assert!(t.child("ecu").is_none());
    }

    #[test]
    fn child_from_reports_index() {
        let t = sample();
        let (i, sig) = t.child_from("signal", 2).expect("second signal");
        assert_eq!(i, 3);
        assert_eq!(sig.child("name").map(|n| n.contents()), Some("Temp"));
        assert!(t.child_from("signal", 4).is_none());
    }

    #[test]
    fn path_skips_children_without_the_rest() {
        let t = SyntaxTree::branch(
            "root",
            vec![
                SyntaxTree::branch("unit", vec![]),
                SyntaxTree::branch("unit", vec![SyntaxTree::leaf("unit_text", "rpm")]),
            ],
        );
        let (i, text) = t.child_from("unit/unit_text", 0).expect("unit text");
        assert_eq!(i, 1);
        assert_eq!(text.contents(), "rpm");
    }

    #[test]
    fn children_matching_in_source_order() {
        let t = sample();
        let names: Vec<_> = t
            .children_matching("signal/name")
            .map(|n| n.contents())
            .collect();
        assert_eq!(names, vec!["Rpm", "Temp"]);
    }
}
