//! Bounding volume hierarchy over axis-aligned boxes.

use crate::bounds::Aabb2;
use crate::primitives::Point2;
use num_traits::Float;

#[derive(Debug, Clone)]
enum Node<F> {
    Leaf {
        bounds: Aabb2<F>,
        first: usize,
        count: usize,
    },
    Internal {
        bounds: Aabb2<F>,
        left: usize,
        right: usize,
    },
}

impl<F: Float> Node<F> {
    fn bounds(&self) -> Aabb2<F> {
        match self {
            Node::Leaf { bounds, .. } | Node::Internal { bounds, .. } => *bounds,
        }
    }
}

/// A static tree of boxes answering "which boxes contain this point" and
/// "which boxes overlap this box".
///
/// Items are identified by their position in the slice passed to
/// [`BoxTree::build`].
///
/// # Example
///
/// ```
/// use arcgraph::bounds::Aabb2;
/// use arcgraph::spatial::BoxTree;
/// use arcgraph::Point2;
///
/// let boxes = vec![
///     Aabb2::from_corners(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
///     Aabb2::from_corners(Point2::new(5.0, 5.0), Point2::new(6.0, 6.0)),
/// ];
/// let tree = BoxTree::build(&boxes, 1);
/// assert_eq!(tree.query_point(Point2::new(1.0, 1.0)), vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct BoxTree<F> {
    nodes: Vec<Node<F>>,
    boxes: Vec<Aabb2<F>>,
    indices: Vec<usize>,
    root: usize,
}

impl<F: Float> BoxTree<F> {
    /// Builds a tree with at most `max_leaf_size` boxes per leaf.
    pub fn build(boxes: &[Aabb2<F>], max_leaf_size: usize) -> Self {
        let n = boxes.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut nodes = Vec::with_capacity(2 * n);
        let root = if n == 0 {
            0
        } else {
            build_recursive(boxes, &mut indices, 0, n, max_leaf_size.max(1), &mut nodes)
        };
        Self {
            nodes,
            boxes: boxes.to_vec(),
            indices,
            root,
        }
    }

    /// Returns true if the tree holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Number of boxes in the tree.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Indices of the boxes that contain `point`, boundary included.
    pub fn query_point(&self, point: Point2<F>) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit(|bb| bb.contains_point(point), &mut out);
        out
    }

    /// Indices of the boxes that overlap `query`.
    pub fn query_aabb(&self, query: Aabb2<F>) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit(|bb| bb.intersects(query), &mut out);
        out
    }

    fn visit(&self, test: impl Fn(Aabb2<F>) -> bool, out: &mut Vec<usize>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !test(node.bounds()) {
                continue;
            }
            match *node {
                Node::Leaf { first, count, .. } => {
                    for &item in &self.indices[first..first + count] {
                        if test(self.boxes[item]) {
                            out.push(item);
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}

fn build_recursive<F: Float>(
    boxes: &[Aabb2<F>],
    indices: &mut [usize],
    start: usize,
    end: usize,
    max_leaf_size: usize,
    nodes: &mut Vec<Node<F>>,
) -> usize {
    let count = end - start;
    let bounds = indices[start + 1..end]
        .iter()
        .fold(boxes[indices[start]], |acc, &i| acc.union(boxes[i]));

    if count <= max_leaf_size {
        nodes.push(Node::Leaf {
            bounds,
            first: start,
            count,
        });
        return nodes.len() - 1;
    }

    // median split on the longer axis
    let by_x = bounds.width() > bounds.height();
    let key = |i: usize| {
        let c = boxes[i].center();
        if by_x {
            c.x
        } else {
            c.y
        }
    };
    indices[start..end].sort_by(|&a, &b| {
        key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mid = start + count / 2;

    let node_idx = nodes.len();
    nodes.push(Node::Internal {
        bounds,
        left: 0,
        right: 0,
    });
    let left = build_recursive(boxes, indices, start, mid, max_leaf_size, nodes);
    let right = build_recursive(boxes, indices, mid, end, max_leaf_size, nodes);
    nodes[node_idx] = Node::Internal {
        bounds,
        left,
        right,
    };
    node_idx
}
