use core::fmt::{self, Display};

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

use crate::aggregator::Aggregator;

/// A node covering one closed sub-interval `[start, end]` of the tree's domain
///
/// The interval boundaries are fixed at construction; mutation only ever
/// touches the aggregate value and the pending marker. Children are owned
/// exclusively by their parent and exist iff the node is internal
/// (`start != end`).
#[derive(Debug)]
pub struct Node<A: Aggregator> {
    pub(crate) start: i64,
    pub(crate) end: i64,
    pub(crate) value: A::PartialAggregate,
    pub(crate) pending: Option<A::Delta>,
    pub(crate) children: Option<Box<Children<A>>>,
}

#[derive(Debug)]
pub(crate) struct Children<A: Aggregator> {
    pub(crate) left: Node<A>,
    pub(crate) right: Node<A>,
}

impl<A: Aggregator> Node<A> {
    pub(crate) fn leaf(index: i64, value: A::PartialAggregate) -> Self {
        Self {
            start: index,
            end: index,
            value,
            pending: None,
            children: None,
        }
    }

    pub(crate) fn internal(start: i64, end: i64, left: Node<A>, right: Node<A>) -> Self {
        let value = A::combine(left.value, right.value);
        Self {
            start,
            end,
            value,
            pending: None,
            children: Some(Box::new(Children { left, right })),
        }
    }

    /// Returns the closed interval `(start, end)` covered by this node
    pub fn range(&self) -> (i64, i64) {
        (self.start, self.end)
    }

    /// Returns the aggregate currently stored in this node
    ///
    /// Exact for the node's interval unless the node itself carries an
    /// unflushed pending marker planted by a deferred range update.
    pub fn value(&self) -> A::PartialAggregate {
        self.value
    }

    /// Returns `true` if this node covers a single elementary index
    pub fn is_leaf(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this node carries an unflushed pending marker
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the number of elementary indices covered by this node
    pub fn size(&self) -> u64 {
        (self.end - self.start + 1) as u64
    }

    /// Returns a reference to the left child, if the node is internal
    pub fn left(&self) -> Option<&Node<A>> {
        self.children.as_deref().map(|c| &c.left)
    }

    /// Returns a reference to the right child, if the node is internal
    pub fn right(&self) -> Option<&Node<A>> {
        self.children.as_deref().map(|c| &c.right)
    }

    pub(crate) fn mid(&self) -> i64 {
        self.start + (self.end - self.start) / 2
    }
}

impl<A: Aggregator> Display for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ~ {} : {:?})", self.start, self.end, self.value)
    }
}
