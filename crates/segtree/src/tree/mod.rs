/// Tree node
pub mod node;

pub use node::Node;

use core::fmt::Debug;

use crate::{
    Error,
    aggregator::{Aggregator, DeltaRule},
};

/// Configuration for a [SegmentTree]
///
/// Range updates are opt-in and decided at construction: a tree built with
/// the default configuration only supports queries and point updates.
///
/// # Example
/// ```
/// use segtree::{TreeConf, aggregator::sum::U64SumAggregator};
///
/// let conf: TreeConf<U64SumAggregator> = TreeConf::default().with_range_updates();
/// ```
pub struct TreeConf<A: Aggregator> {
    pub(crate) range_updates: bool,
    pub(crate) delta_rule: Option<DeltaRule<A>>,
}

impl<A: Aggregator> Default for TreeConf<A> {
    fn default() -> Self {
        Self {
            range_updates: false,
            delta_rule: None,
        }
    }
}

impl<A: Aggregator> Clone for TreeConf<A> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<A: Aggregator> Copy for TreeConf<A> {}

impl<A: Aggregator> Debug for TreeConf<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeConf")
            .field("range_updates", &self.range_updates)
            .field("delta_rule", &self.delta_rule)
            .finish()
    }
}

impl<A: Aggregator> TreeConf<A> {
    /// Enables lazy range updates using the aggregator's own delta rule
    ///
    /// If the aggregator returns `None` from [Aggregator::delta_rule] and no
    /// custom rule is supplied, [SegmentTree::modify] fails with
    /// [Error::UnsupportedOperation].
    pub fn with_range_updates(mut self) -> Self {
        self.range_updates = true;
        self
    }

    /// Supplies a custom delta rule, overriding the aggregator's own
    ///
    /// Implies [Self::with_range_updates].
    pub fn with_delta_rule(mut self, rule: DeltaRule<A>) -> Self {
        self.delta_rule = Some(rule);
        self.range_updates = true;
        self
    }
}

/// A segment tree over a fixed closed integer domain
///
/// The full node graph is allocated once at construction and torn down as a
/// whole when the tree is dropped. Interval boundaries never change after
/// construction; queries and updates only touch aggregate values and pending
/// markers.
///
/// # Example
/// ```
/// use segtree::{SegmentTree, aggregator::sum::U64SumAggregator};
///
/// let mut tree: SegmentTree<U64SumAggregator> =
///     SegmentTree::build(0, 4, |i| (i + 1) as u64).unwrap();
/// assert_eq!(tree.query(0, 4), Ok(15));
/// tree.update(0, 100).unwrap();
/// assert_eq!(tree.query(0, 4), Ok(114));
/// ```
#[derive(Debug)]
pub struct SegmentTree<A: Aggregator> {
    root: Node<A>,
    rule: Option<DeltaRule<A>>,
}

impl<A: Aggregator> SegmentTree<A> {
    /// Builds a tree over the closed domain `[start, end]` with the default
    /// configuration
    ///
    /// `producer` assigns each elementary index its base value. Fails with
    /// [Error::InvalidRange] if `start > end`, before any allocation.
    pub fn build(
        start: i64,
        end: i64,
        producer: impl FnMut(i64) -> A::PartialAggregate,
    ) -> Result<Self, Error> {
        Self::build_with_conf(start, end, producer, TreeConf::default())
    }

    /// Builds a tree over the closed domain `[start, end]` using `conf`
    pub fn build_with_conf(
        start: i64,
        end: i64,
        mut producer: impl FnMut(i64) -> A::PartialAggregate,
        conf: TreeConf<A>,
    ) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        let rule = if conf.range_updates {
            conf.delta_rule.or_else(A::delta_rule)
        } else {
            None
        };
        let root = Self::build_node(start, end, &mut producer);
        Ok(Self { root, rule })
    }

    /// Builds a tree over `[0, values.len() - 1]` from a slice of leaf values
    pub fn from_slice(values: &[A::PartialAggregate]) -> Result<Self, Error> {
        Self::from_slice_with_conf(values, TreeConf::default())
    }

    /// Builds a tree over `[0, values.len() - 1]` from a slice using `conf`
    pub fn from_slice_with_conf(
        values: &[A::PartialAggregate],
        conf: TreeConf<A>,
    ) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::InvalidRange { start: 0, end: -1 });
        }
        Self::build_with_conf(0, values.len() as i64 - 1, |i| values[i as usize], conf)
    }

    fn build_node(
        start: i64,
        end: i64,
        producer: &mut impl FnMut(i64) -> A::PartialAggregate,
    ) -> Node<A> {
        if start == end {
            Node::leaf(start, producer(start))
        } else {
            let mid = start + (end - start) / 2;
            let left = Self::build_node(start, mid, producer);
            let right = Self::build_node(mid + 1, end, producer);
            Node::internal(start, end, left, right)
        }
    }

    /// Returns the closed domain `(start, end)` this tree was built over
    pub fn range(&self) -> (i64, i64) {
        self.root.range()
    }

    /// Returns the number of elementary indices in the domain
    pub fn size(&self) -> u64 {
        self.root.size()
    }

    /// Returns `true` if the tree was built with lazy range updates enabled
    /// and an effective delta rule
    pub fn is_lazy(&self) -> bool {
        self.rule.is_some()
    }

    /// Returns a reference to the root node, for inspection
    pub fn root(&self) -> &Node<A> {
        &self.root
    }

    /// Queries the aggregate over the closed range `[start, end]`
    ///
    /// Decomposes the range into `O(log n)` canonically matching nodes,
    /// flushing pending markers on the way down. `query(i, i)` is the point
    /// query. Fails with [Error::OutOfRange] if the range falls outside the
    /// domain.
    pub fn query(&mut self, start: i64, end: i64) -> Result<A::PartialAggregate, Error> {
        self.check_range(start, end)?;
        Ok(Self::query_node(&mut self.root, start, end, self.rule))
    }

    /// Overwrites the elementary value at `index` and recomputes the
    /// aggregates along the ancestor chain
    ///
    /// The descent performs no push-down: a point update targets the finest
    /// granularity and does not depend on sibling contents. On a lazy tree
    /// this assumes no unflushed pending marker sits on the root-to-leaf
    /// path; interleave a [Self::query] over the previously modified range
    /// before mixing `update` into it.
    pub fn update(&mut self, index: i64, value: A::PartialAggregate) -> Result<(), Error> {
        self.check_range(index, index)?;
        Self::update_node(&mut self.root, index, value);
        Ok(())
    }

    /// Applies `delta` uniformly to every elementary value in `[start, end]`
    ///
    /// Propagation to descendants is deferred: nodes exactly covered by the
    /// range fold the delta into their aggregate and park it as a pending
    /// marker, pushed down when they are next visited. Fails with
    /// [Error::UnsupportedOperation] unless the tree was built with range
    /// updates enabled and an effective delta rule, and with
    /// [Error::OutOfRange] if the range falls outside the domain; both checks
    /// run before any mutation.
    pub fn modify(&mut self, start: i64, end: i64, delta: A::Delta) -> Result<(), Error> {
        let Some(rule) = self.rule else {
            return Err(Error::UnsupportedOperation);
        };
        self.check_range(start, end)?;
        Self::modify_node(&mut self.root, start, end, delta, rule);
        Ok(())
    }

    fn check_range(&self, start: i64, end: i64) -> Result<(), Error> {
        let (low, high) = self.root.range();
        if start > end || start < low || end > high {
            return Err(Error::OutOfRange {
                start,
                end,
                low,
                high,
            });
        }
        Ok(())
    }

    fn query_node(
        node: &mut Node<A>,
        start: i64,
        end: i64,
        rule: Option<DeltaRule<A>>,
    ) -> A::PartialAggregate {
        Self::push_down(node, rule);
        if node.start == start && node.end == end {
            return node.value;
        }
        let mid = node.mid();
        match node.children.as_deref_mut() {
            // a strict sub-range only ever occurs on an internal node
            None => node.value,
            Some(children) => {
                if end <= mid {
                    Self::query_node(&mut children.left, start, end, rule)
                } else if start > mid {
                    Self::query_node(&mut children.right, start, end, rule)
                } else {
                    let left = Self::query_node(&mut children.left, start, mid, rule);
                    let right = Self::query_node(&mut children.right, mid + 1, end, rule);
                    A::combine(left, right)
                }
            }
        }
    }

    fn update_node(node: &mut Node<A>, index: i64, value: A::PartialAggregate) {
        if node.is_leaf() {
            node.value = value;
            return;
        }
        let mid = node.mid();
        if let Some(children) = node.children.as_deref_mut() {
            if index <= mid {
                Self::update_node(&mut children.left, index, value);
            } else {
                Self::update_node(&mut children.right, index, value);
            }
            node.value = A::combine(children.left.value, children.right.value);
        }
    }

    fn modify_node(node: &mut Node<A>, start: i64, end: i64, delta: A::Delta, rule: DeltaRule<A>) {
        Self::push_down(node, Some(rule));
        if node.start == start && node.end == end {
            Self::apply_delta(node, delta, rule);
            return;
        }
        let mid = node.mid();
        if let Some(children) = node.children.as_deref_mut() {
            if end <= mid {
                Self::modify_node(&mut children.left, start, end, delta, rule);
            } else if start > mid {
                Self::modify_node(&mut children.right, start, end, delta, rule);
            } else {
                Self::modify_node(&mut children.left, start, mid, delta, rule);
                Self::modify_node(&mut children.right, mid + 1, end, delta, rule);
            }
            // own pending was flushed above, so recombining keeps this
            // aggregate exact
            node.value = A::combine(children.left.value, children.right.value);
        }
    }

    /// Folds `delta` into a node that is exactly covered by an update, and
    /// parks it as pending on internal nodes. Pendings compose, never
    /// overwrite. Leaf values are final once set, so leaves carry no marker.
    fn apply_delta(node: &mut Node<A>, delta: A::Delta, rule: DeltaRule<A>) {
        node.value = (rule.apply)(node.value, node.size(), delta);
        if !node.is_leaf() {
            node.pending = Some(match node.pending {
                Some(pending) => (rule.compose)(pending, delta),
                None => delta,
            });
        }
    }

    fn push_down(node: &mut Node<A>, rule: Option<DeltaRule<A>>) {
        let Some(delta) = node.pending.take() else {
            return;
        };
        // a pending marker can only be planted through `modify`, which
        // requires a rule, so `rule` is present whenever `pending` is
        let Some(rule) = rule else { return };
        if let Some(children) = node.children.as_deref_mut() {
            Self::apply_delta(&mut children.left, delta, rule);
            Self::apply_delta(&mut children.right, delta, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{
        min_max::I64MaxAggregator,
        sum::{I64SumAggregator, U64SumAggregator},
    };
    use proptest::prelude::*;

    fn lazy_sum_tree(values: &[i64]) -> SegmentTree<I64SumAggregator> {
        let conf = TreeConf::default().with_range_updates();
        SegmentTree::from_slice_with_conf(values, conf).unwrap()
    }

    #[test]
    fn build_query_matches_fold() {
        let values: Vec<u64> = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::from_slice(&values).unwrap();
        for a in 0..values.len() {
            for b in a..values.len() {
                let expected = U64SumAggregator::combine_slice(&values[a..=b]);
                assert_eq!(tree.query(a as i64, b as i64), Ok(expected));
            }
        }
    }

    #[test]
    fn concrete_scenario() {
        let conf = TreeConf::default().with_range_updates();
        let mut tree: SegmentTree<I64SumAggregator> =
            SegmentTree::build_with_conf(0, 4, |i| [1, 2, 3, 4, 5][i as usize], conf).unwrap();

        assert_eq!(tree.query(1, 3), Ok(9));
        tree.modify(1, 3, 10).unwrap();
        assert_eq!(tree.query(1, 3), Ok(39));
        assert_eq!(tree.query(0, 0), Ok(1));
        assert_eq!(tree.query(0, 4), Ok(45));
    }

    #[test]
    fn repeated_queries_are_idempotent() {
        let mut tree = lazy_sum_tree(&[1, 2, 3, 4, 5, 6, 7, 8]);
        tree.modify(2, 6, 3).unwrap();
        let first = tree.query(1, 7).unwrap();
        for _ in 0..4 {
            assert_eq!(tree.query(1, 7), Ok(first));
        }
    }

    #[test]
    fn point_update_matches_rebuild() {
        let mut values: Vec<i64> = (0..13).map(|i| i * i - 7).collect();
        let mut tree: SegmentTree<I64SumAggregator> = SegmentTree::from_slice(&values).unwrap();

        tree.update(5, 1000).unwrap();
        values[5] = 1000;
        assert_eq!(tree.query(5, 5), Ok(1000));

        let mut rebuilt: SegmentTree<I64SumAggregator> = SegmentTree::from_slice(&values).unwrap();
        for a in 0..values.len() {
            for b in a..values.len() {
                assert_eq!(
                    tree.query(a as i64, b as i64),
                    rebuilt.query(a as i64, b as i64),
                );
            }
        }
    }

    #[test]
    fn range_update_arithmetic() {
        let values: Vec<i64> = (1..=16).collect();
        let mut tree = lazy_sum_tree(&values);
        let mut original = lazy_sum_tree(&values);

        tree.modify(3, 11, 7).unwrap();

        // ranges fully inside the modified range shift by delta * width
        for (a, b) in [(3, 11), (3, 3), (5, 9), (11, 11)] {
            let expected = original.query(a, b).unwrap() + 7 * (b - a + 1);
            assert_eq!(tree.query(a, b), Ok(expected));
        }
        // disjoint ranges are unaffected
        for (a, b) in [(0, 2), (12, 15), (0, 0), (15, 15)] {
            assert_eq!(tree.query(a, b), original.query(a, b));
        }
    }

    #[test]
    fn sum_round_trip() {
        let values: Vec<u64> = (0..100).map(|i| i * 31 % 97).collect();
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::from_slice(&values).unwrap();
        assert_eq!(
            tree.query(0, values.len() as i64 - 1),
            Ok(values.iter().sum())
        );
    }

    #[test]
    fn single_element_domain() {
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::build(7, 7, |i| i as u64 * 2)
            .unwrap();
        assert_eq!(tree.range(), (7, 7));
        assert_eq!(tree.size(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.query(7, 7), Ok(14));
    }

    #[test]
    fn negative_domain_bounds() {
        let mut tree: SegmentTree<I64SumAggregator> = SegmentTree::build(-3, 4, |i| i).unwrap();
        assert_eq!(tree.size(), 8);
        assert_eq!(tree.query(-3, 4), Ok(4));
        assert_eq!(tree.query(-3, -1), Ok(-6));
        tree.update(-2, 10).unwrap();
        assert_eq!(tree.query(-3, -1), Ok(6));
    }

    #[test]
    fn invalid_construction() {
        let result: Result<SegmentTree<U64SumAggregator>, Error> =
            SegmentTree::build(5, 2, |_| 0);
        assert_eq!(
            result.err(),
            Some(Error::InvalidRange { start: 5, end: 2 })
        );

        let empty: Result<SegmentTree<U64SumAggregator>, Error> = SegmentTree::from_slice(&[]);
        assert!(empty.err().is_some_and(|e| e.is_invalid_range()));
    }

    #[test]
    fn out_of_range_access() {
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::build(0, 9, |_| 1).unwrap();

        let err = Error::OutOfRange {
            start: 3,
            end: 12,
            low: 0,
            high: 9,
        };
        assert_eq!(tree.query(3, 12), Err(err));
        assert!(tree.query(-1, 4).unwrap_err().is_out_of_range());
        // reversed bounds are rejected as well
        assert!(tree.query(6, 2).unwrap_err().is_out_of_range());
        assert!(tree.update(10, 5).unwrap_err().is_out_of_range());

        let conf = TreeConf::default().with_range_updates();
        let mut lazy: SegmentTree<U64SumAggregator> =
            SegmentTree::build_with_conf(0, 9, |_| 1, conf).unwrap();
        assert!(lazy.modify(5, 11, 2).unwrap_err().is_out_of_range());
        // the rejected modify left no partial state behind
        assert_eq!(lazy.query(0, 9), Ok(10));
    }

    #[test]
    fn modify_requires_opt_in() {
        // a sum tree built without range updates rejects modify
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::build(0, 7, |_| 1).unwrap();
        assert!(!tree.is_lazy());
        assert_eq!(tree.modify(0, 3, 5), Err(Error::UnsupportedOperation));
        assert_eq!(tree.query(0, 7), Ok(8));
    }

    #[test]
    fn custom_delta_rule() {
        // a uniform additive shift is a valid deferred update for MAX:
        // max(a + d, b + d) == max(a, b) + d
        let rule: DeltaRule<I64MaxAggregator> = DeltaRule::new(|value, _, delta| value + delta, |a, b| a + b);
        let conf = TreeConf::default().with_delta_rule(rule);
        let mut tree: SegmentTree<I64MaxAggregator> =
            SegmentTree::from_slice_with_conf(&[2, 3, 8, 4, 0, 1, 3, 9], conf).unwrap();
        assert!(tree.is_lazy());

        tree.modify(2, 5, 12).unwrap();
        assert_eq!(tree.query(1, 2), Ok(20));
        assert_eq!(tree.query(4, 6), Ok(13));
        assert_eq!(tree.query(6, 7), Ok(9));
    }

    #[test]
    fn pending_markers_compose() {
        let mut tree = lazy_sum_tree(&[0; 16]);
        // both updates target the same canonical node; the second composes
        // into the parked marker instead of overwriting it
        tree.modify(0, 7, 2).unwrap();
        tree.modify(0, 7, 3).unwrap();
        assert_eq!(tree.query(0, 15), Ok(40));
        assert_eq!(tree.query(3, 3), Ok(5));
        assert_eq!(tree.query(8, 15), Ok(0));
    }

    #[test]
    fn overlapping_modifies() {
        let values: Vec<i64> = (0..32).collect();
        let mut tree = lazy_sum_tree(&values);
        let mut model = values.clone();

        for (a, b, d) in [(0i64, 20i64, 5i64), (10, 31, -3), (15, 17, 100), (0, 31, 1)] {
            tree.modify(a, b, d).unwrap();
            for v in &mut model[a as usize..=b as usize] {
                *v += d;
            }
        }
        for a in (0..32).step_by(3) {
            for b in (a..32).step_by(5) {
                let expected: i64 = model[a as usize..=b as usize].iter().sum();
                assert_eq!(tree.query(a, b), Ok(expected));
            }
        }
    }

    #[test]
    fn partial_modify_recombines_ancestors() {
        let mut tree = lazy_sum_tree(&[1; 16]);
        // root is a partial-overlap node for this range, yet its aggregate
        // is exact immediately, without an intervening query
        tree.modify(3, 12, 2).unwrap();
        assert_eq!(tree.root().value(), 36);
        assert!(!tree.root().is_pending());
    }

    // function composition over affine maps x -> a*x + b: associative but
    // not commutative, so combine order is observable
    #[derive(Default, Debug, Clone, Copy)]
    struct AffineAggregator;

    impl Aggregator for AffineAggregator {
        const IDENTITY: Self::PartialAggregate = (1, 0);
        type PartialAggregate = (i64, i64);
        type Delta = i64;

        fn combine(
            (a1, b1): Self::PartialAggregate,
            (a2, b2): Self::PartialAggregate,
        ) -> Self::PartialAggregate {
            // right map applied after the left one
            (a1 * a2, b1 * a2 + b2)
        }
    }

    #[test]
    fn non_commutative_combine_order() {
        let maps: Vec<(i64, i64)> = vec![(2, 1), (3, -2), (1, 5), (2, 0), (5, 7)];
        let mut tree: SegmentTree<AffineAggregator> = SegmentTree::from_slice(&maps).unwrap();
        for a in 0..maps.len() {
            for b in a..maps.len() {
                let expected = maps[a..=b]
                    .iter()
                    .copied()
                    .reduce(AffineAggregator::combine)
                    .unwrap();
                assert_eq!(tree.query(a as i64, b as i64), Ok(expected));
            }
        }
    }

    #[test]
    fn deep_domain() {
        let n: i64 = 1 << 17;
        let mut tree: SegmentTree<U64SumAggregator> = SegmentTree::build(0, n - 1, |_| 1).unwrap();
        assert_eq!(tree.query(0, n - 1), Ok(n as u64));
        assert_eq!(tree.query(n / 2, n / 2), Ok(1));
    }

    proptest! {
        #[test]
        fn point_updates_match_model(
            mut model in proptest::collection::vec(-1000i64..1000, 1..100),
            ops in proptest::collection::vec((0usize..100, -1000i64..1000), 0..50),
            ranges in proptest::collection::vec((0usize..100, 0usize..100), 1..30),
        ) {
            let mut tree: SegmentTree<I64SumAggregator> =
                SegmentTree::from_slice(&model).unwrap();
            let n = model.len();

            for (idx, value) in ops {
                let idx = idx % n;
                tree.update(idx as i64, value).unwrap();
                model[idx] = value;
            }
            for (a, b) in ranges {
                let (a, b) = (a % n, b % n);
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                let expected: i64 = model[a..=b].iter().sum();
                prop_assert_eq!(tree.query(a as i64, b as i64), Ok(expected));
            }
        }

        #[test]
        fn range_updates_match_model(
            mut model in proptest::collection::vec(-1000i64..1000, 1..100),
            ops in proptest::collection::vec((0usize..100, 0usize..100, -50i64..50), 0..50),
            ranges in proptest::collection::vec((0usize..100, 0usize..100), 1..30),
        ) {
            let conf = TreeConf::default().with_range_updates();
            let mut tree: SegmentTree<I64SumAggregator> =
                SegmentTree::from_slice_with_conf(&model, conf).unwrap();
            let n = model.len();

            for (a, b, delta) in ops {
                let (a, b) = (a % n, b % n);
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                tree.modify(a as i64, b as i64, delta).unwrap();
                for v in &mut model[a..=b] {
                    *v += delta;
                }
            }
            for (a, b) in ranges {
                let (a, b) = (a % n, b % n);
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                let expected: i64 = model[a..=b].iter().sum();
                prop_assert_eq!(tree.query(a as i64, b as i64), Ok(expected));
            }
        }
    }
}
