use core::fmt::Debug;

/// Incremental MIN/MAX aggregation
pub mod min_max;
/// Incremental SUM aggregation
pub mod sum;

/// Type alias for a function applying a delta to an aggregate covering `len` leaves.
pub type ApplyDeltaFn<P, D> = fn(P, u64, D) -> P;
/// Type alias for a function composing two pending deltas.
pub type ComposeDeltaFn<D> = fn(D, D) -> D;

/// Aggregation interface that library users must implement to use a [crate::SegmentTree]
///
/// segtree provides a set of pre-defined aggregator implementations including:
/// - [sum]
/// - [min_max]
///
/// # Example
///
/// Here is a simple example showing how to create a SUM aggregator using u32.
/// ```
/// use segtree::Aggregator;
///
/// #[derive(Default, Debug, Clone)]
/// struct MySumAggregator;
///
/// impl Aggregator for MySumAggregator {
///     const IDENTITY: Self::PartialAggregate = 0u32;
///     type PartialAggregate = u32;
///     type Delta = u32;
///
///     fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate {
///        a + b
///     }
/// }
/// ```
pub trait Aggregator: Default + Debug + Clone + 'static {
    /// Identity value for [Self::PartialAggregate] under [Self::combine].
    ///
    /// For example, for SUM types the identity value should be set to 0.
    const IDENTITY: Self::PartialAggregate;

    /// Partial Aggregate type stored in every tree node.
    type PartialAggregate: PartialAggregateType;

    /// Offset type accepted by lazy range updates.
    ///
    /// Only meaningful for aggregators that return a rule from
    /// [Self::delta_rule] or trees configured with a custom
    /// [DeltaRule]; for other aggregators any placeholder type will do.
    type Delta: DeltaBounds;

    /// Combines two partial aggregates and produces a new [Self::PartialAggregate].
    ///
    /// Must be associative over all reachable values:
    /// `combine(combine(a, b), c) == combine(a, combine(b, c))`.
    fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate;

    /// Combines a slice of partial aggregates into a new partial
    ///
    /// A default implementation is provided that folds the slice with
    /// [Self::combine] starting from [Self::IDENTITY].
    #[inline]
    fn combine_slice(slice: &[Self::PartialAggregate]) -> Self::PartialAggregate {
        slice.iter().copied().fold(Self::IDENTITY, Self::combine)
    }

    /// Returns the rule enabling lazy range updates for this aggregator
    ///
    /// Is set to `None` by default
    fn delta_rule() -> Option<DeltaRule<Self>> {
        None
    }

    /// Returns `true` if the Aggregator supports lazy range updates
    fn lazy_support() -> bool {
        Self::delta_rule().is_some()
    }
}

/// Defines how deferred range updates are applied and composed
///
/// `apply` folds a delta into the aggregate of a node covering `len` leaves;
/// `compose` accumulates a new delta into an already pending one. For a SUM
/// aggregate the pair is `value + len * delta` and plain addition.
pub struct DeltaRule<A: Aggregator> {
    pub(crate) apply: ApplyDeltaFn<A::PartialAggregate, A::Delta>,
    pub(crate) compose: ComposeDeltaFn<A::Delta>,
}

impl<A: Aggregator> DeltaRule<A> {
    /// Creates a new DeltaRule from an apply and a compose function
    pub fn new(
        apply: ApplyDeltaFn<A::PartialAggregate, A::Delta>,
        compose: ComposeDeltaFn<A::Delta>,
    ) -> Self {
        Self { apply, compose }
    }
}

impl<A: Aggregator> Clone for DeltaRule<A> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<A: Aggregator> Copy for DeltaRule<A> {}

impl<A: Aggregator> Debug for DeltaRule<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("DeltaRule")
    }
}

/// Trait bounds for a partial aggregate type
pub trait PartialAggregateType: Default + Debug + Clone + Copy + Send {}
impl<T> PartialAggregateType for T where T: Default + Debug + Clone + Copy + Send {}

/// Trait bounds for a range-update delta type
pub trait DeltaBounds: Debug + Clone + Copy + Send {}
impl<T> DeltaBounds for T where T: Debug + Clone + Copy + Send {}
