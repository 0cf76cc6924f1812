use super::Aggregator;

#[inline]
fn min<T: PartialOrd>(a: T, b: T) -> T {
    if a < b { a } else { b }
}

#[inline]
fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a > b { a } else { b }
}

macro_rules! min_impl {
    ($struct:tt, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = <$pa>::MAX;

            type PartialAggregate = $pa;
            // MIN has no additive delta rule; the type is a placeholder.
            type Delta = $pa;

            #[inline]
            fn combine(
                a: Self::PartialAggregate,
                b: Self::PartialAggregate,
            ) -> Self::PartialAggregate {
                min(a, b)
            }
        }
    };
}

macro_rules! max_impl {
    ($struct:tt, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = <$pa>::MIN;

            type PartialAggregate = $pa;
            // MAX has no additive delta rule; the type is a placeholder.
            type Delta = $pa;

            #[inline]
            fn combine(
                a: Self::PartialAggregate,
                b: Self::PartialAggregate,
            ) -> Self::PartialAggregate {
                max(a, b)
            }
        }
    };
}

min_impl!(U32MinAggregator, u32);
min_impl!(U64MinAggregator, u64);
min_impl!(I32MinAggregator, i32);
min_impl!(I64MinAggregator, i64);
min_impl!(F64MinAggregator, f64);

max_impl!(U32MaxAggregator, u32);
max_impl!(U64MaxAggregator, u64);
max_impl!(I32MaxAggregator, i32);
max_impl!(I64MaxAggregator, i64);
max_impl!(F64MaxAggregator, f64);
