use super::{Aggregator, DeltaRule};

macro_rules! sum_impl {
    ($struct:tt, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = 0 as $pa;

            type PartialAggregate = $pa;
            type Delta = $pa;

            #[inline]
            fn combine(
                a: Self::PartialAggregate,
                b: Self::PartialAggregate,
            ) -> Self::PartialAggregate {
                a + b
            }

            #[inline]
            fn delta_rule() -> Option<DeltaRule<Self>> {
                // value covers (r - l + 1) leaves, each shifted by delta
                Some(DeltaRule::new(
                    |value, len, delta| value + len as $pa * delta,
                    |a, b| a + b,
                ))
            }
        }
    };
}

sum_impl!(U32SumAggregator, u32);
sum_impl!(U64SumAggregator, u64);
sum_impl!(I32SumAggregator, i32);
sum_impl!(I64SumAggregator, i64);
sum_impl!(F64SumAggregator, f64);
