use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RangeError {
    #[error("cannot compute a range over zero values")]
    EmptyInput,
    #[error("bucket size must be positive and finite, got {0}")]
    InvalidBucketSize(f64),
}

/// Smallest bucket-aligned inclusive range covering every value.
///
/// Uses true floor/ceil on the quotient, so values already on a bucket
/// boundary stay there and re-running on the output returns it unchanged.
pub fn compute_range(values: &[f64], bucket_size: f64) -> Result<(f64, f64), RangeError> {
    if !bucket_size.is_finite() || bucket_size <= 0.0 {
        return Err(RangeError::InvalidBucketSize(bucket_size));
    }
    let Some((&first, rest)) = values.split_first() else {
        return Err(RangeError::EmptyInput);
    };

    let (min, max) = rest
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let low = bucket_size * (min / bucket_size).floor();
    let high = bucket_size * (max / bucket_size).ceil();
    Ok((low, high))
}
