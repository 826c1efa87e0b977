use crate::location::Location;

/// One provider call: a contiguous slice of the registry as origins, the
/// full registry as destinations. `offset` is the index of the first origin
/// within the registry.
pub struct Batch<'a> {
    pub origins: &'a [Location],
    pub destinations: &'a [Location],
    pub offset: usize,
}

/// Split the registry into origin batches of at most `max_origins` locations,
/// in registry order. The last batch keeps whatever remains; there is no
/// rebalancing.
pub fn plan_batches(locations: &[Location], max_origins: usize) -> Vec<Batch<'_>> {
    locations
        .chunks(max_origins)
        .enumerate()
        .map(|(i, origins)| Batch {
            origins,
            destinations: locations,
            offset: i * max_origins,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: usize) -> Vec<Location> {
        (0..n)
            .map(|i| Location::new(&format!("loc_{i}"), 10.0 + i as f64, 76.0))
            .collect()
    }

    #[test]
    fn test_batch_count() {
        let locations = registry(20);
        assert_eq!(plan_batches(&locations, 10).len(), 2);
        assert_eq!(plan_batches(&locations, 5).len(), 4);
        assert_eq!(plan_batches(&locations, 7).len(), 3);
    }

    #[test]
    fn test_batches_cover_registry_in_order() {
        let locations = registry(23);
        let batches = plan_batches(&locations, 10);

        let mut covered: Vec<&Location> = Vec::new();
        for batch in &batches {
            assert_eq!(batch.offset, covered.len());
            covered.extend(batch.origins.iter());
        }

        assert_eq!(covered.len(), locations.len());
        for (original, planned) in locations.iter().zip(covered) {
            assert_eq!(original, planned);
        }
    }

    #[test]
    fn test_destinations_are_full_registry() {
        let locations = registry(12);
        for batch in plan_batches(&locations, 5) {
            assert_eq!(batch.destinations.len(), locations.len());
        }
    }

    #[test]
    fn test_uneven_tail_batch() {
        let locations = registry(23);
        let batches = plan_batches(&locations, 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].origins.len(), 3);
        assert_eq!(batches[2].offset, 20);
    }

    #[test]
    fn test_single_batch_when_under_limit() {
        let locations = registry(4);
        let batches = plan_batches(&locations, 10);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].origins.len(), 4);
    }
}
