use crate::models::JobListing;

pub const INITIAL_VISIBLE: usize = 5;
pub const LOAD_MORE_STEP: usize = 5;

/// Newest first. Stable, so listings with equal timestamps keep their order.
pub fn sort_newest_first(listings: &mut [JobListing]) {
    listings.sort_by(|a, b| b.created.cmp(&a.created));
}

/// The first `visible_count` listings, clamped to what is available.
pub fn visible_slice(sorted: &[JobListing], visible_count: usize) -> &[JobListing] {
    &sorted[..visible_count.min(sorted.len())]
}

pub fn has_more(total: usize, visible_count: usize) -> bool {
    visible_count < total
}
