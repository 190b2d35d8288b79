//! Display order for category series
//!
//! Categories whose name contains one of the configured priority substrings
//! come first, in priority-list order. Everything else keeps its original
//! relative order. This only decides where a series is drawn; it never
//! changes what gets summed.

use crate::ActivityCategory;

/// Index of the first priority substring found in `display_name`, case-insensitively.
pub fn priority_rank(display_name: &str, priorities: &[String]) -> Option<usize> {
    let name = display_name.to_lowercase();
    priorities
        .iter()
        .position(|p| !p.is_empty() && name.contains(&p.to_lowercase()))
}

/// Stable-sort categories into series order.
pub fn order_categories(
    categories: &[ActivityCategory],
    priorities: &[String],
) -> Vec<ActivityCategory> {
    let mut ordered: Vec<ActivityCategory> = categories.to_vec();
    ordered.sort_by_key(|c| priority_rank(&c.display_name, priorities).unwrap_or(usize::MAX));
    ordered
}
