/// Number of pages needed for `item_count` items, never less than one.
pub fn page_count(item_count: usize, page_capacity: usize) -> usize {
    if page_capacity == 0 {
        return 1;
    }
    item_count.div_ceil(page_capacity).max(1)
}

/// The slice of items shown on `page_index`. Pages past the end are empty.
pub fn page_slice<T>(items: &[T], page_index: usize, page_capacity: usize) -> &[T] {
    if page_capacity == 0 {
        return &items[0..0];
    }
    let start = page_index.saturating_mul(page_capacity).min(items.len());
    let end = (start + page_capacity).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_items_at_capacity_ten_make_two_pages() {
        let items: Vec<usize> = (0..12).collect();
        let capacity = 2 * 5;
        assert_eq!(page_count(items.len(), capacity), 2);
        assert_eq!(page_slice(&items, 0, capacity), &items[0..10]);
        assert_eq!(page_slice(&items, 1, capacity), &items[10..12]);
    }

    #[test]
    fn empty_list_still_has_one_page() {
        let items: Vec<usize> = Vec::new();
        assert_eq!(page_count(items.len(), 35), 1);
        assert!(page_slice(&items, 0, 35).is_empty());
    }

    #[test]
    fn page_past_end_is_empty() {
        let items: Vec<usize> = (0..3).collect();
        assert!(page_slice(&items, 4, 10).is_empty());
    }

    #[test]
    fn capacity_change_repages_without_reordering() {
        let items: Vec<usize> = (0..12).collect();
        assert_eq!(page_count(items.len(), 6), 2);
        assert_eq!(page_count(items.len(), 4), 3);
        // Same underlying order, different slice boundaries.
        assert_eq!(page_slice(&items, 1, 4), &items[4..8]);
    }

    #[test]
    fn zero_capacity_is_inert() {
        let items: Vec<usize> = (0..3).collect();
        assert_eq!(page_count(items.len(), 0), 1);
        assert!(page_slice(&items, 0, 0).is_empty());
    }
}
