use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Page starts kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Identifies one numbered page of one search run at one page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub search_id: i64,
    pub page_size: i64,
    pub page: i64,
}

/// Maps numbered pages to the `processed_item_id` they start at, so a page can be read
/// with a range scan instead of an offset scan. Lookups that miss fall back to the
/// offset scan; the index never changes which rows a page contains.
///
/// Holds at most `capacity` page starts. When full, whole search runs are evicted,
/// least recently used first. A single run never keeps more than `capacity` pages.
#[derive(Debug)]
pub struct PageIndex {
    capacity: usize,
    entries: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    /// search_id → (page_size, page) → start id.
    pages: HashMap<i64, HashMap<(i64, i64), i64>>,
    /// Search ids, least recently used at the front.
    recency: VecDeque<i64>,
    len: usize,
}

impl Entries {
    fn touch(&mut self, search_id: i64) {
        if let Some(pos) = self.recency.iter().position(|&id| id == search_id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(search_id);
    }

    fn insert(&mut self, capacity: usize, key: PageKey, start_id: i64) {
        let pages = self.pages.entry(key.search_id).or_default();
        let slot = (key.page_size, key.page);
        if !pages.contains_key(&slot) && pages.len() >= capacity {
            return;
        }
        if pages.insert(slot, start_id).is_none() {
            self.len += 1;
        }
    }

    /// Drops least recently used runs other than `keep` until within capacity.
    fn evict(&mut self, capacity: usize, keep: i64) {
        while self.len > capacity {
            match self.recency.front().copied() {
                Some(oldest) if oldest != keep => {
                    self.recency.pop_front();
                    if let Some(pages) = self.pages.remove(&oldest) {
                        self.len -= pages.len();
                    }
                }
                _ => break,
            }
        }
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero disables the index.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn start_id(&self, key: PageKey) -> Option<i64> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        let start = entries
            .pages
            .get(&key.search_id)?
            .get(&(key.page_size, key.page))
            .copied();
        if start.is_some() {
            entries.touch(key.search_id);
        }
        start
    }

    pub fn record(&self, key: PageKey, start_id: i64) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.insert(self.capacity, key, start_id);
        entries.touch(key.search_id);
        entries.evict(self.capacity, key.search_id);
    }

    /// Records every page start of a freshly committed run. `ids` must be ascending.
    pub fn record_run(&self, search_id: i64, page_size: i64, ids: &[i64]) {
        if self.capacity == 0 || page_size < 1 || ids.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        for (i, chunk) in ids.chunks(page_size as usize).enumerate() {
            let key = PageKey {
                search_id,
                page_size,
                page: i as i64 + 1,
            };
            entries.insert(self.capacity, key, chunk[0]);
        }
        entries.touch(search_id);
        entries.evict(self.capacity, search_id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|err| err.into_inner()).len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: i64) -> PageKey {
        PageKey {
            search_id: 7,
            page_size: 2,
            page,
        }
    }

    #[test]
    fn test_record_run_indexes_each_page_start() {
        let index = PageIndex::new();
        index.record_run(7, 2, &[11, 12, 13, 14, 15]);

        assert_eq!(index.start_id(key(1)), Some(11));
        assert_eq!(index.start_id(key(2)), Some(13));
        assert_eq!(index.start_id(key(3)), Some(15));
        assert_eq!(index.start_id(key(4)), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_keys_are_scoped_by_page_size() {
        let index = PageIndex::new();
        index.record(key(1), 11);
        let other_size = PageKey {
            page_size: 3,
            ..key(1)
        };
        assert_eq!(index.start_id(other_size), None);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used_runs() {
        let index = PageIndex::with_capacity(4);
        index.record_run(1, 2, &[1, 2, 3, 4]);
        index.record_run(2, 2, &[5, 6, 7, 8]);
        assert_eq!(index.len(), 4);

        // A hit makes run 1 the most recently used.
        let run_one = PageKey { search_id: 1, page_size: 2, page: 1 };
        assert_eq!(index.start_id(run_one), Some(1));

        index.record_run(3, 2, &[9, 10, 11]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.start_id(run_one), Some(1));
        assert_eq!(index.start_id(PageKey { search_id: 2, page_size: 2, page: 1 }), None);
        assert_eq!(index.start_id(PageKey { search_id: 3, page_size: 2, page: 2 }), Some(11));
    }

    #[test]
    fn test_many_runs_never_exceed_capacity() {
        let index = PageIndex::with_capacity(50);
        for search_id in 0..1_000 {
            let ids: Vec<i64> = (0..30).map(|n| search_id * 100 + n).collect();
            index.record_run(search_id, 13, &ids);
            assert!(index.len() <= 50);
        }
        assert_eq!(index.start_id(PageKey { search_id: 999, page_size: 13, page: 3 }), Some(99_926));
    }

    #[test]
    fn test_one_run_larger_than_capacity_keeps_its_first_pages() {
        let index = PageIndex::with_capacity(2);
        index.record_run(7, 2, &[11, 12, 13, 14, 15]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.start_id(key(1)), Some(11));
        assert_eq!(index.start_id(key(2)), Some(13));
        assert_eq!(index.start_id(key(3)), None);
    }

    #[test]
    fn test_zero_capacity_disables_the_index() {
        let index = PageIndex::with_capacity(0);
        index.record_run(7, 2, &[11, 12]);
        index.record(key(2), 13);
        assert_eq!(index.len(), 0);
        assert_eq!(index.start_id(key(1)), None);
    }
}
