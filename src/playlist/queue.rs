//! Playback order.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Decides which entry plays next under linear, looping and shuffled-looping
/// playback.
///
/// Entries move `pending -> current -> completed`. With `loop` set, an empty
/// `pending` is refilled from `completed` (optionally shuffled) so playback
/// never ends.
#[derive(Debug, Clone)]
pub struct PlaylistQueue<T> {
    pending: VecDeque<T>,
    completed: VecDeque<T>,
    current: Option<T>,
    looping: bool,
    loop_shuffle: bool,
}

impl<T> PlaylistQueue<T> {
    /// Create a queue holding `entries` in the given order.
    pub fn new(entries: impl IntoIterator<Item = T>, looping: bool, loop_shuffle: bool) -> Self {
        Self {
            pending: entries.into_iter().collect(),
            completed: VecDeque::new(),
            current: None,
            looping,
            loop_shuffle,
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_loop_shuffle(&self) -> bool {
        self.loop_shuffle
    }

    /// Advance to the next entry.
    ///
    /// The current entry (if any) is retired to `completed`. Returns the new
    /// current entry, or `None` when nothing is left to play.
    pub fn next(&mut self) -> Option<&T> {
        self.next_with(&mut rand::thread_rng())
    }

    /// [`next`](Self::next) with an explicit RNG for the reload shuffle.
    pub fn next_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&T> {
        if let Some(previous) = self.current.take() {
            self.completed.push_back(previous);
        }

        if self.pending.is_empty() && !self.completed.is_empty() && self.looping {
            self.reload_with(rng);
        }

        self.current = self.pending.pop_front();
        self.current.as_ref()
    }

    /// Move every completed entry back to the end of `pending`.
    ///
    /// With `loop_shuffle` set, `completed` is shuffled first; otherwise the
    /// original order is kept.
    pub fn reload(&mut self) {
        self.reload_with(&mut rand::thread_rng());
    }

    /// [`reload`](Self::reload) with an explicit RNG.
    pub fn reload_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.loop_shuffle {
            self.completed.make_contiguous().shuffle(rng);
        }
        self.pending.extend(self.completed.drain(..));
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Entry that the next call to [`next`](Self::next) would return, unless a reload intervenes.
    pub fn peek_next(&self) -> Option<&T> {
        self.pending.front()
    }

    /// Most recently completed entry.
    pub fn peek_last(&self) -> Option<&T> {
        self.completed.back()
    }

    pub fn push_pending_front(&mut self, entry: T) {
        self.pending.push_front(entry);
    }

    pub fn push_pending_back(&mut self, entry: T) {
        self.pending.push_back(entry);
    }

    pub fn push_completed_front(&mut self, entry: T) {
        self.completed.push_front(entry);
    }

    pub fn push_completed_back(&mut self, entry: T) {
        self.completed.push_back(entry);
    }

    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.pending.iter()
    }

    pub fn completed(&self) -> impl Iterator<Item = &T> {
        self.completed.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Total entries held: pending, completed and current.
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`next`](Self::next) can never return an entry again.
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
            && self.pending.is_empty()
            && (!self.looping || self.completed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_linear_playback() {
        let mut queue = PlaylistQueue::new(["a", "b", "c"], false, false);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_next(), Some(&"a"));

        assert_eq!(queue.next(), Some(&"a"));
        assert_eq!(queue.current(), Some(&"a"));
        assert_eq!(queue.next(), Some(&"b"));
        assert_eq!(queue.peek_last(), Some(&"a"));
        assert_eq!(queue.next(), Some(&"c"));
        assert_eq!(queue.len(), 3);
        assert!(!queue.is_exhausted());

        assert_eq!(queue.next(), None);
        assert_eq!(queue.completed_len(), 3);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_exhausted_stays_exhausted() {
        let mut queue = PlaylistQueue::new([1, 2], false, false);
        while queue.next().is_some() {}
        for _ in 0..5 {
            assert_eq!(queue.next(), None);
        }
        assert_eq!(queue.completed_len(), 2);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_loop_reloads_in_order() {
        let mut queue = PlaylistQueue::new(["a", "b"], true, false);
        let played: Vec<_> = (0..5).map(|_| *queue.next().unwrap()).collect();
        assert_eq!(played, vec!["a", "b", "a", "b", "a"]);
        assert!(!queue.is_exhausted());
    }

    #[test]
    fn test_reload_preserves_order_without_shuffle() {
        let mut queue = PlaylistQueue::new(Vec::<u32>::new(), false, false);
        for i in 0..5 {
            queue.push_pending_back(i);
        }
        for _ in 0..5 {
            queue.next();
        }
        // retire the last entry
        queue.next();
        assert_eq!(queue.pending_len(), 0);

        queue.reload();
        assert_eq!(queue.completed_len(), 0);
        assert_eq!(queue.pending().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_reload_shuffle_keeps_entries() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue = PlaylistQueue::new(0..20, true, true);
        for _ in 0..20 {
            queue.next_with(&mut rng);
        }
        queue.next_with(&mut rng);

        // one entry is current after the reload
        assert_eq!(queue.len(), 20);
        let mut seen: Vec<_> = queue.pending().copied().collect();
        seen.extend(queue.current().copied());
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_push_helpers() {
        let mut queue = PlaylistQueue::new(["b"], false, false);
        queue.push_pending_front("a");
        queue.push_pending_back("c");
        queue.push_completed_back("y");
        queue.push_completed_front("x");

        assert_eq!(queue.pending().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(queue.completed().copied().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(queue.peek_last(), Some(&"y"));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = PlaylistQueue::<u8>::new([], true, false);
        assert!(queue.is_empty());
        assert!(queue.is_exhausted());
        assert_eq!(queue.next(), None);
    }
}
