//! OwningPoolの子オブジェクトを保持するslotの配列。
//! 空きslotはbitvecで探して再利用し、再利用するたびにgenerationを進める。

use bitvec::vec::BitVec;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub(super) struct Arena<T> {
    slots: Vec<Slot<T>>,
    occupied: BitVec,
    len: usize,
}
impl<T> Arena<T> {
    pub(super) fn new() -> Self {
        Self {
            slots: vec![],
            occupied: BitVec::new(),
            len: 0,
        }
    }

    /// (index, generation)を返す
    pub(super) fn insert(&mut self, value: T) -> (u32, u32) {
        self.len += 1;
        if let Some(index) = self.occupied.first_zero() {
            self.occupied.set(index, true);
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return (index as u32, slot.generation);
        }
        let index = self.slots.len();
        self.occupied.push(true);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index as u32, 0)
    }

    pub(super) fn get(&self, index: u32, generation: u32) -> Option<&T> {
        let index = index as usize;
        if !self.occupied.get(index).map_or(false, |bit| *bit) {
            return None;
        }
        let slot = &self.slots[index];
        if slot.generation != generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub(super) fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        self.get(index, generation)?;
        let index = index as usize;
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        self.occupied.set(index, false);
        self.len -= 1;
        slot.value.take()
    }

    /// 生きている要素を(index, generation, value)で列挙する
    pub(super) fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.occupied.iter_ones().filter_map(move |index| {
            let slot = &self.slots[index];
            slot.value
                .as_ref()
                .map(|value| (index as u32, slot.generation, value))
        })
    }

    /// すべて取り除いて返す
    pub(super) fn drain(&mut self) -> Vec<T> {
        let indices = self.occupied.iter_ones().collect::<Vec<_>>();
        let mut values = Vec::with_capacity(indices.len());
        for index in indices {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            values.extend(slot.value.take());
            self.occupied.set(index, false);
        }
        self.len = 0;
        values
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(a, (0, 0));
        assert_eq!(b, (1, 0));

        assert_eq!(arena.remove(a.0, a.1), Some("a"));
        assert_eq!(arena.remove(a.0, a.1), None);
        let c = arena.insert("c");
        assert_eq!(c, (0, 1));
        assert_eq!(arena.get(a.0, a.1), None);
        assert_eq!(arena.get(c.0, c.1), Some(&"c"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn drain_empties_and_invalidates() {
        let mut arena = Arena::new();
        let ids = (0..5).map(|i| arena.insert(i)).collect::<Vec<_>>();
        arena.remove(ids[2].0, ids[2].1);
        assert_eq!(arena.iter().map(|(_, _, v)| *v).collect::<Vec<_>>(), vec![0, 1, 3, 4]);

        let mut drained = arena.drain();
        drained.sort();
        assert_eq!(drained, vec![0, 1, 3, 4]);
        assert_eq!(arena.len(), 0);
        assert!(ids.iter().all(|&(index, generation)| arena.get(index, generation).is_none()));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut arena = Arena::<u8>::new();
        assert!(arena.get(10, 0).is_none());
        assert!(arena.remove(10, 0).is_none());
    }
}
