use rustc_hash::FxHashSet;

use crate::elementor::Element;

/// Elementor element ids are 7 lowercase hex digits.
pub const ID_LEN: usize = 7;

/// Hands out element ids that are unique for the lifetime of the generator.
///
/// One generator is used per page: ids only need to be unique within a
/// single `_elementor_data` document.
#[derive(Debug, Clone)]
pub struct IdGen {
    issued: FxHashSet<String>,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Random,
    Seeded(u64),
}

impl IdGen {
    pub fn random() -> Self {
        IdGen { issued: FxHashSet::default(), source: Source::Random }
    }

    /// A deterministic generator: the same seed yields the same ids.
    pub fn seeded(seed: u64) -> Self {
        IdGen { issued: FxHashSet::default(), source: Source::Seeded(seed) }
    }

    /// `seeded(seed)` when there is a seed, `random()` otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(IdGen::random, IdGen::seeded)
    }

    fn candidate(&mut self) -> String {
        match &mut self.source {
            Source::Random => {
                let uuid = uuid::Uuid::new_v4();
                let mut hex = uuid.simple().to_string();
                hex.truncate(ID_LEN);
                hex
            }
            Source::Seeded(state) => {
                let bits = splitmix64(state) >> (64 - 4 * ID_LEN as u32);
                format!("{bits:0width$x}", width = ID_LEN)
            }
        }
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id = self.candidate();
            if self.issued.insert(id.clone()) {
                return id;
            }

            log::trace!("element id collision on {id}; drawing again");
        }
    }

    /// Marks `id` as taken. Returns `false` if it already was.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.issued.insert(id.to_string())
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// Gives every element in `element`'s subtree a fresh id.
    pub fn refresh(&mut self, element: &mut Element) {
        element.walk_mut(&mut |e| e.set_id(self.next_id()));
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings;

    fn is_elementor_id(id: &str) -> bool {
        id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    #[test]
    fn random_ids_are_hex_and_unique() {
        let mut ids = IdGen::random();
        let drawn: FxHashSet<String> = (0..2000).map(|_| ids.next_id()).collect();
        assert_eq!(drawn.len(), 2000);
        assert!(drawn.iter().all(|id| is_elementor_id(id)));
    }

    #[test]
    fn seeded_ids_are_reproducible() {
        let a: Vec<_> = { let mut g = IdGen::seeded(7); (0..50).map(|_| g.next_id()).collect() };
        let b: Vec<_> = { let mut g = IdGen::seeded(7); (0..50).map(|_| g.next_id()).collect() };
        let c: Vec<_> = { let mut g = IdGen::seeded(8); (0..50).map(|_| g.next_id()).collect() };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|id| is_elementor_id(id)));
    }

    #[test]
    fn reserved_ids_are_never_issued() {
        let mut reference = IdGen::seeded(1);
        let first = reference.next_id();

        let mut ids = IdGen::seeded(1);
        assert!(ids.reserve(&first));
        assert!(!ids.reserve(&first));
        assert_ne!(ids.next_id(), first);
    }

    #[test]
    fn refresh_rewrites_the_whole_subtree() {
        let mut tree = Element::section("same", settings! {}, vec![
            Element::column("same", 100, vec![
                Element::widget("same", "cholot-title", settings! { "title": "x" }),
            ]),
        ]);

        let mut ids = IdGen::seeded(3);
        ids.refresh(&mut tree);

        let mut seen = FxHashSet::default();
        tree.walk(&mut |e| { seen.insert(e.id().to_string()); });
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("same"));
        assert_eq!(ids.issued(), 3);
    }
}
