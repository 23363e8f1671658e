use rand::Rng;
use rand::seq::SliceRandom;

pub struct PlayPlanner;

impl PlayPlanner {
    /// Uniformly random choice among the playable hand indices.
    pub fn choose<R: Rng + ?Sized>(playable: &[usize], rng: &mut R) -> Option<usize> {
        playable.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::PlayPlanner;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn only_picks_from_playable() {
        let mut rng = StdRng::seed_from_u64(4);
        let playable = [1, 3, 4];
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let index = PlayPlanner::choose(&playable, &mut rng).unwrap();
            assert!(playable.contains(&index));
            seen.insert(index);
        }
        assert_eq!(seen.len(), playable.len());
    }

    #[test]
    fn nothing_to_play_yields_none() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(PlayPlanner::choose(&[], &mut rng), None);
    }
}
