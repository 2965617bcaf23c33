use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{Item, Split, SplitData};

/// Seeded RNG for reproducible shuffles, or one seeded from entropy
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Split for the item at `index` of `count` shuffled items.
///
/// An item is in the train split while `index / count` is still below
/// `train_ratio`, so 10 items at 0.9 give 9 train and 1 val.
pub fn assign_split(index: usize, count: usize, train_ratio: f64) -> Split {
    if (index as f64) / (count as f64) < train_ratio {
        Split::Train
    } else {
        Split::Val
    }
}

/// Shuffle all items globally and cut them into train and val splits
pub fn split_items<R: Rng + ?Sized>(
    mut items: Vec<Item>,
    train_ratio: f64,
    rng: &mut R,
) -> SplitData {
    items.shuffle(rng);

    let count = items.len();
    let train_len = (0..count)
        .take_while(|&index| assign_split(index, count, train_ratio) == Split::Train)
        .count();
    let val_items = items.split_off(train_len);

    SplitData {
        train_items: items,
        val_items,
    }
}
