// ============================================================
// Layer 4 — Keyphrase Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec<KeyphraseExample> of
// ragged sequences becomes one padded KeyphraseBatch.
//
// Padding rules:
//   src, trg             padded with <pad> (id 1)
//   src_all, trg_all     padded with <pad>
//   src_map, alignment,
//   copy_mask            padded with 0 (the "absent" sentinel)
//   src_mask, trg_mask   true for real tokens, false for padding
//
// Every sequence is padded to the longest one IN THIS BATCH,
// so shapes are [batch_size, max_src_len] and
// [batch_size, max_trg_len].

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::example::KeyphraseExample;
use crate::domain::specials::PAD_ID;

#[derive(Debug, Clone)]
pub struct KeyphraseBatch<B: Backend> {
    pub src:       Tensor<B, 2, Int>,
    pub src_all:   Tensor<B, 2, Int>,
    pub src_mask:  Tensor<B, 2, Bool>,
    pub src_map:   Tensor<B, 2, Int>,
    pub trg:       Tensor<B, 2, Int>,
    pub trg_all:   Tensor<B, 2, Int>,
    pub trg_mask:  Tensor<B, 2, Bool>,
    pub alignment: Tensor<B, 2, Int>,
    pub copy_mask: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug, Default)]
pub struct KeyphraseBatcher;

impl KeyphraseBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, KeyphraseExample, KeyphraseBatch<B>> for KeyphraseBatcher {
    fn batch(&self, items: Vec<KeyphraseExample>, device: &B::Device) -> KeyphraseBatch<B> {
        let src_len = items.iter().map(KeyphraseExample::src_len).max().unwrap_or(0);
        let trg_len = items.iter().map(KeyphraseExample::trg_len).max().unwrap_or(0);

        let src       = pad_ids::<B, _>(&items, |e| e.src.as_slice(), src_len, PAD_ID, device);
        let src_all   = pad_ids::<B, _>(&items, |e| e.src_all.as_slice(), src_len, PAD_ID, device);
        let src_map   = pad_ids::<B, _>(&items, |e| e.src_map.as_slice(), src_len, 0, device);
        let trg       = pad_ids::<B, _>(&items, |e| e.trg.as_slice(), trg_len, PAD_ID, device);
        let trg_all   = pad_ids::<B, _>(&items, |e| e.trg_all.as_slice(), trg_len, PAD_ID, device);
        let alignment = pad_ids::<B, _>(&items, |e| e.alignment.as_slice(), trg_len, 0, device);
        let copy_mask = pad_ids::<B, _>(&items, |e| e.copy_mask.as_slice(), trg_len, 0, device);

        let src_lens: Vec<usize> = items.iter().map(KeyphraseExample::src_len).collect();
        let trg_lens: Vec<usize> = items.iter().map(KeyphraseExample::trg_len).collect();
        let src_mask = length_mask::<B>(&src_lens, src_len, device);
        let trg_mask = length_mask::<B>(&trg_lens, trg_len, device);

        KeyphraseBatch {
            src, src_all, src_mask, src_map,
            trg, trg_all, trg_mask, alignment, copy_mask,
        }
    }
}

/// Stack one id field of every example into [batch, width],
/// right-padded with `fill`.
fn pad_ids<B: Backend, F>(
    items:  &[KeyphraseExample],
    field:  F,
    width:  usize,
    fill:   usize,
    device: &B::Device,
) -> Tensor<B, 2, Int>
where
    F: Fn(&KeyphraseExample) -> &[usize],
{
    let flat: Vec<i32> = items
        .iter()
        .flat_map(|e| {
            let ids = field(e);
            ids.iter()
                .copied()
                .chain(std::iter::repeat(fill).take(width - ids.len()))
                .map(|x| x as i32)
        })
        .collect();

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([items.len(), width])
}

/// [batch, width] mask, true for the first `len` positions of each row.
pub fn length_mask<B: Backend>(
    lens:   &[usize],
    width:  usize,
    device: &B::Device,
) -> Tensor<B, 2, Bool> {
    let flat: Vec<i32> = lens
        .iter()
        .flat_map(|&len| (0..width).map(move |i| i32::from(i < len)))
        .collect();

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
        .reshape([lens.len(), width])
        .equal_elem(1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn example(src: Vec<usize>, trg: Vec<usize>, copy: Vec<usize>) -> KeyphraseExample {
        KeyphraseExample {
            src_all:   src.clone(),
            src_map:   (0..src.len()).collect(),
            src,
            trg_all:   trg.clone(),
            alignment: vec![0; trg.len()],
            trg,
            copy_mask: copy,
        }
    }

    fn ints(t: Tensor<TB, 2, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec::<i64>().unwrap()
    }

    #[test]
    fn test_pads_to_batch_max() {
        let device = Default::default();
        let items = vec![
            example(vec![4, 5, 6], vec![4], vec![100]),
            example(vec![7], vec![8, 9], vec![0, 0]),
        ];

        let batch: KeyphraseBatch<TB> = KeyphraseBatcher::new().batch(items, &device);

        assert_eq!(batch.src.dims(), [2, 3]);
        assert_eq!(batch.trg.dims(), [2, 2]);
        assert_eq!(ints(batch.src), vec![4, 5, 6, 7, 1, 1]);
        assert_eq!(ints(batch.trg), vec![4, 1, 8, 9]);
        assert_eq!(ints(batch.src_map), vec![0, 1, 2, 0, 0, 0]);
        assert_eq!(ints(batch.copy_mask), vec![100, 0, 0, 0]);
    }

    #[test]
    fn test_masks_mark_real_tokens() {
        let device = Default::default();
        let items = vec![
            example(vec![4, 5], vec![4], vec![0]),
            example(vec![6], vec![7], vec![0]),
        ];

        let batch: KeyphraseBatch<TB> = KeyphraseBatcher::new().batch(items, &device);
        let mask: Vec<bool> = batch.src_mask.into_data().to_vec::<bool>().unwrap();
        assert_eq!(mask, vec![true, true, true, false]);
    }
}
