// ============================================================
// Layer 4 — Dynamic (Per-Example) Vocabulary
// ============================================================
// A copy mechanism needs to name source words that the global
// vocabulary may not know. For each example we therefore build
// a tiny vocabulary over the source tokens only.
//
// Two index spaces come out of it:
//
//   local id      0, 1, 2, ... per DISTINCT source token, in
//                 order of first appearance
//                 → src_map (per source position)
//                 → alignment (per target position)
//
//   copy pointer  vocab_size + position of the FIRST occurrence
//                 of the token in the source — an index into the
//                 "extended vocabulary" (global words followed by
//                 source positions)
//                 → copy_mask (per target position)
//
// Absence is never an error: a target token that does not occur
// in the source gets local id 0 and copy pointer 0. Note that 0
// is also the real local id of the first source token — readers
// of `alignment` must consult `copy_mask` to tell the two apart.
//
// Example:
//   source  = [neural, network, model, neural]
//   target  = [neural, network]
//   src_map   = [0, 1, 2, 0]
//   alignment = [0, 1]
//   copy_mask = [V+0, V+1]

use std::collections::HashMap;

/// Local id / first-offset index over one source sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicVocabulary {
    /// token → (local id, first source position)
    entries: HashMap<String, (usize, usize)>,
    src_map: Vec<usize>,
}

/// Copy-alignment sequences for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAlignment {
    pub alignment: Vec<usize>,
    pub copy_mask: Vec<usize>,
}

impl DynamicVocabulary {
    /// Index `source`. An empty source yields an empty vocabulary
    /// in which every lookup falls back to 0.
    pub fn build(source: &[String]) -> Self {
        let mut entries: HashMap<String, (usize, usize)> = HashMap::new();
        let mut src_map = Vec::with_capacity(source.len());

        for (pos, token) in source.iter().enumerate() {
            let next_id = entries.len();
            let (local_id, _) = *entries
                .entry(token.clone())
                .or_insert((next_id, pos));
            src_map.push(local_id);
        }

        Self { entries, src_map }
    }

    /// Number of distinct source tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Local id per source position; same length as the source.
    pub fn src_map(&self) -> &[usize] {
        &self.src_map
    }

    /// Local id, or 0 for tokens absent from the source.
    pub fn local_id(&self, token: &str) -> usize {
        self.entries.get(token).map_or(0, |&(id, _)| id)
    }

    /// Position of the first occurrence in the source.
    pub fn first_position(&self, token: &str) -> Option<usize> {
        self.entries.get(token).map(|&(_, pos)| pos)
    }

    /// Local id per target position.
    pub fn alignment(&self, target: &[String]) -> Vec<usize> {
        target.iter().map(|t| self.local_id(t)).collect()
    }

    /// Extended-vocabulary pointer per target position:
    /// `vocab_size + first_position`, or 0 when not copyable.
    pub fn copy_pointers(&self, target: &[String], vocab_size: usize) -> Vec<usize> {
        target
            .iter()
            .map(|t| self.first_position(t).map_or(0, |pos| vocab_size + pos))
            .collect()
    }

    /// Both target-side sequences in one pass over the builder.
    pub fn align(&self, target: &[String], vocab_size: usize) -> CopyAlignment {
        CopyAlignment {
            alignment: self.alignment(target),
            copy_mask: self.copy_pointers(target, vocab_size),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const V: usize = 50_000;

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_repeated_source_token_shares_id_and_offset() {
        let source = toks(&["neural", "network", "model", "neural"]);
        let dv = DynamicVocabulary::build(&source);

        assert_eq!(dv.src_map(), &[0, 1, 2, 0]);

        let target = toks(&["neural", "network"]);
        let out = dv.align(&target, V);
        assert_eq!(out.alignment, vec![0, 1]);
        assert_eq!(out.copy_mask, vec![V, V + 1]);
    }

    #[test]
    fn test_no_overlap_gives_zero_sentinels() {
        let dv = DynamicVocabulary::build(&toks(&["a", "b"]));
        let out = dv.align(&toks(&["c"]), V);
        assert_eq!(out.alignment, vec![0]);
        assert_eq!(out.copy_mask, vec![0]);
    }

    #[test]
    fn test_empty_source() {
        let dv = DynamicVocabulary::build(&[]);
        assert!(dv.is_empty());
        assert!(dv.src_map().is_empty());

        let out = dv.align(&toks(&["x"]), V);
        assert_eq!(out.alignment, vec![0]);
        assert_eq!(out.copy_mask, vec![0]);
    }

    #[test]
    fn test_src_map_length_matches_source() {
        for source in [vec![], toks(&["a"]), toks(&["a", "a", "b", "a", "c", "b"])] {
            let dv = DynamicVocabulary::build(&source);
            assert_eq!(dv.src_map().len(), source.len());
        }
    }

    #[test]
    fn test_copy_pointer_uses_earliest_position() {
        let source = toks(&["x", "y", "z", "y", "z"]);
        let dv = DynamicVocabulary::build(&source);
        let ptrs = dv.copy_pointers(&toks(&["z", "y", "q"]), V);

        assert_eq!(ptrs, vec![V + 2, V + 1, 0]);
        for (t, p) in ["z", "y"].iter().zip(&ptrs) {
            let first = source.iter().position(|s| s == t).unwrap();
            assert!(*p >= V);
            assert_eq!(*p, V + first);
        }
    }

    #[test]
    fn test_local_id_differs_from_offset_after_duplicates() {
        // "c" is the third distinct token but sits at position 3
        let dv = DynamicVocabulary::build(&toks(&["a", "b", "a", "c"]));
        assert_eq!(dv.local_id("c"), 2);
        assert_eq!(dv.first_position("c"), Some(3));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let source = toks(&["p", "q", "p", "r", "q"]);
        let a = DynamicVocabulary::build(&source);
        let b = DynamicVocabulary::build(&source);
        assert_eq!(a.src_map(), b.src_map());
        assert_eq!(a, b);
    }
}
