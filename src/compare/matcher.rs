//! Matching-blocks sequence matcher.
//!
//! Finds the longest contiguous matching block, then recurses on the pieces
//! to its left and right. The resulting blocks drive every comparison
//! output: the similarity ratio, opcodes for word diffs, grouped opcodes for
//! unified hunks and the HTML view.
//!
//! Worst case is quadratic in sequence length; natural-language text stays
//! close to linear because each element only visits the positions where it
//! occurs in `b`.
//!
//! Elements of `b` that are very frequent in long sequences (the "popular"
//! heuristic) are left out of the index. They can still extend a match that
//! was anchored on a rarer element, which keeps long-text ratios stable
//! without letting whitespace dominate the search.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Sequences at least this long get the popular-element heuristic.
const POPULAR_MIN_LEN: usize = 200;

/// A matching block: `a[a_start..a_start + size] == b[b_start..b_start + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Edit operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// How `a[a_start..a_end]` maps onto `b[b_start..b_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Opcode {
    fn new(tag: Tag, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }
}

pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
    matching_blocks: Option<Vec<Match>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        let n = b.len();
        if n >= POPULAR_MIN_LEN {
            let threshold = n / 100 + 1;
            let popular: HashSet<&'a T> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > threshold)
                .map(|(elt, _)| *elt)
                .collect();
            for elt in popular {
                b2j.remove(elt);
            }
        }

        Self {
            a,
            b,
            b2j,
            matching_blocks: None,
        }
    }

    /// Longest matching block in `a[alo..ahi]` × `b[blo..bhi]`.
    ///
    /// Ties resolve to the earliest start in `a`, then the earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (a, b) = (self.a, self.b);
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_size = 0usize;

        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, elt) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(elt) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Popular elements are not indexed; grow the block over them.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        Match {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }

    /// Non-adjacent matching blocks in increasing order, terminated by a
    /// zero-size sentinel at `(len(a), len(b))`.
    pub fn matching_blocks(&mut self) -> &[Match] {
        if self.matching_blocks.is_none() {
            self.matching_blocks = Some(self.compute_matching_blocks());
        }
        self.matching_blocks.as_deref().unwrap_or(&[])
    }

    fn compute_matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a_start && blo < m.b_start {
                queue.push((alo, m.a_start, blo, m.b_start));
            }
            if m.a_start + m.size < ahi && m.b_start + m.size < bhi {
                queue.push((m.a_start + m.size, ahi, m.b_start + m.size, bhi));
            }
        }
        blocks.sort();

        let mut collapsed = Vec::with_capacity(blocks.len() + 1);
        let mut current = Match {
            a_start: 0,
            b_start: 0,
            size: 0,
        };
        for m in blocks {
            if current.a_start + current.size == m.a_start
                && current.b_start + current.size == m.b_start
            {
                current.size += m.size;
            } else {
                if current.size > 0 {
                    collapsed.push(current);
                }
                current = m;
            }
        }
        if current.size > 0 {
            collapsed.push(current);
        }
        collapsed.push(Match {
            a_start: la,
            b_start: lb,
            size: 0,
        });
        collapsed
    }

    /// Opcodes turning `a` into `b`, covering both sequences end to end.
    pub fn opcodes(&mut self) -> Vec<Opcode> {
        let mut i = 0;
        let mut j = 0;
        let mut answer = Vec::new();

        for m in self.matching_blocks().to_vec() {
            let tag = if i < m.a_start && j < m.b_start {
                Some(Tag::Replace)
            } else if i < m.a_start {
                Some(Tag::Delete)
            } else if j < m.b_start {
                Some(Tag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                answer.push(Opcode::new(tag, i, m.a_start, j, m.b_start));
            }
            i = m.a_start + m.size;
            j = m.b_start + m.size;
            if m.size > 0 {
                answer.push(Opcode::new(Tag::Equal, m.a_start, i, m.b_start, j));
            }
        }
        answer
    }

    /// Opcodes clustered into hunks with up to `context` lines of equal
    /// context around each change. Identical inputs produce no groups.
    pub fn grouped_opcodes(&mut self, context: usize) -> Vec<Vec<Opcode>> {
        let mut codes = self.opcodes();
        if codes.is_empty() {
            codes.push(Opcode::new(Tag::Equal, 0, 1, 0, 1));
        }

        if let Some(first) = codes.first_mut() {
            if first.tag == Tag::Equal {
                first.a_start = first.a_start.max(first.a_end.saturating_sub(context));
                first.b_start = first.b_start.max(first.b_end.saturating_sub(context));
            }
        }
        if let Some(last) = codes.last_mut() {
            if last.tag == Tag::Equal {
                last.a_end = last.a_end.min(last.a_start + context);
                last.b_end = last.b_end.min(last.b_start + context);
            }
        }

        let span = context * 2;
        let mut groups = Vec::new();
        let mut group = Vec::new();
        for mut code in codes {
            if code.tag == Tag::Equal && code.a_end - code.a_start > span {
                group.push(Opcode::new(
                    Tag::Equal,
                    code.a_start,
                    code.a_end.min(code.a_start + context),
                    code.b_start,
                    code.b_end.min(code.b_start + context),
                ));
                groups.push(std::mem::take(&mut group));
                code.a_start = code.a_start.max(code.a_end.saturating_sub(context));
                code.b_start = code.b_start.max(code.b_end.saturating_sub(context));
            }
            group.push(code);
        }
        if !group.is_empty() && !(group.len() == 1 && group[0].tag == Tag::Equal) {
            groups.push(group);
        }
        groups
    }

    /// Similarity in `[0, 1]`: twice the matched length over the combined
    /// length. Two empty sequences are identical (1.0).
    pub fn ratio(&mut self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matches as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn ratio_identical_and_disjoint() {
        let a = chars("abcd");
        assert_eq!(SequenceMatcher::new(&a, &a).ratio(), 1.0);
        let b = chars("wxyz");
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 0.0);
    }

    #[test]
    fn ratio_of_empty_inputs_is_one() {
        let empty: Vec<char> = Vec::new();
        assert_eq!(SequenceMatcher::new(&empty, &empty).ratio(), 1.0);
        let a = chars("a");
        assert_eq!(SequenceMatcher::new(&a, &empty).ratio(), 0.0);
    }

    #[test]
    fn ratio_known_value() {
        // " abcd" matches the tail of "abcd abcd" in one block of 5.
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let r = SequenceMatcher::new(&a, &b).ratio();
        assert!((r - 10.0 / 14.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn longest_match_prefers_earliest() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(
            m,
            Match {
                a_start: 0,
                b_start: 4,
                size: 5
            }
        );
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let mut sm = SequenceMatcher::new(&a, &b);
        let blocks = sm.matching_blocks().to_vec();
        assert_eq!(
            blocks,
            vec![
                Match {
                    a_start: 0,
                    b_start: 0,
                    size: 2
                },
                Match {
                    a_start: 3,
                    b_start: 2,
                    size: 2
                },
                Match {
                    a_start: 5,
                    b_start: 4,
                    size: 0
                },
            ]
        );
    }

    #[test]
    fn opcodes_cover_both_sequences() {
        let a = chars("qabxcd");
        let b = chars("abycdf");
        let codes = SequenceMatcher::new(&a, &b).opcodes();
        let tags: Vec<Tag> = codes.iter().map(|c| c.tag).collect();
        assert_eq!(
            tags,
            vec![Tag::Delete, Tag::Equal, Tag::Replace, Tag::Equal, Tag::Insert]
        );
        assert_eq!(codes[0], Opcode::new(Tag::Delete, 0, 1, 0, 0));
        assert_eq!(codes[4], Opcode::new(Tag::Insert, 6, 6, 5, 6));
    }

    #[test]
    fn grouped_opcodes_trim_context() {
        let a: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
        let mut b = a.clone();
        b[9] = "ten".into();
        let groups = SequenceMatcher::new(&a, &b).grouped_opcodes(3);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.first().map(|c| c.a_start), Some(6));
        assert_eq!(g.last().map(|c| c.a_end), Some(13));
    }

    #[test]
    fn grouped_opcodes_split_distant_changes() {
        let a: Vec<String> = (1..=30).map(|i| i.to_string()).collect();
        let mut b = a.clone();
        b[2] = "x".into();
        b[25] = "y".into();
        let groups = SequenceMatcher::new(&a, &b).grouped_opcodes(3);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn identical_inputs_have_no_groups() {
        let a = vec!["same"; 5];
        assert!(SequenceMatcher::new(&a, &a).grouped_opcodes(3).is_empty());
        let empty: Vec<&str> = Vec::new();
        assert!(SequenceMatcher::new(&empty, &empty).grouped_opcodes(3).is_empty());
    }

    #[test]
    fn popular_elements_still_extend_matches() {
        // 300 copies of 'a' make 'a' popular in b; the match is found by
        // extending outward from the rare 'b'.
        let a: Vec<char> = std::iter::repeat('a').take(300).chain(['b']).collect();
        let b = a.clone();
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 1.0);
    }
}
