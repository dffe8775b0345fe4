//! Combinatorial generators for the orphan resolver
//!
//! Voice counts are at most six, so exhaustive enumeration stays small
//! (720 permutations at worst).

/// Every one-to-one pairing of `n` voice slots onto `n` pitch slots
///
/// Each entry lists `(voice_slot, pitch_slot)` pairs for pitch slots
/// `0..n`. Entries come in lexicographic order of the voice slots, so the
/// identity pairing is first.
pub fn combinations(n: usize) -> Vec<Vec<(usize, usize)>> {
    fn extend(
        n: usize,
        current: &mut Vec<usize>,
        used: &mut [bool],
        out: &mut Vec<Vec<(usize, usize)>>,
    ) {
        if current.len() == n {
            out.push(current.iter().enumerate().map(|(p, &v)| (v, p)).collect());
            return;
        }
        for v in 0..n {
            if !used[v] {
                used[v] = true;
                current.push(v);
                extend(n, current, used, out);
                current.pop();
                used[v] = false;
            }
        }
    }

    let mut out = Vec::new();
    extend(n, &mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
    out
}

/// All `k`-element subsets of `items`, in lexicographic index order
pub fn subsets<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    fn extend<T: Clone>(items: &[T], k: usize, start: usize, current: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        let needed = k - current.len();
        for i in start..=items.len().saturating_sub(needed) {
            if i >= items.len() {
                break;
            }
            current.push(items[i].clone());
            extend(items, k, i + 1, current, out);
            current.pop();
        }
    }

    if k > items.len() {
        return Vec::new();
    }
    let mut out = Vec::new();
    extend(items, k, 0, &mut Vec::with_capacity(k), &mut out);
    out
}

/// Right-pad a set with `None` up to `len` entries
pub fn pad<T: Clone>(items: &[T], len: usize) -> Vec<Option<T>> {
    let mut padded: Vec<Option<T>> = items.iter().cloned().map(Some).collect();
    if padded.len() < len {
        padded.resize(len, None);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factorial(n: usize) -> usize {
        (1..=n).product()
    }

    #[test]
    fn test_combination_counts() {
        for n in 0..=6 {
            assert_eq!(combinations(n).len(), factorial(n));
        }
    }

    #[test]
    fn test_combinations_are_bijective() {
        for pairing in combinations(4) {
            let mut voices: Vec<usize> = pairing.iter().map(|&(v, _)| v).collect();
            voices.sort_unstable();
            assert_eq!(voices, vec![0, 1, 2, 3]);
            let pitches: Vec<usize> = pairing.iter().map(|&(_, p)| p).collect();
            assert_eq!(pitches, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_combinations_start_with_identity() {
        let all = combinations(3);
        assert_eq!(all[0], vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(all[1], vec![(0, 0), (2, 1), (1, 2)]);
    }

    #[test]
    fn test_subsets() {
        let sets = subsets(&[1, 2, 3, 4], 2);
        assert_eq!(sets.len(), 6);
        assert_eq!(sets[0], vec![1, 2]);
        assert_eq!(sets[5], vec![3, 4]);
        assert_eq!(subsets(&[1, 2], 3).len(), 0);
        assert_eq!(subsets(&[1, 2], 0), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad(&[62], 3), vec![Some(62), None, None]);
        assert_eq!(pad(&[1, 2], 1), vec![Some(1), Some(2)]);
    }
}
