/// Union-find over file indices `0..n` with path halving and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets holding `a` and `b`. Returns `false` if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    /// Connected components with at least `min_size` members.
    ///
    /// Members are ascending; components are ordered by their smallest member.
    pub fn components(&mut self, min_size: usize) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut comps: Vec<Vec<usize>> = Vec::new();
        for idx in 0..self.len() {
            let root = self.find(idx);
            match slot_of_root[root] {
                Some(slot) => comps[slot].push(idx),
                None => {
                    slot_of_root[root] = Some(comps.len());
                    comps.push(vec![idx]);
                }
            }
        }
        comps.retain(|c| c.len() >= min_size);
        comps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(edges: &[(usize, usize)], n: usize) -> Vec<Vec<usize>> {
        let mut ds = DisjointSet::new(n);
        for &(a, b) in edges {
            ds.union(a, b);
        }
        ds.components(2)
    }

    #[test]
    fn test_find_is_idempotent() {
        let mut ds = DisjointSet::new(4);
        ds.union(0, 1);
        ds.union(2, 3);
        ds.union(1, 3);
        let root = ds.find(0);
        assert_eq!(ds.find(root), root);
        for i in 0..4 {
            assert_eq!(ds.find(i), root);
        }
    }

    #[test]
    fn test_union_reports_existing_join() {
        let mut ds = DisjointSet::new(3);
        assert!(ds.union(0, 1));
        assert!(!ds.union(1, 0));
        assert!(ds.union(2, 0));
    }

    #[test]
    fn test_transitive_merge() {
        assert_eq!(partition(&[(0, 1), (1, 2)], 4), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_singletons_dropped() {
        assert!(partition(&[], 5).is_empty());
        assert_eq!(partition(&[(3, 4)], 5), vec![vec![3, 4]]);
    }

    #[test]
    fn test_partition_independent_of_edge_order() {
        let edges = [(0, 5), (2, 3), (5, 7), (3, 6), (1, 8)];
        let forward = partition(&edges, 9);
        let mut reversed = edges.to_vec();
        reversed.reverse();
        let swapped: Vec<(usize, usize)> = reversed.iter().map(|&(a, b)| (b, a)).collect();
        assert_eq!(forward, partition(&reversed, 9));
        assert_eq!(forward, partition(&swapped, 9));
        assert_eq!(forward, vec![vec![0, 5, 7], vec![1, 8], vec![2, 3, 6]]);
    }
}
