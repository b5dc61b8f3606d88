/// Disjoint-set forest with path compression and union by rank
///
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Join the sets holding a and b, returns false if they were already joined
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        if self.rank[root_a] < self.rank[root_b] {
            self.parent[root_a] = root_b;
        } else if self.rank[root_a] > self.rank[root_b] {
            self.parent[root_b] = root_a;
        } else {
            self.parent[root_b] = root_a;
            self.rank[root_a] += 1;
        }
        true
    }

    /// All sets, each in ascending member order, ordered by their lowest member
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        use std::collections::BTreeMap;

        let mut root_groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            root_groups.entry(root).or_default().push(x);
        }
        let mut groups = root_groups.into_values().collect::<Vec<_>>();
        groups.sort_by_key(|x| x[0]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(3, 1));
        assert!(uf.union(4, 0));
        assert!(!uf.union(1, 3));
        assert_eq!(uf.groups(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    }
}
