use serde::Serialize;

use crate::params::Symmetry;

/// One logical face of the cage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaceDef {
    /// 1-based net triangle the face is cut from.
    pub triangle: usize,
    pub label: &'static str,
    /// Cage vertices the net triangle's corners `[0, ckA, ckB]` land on.
    pub vertices: [usize; 3],
    /// Copies placed by rotating `2π / s` about the z axis.
    pub repetitions: usize,
}

const fn face(triangle: usize, label: &'static str, vertices: [usize; 3], repetitions: usize) -> FaceDef {
    FaceDef {
        triangle,
        label,
        vertices,
        repetitions,
    }
}

const FACES_5: [FaceDef; 4] = [
    face(1, "T1-▲", [0, 1, 2], 5),
    face(1, "T1-▼", [6, 11, 7], 5),
    face(2, "T2-▲", [2, 1, 6], 5),
    face(2, "T2-▼", [6, 7, 2], 5),
];

#[rustfmt::skip]
const ADJACENCY_5: [[usize; 5]; 12] = [
    [1, 2, 3, 4, 5],
    [0, 2, 5, 6, 10],
    [0, 1, 3, 6, 7],
    [0, 2, 4, 7, 8],
    [0, 3, 5, 8, 9],
    [0, 1, 4, 9, 10],
    [1, 2, 7, 10, 11],
    [2, 3, 6, 8, 11],
    [3, 4, 7, 9, 11],
    [4, 5, 8, 10, 11],
    [1, 5, 6, 9, 11],
    [6, 7, 8, 9, 10],
];

const FACES_3: [FaceDef; 8] = [
    face(1, "T1-▔", [0, 2, 1], 1),
    face(1, "T1-▲", [1, 2, 3], 3),
    face(1, "T1-▼", [6, 9, 11], 3),
    face(1, "T1-▁", [9, 10, 11], 1),
    face(2, "T2-▼", [1, 3, 6], 3),
    face(2, "T2-▲", [9, 6, 3], 3),
    face(3, "T3-▼", [1, 6, 5], 3),
    face(3, "T3-▲", [11, 5, 6], 3),
];

#[rustfmt::skip]
const ADJACENCY_3: [[usize; 5]; 12] = [
    [1, 2, 4, 5, 8],
    [0, 2, 3, 5, 6],
    [0, 1, 3, 4, 7],
    [1, 2, 6, 7, 9],
    [0, 2, 7, 8, 10],
    [0, 1, 6, 8, 11],
    [1, 3, 5, 9, 11],
    [2, 3, 4, 9, 10],
    [0, 4, 5, 10, 11],
    [3, 6, 7, 10, 11],
    [4, 7, 8, 9, 11],
    [5, 6, 8, 9, 10],
];

const FACES_2: [FaceDef; 10] = [
    face(1, "T1-▔", [0, 1, 2], 2),
    face(1, "T1-▔", [2, 1, 4], 2),
    face(1, "T1-▁", [9, 10, 6], 2),
    face(1, "T1-▁", [9, 11, 10], 2),
    face(2, "T2-▼", [0, 2, 6], 2),
    face(2, "T2-▲", [9, 6, 2], 2),
    face(2, "T2-▼", [2, 4, 9], 2),
    face(2, "T2-▲", [11, 9, 4], 2),
    face(3, "T3-▼", [0, 6, 5], 2),
    face(3, "T3-▲", [10, 5, 6], 2),
];

#[rustfmt::skip]
const ADJACENCY_2: [[usize; 5]; 12] = [
    [1, 2, 3, 5, 6],
    [0, 2, 3, 4, 7],
    [0, 1, 4, 6, 9],
    [0, 1, 5, 7, 8],
    [1, 2, 7, 9, 11],
    [0, 3, 6, 8, 10],
    [0, 2, 5, 9, 10],
    [1, 3, 4, 8, 11],
    [3, 5, 7, 10, 11],
    [2, 4, 6, 10, 11],
    [5, 6, 8, 9, 11],
    [4, 7, 8, 9, 10],
];

/// How the net triangles are laid onto a cage of a given symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcoFaceConfig {
    pub symmetry: Symmetry,
    pub faces: &'static [FaceDef],
    /// The five neighbours of every cage vertex.
    pub adjacency: &'static [[usize; 5]; 12],
}

impl IcoFaceConfig {
    pub fn for_symmetry(symmetry: Symmetry) -> Self {
        let (faces, adjacency): (&'static [FaceDef], _) = match symmetry {
            Symmetry::Five => (&FACES_5, &ADJACENCY_5),
            Symmetry::Three => (&FACES_3, &ADJACENCY_3),
            Symmetry::Two => (&FACES_2, &ADJACENCY_2),
        };
        Self {
            symmetry,
            faces,
            adjacency,
        }
    }

    /// Number of distinct net triangles the faces draw from.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.triangle).max().unwrap_or(0)
    }

    /// Total face copies placed on the cage per net triangle.
    pub fn repetitions_per_triangle(&self) -> Vec<usize> {
        let mut counts = vec![0; self.triangle_count()];
        for f in self.faces {
            counts[f.triangle - 1] += f.repetitions;
        }
        counts
    }

    /// Total number of assembled faces.
    pub fn face_count(&self) -> usize {
        self.faces.iter().map(|f| f.repetitions).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Symmetry; 3] = [Symmetry::Two, Symmetry::Three, Symmetry::Five];

    #[test]
    fn test_twenty_faces_for_every_symmetry() {
        for s in ALL {
            assert_eq!(IcoFaceConfig::for_symmetry(s).face_count(), 20, "{s:?}");
        }
    }

    #[test]
    fn test_triangle_counts() {
        assert_eq!(IcoFaceConfig::for_symmetry(Symmetry::Five).triangle_count(), 2);
        assert_eq!(IcoFaceConfig::for_symmetry(Symmetry::Three).triangle_count(), 3);
        assert_eq!(IcoFaceConfig::for_symmetry(Symmetry::Two).triangle_count(), 3);
        assert_eq!(
            IcoFaceConfig::for_symmetry(Symmetry::Three).repetitions_per_triangle(),
            vec![8, 6, 6]
        );
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        for s in ALL {
            let cfg = IcoFaceConfig::for_symmetry(s);
            for (v, neighbours) in cfg.adjacency.iter().enumerate() {
                for &n in neighbours {
                    assert_ne!(n, v);
                    assert!(cfg.adjacency[n].contains(&v), "{s:?}: {v} -> {n} not mutual");
                }
            }
        }
    }

    #[test]
    fn test_face_vertices_are_adjacent() {
        for s in ALL {
            let cfg = IcoFaceConfig::for_symmetry(s);
            for f in cfg.faces {
                let [a, b, c] = f.vertices;
                assert!(cfg.adjacency[a].contains(&b));
                assert!(cfg.adjacency[b].contains(&c));
                assert!(cfg.adjacency[c].contains(&a));
            }
        }
    }
}
