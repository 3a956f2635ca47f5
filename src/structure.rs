//! Backbone-only view of a parsed structure.
//!
//! Link detection works on a [`Backbone`] rather than on `pdbtbx` types. It
//! holds, for every chain of the first model, the `N`, `CA` and `C` atoms of
//! each amino-acid residue in file order.

use nalgebra::Vector3;
use pdbtbx::*;

/// Names of the atoms kept for each residue.
pub const BACKBONE_ATOMS: [&str; 3] = ["N", "CA", "C"];

/// A 3-D coordinate in Ångström.
pub type Coord = Vector3<f64>;

/// A single backbone atom.
#[derive(Debug, Clone, PartialEq)]
pub struct BackboneAtom {
    /// Atom name, one of [`BACKBONE_ATOMS`]
    pub name: String,
    /// Cartesian position
    pub pos: Coord,
}

/// A residue reduced to its backbone atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct BackboneResidue {
    /// Residue number as written in the file
    pub number: isize,
    /// Insertion code, if any
    pub insertion: Option<String>,
    /// Three-letter residue name
    pub name: String,
    /// Backbone atoms in file order
    pub atoms: Vec<BackboneAtom>,
}

/// A chain reduced to its backbone.
#[derive(Debug, Clone, PartialEq)]
pub struct BackboneChain {
    /// Chain identifier
    pub id: String,
    /// Residues in file order; the position in this vector is the residue's global index
    pub residues: Vec<BackboneResidue>,
}

/// Backbone representation of one model of a structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backbone {
    chains: Vec<BackboneChain>,
}

impl BackboneResidue {
    /// Build a residue from `(atom name, position)` pairs.
    pub fn new(number: isize, name: &str, atoms: &[(&str, Coord)]) -> Self {
        Self {
            number,
            insertion: None,
            name: name.to_string(),
            atoms: atoms
                .iter()
                .map(|(n, pos)| BackboneAtom {
                    name: n.to_string(),
                    pos: *pos,
                })
                .collect(),
        }
    }
}

impl BackboneChain {
    /// Residue numbers indexed by global residue index.
    pub fn residue_numbers(&self) -> Vec<isize> {
        self.residues.iter().map(|r| r.number).collect()
    }

    /// Iterate over `(global index, atom)` for every backbone atom of the chain.
    pub fn indexed_atoms(&self) -> impl Iterator<Item = (usize, &BackboneAtom)> + '_ {
        self.residues
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.atoms.iter().map(move |a| (i, a)))
    }

    /// Count residue numbers missing between the lowest and highest residue number.
    pub fn missing_residues(&self) -> usize {
        let numbers: std::collections::BTreeSet<isize> =
            self.residues.iter().map(|r| r.number).collect();
        match (numbers.first(), numbers.last()) {
            (Some(&lo), Some(&hi)) => (lo..=hi).filter(|n| !numbers.contains(n)).count(),
            _ => 0,
        }
    }
}

impl Backbone {
    /// Wrap already-built chains.
    pub fn new(chains: Vec<BackboneChain>) -> Self {
        Self { chains }
    }

    /// Reduce a parsed model to its backbone atoms.
    ///
    /// Chains keep their first-seen order; a chain id that appears twice is
    /// merged into the first occurrence. Chains without any backbone atom are
    /// kept (empty) so that they still show up in [`Backbone::chain_ids`].
    pub fn from_model(model: &Model) -> Self {
        let mut chains: Vec<BackboneChain> = Vec::new();
        for chain in model.chains() {
            let residues = chain.residues().filter_map(|residue| {
                // Alternate locations repeat atom names; the first one wins
                let mut atoms: Vec<BackboneAtom> = Vec::with_capacity(BACKBONE_ATOMS.len());
                for atom in residue.atoms() {
                    if BACKBONE_ATOMS.contains(&atom.name())
                        && !atoms.iter().any(|a| a.name == atom.name())
                    {
                        let (x, y, z) = atom.pos();
                        atoms.push(BackboneAtom {
                            name: atom.name().to_string(),
                            pos: Coord::new(x, y, z),
                        });
                    }
                }
                if atoms.is_empty() {
                    return None;
                }
                let (number, insertion) = residue.id();
                Some(BackboneResidue {
                    number,
                    insertion: insertion.map(|s| s.to_string()),
                    name: residue.name().unwrap_or("UNK").to_string(),
                    atoms,
                })
            });

            match chains.iter_mut().find(|c| c.id == chain.id()) {
                Some(existing) => existing.residues.extend(residues),
                None => chains.push(BackboneChain {
                    id: chain.id().to_string(),
                    residues: residues.collect(),
                }),
            }
        }
        Self { chains }
    }

    /// Reduce the first model of a structure; `None` if there are no models.
    pub fn from_pdb(pdb: &PDB) -> Option<Self> {
        pdb.model(0).map(Self::from_model)
    }

    /// Chain identifiers in first-seen order.
    pub fn chain_ids(&self) -> Vec<&str> {
        self.chains.iter().map(|c| c.id.as_str()).collect()
    }

    /// Look up a chain by identifier.
    pub fn chain(&self, id: &str) -> Option<&BackboneChain> {
        self.chains.iter().find(|c| c.id == id)
    }

    /// All chains.
    pub fn chains(&self) -> impl Iterator<Item = &BackboneChain> + '_ {
        self.chains.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A straight chain along `axis` starting at `origin`, 3.8 Å per residue.
    pub(crate) fn straight_chain(
        id: &str,
        numbers: impl IntoIterator<Item = isize>,
        origin: Coord,
        axis: Coord,
    ) -> BackboneChain {
        let step = axis.normalize() * 3.8;
        let residues = numbers
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                let ca = origin + step * i as f64;
                BackboneResidue::new(
                    n,
                    "GLY",
                    &[
                        ("N", ca - step * 0.3),
                        ("CA", ca),
                        ("C", ca + step * 0.3),
                    ],
                )
            })
            .collect();
        BackboneChain {
            id: id.to_string(),
            residues,
        }
    }

    #[test]
    fn missing_residues_counts_gaps() {
        let chain = straight_chain(
            "A",
            [1, 2, 5, 6, 9],
            Coord::zeros(),
            Coord::new(1.0, 0.0, 0.0),
        );
        assert_eq!(chain.missing_residues(), 4, "3, 4, 7 and 8 are missing");

        let empty = BackboneChain {
            id: "B".to_string(),
            residues: vec![],
        };
        assert_eq!(empty.missing_residues(), 0);
    }

    #[test]
    fn indexed_atoms_follow_residue_order() {
        let chain = straight_chain("A", 10..13, Coord::zeros(), Coord::new(0.0, 1.0, 0.0));
        let idx: Vec<usize> = chain.indexed_atoms().map(|(i, _)| i).collect();
        assert_eq!(idx, vec![0, 0, 0, 1, 1, 1, 2, 2, 2]);
        assert_eq!(chain.residue_numbers(), vec![10, 11, 12]);
    }

    #[test]
    fn backbone_from_model_keeps_only_backbone() {
        let mut model = Model::new(0);
        let mut chain = Chain::new("A").unwrap();
        for (i, resn) in ["ALA", "GLY"].iter().enumerate() {
            let mut conformer = Conformer::new(*resn, None, None).unwrap();
            for (j, name) in ["N", "CA", "C", "O", "CB"].iter().enumerate() {
                let element = &name[..1];
                conformer.add_atom(
                    Atom::new(
                        false,
                        i * 5 + j + 1,
                        *name,
                        i as f64,
                        j as f64,
                        0.0,
                        1.0,
                        0.0,
                        element,
                        0,
                    )
                    .unwrap(),
                );
            }
            chain.add_residue(Residue::new(i as isize + 1, None, Some(conformer)).unwrap());
        }
        model.add_chain(chain);

        let backbone = Backbone::from_model(&model);
        assert_eq!(backbone.chain_ids(), vec!["A"]);
        let chain = backbone.chain("A").unwrap();
        assert_eq!(chain.residues.len(), 2);
        for residue in &chain.residues {
            let names: Vec<&str> = residue.atoms.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, BACKBONE_ATOMS.to_vec());
        }
        assert_eq!(chain.residues[1].atoms[1].pos, Coord::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn from_model_merges_chains_and_keeps_first_altloc() {
        let atom = |serial: usize, name: &str, x: f64| {
            Atom::new(false, serial, name, x, 0.0, 0.0, 1.0, 0.0, &name[..1], 0).unwrap()
        };
        let conformer = |altloc: Option<&str>, names: &[&str], x: f64| {
            let mut conformer = Conformer::new("GLY", altloc, None).unwrap();
            for (j, name) in names.iter().enumerate() {
                conformer.add_atom(atom(j + 1, name, x));
            }
            conformer
        };

        let mut model = Model::new(0);

        let mut first_a = Chain::new("A").unwrap();
        let mut residue =
            Residue::new(1, None, Some(conformer(Some("A"), &["N", "CA", "C"], 1.0))).unwrap();
        residue.add_conformer(conformer(Some("B"), &["CA"], 9.0));
        first_a.add_residue(residue);
        model.add_chain(first_a);

        let mut chain_b = Chain::new("B").unwrap();
        chain_b.add_residue(
            Residue::new(1, None, Some(conformer(None, &["N", "CA", "C"], 5.0))).unwrap(),
        );
        model.add_chain(chain_b);

        // Same id again, e.g. a ligand-split chain in the file
        let mut second_a = Chain::new("A").unwrap();
        second_a.add_residue(
            Residue::new(2, None, Some(conformer(None, &["N", "CA", "C"], 2.0))).unwrap(),
        );
        model.add_chain(second_a);

        let backbone = Backbone::from_model(&model);
        assert_eq!(backbone.chain_ids(), vec!["A", "B"]);

        let chain = backbone.chain("A").unwrap();
        let numbers: Vec<isize> = chain.residues.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2]);

        let first = &chain.residues[0];
        assert_eq!(first.atoms.len(), 3);
        assert_eq!(first.atoms[1].name, "CA");
        assert_eq!(first.atoms[1].pos, Coord::new(1.0, 0.0, 0.0));

        assert_eq!(backbone.chain("B").unwrap().residues.len(), 1);
    }
}
