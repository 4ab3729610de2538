// Element table and Morse pair parameters.
//
// V(r) = De (1 - exp(-alpha (r - re)))^2 - De

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    H,
    C,
    N,
    O,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub symbol: &'static str,
    pub name: &'static str,
    pub mass: f64,            // amu
    pub covalent_radius: f64, // A
    pub vdw_radius: f64,      // A
    pub color: &'static str,  // CPK hex colour, only used by viewers
    pub max_valence: u8,
}

const HYDROGEN: ElementData = ElementData {
    symbol: "H",
    name: "Hydrogen",
    mass: 1.008,
    covalent_radius: 0.31,
    vdw_radius: 1.2,
    color: "#FFFFFF",
    max_valence: 1,
};

const CARBON: ElementData = ElementData {
    symbol: "C",
    name: "Carbon",
    mass: 12.011,
    covalent_radius: 0.77,
    vdw_radius: 1.7,
    color: "#505050",
    max_valence: 4,
};

const NITROGEN: ElementData = ElementData {
    symbol: "N",
    name: "Nitrogen",
    mass: 14.007,
    covalent_radius: 0.75,
    vdw_radius: 1.55,
    color: "#3050F8",
    max_valence: 3,
};

const OXYGEN: ElementData = ElementData {
    symbol: "O",
    name: "Oxygen",
    mass: 15.999,
    covalent_radius: 0.73,
    vdw_radius: 1.52,
    color: "#FF0D0D",
    max_valence: 2,
};

impl Element {
    pub const ALL: [Element; 4] = [Element::H, Element::C, Element::N, Element::O];

    pub fn data(self) -> &'static ElementData {
        match self {
            Element::H => &HYDROGEN,
            Element::C => &CARBON,
            Element::N => &NITROGEN,
            Element::O => &OXYGEN,
        }
    }

    pub fn symbol(self) -> &'static str {
        self.data().symbol
    }

    pub fn mass(self) -> f64 {
        self.data().mass
    }

    pub fn covalent_radius(self) -> f64 {
        self.data().covalent_radius
    }

    pub fn vdw_radius(self) -> f64 {
        self.data().vdw_radius
    }

    pub fn max_valence(self) -> u8 {
        self.data().max_valence
    }

    /// Radius a viewer should draw the atom with.
    pub fn visual_radius(self) -> f64 {
        (self.covalent_radius() * 0.6).max(0.25)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "H" => Ok(Element::H),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            other => Err(SimError::UnknownElement(other.to_string())),
        }
    }
}

/// Sum of covalent radii, the length scale every bond threshold is a multiple of.
pub fn covalent_radius_sum(a: Element, b: Element) -> f64 {
    a.covalent_radius() + b.covalent_radius()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorseParameters {
    pub dissociation_energy: f64, // De, eV
    pub width: f64,               // alpha, 1/A
    pub equilibrium_distance: f64, // re, A
}

impl MorseParameters {
    const fn new(dissociation_energy: f64, width: f64, equilibrium_distance: f64) -> Self {
        MorseParameters {
            dissociation_energy,
            width,
            equilibrium_distance,
        }
    }
}

/// Weak van der Waals-like well used for any pair missing from the table.
pub const DEFAULT_MORSE: MorseParameters = MorseParameters::new(0.05, 1.0, 3.0);

/// Morse parameters for a pair, symmetric in its arguments.
pub fn morse_parameters(a: Element, b: Element) -> MorseParameters {
    use Element::*;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    // ordering follows the enum declaration: H < C < N < O
    match (lo, hi) {
        (H, H) => MorseParameters::new(4.52, 1.94, 0.74),
        (C, C) => MorseParameters::new(3.60, 1.80, 1.54),
        (H, C) => MorseParameters::new(4.30, 1.85, 1.09),
        (C, N) => MorseParameters::new(3.17, 1.75, 1.47),
        (C, O) => MorseParameters::new(3.64, 2.00, 1.43),
        (H, N) => MorseParameters::new(3.92, 1.90, 1.01),
        (H, O) => MorseParameters::new(4.80, 2.10, 0.96),
        (N, N) => MorseParameters::new(9.79, 2.70, 1.10),
        (N, O) => MorseParameters::new(2.68, 1.80, 1.40),
        (O, O) => MorseParameters::new(5.12, 2.68, 1.21),
        _ => DEFAULT_MORSE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        for element in Element::ALL {
            assert_eq!(element.symbol().parse::<Element>().unwrap(), element);
        }
        assert!(matches!(
            "Fe".parse::<Element>(),
            Err(SimError::UnknownElement(s)) if s == "Fe"
        ));
    }

    #[test]
    fn test_valence_table() {
        assert_eq!(Element::H.max_valence(), 1);
        assert_eq!(Element::C.max_valence(), 4);
        assert_eq!(Element::N.max_valence(), 3);
        assert_eq!(Element::O.max_valence(), 2);
    }

    #[test]
    fn test_morse_parameters_symmetric() {
        for a in Element::ALL {
            for b in Element::ALL {
                assert_eq!(morse_parameters(a, b), morse_parameters(b, a));
            }
        }
        let ch = morse_parameters(Element::H, Element::C);
        assert!((ch.equilibrium_distance - 1.09).abs() < 1e-12);
    }

    #[test]
    fn test_serde_uses_symbols() {
        let json = serde_json::to_string(&Element::O).unwrap();
        assert_eq!(json, "\"O\"");
        let back: Element = serde_json::from_str("\"N\"").unwrap();
        assert_eq!(back, Element::N);
    }

    #[test]
    fn test_visual_radius_floor() {
        assert!((Element::H.visual_radius() - 0.25).abs() < 1e-12);
        assert!((Element::C.visual_radius() - 0.462).abs() < 1e-12);
    }
}
