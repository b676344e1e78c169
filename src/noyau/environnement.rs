// src/noyau/environnement.rs
//
// Liste blanche : l’ensemble FERMÉ des noms qu’une expression peut utiliser.
// - Construite une fois (au démarrage), jamais modifiée ensuite.
// - La saisie utilisateur ne l’étend jamais.
// - Une surcouche par appel (`Liaisons`, ex: {"Ans": 42}) peut masquer ou ajouter
//   des valeurs numériques le temps d’UNE évaluation ; la base reste intacte.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{E, PI, TAU};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Deserialize;

use super::erreurs::ErreurCalc;
use super::fonctions as f;

/// Profondeur d’arbre maximale par défaut (parenthèses, unaires, puissances…).
pub const PROFONDEUR_MAX_DEFAUT: usize = 200;

/// Surcouche transitoire : nom -> valeur, pour un seul appel.
pub type Liaisons = HashMap<String, f64>;

/// Unité des angles pour la trigonométrie (et ses réciproques).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeAngle {
    #[default]
    #[serde(alias = "rad")]
    Radians,
    #[serde(alias = "deg", alias = "degrees")]
    Degres,
}

impl ModeAngle {
    pub fn vers_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Radians => x,
            ModeAngle::Degres => x.to_radians(),
        }
    }

    pub fn depuis_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Radians => x,
            ModeAngle::Degres => x.to_degrees(),
        }
    }
}

impl FromStr for ModeAngle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rad" | "radians" => Ok(ModeAngle::Radians),
            "deg" | "degres" | "degrés" | "degrees" => Ok(ModeAngle::Degres),
            autre => Err(format!("mode d’angle inconnu: '{autre}' (rad|deg)")),
        }
    }
}

impl fmt::Display for ModeAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeAngle::Radians => "rad",
            ModeAngle::Degres => "deg",
        })
    }
}

/* ------------------------ Signatures ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Defaut {
    Requis,
    /// Valeur par défaut + son écriture pour l’aide (ex: base=e).
    Valeur(f64, &'static str),
    /// Optionnel sans valeur : la fonction décide (ex: perm(n, k=n)).
    Absent(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parametre {
    pub nom: &'static str,
    pub defaut: Defaut,
}

impl Parametre {
    pub const fn requis(nom: &'static str) -> Self {
        Parametre {
            nom,
            defaut: Defaut::Requis,
        }
    }

    pub const fn optionnel(nom: &'static str, defaut: Defaut) -> Self {
        Parametre { nom, defaut }
    }
}

/// Arguments liés, dans l’ordre des paramètres.
pub struct Arguments<'a> {
    valeurs: &'a [Option<f64>],
    pub angle: ModeAngle,
}

impl<'a> Arguments<'a> {
    pub fn new(valeurs: &'a [Option<f64>], angle: ModeAngle) -> Self {
        Arguments { valeurs, angle }
    }

    /// Paramètre requis (ou optionnel avec valeur par défaut).
    pub fn get(&self, i: usize) -> f64 {
        self.optionnel(i).unwrap_or(f64::NAN)
    }

    pub fn optionnel(&self, i: usize) -> Option<f64> {
        self.valeurs.get(i).copied().flatten()
    }
}

pub type Corps = fn(&Arguments<'_>) -> Result<f64, ErreurCalc>;

#[derive(Clone, Copy)]
pub struct Fonction {
    pub nom: &'static str,
    pub params: &'static [Parametre],
    pub corps: Corps,
    pub aide: &'static str,
}

impl fmt::Debug for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fonction({})", self.signature())
    }
}

impl Fonction {
    /// Écriture de la signature, ex: `log(x, base=e)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| match p.defaut {
                Defaut::Requis => p.nom.to_string(),
                Defaut::Valeur(_, texte) | Defaut::Absent(texte) => format!("{}={texte}", p.nom),
            })
            .collect();
        format!("{}({})", self.nom, params.join(", "))
    }

    /// Lie les arguments évalués aux paramètres déclarés.
    ///
    /// - trop / pas assez de positionnels, ou argument donné deux fois => Arite
    /// - nom inconnu (ou paramètre requis passé par nom) => MotCleInconnu
    pub fn lier(
        &self,
        positionnels: &[f64],
        nommes: &[(&str, f64)],
    ) -> Result<Vec<Option<f64>>, ErreurCalc> {
        let n = self.params.len();
        if positionnels.len() > n {
            return Err(ErreurCalc::arite(
                self.nom,
                format!(
                    "attend au plus {n} argument(s), {} reçu(s)",
                    positionnels.len()
                ),
            ));
        }

        let mut valeurs: Vec<Option<f64>> = vec![None; n];
        for (slot, v) in valeurs.iter_mut().zip(positionnels) {
            *slot = Some(*v);
        }

        for (mot_cle, v) in nommes {
            let i = self
                .params
                .iter()
                .position(|p| p.nom == *mot_cle && p.defaut != Defaut::Requis)
                .ok_or_else(|| ErreurCalc::MotCleInconnu {
                    fonction: self.nom.to_string(),
                    mot_cle: mot_cle.to_string(),
                })?;
            if valeurs[i].is_some() {
                return Err(ErreurCalc::arite(
                    self.nom,
                    format!("argument '{mot_cle}' fourni deux fois"),
                ));
            }
            valeurs[i] = Some(*v);
        }

        for (slot, p) in valeurs.iter_mut().zip(self.params) {
            if slot.is_some() {
                continue;
            }
            match p.defaut {
                Defaut::Requis => {
                    let requis = self
                        .params
                        .iter()
                        .filter(|p| p.defaut == Defaut::Requis)
                        .count();
                    return Err(ErreurCalc::arite(
                        self.nom,
                        format!(
                            "attend au moins {requis} argument(s), {} reçu(s) (manque '{}')",
                            positionnels.len(),
                            p.nom
                        ),
                    ));
                }
                Defaut::Valeur(v, _) => *slot = Some(v),
                Defaut::Absent(_) => {}
            }
        }

        Ok(valeurs)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Liaison {
    Constante(f64),
    Fonction(Fonction),
}

/* ------------------------ Table ------------------------ */

const X: &[Parametre] = &[Parametre::requis("x")];
const LOG: &[Parametre] = &[
    Parametre::requis("x"),
    Parametre::optionnel("base", Defaut::Valeur(E, "e")),
];
const ROUND: &[Parametre] = &[
    Parametre::requis("x"),
    Parametre::optionnel("ndigits", Defaut::Valeur(0.0, "0")),
];
const COMB: &[Parametre] = &[Parametre::requis("n"), Parametre::requis("k")];
const PERM: &[Parametre] = &[
    Parametre::requis("n"),
    Parametre::optionnel("k", Defaut::Absent("n")),
];

const fn fonction(
    nom: &'static str,
    params: &'static [Parametre],
    corps: Corps,
    aide: &'static str,
) -> Fonction {
    Fonction {
        nom,
        params,
        corps,
        aide,
    }
}

/// La table complète (documentée dans DESIGN.md).
const FONCTIONS: &[Fonction] = &[
    // trigonométrie (unité selon le mode d’angle)
    fonction("sin", X, f::sin, "sinus"),
    fonction("cos", X, f::cos, "cosinus"),
    fonction("tan", X, f::tan, "tangente"),
    fonction("asin", X, f::asin, "arc sinus, x dans [-1, 1]"),
    fonction("acos", X, f::acos, "arc cosinus, x dans [-1, 1]"),
    fonction("atan", X, f::atan, "arc tangente"),
    // hyperboliques
    fonction("sinh", X, f::sinh, "sinus hyperbolique"),
    fonction("cosh", X, f::cosh, "cosinus hyperbolique"),
    fonction("tanh", X, f::tanh, "tangente hyperbolique"),
    fonction("asinh", X, f::asinh, "argument sinus hyperbolique"),
    fonction("acosh", X, f::acosh, "argument cosinus hyperbolique, x >= 1"),
    fonction("atanh", X, f::atanh, "argument tangente hyperbolique, |x| < 1"),
    // racines, logarithmes
    fonction("sqrt", X, f::sqrt, "racine carrée, x >= 0"),
    fonction("cbrt", X, f::cbrt, "racine cubique réelle"),
    fonction("ln", X, f::ln, "logarithme népérien, x > 0"),
    fonction("log", LOG, f::log, "logarithme (base e par défaut)"),
    fonction("log10", X, f::log10, "logarithme décimal, x > 0"),
    fonction("exp", X, f::exp, "exponentielle"),
    // divers
    fonction("abs", X, f::abs, "valeur absolue"),
    fonction("round", ROUND, f::round, "arrondi au pair le plus proche"),
    fonction("floor", X, f::floor, "partie entière inférieure"),
    fonction("ceil", X, f::ceil, "partie entière supérieure"),
    fonction("factorial", X, f::factorial, "factorielle, entier >= 0"),
    fonction("fact", X, f::factorial, "alias de factorial"),
    fonction("deg", X, f::deg, "radians -> degrés"),
    fonction("rad", X, f::rad, "degrés -> radians"),
    // combinatoire
    fonction("comb", COMB, f::comb, "combinaisons C(n, k)"),
    fonction("perm", PERM, f::perm, "arrangements A(n, k)"),
];

const CONSTANTES: &[(&str, f64)] = &[("pi", PI), ("e", E), ("tau", TAU)];

/// Environnement de liaison (liste blanche + réglages immuables).
#[derive(Debug)]
pub struct Environnement {
    liaisons: BTreeMap<&'static str, Liaison>,
    angle: ModeAngle,
    profondeur_max: usize,
}

impl Default for Environnement {
    fn default() -> Self {
        Self::new(ModeAngle::default(), PROFONDEUR_MAX_DEFAUT)
    }
}

impl Environnement {
    pub fn new(angle: ModeAngle, profondeur_max: usize) -> Self {
        let mut liaisons = BTreeMap::new();
        for (nom, v) in CONSTANTES {
            liaisons.insert(*nom, Liaison::Constante(*v));
        }
        for fonc in FONCTIONS {
            liaisons.insert(fonc.nom, Liaison::Fonction(*fonc));
        }

        Environnement {
            liaisons,
            angle,
            profondeur_max: profondeur_max.max(1),
        }
    }

    /// Environnement standard (radians, profondeur 200), partagé par tout le processus.
    pub fn standard() -> &'static Environnement {
        static STANDARD: OnceLock<Environnement> = OnceLock::new();
        STANDARD.get_or_init(Environnement::default)
    }

    pub fn angle(&self) -> ModeAngle {
        self.angle
    }

    pub fn profondeur_max(&self) -> usize {
        self.profondeur_max
    }

    pub fn get(&self, nom: &str) -> Option<&Liaison> {
        self.liaisons.get(nom)
    }

    /// Entrées triées par nom (aide, `--fonctions`).
    pub fn entrees(&self) -> impl Iterator<Item = (&'static str, &Liaison)> + '_ {
        self.liaisons.iter().map(|(k, v)| (*k, v))
    }
}

/* ------------------------ Portée d’un appel ------------------------ */

/// Ce qu’un nom désigne pour UNE évaluation.
#[derive(Clone, Copy, Debug)]
pub enum Resolution<'a> {
    Valeur(f64),
    Fonction(&'a Fonction),
}

/// Base partagée + surcouche transitoire (prioritaire).
#[derive(Clone, Copy)]
pub struct Portee<'a> {
    pub env: &'a Environnement,
    extra: &'a Liaisons,
}

impl<'a> Portee<'a> {
    pub fn new(env: &'a Environnement, extra: &'a Liaisons) -> Self {
        Portee { env, extra }
    }

    pub fn resoudre(&self, nom: &str) -> Option<Resolution<'a>> {
        if let Some(v) = self.extra.get(nom) {
            return Some(Resolution::Valeur(*v));
        }
        match self.env.get(nom)? {
            Liaison::Constante(v) => Some(Resolution::Valeur(*v)),
            Liaison::Fonction(fonc) => Some(Resolution::Fonction(fonc)),
        }
    }
}
