//! Noyau sûr
//!
//! Organisation interne :
//! - jetons.rs        : normalisation des glyphes + tokenisation
//! - syntaxe.rs       : montée de précédence -> Expr (profondeur bornée)
//! - expr.rs          : AST fermé (Nombre, Var, Unaire, Binaire, Appel, NonSupporte)
//! - environnement.rs : liste blanche immuable + surcouche par appel
//! - fonctions.rs     : corps des fonctions autorisées (domaines vérifiés)
//! - operateurs.rs    : table des opérateurs binaires/unaires
//! - format.rs        : recalage entier, affichage du résultat et de l’arbre
//! - eval.rs          : pipeline complet
//! - erreurs.rs       : taxonomie des échecs

pub mod environnement;
pub mod erreurs;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod operateurs;
pub mod syntaxe;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

#[cfg(test)]
mod tests_proprietes;

// API publique minimale
pub use environnement::{Environnement, Liaisons, ModeAngle, PROFONDEUR_MAX_DEFAUT};
pub use erreurs::ErreurCalc;
pub use eval::{analyser, evaluer, DemarcheNoyau, Issue};
pub use format::{formater_resultat, DECIMALES_DEFAUT};
pub use syntaxe::parse;
