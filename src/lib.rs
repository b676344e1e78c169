//! Calculatrice sûre : évaluation d’expressions mathématiques sans aucun
//! accès au langage hôte.
//!
//! ```
//! use calculatrice_sure::noyau::{evaluer, Issue, Liaisons};
//!
//! assert_eq!(evaluer("2 + 3 * 4", &Liaisons::new()), Issue::Succes(14.0));
//! ```

pub mod config;
pub mod noyau;
pub mod session;
