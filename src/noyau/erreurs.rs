// src/noyau/erreurs.rs
//
// Taxonomie des échecs du noyau.
// - Toutes les erreurs sont locales et récupérables : le noyau ne panique jamais.
// - Aucune erreur n’est convertie en une autre (domaine ≠ division par zéro ≠ syntaxe).

use thiserror::Error;

/// Échec typé d’une évaluation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErreurCalc {
    /// Syntaxe invalide (parenthèses, opérateur en fin, caractère inconnu…).
    #[error("erreur de syntaxe : {0}")]
    Syntaxe(String),

    /// Forme syntaxiquement valide mais interdite (attribut, indice, liste…).
    #[error("construction non supportée : {0}")]
    ConstructionNonSupportee(String),

    #[error("nom inconnu : '{0}'")]
    NomInconnu(String),

    /// Appel sur un nom qui désigne une valeur (ex: `pi(2)`).
    #[error("'{0}' n’est pas une fonction")]
    NonAppelable(String),

    /// Fonction utilisée sans parenthèses (ex: `sqrt + 1`).
    #[error("'{0}' est une fonction ; appelez-la avec ()")]
    ReferenceFonctionNue(String),

    #[error("{fonction} : {raison}")]
    Arite { fonction: String, raison: String },

    #[error("{fonction} : argument nommé inconnu '{mot_cle}'")]
    MotCleInconnu { fonction: String, mot_cle: String },

    /// Valeur hors du domaine de définition (porte la valeur fautive).
    #[error("erreur de domaine : {fonction}({valeur})")]
    Domaine { fonction: String, valeur: f64 },

    #[error("division par zéro")]
    DivisionParZero,

    #[error("résultat non fini ({0})")]
    ResultatNonFini(f64),

    #[error("expression trop complexe (profondeur > {0})")]
    ExpressionTropComplexe(usize),
}

impl ErreurCalc {
    pub fn syntaxe(msg: impl Into<String>) -> Self {
        ErreurCalc::Syntaxe(msg.into())
    }

    pub fn domaine(fonction: &str, valeur: f64) -> Self {
        ErreurCalc::Domaine {
            fonction: fonction.to_string(),
            valeur,
        }
    }

    pub fn arite(fonction: &str, raison: impl Into<String>) -> Self {
        ErreurCalc::Arite {
            fonction: fonction.to_string(),
            raison: raison.into(),
        }
    }

    /// Nom stable du genre d’erreur (pour la CLI et les appelants).
    pub fn code(&self) -> &'static str {
        match self {
            ErreurCalc::Syntaxe(_) => "ParseError",
            ErreurCalc::ConstructionNonSupportee(_) => "UnsupportedConstruct",
            ErreurCalc::NomInconnu(_) => "UnknownName",
            ErreurCalc::NonAppelable(_) => "NotCallable",
            ErreurCalc::ReferenceFonctionNue(_) => "BareFunctionReference",
            ErreurCalc::Arite { .. } => "ArityMismatch",
            ErreurCalc::MotCleInconnu { .. } => "UnknownKeyword",
            ErreurCalc::Domaine { .. } => "DomainError",
            ErreurCalc::DivisionParZero => "DivisionByZero",
            ErreurCalc::ResultatNonFini(_) => "NonFiniteResult",
            ErreurCalc::ExpressionTropComplexe(_) => "ExpressionTooComplex",
        }
    }
}
