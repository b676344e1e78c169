//! Noyau — évaluation (pipeline réel)
//!
//! normaliser -> jetons -> arbre (montée de précédence) -> évaluation restreinte
//!        -> recalage entier -> contrôle de finitude
//!
//! L’évaluateur ne connaît que les noms de la liste blanche (plus la surcouche
//! de l’appel) : aucune autre capacité n’est atteignable depuis une saisie.

use tracing::debug;

use super::environnement::{Arguments, Environnement, Liaisons, Portee, Resolution};
use super::erreurs::ErreurCalc;
use super::expr::Expr;
use super::format::{format_expr_pretty, recaler_entier};
use super::jetons::{format_tokens, normaliser, tokenize};
use super::operateurs::{appliquer_binaire, appliquer_unaire};
use super::syntaxe::{parse, parse_tokens};

/// Issue d’une évaluation : un nombre, rien (saisie vide), ou une erreur typée.
#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    Succes(f64),
    Vide,
    Echec(ErreurCalc),
}

impl Issue {
    pub fn valeur(&self) -> Option<f64> {
        match self {
            Issue::Succes(v) => Some(*v),
            _ => None,
        }
    }

    pub fn erreur(&self) -> Option<&ErreurCalc> {
        match self {
            Issue::Echec(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<f64>, ErreurCalc> {
        match self {
            Issue::Succes(v) => Ok(Some(v)),
            Issue::Vide => Ok(None),
            Issue::Echec(e) => Err(e),
        }
    }
}

impl From<Result<Option<f64>, ErreurCalc>> for Issue {
    fn from(r: Result<Option<f64>, ErreurCalc>) -> Self {
        match r {
            Ok(Some(v)) => Issue::Succes(v),
            Ok(None) => Issue::Vide,
            Err(e) => Issue::Echec(e),
        }
    }
}

/// API publique : évalue `expression` dans l’environnement standard
/// (radians, profondeur 200), avec une surcouche transitoire `extra`.
pub fn evaluer(expression: &str, extra: &Liaisons) -> Issue {
    Environnement::standard().evaluer(expression, extra)
}

impl Environnement {
    /// Évalue une saisie brute. Ne panique jamais, ne modifie rien.
    pub fn evaluer(&self, expression: &str, extra: &Liaisons) -> Issue {
        let issue = Issue::from(self.calculer(expression, extra));
        debug!(expression, ?issue, "évaluation");
        issue
    }

    fn calculer(&self, expression: &str, extra: &Liaisons) -> Result<Option<f64>, ErreurCalc> {
        let Some(arbre) = parse(expression, self.profondeur_max())? else {
            return Ok(None);
        };
        debug!(arbre = %arbre, "analyse");

        let portee = Portee::new(self, extra);
        let brut = evaluer_expr(&arbre, &portee, 0)?;
        finaliser(brut).map(Some)
    }
}

/// Post-traitement (niveau racine uniquement).
fn finaliser(x: f64) -> Result<f64, ErreurCalc> {
    let x = recaler_entier(x);
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ErreurCalc::ResultatNonFini(x))
    }
}

/// Évaluation ascendante d’un arbre déjà construit.
///
/// `profondeur` est la profondeur du nœud courant (0 à la racine) : un arbre
/// construit à la main ne peut pas dépasser la borne de l’environnement.
pub fn evaluer_expr(expr: &Expr, portee: &Portee<'_>, profondeur: usize) -> Result<f64, ErreurCalc> {
    let max = portee.env.profondeur_max();
    if profondeur >= max {
        return Err(ErreurCalc::ExpressionTropComplexe(max));
    }
    let suivante = profondeur + 1;

    match expr {
        Expr::Nombre(n) => Ok(*n),

        Expr::Var(nom) => match portee.resoudre(nom) {
            Some(Resolution::Valeur(v)) => Ok(v),
            Some(Resolution::Fonction(_)) => Err(ErreurCalc::ReferenceFonctionNue(nom.clone())),
            None => Err(ErreurCalc::NomInconnu(nom.clone())),
        },

        Expr::Unaire(op, x) => Ok(appliquer_unaire(*op, evaluer_expr(x, portee, suivante)?)),

        Expr::Binaire(op, a, b) => {
            let a = evaluer_expr(a, portee, suivante)?;
            let b = evaluer_expr(b, portee, suivante)?;
            appliquer_binaire(*op, a, b)
        }

        Expr::Appel { nom, args, kwargs } => {
            // le nom d’abord : rien n’est évalué pour un appel interdit
            let fonction = match portee.resoudre(nom) {
                Some(Resolution::Fonction(f)) => f,
                Some(Resolution::Valeur(_)) => return Err(ErreurCalc::NonAppelable(nom.clone())),
                None => return Err(ErreurCalc::NomInconnu(nom.clone())),
            };

            let positionnels = args
                .iter()
                .map(|a| evaluer_expr(a, portee, suivante))
                .collect::<Result<Vec<_>, _>>()?;
            let nommes = kwargs
                .iter()
                .map(|(k, v)| Ok((k.as_str(), evaluer_expr(v, portee, suivante)?)))
                .collect::<Result<Vec<_>, ErreurCalc>>()?;

            let valeurs = fonction.lier(&positionnels, &nommes)?;
            (fonction.corps)(&Arguments::new(&valeurs, portee.env.angle()))
        }

        Expr::NonSupporte(c) => Err(ErreurCalc::ConstructionNonSupportee(c.description())),
    }
}

/* ------------------------ Démarche ------------------------ */

/// Formes intermédiaires d’une saisie (affichées par `--demarche`).
#[derive(Default, Clone, Debug, PartialEq)]
pub struct DemarcheNoyau {
    pub jetons: String,
    /// Arbre parenthésé ; `None` pour une saisie vide.
    pub arbre: Option<String>,
    pub profondeur: usize,
}

/// Jetons + arbre d’une saisie, sans l’évaluer.
pub fn analyser(expression: &str, profondeur_max: usize) -> Result<DemarcheNoyau, ErreurCalc> {
    let jetons = tokenize(&normaliser(expression))?;
    let mut d = DemarcheNoyau {
        jetons: format_tokens(&jetons),
        ..Default::default()
    };
    if !jetons.is_empty() {
        let arbre = parse_tokens(&jetons, profondeur_max)?;
        d.arbre = Some(format_expr_pretty(&arbre));
        d.profondeur = arbre.profondeur();
    }
    Ok(d)
}
