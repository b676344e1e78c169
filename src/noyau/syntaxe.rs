// src/noyau/syntaxe.rs
//
// Jetons -> AST (montée de précédence).
//
// Règles:
// - Précédences (de la plus faible à la plus forte) :
//     comparaisons/bit-à-bit (refusées) < + - < * / // % < unaire (- + √) < ** < primaire
// - `**` est associatif à droite ; son exposant peut porter un signe : 2**-1.
// - Un unaire à GAUCHE d’une puissance est plus faible qu’elle : -2**2 = -(2**2) = -4.
// - Ident suivi de '(' => appel (arguments positionnels puis nommés).
// - Attribut, indice, liste, tuple, dictionnaire, chaîne : analysés jusqu’au bout
//   (la syntaxe est vérifiée), puis remplacés par Expr::NonSupporte.
//
// NOTE:
// - Deux bornes, toutes deux à `profondeur_max` => ExpressionTropComplexe :
//   la récursion du parseur, et la profondeur de l’arbre construit. Une chaîne
//   à plat (1+1+…+1) est repliée en boucle : sa profondeur est tenue à jour à
//   chaque repli, si bien qu’aucun arbre plus profond que la borne n’existe.

use tracing::trace;

use super::erreurs::ErreurCalc;
use super::expr::{Construction, Expr, OpBinaire, OpUnaire};
use super::jetons::{format_tokens, normaliser, tokenize, Tok};

/// Précédence des opérateurs binaires ; 0 = pas un opérateur binaire.
fn precedence(t: &Tok) -> u8 {
    match t {
        Tok::OpNonSupporte(op) if *op != "~" => 1,
        Tok::Plus | Tok::Minus => 2,
        Tok::Star | Tok::Slash | Tok::DoubleSlash | Tok::Percent => 3,
        Tok::DoubleStar => PREC_PUISSANCE,
        _ => 0,
    }
}

/// Les opérandes d’un unaire se lisent à ce niveau (seule la puissance passe devant).
const PREC_PUISSANCE: u8 = 4;

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::DoubleStar)
}

fn op_binaire(t: &Tok) -> Option<OpBinaire> {
    Some(match t {
        Tok::Plus => OpBinaire::Add,
        Tok::Minus => OpBinaire::Sub,
        Tok::Star => OpBinaire::Mul,
        Tok::Slash => OpBinaire::Div,
        Tok::DoubleSlash => OpBinaire::FloorDiv,
        Tok::Percent => OpBinaire::Mod,
        Tok::DoubleStar => OpBinaire::Pow,
        _ => return None,
    })
}

/// Analyse complète d’une saisie brute : normalisation, jetons, arbre.
///
/// Retourne `Ok(None)` pour une saisie vide (ou seulement des espaces) :
/// un écran vide n’est pas une erreur.
pub fn parse(source: &str, profondeur_max: usize) -> Result<Option<Expr>, ErreurCalc> {
    let normalise = normaliser(source);
    let jetons = tokenize(&normalise)?;
    trace!(jetons = %format_tokens(&jetons), "tokenisation");

    if jetons.is_empty() {
        return Ok(None);
    }
    parse_tokens(&jetons, profondeur_max).map(Some)
}

/// Construit l’arbre à partir d’une suite (non vide) de jetons.
pub fn parse_tokens(tokens: &[Tok], profondeur_max: usize) -> Result<Expr, ErreurCalc> {
    let mut p = Parseur {
        toks: tokens,
        pos: 0,
        profondeur: 0,
        profondeur_max,
    };

    let (e, _) = p.expression()?;

    match p.regarder() {
        None => Ok(e),
        Some(Tok::RPar) => Err(ErreurCalc::syntaxe("parenthèse fermante sans ouvrante")),
        Some(Tok::Egal) => Err(ErreurCalc::syntaxe(
            "'=' n’est permis que pour un argument nommé",
        )),
        Some(t) => Err(ErreurCalc::syntaxe(format!(
            "jeton inattendu: '{}'",
            format_tokens(std::slice::from_ref(t))
        ))),
    }
}

/// Sous-arbre et sa profondeur (une feuille vaut 1, comme `Expr::profondeur`).
type Noeud = (Expr, usize);

/// (positionnels, nommés, profondeur du plus profond)
type ArgumentsAppel = (Vec<Expr>, Vec<(String, Expr)>, usize);

fn feuille(e: Expr) -> Noeud {
    (e, 1)
}

struct Parseur<'a> {
    toks: &'a [Tok],
    pos: usize,
    profondeur: usize,
    profondeur_max: usize,
}

impl<'a> Parseur<'a> {
    fn regarder(&self) -> Option<&'a Tok> {
        self.toks.get(self.pos)
    }

    fn regarder_apres(&self) -> Option<&'a Tok> {
        self.toks.get(self.pos + 1)
    }

    fn avancer(&mut self) -> Option<&'a Tok> {
        let t = self.toks.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn consommer_si(&mut self, attendu: &Tok) -> bool {
        if self.regarder() == Some(attendu) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn fermer(&mut self, fermant: &Tok) -> Result<(), ErreurCalc> {
        if self.consommer_si(fermant) {
            return Ok(());
        }
        match self.regarder() {
            None => Err(ErreurCalc::syntaxe(match fermant {
                Tok::RPar => "parenthèses non fermées",
                Tok::RCrochet => "crochet non fermé",
                _ => "accolade non fermée",
            })),
            Some(t) => Err(ErreurCalc::syntaxe(format!(
                "'{}' attendu, trouvé '{}'",
                format_tokens(std::slice::from_ref(fermant)),
                format_tokens(std::slice::from_ref(t))
            ))),
        }
    }

    /// Garde-fou de profondeur. Toute récursion passe par `binaire` :
    /// parenthèses, unaires, exposants, arguments.
    fn entrer(&mut self) -> Result<(), ErreurCalc> {
        self.profondeur += 1;
        if self.profondeur > self.profondeur_max {
            return Err(ErreurCalc::ExpressionTropComplexe(self.profondeur_max));
        }
        Ok(())
    }

    fn sortir(&mut self) {
        self.profondeur -= 1;
    }

    /// Profondeur d’un nœud sur le point d’être construit.
    fn borner(&self, profondeur: usize) -> Result<usize, ErreurCalc> {
        if profondeur > self.profondeur_max {
            return Err(ErreurCalc::ExpressionTropComplexe(self.profondeur_max));
        }
        Ok(profondeur)
    }

    fn expression(&mut self) -> Result<Noeud, ErreurCalc> {
        self.binaire(1)
    }

    /// Montée de précédence : lit les opérateurs de précédence >= `min_prec`.
    fn binaire(&mut self, min_prec: u8) -> Result<Noeud, ErreurCalc> {
        self.entrer()?;

        let (mut gauche, mut prof) = self.unaire()?;

        while let Some(tok) = self.regarder() {
            let p = precedence(tok);
            if p == 0 || p < min_prec {
                break;
            }
            self.pos += 1;

            let prochain = if is_right_associative(tok) { p } else { p + 1 };
            let (droite, prof_droite) = self.binaire(prochain)?;

            (gauche, prof) = match (op_binaire(tok), tok) {
                (Some(op), _) => {
                    let profondeur = self.borner(1 + prof.max(prof_droite))?;
                    (Expr::binaire(op, gauche, droite), profondeur)
                }
                (None, Tok::OpNonSupporte(op)) => {
                    feuille(Expr::NonSupporte(Construction::Operateur(*op)))
                }
                (None, _) => return Err(ErreurCalc::syntaxe("opérateur inattendu")),
            };
        }

        self.sortir();
        Ok((gauche, prof))
    }

    fn unaire(&mut self) -> Result<Noeud, ErreurCalc> {
        let op = match self.regarder() {
            Some(Tok::Minus) => Some(OpUnaire::Neg),
            Some(Tok::Plus) => Some(OpUnaire::Pos),
            Some(Tok::Racine) | Some(Tok::OpNonSupporte("~")) => None,
            _ => return self.postfixe(),
        };
        let tok = self.avancer();

        // l’opérande d’un unaire : tout ce qui lie plus fort (puissance incluse)
        let (x, prof) = self.binaire(PREC_PUISSANCE)?;

        let e = match (op, tok) {
            (Some(op), _) => Expr::unaire(op, x),
            (None, Some(Tok::Racine)) => Expr::appel("sqrt", vec![x]),
            (None, _) => return Ok(feuille(Expr::NonSupporte(Construction::Operateur("~")))),
        };
        Ok((e, self.borner(prof + 1)?))
    }

    /// Primaire suivi de ses suffixes : appel, indice, attribut.
    fn postfixe(&mut self) -> Result<Noeud, ErreurCalc> {
        let mut e = self.primaire()?;

        loop {
            match self.regarder() {
                Some(Tok::LPar) => {
                    self.pos += 1;
                    self.arguments()?;
                    e = feuille(Expr::NonSupporte(Construction::AppelIndirect));
                }
                Some(Tok::LCrochet) => {
                    self.pos += 1;
                    self.elements(&Tok::RCrochet)?;
                    e = feuille(Expr::NonSupporte(Construction::Indice));
                }
                Some(Tok::Point) => {
                    self.pos += 1;
                    match self.avancer() {
                        Some(Tok::Ident(nom)) => {
                            e = feuille(Expr::NonSupporte(Construction::Attribut(nom.clone())));
                        }
                        _ => return Err(ErreurCalc::syntaxe("nom attendu après '.'")),
                    }
                }
                _ => return Ok(e),
            }
        }
    }

    fn primaire(&mut self) -> Result<Noeud, ErreurCalc> {
        let tok = match self.avancer() {
            Some(t) => t,
            None => return Err(ErreurCalc::syntaxe("expression incomplète")),
        };

        match tok {
            Tok::Num(n) => Ok(feuille(Expr::Nombre(*n))),

            Tok::Ident(nom) => {
                if self.consommer_si(&Tok::LPar) {
                    let (args, kwargs, prof) = self.arguments()?;
                    let appel = Expr::Appel {
                        nom: nom.clone(),
                        args,
                        kwargs,
                    };
                    Ok((appel, self.borner(prof + 1)?))
                } else {
                    Ok(feuille(Expr::Var(nom.clone())))
                }
            }

            Tok::LPar => {
                // "()" : tuple vide
                if self.consommer_si(&Tok::RPar) {
                    return Ok(feuille(Expr::NonSupporte(Construction::Tuple)));
                }
                let e = self.expression()?;
                if self.consommer_si(&Tok::Virgule) {
                    self.elements(&Tok::RPar)?;
                    return Ok(feuille(Expr::NonSupporte(Construction::Tuple)));
                }
                self.fermer(&Tok::RPar)?;
                Ok(e)
            }

            Tok::LCrochet => {
                self.elements(&Tok::RCrochet)?;
                Ok(feuille(Expr::NonSupporte(Construction::Liste)))
            }

            Tok::LAccolade => {
                self.elements(&Tok::RAccolade)?;
                Ok(feuille(Expr::NonSupporte(Construction::Dictionnaire)))
            }

            Tok::Chaine(_) => Ok(feuille(Expr::NonSupporte(Construction::Chaine))),

            Tok::RPar => Err(ErreurCalc::syntaxe("parenthèse fermante inattendue")),
            Tok::Virgule => Err(ErreurCalc::syntaxe("virgule inattendue")),
            t => Err(ErreurCalc::syntaxe(format!(
                "'{}' inattendu",
                format_tokens(std::slice::from_ref(t))
            ))),
        }
    }

    /// Arguments d’appel, '(' déjà consommée.
    /// Les arguments nommés (`base=2`) viennent après les positionnels.
    fn arguments(&mut self) -> Result<ArgumentsAppel, ErreurCalc> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        let mut prof = 0;

        loop {
            if self.consommer_si(&Tok::RPar) {
                break;
            }

            match (self.regarder(), self.regarder_apres()) {
                (Some(Tok::Ident(nom)), Some(Tok::Egal)) => {
                    self.pos += 2;
                    if kwargs.iter().any(|(k, _)| k == nom) {
                        return Err(ErreurCalc::syntaxe(format!(
                            "argument nommé répété: '{nom}'"
                        )));
                    }
                    let (v, p) = self.expression()?;
                    prof = prof.max(p);
                    kwargs.push((nom.clone(), v));
                }
                _ => {
                    if !kwargs.is_empty() {
                        return Err(ErreurCalc::syntaxe(
                            "argument positionnel après un argument nommé",
                        ));
                    }
                    let (a, p) = self.expression()?;
                    prof = prof.max(p);
                    args.push(a);
                }
            }

            if !self.consommer_si(&Tok::Virgule) {
                self.fermer(&Tok::RPar)?;
                break;
            }
        }

        Ok((args, kwargs, prof))
    }

    /// Éléments séparés par des virgules jusqu’à `fermant` (ouvrant déjà consommé).
    /// Accepte `a: b` (dictionnaires, tranches) ; le contenu est vérifié puis jeté.
    fn elements(&mut self, fermant: &Tok) -> Result<(), ErreurCalc> {
        loop {
            if self.consommer_si(fermant) {
                break;
            }
            self.expression()?;
            if self.consommer_si(&Tok::DeuxPoints) {
                self.expression()?;
            }
            if !self.consommer_si(&Tok::Virgule) {
                self.fermer(fermant)?;
                break;
            }
        }
        Ok(())
    }
}
