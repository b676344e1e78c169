//! src/session.rs
//!
//! État d’une session de calcul (sans affichage).
//!
//! Rôle : contenir ce que l’appelant possède entre deux évaluations (entrée,
//! dernier résultat `Ans`, dernière erreur, décimales, mode d’angle) et offrir
//! les actions de la calculatrice (C / CLR / AC, bascule DEG/RAD).
//!
//! Contrats :
//! - Le noyau reste sans état : `Ans` lui est passé en surcouche à chaque appel.
//! - Une erreur ne remplace pas `Ans` : seul un succès le met à jour.

use crate::config::{Config, DECIMALES_MAX};
use crate::noyau::{formater_resultat, Environnement, ErreurCalc, Issue, Liaisons, ModeAngle};

/// Noms sous lesquels le dernier résultat est visible.
pub const NOMS_ANS: [&str; 2] = ["Ans", "ANS"];

#[derive(Debug)]
pub struct Session {
    env: Environnement,

    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String,
    pub erreur: Option<ErreurCalc>,

    // --- mémoire ---
    ans: Option<f64>,

    // --- paramètres ---
    decimales: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            env: config.environnement(),
            entree: String::new(),
            resultat: String::new(),
            erreur: None,
            ans: None,
            decimales: config.decimales.min(DECIMALES_MAX),
        }
    }

    pub fn ans(&self) -> Option<f64> {
        self.ans
    }

    pub fn set_ans(&mut self, v: f64) {
        self.ans = Some(v);
    }

    pub fn decimales(&self) -> usize {
        self.decimales
    }

    pub fn set_decimales(&mut self, decimales: usize) {
        self.decimales = decimales.min(DECIMALES_MAX);
    }

    pub fn angle(&self) -> ModeAngle {
        self.env.angle()
    }

    pub fn environnement(&self) -> &Environnement {
        &self.env
    }

    /// DEG <-> RAD : reconstruit l’environnement (la liste blanche est immuable).
    pub fn basculer_angle(&mut self) {
        let angle = match self.env.angle() {
            ModeAngle::Radians => ModeAngle::Degres,
            ModeAngle::Degres => ModeAngle::Radians,
        };
        self.env = Environnement::new(angle, self.env.profondeur_max());
    }

    /// Surcouche de l’appel : `Ans`/`ANS` si un résultat existe.
    pub fn liaisons(&self) -> Liaisons {
        let mut extra = Liaisons::new();
        if let Some(v) = self.ans {
            for nom in NOMS_ANS {
                extra.insert(nom.to_string(), v);
            }
        }
        extra
    }

    /* ------------------------ Évaluation ------------------------ */

    /// Évalue `ligne` et dépose le résultat (ou l’erreur) dans l’état.
    pub fn evaluer_ligne(&mut self, ligne: &str) -> Issue {
        let issue = self.env.evaluer(ligne, &self.liaisons());
        match &issue {
            Issue::Succes(v) => {
                self.ans = Some(*v);
                self.resultat = formater_resultat(*v, self.decimales);
                self.erreur = None;
            }
            Issue::Vide => {}
            Issue::Echec(e) => {
                // on CONSERVE le dernier résultat affiché
                self.erreur = Some(e.clone());
            }
        }
        issue
    }

    /// "=" : évalue l’entrée courante.
    pub fn evaluer_entree(&mut self) -> Issue {
        let ligne = self.entree.clone();
        self.evaluer_ligne(&ligne)
    }

    /* ------------------------ Actions “boutons” ------------------------ */

    /// Bouton "Ans" : insère le nom du dernier résultat dans l’entrée.
    pub fn inserer_ans(&mut self) {
        self.entree.push_str(NOMS_ANS[0]);
    }

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
    }

    /// CLR : effacer résultat + erreur (sans toucher à l’entrée ni à `Ans`).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur = None;
    }

    /// AC : remise à zéro totale (entrée, résultats, mémoire).
    pub fn reset_total(&mut self) {
        self.clear_entree();
        self.clear_resultats();
        self.ans = None;
    }
}
