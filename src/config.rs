// src/config.rs
//
// Réglages persistants (facultatifs) : fichier TOML.
// - Emplacement par défaut : <config_dir>/calculatrice-sure/config.toml
// - Fichier absent à l’emplacement par défaut => valeurs par défaut.
// - Fichier donné explicitement (--config) => il doit exister.
// - Les options de la ligne de commande priment sur le fichier.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::noyau::{Environnement, ModeAngle, DECIMALES_DEFAUT, PROFONDEUR_MAX_DEFAUT};

/// Au-delà, les chiffres affichés ne sont plus significatifs pour un f64.
pub const DECIMALES_MAX: usize = 17;

/// Borne haute acceptée pour `profondeur_max` (la pile doit suivre).
pub const PROFONDEUR_MAX_PLAFOND: usize = 2_000;

#[derive(Debug, Error)]
pub enum ErreurConfig {
    #[error("lecture de {chemin} impossible")]
    Lecture {
        chemin: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration invalide dans {chemin}")]
    Format {
        chemin: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("{champ} = {valeur} hors bornes ({bornes})")]
    Valeur {
        champ: &'static str,
        valeur: usize,
        bornes: String,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Unité des angles (rad | deg).
    pub angle: ModeAngle,
    /// Décimales affichées.
    pub decimales: usize,
    /// Profondeur d’arbre maximale.
    pub profondeur_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            angle: ModeAngle::default(),
            decimales: DECIMALES_DEFAUT,
            profondeur_max: PROFONDEUR_MAX_DEFAUT,
        }
    }
}

impl Config {
    pub fn chemin_defaut() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("calculatrice-sure").join("config.toml"))
    }

    /// Charge `chemin` s’il est donné, sinon l’emplacement par défaut (s’il existe).
    pub fn charger(chemin: Option<&Path>) -> Result<Self, ErreurConfig> {
        match chemin {
            Some(p) => Self::depuis_fichier(p),
            None => match Self::chemin_defaut() {
                Some(p) if p.is_file() => Self::depuis_fichier(&p),
                _ => {
                    debug!("pas de fichier de configuration, valeurs par défaut");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn depuis_fichier(chemin: &Path) -> Result<Self, ErreurConfig> {
        let texte = fs::read_to_string(chemin).map_err(|source| ErreurConfig::Lecture {
            chemin: chemin.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&texte).map_err(|e| ErreurConfig::Format {
            chemin: chemin.to_path_buf(),
            source: Box::new(e),
        })?;
        debug!(chemin = %chemin.display(), ?config, "configuration chargée");
        config.valider()
    }

    pub fn valider(self) -> Result<Self, ErreurConfig> {
        if self.decimales > DECIMALES_MAX {
            return Err(ErreurConfig::Valeur {
                champ: "decimales",
                valeur: self.decimales,
                bornes: format!("0..={DECIMALES_MAX}"),
            });
        }
        if !(1..=PROFONDEUR_MAX_PLAFOND).contains(&self.profondeur_max) {
            return Err(ErreurConfig::Valeur {
                champ: "profondeur_max",
                valeur: self.profondeur_max,
                bornes: format!("1..={PROFONDEUR_MAX_PLAFOND}"),
            });
        }
        Ok(self)
    }

    /// Environnement d’évaluation correspondant (liste blanche standard).
    pub fn environnement(&self) -> Environnement {
        Environnement::new(self.angle, self.profondeur_max)
    }
}
