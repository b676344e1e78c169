// src/main.rs
//
// Calculatrice sûre — point d’entrée en ligne de commande
// -------------------------------------------------------
// - Avec une expression : un calcul, résultat sur stdout.
// - Sans expression     : une ligne de stdin par calcul ; chaque succès
//                         devient `Ans` pour les lignes suivantes.
//
// Codes de sortie :
//   0 = succès (ou saisie vide)
//   1 = au moins un calcul a échoué (erreur[<Genre>] sur stderr)
//   2 = configuration ou entrée/sortie invalide

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use calculatrice_sure::config::Config;
use calculatrice_sure::noyau::environnement::Liaison;
use calculatrice_sure::noyau::{analyser, Environnement, Issue, ModeAngle};
use calculatrice_sure::session::Session;

#[derive(Parser, Debug)]
#[command(
    name = "calculatrice-sure",
    version,
    about = "Évalue des expressions mathématiques, sans jamais exécuter de code"
)]
struct Cli {
    /// Expression à évaluer (les mots sont joints par des espaces).
    /// Sans expression : lecture de stdin, un calcul par ligne.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<String>,

    /// Valeur initiale de `Ans`/`ANS`.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    ans: Option<f64>,

    /// Unité des angles.
    #[arg(long, value_name = "rad|deg")]
    angle: Option<ModeAngle>,

    /// Décimales affichées.
    #[arg(long, value_name = "N")]
    decimales: Option<usize>,

    /// Fichier de configuration TOML (sinon l’emplacement par défaut, s’il existe).
    #[arg(long, value_name = "FICHIER")]
    config: Option<PathBuf>,

    /// Affiche les jetons et l’arbre retenu (stderr).
    #[arg(long)]
    demarche: bool,

    /// Liste les constantes et fonctions autorisées.
    #[arg(long)]
    fonctions: bool,

    /// Journal détaillé (équivaut à RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    installer_journal(cli.verbose);

    match executer(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("erreur: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn installer_journal(verbose: bool) {
    let filtre = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn executer(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config =
        Config::charger(cli.config.as_deref()).context("chargement de la configuration")?;
    if let Some(angle) = cli.angle {
        config.angle = angle;
    }
    if let Some(decimales) = cli.decimales {
        config.decimales = decimales;
    }
    let config = config.valider()?;
    debug!(?config, "configuration effective");

    let mut session = Session::new(&config);
    if let Some(ans) = cli.ans {
        session.set_ans(ans);
    }

    let mut out = io::stdout().lock();

    if cli.fonctions {
        afficher_fonctions(session.environnement(), &mut out)?;
        return Ok(ExitCode::SUCCESS);
    }

    let reussi = if cli.expression.is_empty() {
        let mut echecs = 0usize;
        for ligne in io::stdin().lock().lines() {
            let ligne = ligne.context("lecture de l’entrée standard")?;
            if !calculer(&mut session, &ligne, cli.demarche, &mut out)? {
                echecs += 1;
            }
        }
        debug!(echecs, "fin de l’entrée standard");
        echecs == 0
    } else {
        let ligne = cli.expression.join(" ");
        calculer(&mut session, &ligne, cli.demarche, &mut out)?
    };

    out.flush()?;
    Ok(if reussi {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Un calcul : résultat sur `out`, erreur sur stderr. Retourne false en cas d’échec.
fn calculer(
    session: &mut Session,
    ligne: &str,
    demarche: bool,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    if demarche {
        // une saisie invalide est signalée par l’évaluation juste après
        if let Ok(d) = analyser(ligne, session.environnement().profondeur_max()) {
            eprintln!("jetons : {}", d.jetons);
            if let Some(arbre) = d.arbre {
                eprintln!("arbre  : {arbre} (profondeur {})", d.profondeur);
            }
        }
    }

    match session.evaluer_ligne(ligne) {
        Issue::Succes(_) => {
            writeln!(out, "{}", session.resultat)?;
            Ok(true)
        }
        Issue::Vide => Ok(true),
        Issue::Echec(e) => {
            eprintln!("erreur[{}]: {e}", e.code());
            Ok(false)
        }
    }
}

fn afficher_fonctions(env: &Environnement, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "angles : {}", env.angle())?;
    for (nom, liaison) in env.entrees() {
        match liaison {
            Liaison::Constante(v) => writeln!(out, "{nom:<20} constante = {v}")?,
            Liaison::Fonction(f) => writeln!(out, "{:<20} {}", f.signature(), f.aide)?,
        }
    }
    Ok(())
}
