//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte certaines erreurs attendues (division par zéro, domaine, débordement)
//! - invariant clé : un succès est toujours fini

use std::time::{Duration, Instant};

use super::environnement::{Liaisons, PROFONDEUR_MAX_DEFAUT};
use super::erreurs::ErreurCalc;
use super::eval::{analyser, evaluer, Issue};
use super::format::formater_resultat;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(code: &str) -> bool {
    // Erreurs *normales* pour un fuzz arithmétique : le domaine est volontairement limité.
    matches!(code, "DivisionByZero" | "DomainError" | "NonFiniteResult")
}

fn check_succes_fini(expr: &str, issue: &Issue) {
    if let Issue::Succes(v) = issue {
        assert!(v.is_finite(), "succès non fini: expr={expr:?} v={v}");
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    // inclut 0 (utile pour les divisions) et des décimaux
    match rng.pick(8) {
        0 => "0".to_string(),
        1 => "1".to_string(),
        2 => "2".to_string(),
        3 => "0.5".to_string(),
        4 => "3.25".to_string(),
        5 => "10".to_string(),
        6 => "1e3".to_string(),
        _ => "7".to_string(),
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        _ => format!("-{}", gen_nombre(rng)),
    }
}

fn gen_appel(rng: &mut Rng, x: String) -> String {
    const UNAIRES: [&str; 12] = [
        "sin", "cos", "tan", "sqrt", "ln", "log10", "exp", "abs", "floor", "asin", "atanh",
        "factorial",
    ];
    let f = UNAIRES[rng.pick(UNAIRES.len() as u32) as usize];
    format!("{f}({x})")
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let sous = |rng: &mut Rng| gen_expr(rng, depth - 1);

    match rng.pick(10) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", sous(rng), sous(rng)),
        2 => format!("({}-{})", sous(rng), sous(rng)),
        3 => format!("({}*{})", sous(rng), sous(rng)),
        4 => format!("({}/{})", sous(rng), sous(rng)),
        5 => format!("({}%{})", sous(rng), sous(rng)),
        6 => format!("({}^{})", sous(rng), gen_nombre(rng)),
        7 => {
            let x = sous(rng);
            gen_appel(rng, x)
        }
        8 => format!("log({}, base={})", sous(rng), gen_nombre(rng)),
        _ => {
            if rng.coin() {
                format!("-({})", sous(rng))
            } else {
                format!("round({}, 2)", sous(rng))
            }
        }
    }
}

/// Saisie hostile : bouts de syntaxe d’un langage de script, mélangés au hasard.
fn gen_hostile(rng: &mut Rng) -> String {
    const MORCEAUX: [&str; 24] = [
        "__import__", "os", ".", "system", "(", ")", "'ls'", "\"x\"", "[", "]", "{", "}",
        ":", ",", "=", "lambda", "1", "pi", "sqrt", "**", "__class__", "eval", "exec", " ",
    ];
    let n = 1 + rng.pick(12) as usize;
    (0..n)
        .map(|_| MORCEAUX[rng.pick(MORCEAUX.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Helper chaîne à plat anti pile ------------------------ */

/// `n` termes reliés sans parenthèses ; `ops` est parcouru en boucle.
fn chaine_plate(rng: &mut Rng, ops: &[&str], n: usize) -> String {
    let mut s = String::with_capacity(n * 4);
    s.push_str(&gen_nombre(rng));
    for k in 1..n {
        s.push_str(ops[k % ops.len()]);
        s.push_str(&gen_nombre(rng));
    }
    s
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_finitude() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);
    let vide = Liaisons::new();

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..300 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 5);
        let issue = evaluer(&expr, &vide);
        // via Debug : NaN != NaN pour PartialEq
        assert_eq!(
            format!("{issue:?}"),
            format!("{:?}", evaluer(&expr, &vide)),
            "non déterministe: {expr:?}"
        );
        check_succes_fini(&expr, &issue);

        match issue {
            Issue::Succes(_) => seen_ok += 1,
            Issue::Echec(e) => {
                assert!(
                    is_erreur_attendue(e.code()),
                    "erreur non attendue: expr={expr:?} err={e:?}"
                );
                seen_err += 1;
            }
            Issue::Vide => panic!("vide inattendu: {expr:?}"),
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_affichage_relisible() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);
    let vide = Liaisons::new();

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..200 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 3);
        if let Issue::Succes(v) = evaluer(&expr, &vide) {
            let texte = formater_resultat(v, 12);
            match evaluer(&texte, &vide) {
                Issue::Succes(w) => assert_eq!(
                    formater_resultat(w, 12),
                    texte,
                    "affichage non idempotent: expr={expr:?}"
                ),
                autre => panic!("affichage illisible: {texte:?} -> {autre:?}"),
            }
        }
    }
}

#[test]
fn fuzz_safe_saisie_hostile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);
    let vide = Liaisons::new();

    let mut rng = Rng::new(0x5EC0_u64);

    for _ in 0..400 {
        budget(t0, max);

        let expr = gen_hostile(&mut rng);
        let issue = evaluer(&expr, &vide);
        check_succes_fini(&expr, &issue);

        // aucun nom hors liste blanche ne peut produire un nombre
        let contient_interdit = ["__import__", "os", "system", "lambda", "__class__", "eval", "exec"]
            .iter()
            .any(|m| expr.contains(m));
        if contient_interdit {
            assert!(
                !matches!(issue, Issue::Succes(_)),
                "succès sur saisie hostile: {expr:?}"
            );
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(evaluer(&expr, &Liaisons::new()), Issue::Succes(400.0));
}

#[test]
fn fuzz_safe_chaine_plate_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);
    let trop = ErreurCalc::ExpressionTropComplexe(PROFONDEUR_MAX_DEFAUT);

    let mut rng = Rng::new(0xF1A7_u64);

    let mut familles: Vec<Vec<&str>> = ["+", "-", "*", "/", "//", "%"]
        .iter()
        .map(|op| vec![*op])
        .collect();
    familles.push(vec!["+", "*", "-", "/", "%", "//"]);

    for ops in &familles {
        let expr = chaine_plate(&mut rng, ops, 100_000);
        // refus structurel : aucune division n’a lieu, même par zéro
        assert_eq!(evaluer(&expr, &Liaisons::new()), Issue::Echec(trop.clone()), "ops={ops:?}");
        assert_eq!(analyser(&expr, PROFONDEUR_MAX_DEFAUT), Err(trop.clone()), "ops={ops:?}");
        budget(t0, max);
    }

    // un million de termes mélangés
    let expr = chaine_plate(&mut rng, &["+", "*", "-"], 1_000_000);
    assert_eq!(evaluer(&expr, &Liaisons::new()), Issue::Echec(trop.clone()));
    assert_eq!(analyser(&expr, PROFONDEUR_MAX_DEFAUT), Err(trop));
    budget(t0, max);
}
