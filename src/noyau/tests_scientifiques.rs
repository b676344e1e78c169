//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//!
//! Notes importantes (aligné avec l’état actuel du noyau) :
//! - Calcul en f64 : les identités sont vérifiées après recalage entier (1e-12),
//!   ou avec une tolérance relative explicite.
//! - Une somme “à plat” de n termes est un arbre de profondeur n : au-delà de
//!   la borne (200), elle est refusée comme trop complexe. Une somme balancée passe.

use std::time::{Duration, Instant};

use super::environnement::{Environnement, Liaisons, ModeAngle};
use super::erreurs::ErreurCalc;
use super::eval::{evaluer, Issue};
use super::format::formater_resultat;

fn eval_ok(expr: &str) -> f64 {
    match evaluer(expr, &Liaisons::new()) {
        Issue::Succes(v) => v,
        autre => panic!("expr={expr:?} -> {autre:?}"),
    }
}

fn assert_affiche(expr: &str, attendu: &str) {
    assert_eq!(formater_resultat(eval_ok(expr), 12), attendu, "expr={expr:?}");
}

fn assert_proche(expr: &str, attendu: f64) {
    let v = eval_ok(expr);
    assert!(
        (v - attendu).abs() <= 1e-12 * attendu.abs().max(1.0),
        "expr={expr:?} v={v} attendu={attendu}"
    );
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Invariants trig ------------------------ */

#[test]
fn sci_angles_remarquables() {
    assert_affiche("sin(pi/6)", "0.5");
    assert_affiche("cos(pi/3)", "0.5");
    assert_affiche("tan(pi/4)", "1");
    assert_affiche("sin(pi/4)", "0.707106781187");
    assert_affiche("sin(pi)", "0");
    assert_affiche("cos(pi/2)", "0");
}

#[test]
fn sci_identites_symetrie() {
    // sin(-x) = -sin(x), cos(-x) = cos(x)
    for x in ["0.3", "1.7", "pi/5", "2.5"] {
        assert_eq!(eval_ok(&format!("sin(-{x}) + sin({x})")), 0.0, "x={x}");
        assert_eq!(eval_ok(&format!("cos(-{x}) - cos({x})")), 0.0, "x={x}");
    }
}

#[test]
fn sci_pythagore_et_periodicite() {
    for x in ["0.1", "1", "2.2", "pi/7", "-3"] {
        assert_eq!(eval_ok(&format!("sin({x})^2 + cos({x})^2")), 1.0, "x={x}");
        assert_eq!(eval_ok(&format!("sin({x} + 2*pi) - sin({x})")), 0.0, "x={x}");
    }
}

#[test]
fn sci_reciproques() {
    assert_affiche("asin(sin(0.5))", "0.5");
    assert_affiche("exp(ln(7))", "7");
    assert_affiche("log(2 ** 20, 2)", "20");
    assert_affiche("cbrt(-27)", "-3");
    assert_affiche("tanh(atanh(0.25))", "0.25");
}

#[test]
fn sci_degres() {
    let env = Environnement::new(ModeAngle::Degres, 200);
    let vide = Liaisons::new();
    let sin30 = env.evaluer("sin(30)", &vide).valeur().unwrap();
    assert_eq!(formater_resultat(sin30, 12), "0.5");
    assert_eq!(env.evaluer("tan(45)", &vide), Issue::Succes(1.0));
    assert_eq!(env.evaluer("asin(1)", &vide), Issue::Succes(90.0));
    // même saisie, autre unité : l’environnement standard reste en radians
    assert_eq!(evaluer("asin(1)", &vide), Issue::Succes(std::f64::consts::FRAC_PI_2));
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_eq!(eval_ok("(1/2 + 1/3) - 5/6"), 0.0);
    assert_eq!(eval_ok("(2/3 * 3/4) - 1/2"), 0.0);
    assert_eq!(eval_ok("sqrt(2)*sqrt(2) - 2"), 0.0);
    assert_eq!(eval_ok("1/sqrt(3) - sqrt(3)/3"), 0.0);
}

#[test]
fn sci_combinatoire_exacte() {
    // symétrie C(n, k) = C(n, n-k), Pascal
    for (n, k) in [(10, 3), (30, 12), (52, 5)] {
        assert_eq!(
            eval_ok(&format!("comb({n}, {k})")),
            eval_ok(&format!("comb({n}, {})", n - k))
        );
        assert_eq!(
            eval_ok(&format!("comb({n}, {k})")),
            eval_ok(&format!("comb({}, {}) + comb({}, {k})", n - 1, k - 1, n - 1))
        );
    }
    assert_eq!(eval_ok("comb(52, 5)"), 2_598_960.0);
    assert_eq!(eval_ok("perm(10, 3)"), 720.0);
    assert_eq!(eval_ok("comb(3, 5)"), 0.0);
    assert_proche("factorial(20)", 2_432_902_008_176_640_000.0);
}

#[test]
fn sci_arrondi_pair() {
    assert_eq!(eval_ok("round(0.5)"), 0.0);
    assert_eq!(eval_ok("round(1.5)"), 2.0);
    assert_eq!(eval_ok("round(-2.5)"), -2.0);
    // 2.675 vaut 2.67499999... en binaire : l’arrondi exact donne 2.67
    assert_eq!(eval_ok("round(2.675, 2)"), 2.67);
    assert_eq!(eval_ok("round(1234, -2)"), 1200.0);
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // sqrt(4) -> 2 ; (2)^2 -> 4 ; etc. On alterne pour rester sur des carrés parfaits.
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
        budget(t0, max);
    }

    assert_eq!(eval_ok(&expr), 4.0);
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // 150 termes : sous la borne de profondeur
    let expr = ["1/2"; 150].join(" + ");
    budget(t0, max);
    assert_eq!(eval_ok(&expr), 75.0);

    // 300 termes à plat : arbre de profondeur 300 => refusé proprement
    let expr = ["1"; 300].join(" + ");
    assert_eq!(
        evaluer(&expr, &Liaisons::new()),
        Issue::Echec(ErreurCalc::ExpressionTropComplexe(200))
    );
    budget(t0, max);
}

#[test]
fn sci_stress_grands_nombres_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // gros littéral contrôlé (100 chiffres)
    let big = "9".repeat(100);
    assert_proche(&format!("{big}/7 + 1/7"), 1e100 / 7.0);
    budget(t0, max);

    // au-delà de f64 : refus typé, pas d’infini affiché
    let enorme = "9".repeat(400);
    assert!(matches!(
        evaluer(&enorme, &Liaisons::new()),
        Issue::Echec(ErreurCalc::ResultatNonFini(_))
    ));
    assert_affiche("factorial(170) / factorial(169)", "170");
    budget(t0, max);
}
