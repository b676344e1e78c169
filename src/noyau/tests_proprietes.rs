//! Propriétés (proptest) : lois vérifiées sur des saisies tirées au hasard.

use proptest::prelude::*;

use super::environnement::{Environnement, Liaisons};
use super::erreurs::ErreurCalc;
use super::eval::{evaluer, Issue};
use super::format::formater_resultat;

fn vide() -> Liaisons {
    Liaisons::new()
}

/// Texte relisible d’un nombre (via l’affichage officiel).
fn texte(x: f64) -> String {
    formater_resultat(x, 12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // --- Affichage ---

    #[test]
    fn affichage_idempotent(a in -1_000_000i64..1_000_000, b in 1i64..10_000, op in 0usize..4) {
        let op = ["+", "-", "*", "/"][op];
        let expr = format!("{a} {op} {b}");
        if let Issue::Succes(v) = evaluer(&expr, &vide()) {
            let premier = texte(v);
            let relu = evaluer(&premier, &vide());
            prop_assert_eq!(relu.valeur().map(texte), Some(premier));
        }
    }

    #[test]
    fn entiers_exacts(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let somme = evaluer(&format!("{a} + {b}"), &vide());
        prop_assert_eq!(somme, Issue::Succes((a + b) as f64));
        let produit = evaluer(&format!("({a}) * ({b})"), &vide());
        prop_assert_eq!(produit, Issue::Succes((a * b) as f64));
    }

    // --- Division par zéro ---

    #[test]
    fn division_par_zero_typee(x in -1e12f64..1e12, op in 0usize..3) {
        let op = ["/", "//", "%"][op];
        let expr = format!("({}) {op} (1 - 1)", texte(x));
        prop_assert_eq!(evaluer(&expr, &vide()), Issue::Echec(ErreurCalc::DivisionParZero));
    }

    // --- Liste blanche fermée ---

    #[test]
    fn nom_hors_liste_inconnu(nom in "[a-z_][a-z0-9_]{0,10}") {
        prop_assume!(Environnement::standard().get(&nom).is_none());
        let attendu = ErreurCalc::NomInconnu(nom.clone());
        prop_assert_eq!(evaluer(&nom, &vide()), Issue::Echec(attendu.clone()));
        prop_assert_eq!(evaluer(&format!("{nom}(1)"), &vide()), Issue::Echec(attendu));
    }

    #[test]
    fn surcouche_sans_fuite(v in -1e6f64..1e6) {
        let mut extra = Liaisons::new();
        extra.insert("Ans".into(), v);
        prop_assert!(matches!(evaluer("Ans", &extra), Issue::Succes(_)));
        prop_assert_eq!(
            evaluer("Ans", &vide()),
            Issue::Echec(ErreurCalc::NomInconnu("Ans".into()))
        );
    }

    // --- Robustesse ---

    #[test]
    fn jamais_de_panique(s in "\\PC{0,40}") {
        if let Issue::Succes(v) = evaluer(&s, &vide()) {
            prop_assert!(v.is_finite());
        }
    }
}
