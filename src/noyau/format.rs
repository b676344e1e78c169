// src/noyau/format.rs

use super::expr::Expr;

/// Tolérance du recalage sur l’entier le plus proche.
pub const EPSILON_ENTIER: f64 = 1e-12;

/// Nombre de décimales affichées par défaut.
pub const DECIMALES_DEFAUT: usize = 12;

/* ------------------------ Post-traitement ------------------------ */

/// Recale sur l’entier le plus proche si l’écart est < 1e-12
/// (ex: sin(pi) = 1.2e-16 -> 0, 2.9999999999999996 -> 3).
pub fn recaler_entier(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let r = x.round();
    if (x - r).abs() < EPSILON_ENTIER {
        // pas de -0 à l’affichage
        r + 0.0
    } else {
        x
    }
}

/* ------------------------ Affichage du résultat ------------------------ */

/// Texte d’un résultat, relisible par le noyau (idempotent).
///
/// - |x| dans [1, 1e15[ : `decimales` chiffres après la virgule, zéros de fin retirés
///   (0.1 + 0.2 -> "0.3", 2^10 -> "1024")
/// - |x| dans [1e-6, 1[ : `decimales` chiffres significatifs, les zéros de tête
///   ne comptent pas (1.23456789e-6 -> "0.00000123456789")
/// - sinon : notation scientifique, `decimales` chiffres significatifs au plus (1.5e20)
pub fn formater_resultat(x: f64, decimales: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return format!("{x}");
    }

    let a = x.abs();
    if (1e-6..1e15).contains(&a) {
        let chiffres = decimales + zeros_de_tete(a);
        let texte = retirer_zeros(&format!("{x:.chiffres$}"));
        if texte == "-0" {
            "0".to_string()
        } else {
            texte
        }
    } else {
        let precision = decimales.clamp(1, 16) - 1;
        let texte = format!("{x:.precision$e}");
        match texte.split_once('e') {
            Some((mantisse, exposant)) => format!("{}e{exposant}", retirer_zeros(mantisse)),
            None => texte,
        }
    }
}

/// Zéros entre la virgule et le premier chiffre significatif (0.00123 -> 2).
fn zeros_de_tete(a: f64) -> usize {
    if a >= 1.0 {
        return 0;
    }
    // log10 inexact près des puissances de 10 : au pire un chiffre de plus
    ((-a.log10()).ceil() as usize).saturating_sub(1)
}

fn retirer_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/* ------------------------ Affichage de l’arbre (démarche) ------------------------ */

/// Forme lisible de l’arbre : chaque opération binaire est parenthésée,
/// ce qui rend la précédence retenue visible (ex: -2^2 -> "-(2 ** 2)").
pub fn format_expr_pretty(e: &Expr) -> String {
    use Expr::*;

    match e {
        Nombre(n) => format!("{n}"),
        Var(s) => s.clone(),

        Unaire(op, x) => match **x {
            Binaire(..) | Nombre(_) | Var(_) | Appel { .. } => {
                format!("{}{}", op.symbole(), format_expr_pretty(x))
            }
            _ => format!("{}({})", op.symbole(), format_expr_pretty(x)),
        },

        Binaire(op, a, b) => format!(
            "({} {} {})",
            format_expr_pretty(a),
            op.symbole(),
            format_expr_pretty(b)
        ),

        Appel { nom, args, kwargs } => {
            let mut parts: Vec<String> = args.iter().map(format_expr_pretty).collect();
            parts.extend(
                kwargs
                    .iter()
                    .map(|(k, v)| format!("{k}={}", format_expr_pretty(v))),
            );
            format!("{nom}({})", parts.join(", "))
        }

        NonSupporte(c) => format!("<{}>", c.description()),
    }
}
