// src/noyau/operateurs.rs
//
// Table des opérateurs : une entrée par étiquette, dispatch exhaustif.
// - `/`, `//`, `%` par zéro => DivisionParZero (jamais ±inf ni NaN).
// - `%` et `//` suivent la convention “plancher” : le reste a le signe du diviseur.
// - base négative ** exposant non entier => Domaine (le résultat serait complexe).

use super::erreurs::ErreurCalc;
use super::expr::{OpBinaire, OpUnaire};

pub fn appliquer_binaire(op: OpBinaire, a: f64, b: f64) -> Result<f64, ErreurCalc> {
    match op {
        OpBinaire::Add => Ok(a + b),
        OpBinaire::Sub => Ok(a - b),
        OpBinaire::Mul => Ok(a * b),
        OpBinaire::Div => {
            non_nul(b)?;
            Ok(a / b)
        }
        OpBinaire::FloorDiv => {
            non_nul(b)?;
            Ok(divmod(a, b).0)
        }
        OpBinaire::Mod => {
            non_nul(b)?;
            Ok(divmod(a, b).1)
        }
        OpBinaire::Pow => puissance(a, b),
    }
}

pub fn appliquer_unaire(op: OpUnaire, x: f64) -> f64 {
    match op {
        OpUnaire::Neg => -x,
        OpUnaire::Pos => x,
    }
}

fn non_nul(b: f64) -> Result<(), ErreurCalc> {
    if b == 0.0 {
        Err(ErreurCalc::DivisionParZero)
    } else {
        Ok(())
    }
}

/// (quotient plancher, reste) avec le reste du signe du diviseur.
/// Corrige les cas où `(a / b).floor()` serait faux à cause de l’arrondi de `a / b`
/// (ex: 1 // 0.1 = 9, car 0.1 vaut un peu plus que 1/10).
fn divmod(a: f64, b: f64) -> (f64, f64) {
    let mut reste = a % b;
    let mut quotient = (a - reste) / b;

    if reste != 0.0 {
        if (b < 0.0) != (reste < 0.0) {
            reste += b;
            quotient -= 1.0;
        }
    } else {
        reste = 0.0_f64.copysign(b);
    }

    let plancher = if quotient != 0.0 {
        let mut q = quotient.floor();
        if quotient - q > 0.5 {
            q += 1.0;
        }
        q
    } else {
        0.0_f64.copysign(a / b)
    };

    (plancher, reste)
}

fn puissance(base: f64, exposant: f64) -> Result<f64, ErreurCalc> {
    if base == 0.0 && exposant < 0.0 {
        return Err(ErreurCalc::DivisionParZero);
    }
    if base < 0.0 && exposant.is_finite() && exposant.fract() != 0.0 {
        return Err(ErreurCalc::domaine("**", base));
    }
    Ok(base.powf(exposant))
}
