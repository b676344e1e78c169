// src/noyau/fonctions.rs
//
// Corps des fonctions de la liste blanche.
// Chaque fonction est définie sur son domaine mathématique ; hors domaine, on
// retourne ErreurCalc::Domaine avec la valeur fautive (jamais de NaN silencieux).
//
// factorial / comb / perm : calcul entier exact (BigInt), puis conversion f64.
// round(x, ndigits) : arrondi décimal exact (BigRational), au pair le plus proche.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, ToPrimitive, Zero};

use super::environnement::Arguments;
use super::erreurs::ErreurCalc;

type R = Result<f64, ErreurCalc>;

/// Au-delà, n! dépasse f64::MAX : inutile de calculer.
const FACTORIELLE_MAX: u32 = 170;

/// C(n, m) >= 2^m quand m <= n/2 : au-delà de 1100 termes, c’est infini en f64.
const COMB_TERMES_MAX: u32 = 1100;

/* ------------------------ Trigonométrie ------------------------ */

pub fn sin(a: &Arguments) -> R {
    Ok(a.angle.vers_radians(a.get(0)).sin())
}

pub fn cos(a: &Arguments) -> R {
    Ok(a.angle.vers_radians(a.get(0)).cos())
}

pub fn tan(a: &Arguments) -> R {
    Ok(a.angle.vers_radians(a.get(0)).tan())
}

pub fn asin(a: &Arguments) -> R {
    let x = dans_intervalle("asin", a.get(0))?;
    Ok(a.angle.depuis_radians(x.asin()))
}

pub fn acos(a: &Arguments) -> R {
    let x = dans_intervalle("acos", a.get(0))?;
    Ok(a.angle.depuis_radians(x.acos()))
}

pub fn atan(a: &Arguments) -> R {
    Ok(a.angle.depuis_radians(a.get(0).atan()))
}

fn dans_intervalle(fonction: &str, x: f64) -> R {
    if (-1.0..=1.0).contains(&x) {
        Ok(x)
    } else {
        Err(ErreurCalc::domaine(fonction, x))
    }
}

/* ------------------------ Hyperboliques ------------------------ */

pub fn sinh(a: &Arguments) -> R {
    Ok(a.get(0).sinh())
}

pub fn cosh(a: &Arguments) -> R {
    Ok(a.get(0).cosh())
}

pub fn tanh(a: &Arguments) -> R {
    Ok(a.get(0).tanh())
}

pub fn asinh(a: &Arguments) -> R {
    Ok(a.get(0).asinh())
}

pub fn acosh(a: &Arguments) -> R {
    let x = a.get(0);
    if x >= 1.0 {
        Ok(x.acosh())
    } else {
        Err(ErreurCalc::domaine("acosh", x))
    }
}

pub fn atanh(a: &Arguments) -> R {
    let x = a.get(0);
    if x > -1.0 && x < 1.0 {
        Ok(x.atanh())
    } else {
        Err(ErreurCalc::domaine("atanh", x))
    }
}

/* ------------------------ Racines, logarithmes ------------------------ */

pub fn sqrt(a: &Arguments) -> R {
    let x = a.get(0);
    if x >= 0.0 {
        Ok(x.sqrt())
    } else {
        Err(ErreurCalc::domaine("sqrt", x))
    }
}

pub fn cbrt(a: &Arguments) -> R {
    Ok(a.get(0).cbrt())
}

fn strictement_positif(fonction: &str, x: f64) -> R {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(ErreurCalc::domaine(fonction, x))
    }
}

pub fn ln(a: &Arguments) -> R {
    Ok(strictement_positif("ln", a.get(0))?.ln())
}

/// log(x, base=e). Base 1 : ln(1) = 0 au dénominateur => division par zéro.
pub fn log(a: &Arguments) -> R {
    let x = strictement_positif("log", a.get(0))?;
    let base = strictement_positif("log", a.get(1))?;
    if base == 1.0 {
        return Err(ErreurCalc::DivisionParZero);
    }
    Ok(x.ln() / base.ln())
}

pub fn log10(a: &Arguments) -> R {
    Ok(strictement_positif("log10", a.get(0))?.log10())
}

pub fn exp(a: &Arguments) -> R {
    Ok(a.get(0).exp())
}

/* ------------------------ Divers ------------------------ */

pub fn abs(a: &Arguments) -> R {
    Ok(a.get(0).abs())
}

pub fn floor(a: &Arguments) -> R {
    Ok(a.get(0).floor())
}

pub fn ceil(a: &Arguments) -> R {
    Ok(a.get(0).ceil())
}

pub fn deg(a: &Arguments) -> R {
    Ok(a.get(0).to_degrees())
}

pub fn rad(a: &Arguments) -> R {
    Ok(a.get(0).to_radians())
}

/// round(x, ndigits=0) : au pair le plus proche, sur la valeur décimale EXACTE de x.
/// (ex: round(2.675, 2) = 2.67, car 2.675 vaut en réalité 2.67499999…)
pub fn round(a: &Arguments) -> R {
    let x = a.get(0);
    let n = a.get(1);
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(ErreurCalc::domaine("round", n));
    }
    if !x.is_finite() {
        return Ok(x);
    }
    if n == 0.0 {
        return Ok(x.round_ties_even());
    }
    // au-delà de ces bornes, l’arrondi ne change rien (ou donne 0)
    if n > 400.0 {
        return Ok(x);
    }
    if n < -400.0 {
        return Ok(0.0_f64.copysign(x));
    }
    arrondi_decimal(x, n as i32)
}

fn arrondi_decimal(x: f64, n: i32) -> R {
    let r = BigRational::from_float(x).ok_or_else(|| ErreurCalc::domaine("round", x))?;
    let echelle = BigRational::from_integer(BigInt::from(10u32).pow(n.unsigned_abs()));

    let y = if n > 0 { r * &echelle } else { r / &echelle };
    let q = pair_le_plus_proche(&y);

    // la conversion texte -> f64 est correctement arrondie
    let texte = format!("{q}e{}", -n);
    let v: f64 = texte
        .parse()
        .map_err(|_| ErreurCalc::domaine("round", x))?;
    Ok(if v == 0.0 { 0.0_f64.copysign(x) } else { v })
}

fn pair_le_plus_proche(y: &BigRational) -> BigInt {
    let plancher = y.floor();
    let reste = y - &plancher;
    let q = plancher.to_integer();
    let demi = BigRational::new(BigInt::one(), BigInt::from(2));

    match reste.cmp(&demi) {
        Ordering::Less => q,
        Ordering::Greater => q + 1u32,
        Ordering::Equal => {
            if (&q % 2u32).is_zero() {
                q
            } else {
                q + 1u32
            }
        }
    }
}

/* ------------------------ Combinatoire (entiers exacts) ------------------------ */

/// x doit être un entier >= 0 (écrit en flottant).
fn entier_naturel(fonction: &str, x: f64) -> Result<BigInt, ErreurCalc> {
    if x.is_finite() && x.fract() == 0.0 && x >= 0.0 {
        BigInt::from_f64(x).ok_or_else(|| ErreurCalc::domaine(fonction, x))
    } else {
        Err(ErreurCalc::domaine(fonction, x))
    }
}

fn vers_f64(n: &BigInt) -> f64 {
    n.to_f64().unwrap_or(f64::INFINITY)
}

/// Produit des entiers de `bas` (exclu) à `haut` (inclus).
fn produit(bas: &BigInt, haut: &BigInt) -> BigInt {
    let mut acc = BigInt::one();
    let mut i = bas + 1u32;
    while &i <= haut {
        acc *= &i;
        i += 1u32;
    }
    acc
}

pub fn factorial(a: &Arguments) -> R {
    let n = entier_naturel("factorial", a.get(0))?;
    if n > BigInt::from(FACTORIELLE_MAX) {
        return Ok(f64::INFINITY);
    }
    Ok(vers_f64(&produit(&BigInt::zero(), &n)))
}

pub fn comb(a: &Arguments) -> R {
    let n = entier_naturel("comb", a.get(0))?;
    let k = entier_naturel("comb", a.get(1))?;
    if k > n {
        return Ok(0.0);
    }

    let m = std::cmp::min(k.clone(), &n - &k);
    if m > BigInt::from(COMB_TERMES_MAX) {
        return Ok(f64::INFINITY);
    }

    // C(n, i+1) = C(n, i) * (n - i) / (i + 1) : division exacte à chaque pas
    let mut acc = BigInt::one();
    let mut i = BigInt::zero();
    while i < m {
        acc = acc * (&n - &i) / (&i + 1u32);
        i += 1u32;
        // croissant tant que i <= n/2 : déjà hors de f64
        if acc.bits() > 1100 {
            return Ok(f64::INFINITY);
        }
    }
    Ok(vers_f64(&acc))
}

/// perm(n, k=n) = n! / (n-k)!
pub fn perm(a: &Arguments) -> R {
    let n = entier_naturel("perm", a.get(0))?;
    let k = match a.optionnel(1) {
        Some(k) => entier_naturel("perm", k)?,
        None => n.clone(),
    };
    if k > n {
        return Ok(0.0);
    }
    // perm(n, k) >= k!
    if k > BigInt::from(FACTORIELLE_MAX) {
        return Ok(f64::INFINITY);
    }
    Ok(vers_f64(&produit(&(&n - &k), &n)))
}
