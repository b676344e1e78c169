// src/noyau/jetons.rs
//
// Normalisation de la saisie + tokenisation.
// - Les glyphes “calculatrice” (×, ÷, −, ^, π) sont ramenés à leur forme ASCII
//   AVANT la tokenisation : le reste du noyau ne voit jamais de glyphe.
// - La tokenisation reconnaît aussi des jetons que la grammaire refuse ensuite
//   (chaînes, crochets, comparaisons…) : le rejet se fait au bon niveau, avec un
//   message précis, au lieu d’un “caractère inattendu” générique.

use super::erreurs::ErreurCalc;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),
    Ident(String),

    Plus,
    Minus,
    Star,
    DoubleStar, // ** (et ^ après normalisation)
    Slash,
    DoubleSlash, // division entière (plancher)
    Percent,
    Racine, // √

    LPar,
    RPar,
    Virgule,
    Egal,

    // Jetons reconnus pour être refusés proprement par la grammaire.
    LCrochet,
    RCrochet,
    LAccolade,
    RAccolade,
    DeuxPoints,
    Point,
    Chaine(String),
    OpNonSupporte(&'static str),
}

/// Remplace les glyphes saisis au clavier/boutons par leur équivalent ASCII.
pub fn normaliser(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '×' | '·' | '⋅' | '∗' => out.push('*'),
            '÷' | '∕' => out.push('/'),
            '−' | '–' => out.push('-'),
            '^' => out.push_str("**"),
            'π' => out.push_str("pi"),
            _ => out.push(c),
        }
    }
    out
}

/// Tokenize une chaîne déjà normalisée.
/// Supporte:
/// - nombres décimaux (12, 1.5, .5, 5.) + notation scientifique (1e3, 2.5E-4)
/// - opérateurs + - * ** / // %
/// - parenthèses, virgule, `=` (arguments nommés)
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (sensibles à la casse)
/// - √ (racine préfixe)
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurCalc> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        let suivant = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Nombre : chiffre, ou '.' suivi d’un chiffre
        if c.is_ascii_digit() || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit())) {
            let (n, fin) = lire_nombre(&chars, i)?;
            out.push(Tok::Num(n));
            i = fin;
            continue;
        }

        // Identifiants ASCII
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            out.push(Tok::Ident(chars[start..i].iter().collect()));
            continue;
        }

        // Chaînes (refusées par la grammaire, mais syntaxe vérifiée)
        if c == '\'' || c == '"' {
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && chars[j] != c {
                j += 1;
            }
            if j >= chars.len() {
                return Err(ErreurCalc::syntaxe("chaîne non terminée"));
            }
            out.push(Tok::Chaine(chars[start..j].iter().collect()));
            i = j + 1;
            continue;
        }

        // Opérateurs sur deux caractères d’abord
        let double = |attendu: char| suivant == Some(attendu);
        let (tok, largeur) = match c {
            '*' if double('*') => (Tok::DoubleStar, 2),
            '/' if double('/') => (Tok::DoubleSlash, 2),
            '<' if double('<') => (Tok::OpNonSupporte("<<"), 2),
            '>' if double('>') => (Tok::OpNonSupporte(">>"), 2),
            '<' if double('=') => (Tok::OpNonSupporte("<="), 2),
            '>' if double('=') => (Tok::OpNonSupporte(">="), 2),
            '=' if double('=') => (Tok::OpNonSupporte("=="), 2),
            '!' if double('=') => (Tok::OpNonSupporte("!="), 2),

            '+' => (Tok::Plus, 1),
            '-' => (Tok::Minus, 1),
            '*' => (Tok::Star, 1),
            '/' => (Tok::Slash, 1),
            '%' => (Tok::Percent, 1),
            '√' => (Tok::Racine, 1),
            '(' => (Tok::LPar, 1),
            ')' => (Tok::RPar, 1),
            ',' => (Tok::Virgule, 1),
            '=' => (Tok::Egal, 1),
            '[' => (Tok::LCrochet, 1),
            ']' => (Tok::RCrochet, 1),
            '{' => (Tok::LAccolade, 1),
            '}' => (Tok::RAccolade, 1),
            ':' => (Tok::DeuxPoints, 1),
            '.' => (Tok::Point, 1),
            '<' => (Tok::OpNonSupporte("<"), 1),
            '>' => (Tok::OpNonSupporte(">"), 1),
            '|' => (Tok::OpNonSupporte("|"), 1),
            '&' => (Tok::OpNonSupporte("&"), 1),
            '~' => (Tok::OpNonSupporte("~"), 1),
            '@' => (Tok::OpNonSupporte("@"), 1),

            _ => return Err(ErreurCalc::syntaxe(format!("caractère inattendu: '{c}'"))),
        };
        out.push(tok);
        i += largeur;
    }

    Ok(out)
}

/// Lit un littéral numérique à partir de `start`.
/// Retourne (valeur, index de fin).
///
/// `1e3` est un nombre ; `2e` ou `2*e` laissent `e` à l’identifiant (constante).
fn lire_nombre(chars: &[char], start: usize) -> Result<(f64, usize), ErreurCalc> {
    let mut i = start;
    let chiffres = |i: &mut usize| {
        let debut = *i;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
        chars[debut..*i].iter().collect::<String>()
    };

    let entier = chiffres(&mut i);
    let mut fraction = String::new();
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        fraction = chiffres(&mut i);
    }

    // exposant seulement si des chiffres suivent (éventuellement signés)
    let mut exposant = String::new();
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let mut signe = String::new();
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            signe.push(chars[j]);
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            let e = chiffres(&mut j);
            exposant = format!("e{signe}{e}");
            i = j;
        }
    }

    // forme canonique, acceptée sans ambiguïté par f64::from_str
    let entier = if entier.is_empty() { "0".into() } else { entier };
    let fraction = if fraction.is_empty() { "0".into() } else { fraction };
    let texte = format!("{entier}.{fraction}{exposant}");

    let n: f64 = texte
        .parse()
        .map_err(|_| ErreurCalc::syntaxe(format!("nombre invalide: {texte}")))?;
    Ok((n, i))
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(n) => format!("{n}"),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::DoubleStar => "**".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::DoubleSlash => "//".to_string(),
            Tok::Percent => "%".to_string(),
            Tok::Racine => "√".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),
            Tok::Egal => "=".to_string(),

            Tok::LCrochet => "[".to_string(),
            Tok::RCrochet => "]".to_string(),
            Tok::LAccolade => "{".to_string(),
            Tok::RAccolade => "}".to_string(),
            Tok::DeuxPoints => ":".to_string(),
            Tok::Point => ".".to_string(),
            Tok::Chaine(s) => format!("{s:?}"),
            Tok::OpNonSupporte(op) => op.to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
