// src/noyau/expr.rs
//
// AST du noyau (flottants f64).
// - Arbre possédé : chaque noeud possède ses enfants (Box/Vec), aucun partage.
// - Ensemble fermé de noeuds : l’évaluateur fait un `match` exhaustif.
// - NonSupporte : forme syntaxiquement valide mais interdite ; elle n’existe que
//   pour être rejetée à l’évaluation (la liste blanche vaut aussi pour la syntaxe).

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    FloorDiv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Neg,
    Pos,
}

/// Formes refusées par l’évaluateur.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Construction {
    Attribut(String),
    Indice,
    Liste,
    Tuple,
    Dictionnaire,
    Chaine,
    /// Appel dont l’appelé n’est pas un simple nom (ex: `(f)(x)`, `a.b(x)`).
    AppelIndirect,
    Operateur(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Nombre(f64),
    Var(String),

    Unaire(OpUnaire, Box<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),

    Appel {
        nom: String,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },

    NonSupporte(Construction),
}

impl OpBinaire {
    pub fn symbole(self) -> &'static str {
        match self {
            OpBinaire::Add => "+",
            OpBinaire::Sub => "-",
            OpBinaire::Mul => "*",
            OpBinaire::Div => "/",
            OpBinaire::Pow => "**",
            OpBinaire::Mod => "%",
            OpBinaire::FloorDiv => "//",
        }
    }
}

impl OpUnaire {
    pub fn symbole(self) -> &'static str {
        match self {
            OpUnaire::Neg => "-",
            OpUnaire::Pos => "+",
        }
    }
}

impl Construction {
    pub fn description(&self) -> String {
        match self {
            Construction::Attribut(nom) => format!("accès à l’attribut '.{nom}'"),
            Construction::Indice => "indexation [..]".into(),
            Construction::Liste => "liste [..]".into(),
            Construction::Tuple => "tuple (a, b)".into(),
            Construction::Dictionnaire => "dictionnaire/ensemble {..}".into(),
            Construction::Chaine => "littéral non numérique".into(),
            Construction::AppelIndirect => "appel de fonction non sûr".into(),
            Construction::Operateur(op) => format!("opérateur '{op}'"),
        }
    }
}

impl Expr {
    pub fn binaire(op: OpBinaire, a: Expr, b: Expr) -> Expr {
        Expr::Binaire(op, Box::new(a), Box::new(b))
    }

    pub fn unaire(op: OpUnaire, x: Expr) -> Expr {
        Expr::Unaire(op, Box::new(x))
    }

    pub fn appel(nom: &str, args: Vec<Expr>) -> Expr {
        Expr::Appel {
            nom: nom.to_string(),
            args,
            kwargs: Vec::new(),
        }
    }

    /// Profondeur de l’arbre, calculée itérativement (pas de récursion).
    pub fn profondeur(&self) -> usize {
        let mut max = 0;
        let mut pile: Vec<(&Expr, usize)> = vec![(self, 1)];

        while let Some((e, d)) = pile.pop() {
            max = max.max(d);
            match e {
                Expr::Nombre(_) | Expr::Var(_) | Expr::NonSupporte(_) => {}
                Expr::Unaire(_, x) => pile.push((x, d + 1)),
                Expr::Binaire(_, a, b) => {
                    pile.push((a, d + 1));
                    pile.push((b, d + 1));
                }
                Expr::Appel { args, kwargs, .. } => {
                    pile.extend(args.iter().map(|a| (a, d + 1)));
                    pile.extend(kwargs.iter().map(|(_, v)| (v, d + 1)));
                }
            }
        }

        max
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::format::format_expr_pretty(self))
    }
}
